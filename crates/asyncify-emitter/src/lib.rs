//! Printer for the asyncify converter.
//!
//! Renders arena nodes back to source text. The same printer handles nodes
//! straight from the parser and nodes synthesized by the rewriter, so it
//! inserts the parentheses that synthesized trees need but never carry.

pub mod source_writer;
pub use source_writer::SourceWriter;

pub mod printer;
pub use printer::{PrintOptions, Printer};
