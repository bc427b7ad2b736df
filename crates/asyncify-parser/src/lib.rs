//! TypeScript parser and AST types for the asyncify converter.
//!
//! This crate provides:
//! - `NodeArena` - thin 16-byte nodes plus typed data pools
//! - `ParserState` - recursive descent parser producing a `NodeArena`
//! - `syntax` - small traversal helpers shared by later phases

pub mod parser;
pub use parser::{
    NodeAccess, NodeArena, NodeIndex, NodeList, ParseDiagnostic, ParserState, node,
    node_flags, syntax_kind_ext,
};

pub mod syntax;
