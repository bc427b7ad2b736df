//! Type oracle for the asyncify converter.
//!
//! The converter never type-checks; it asks three questions of the program
//! (is this expression promise-like, what binding does this identifier name,
//! what is this callable's first parameter called). `TypeOracle` is that
//! query surface and `PromiseTypeOracle` answers it from declarations, type
//! annotation text and a configurable list of known promise producers.

pub mod options;
pub use options::{ConfigError, OracleOptions};

pub mod oracle;
pub use oracle::TypeOracle;

pub mod promise_oracle;
pub use promise_oracle::{PromiseTypeOracle, is_promise_type_text, returns_promise_type_text};
