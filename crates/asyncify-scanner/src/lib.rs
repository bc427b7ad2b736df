//! TypeScript scanner/tokenizer for the asyncify converter.
//!
//! This crate provides the lexical analysis phase:
//! - `SyntaxKind` - Token types
//! - `ScannerState` - Tokenizer state machine
//! - `char_codes` - Character classification utilities

pub mod char_codes;

pub mod scanner;
pub use scanner::{SyntaxKind, keyword_to_kind, token_to_string};

pub mod scanner_impl;
pub use scanner_impl::{ScannerDiagnostic, ScannerSnapshot, ScannerState, token_flags};
