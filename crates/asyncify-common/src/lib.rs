//! Common types and utilities for the asyncify converter.
//!
//! This crate provides foundational types used across all asyncify crates:
//! - Byte spans and line maps for source locations
//! - Diagnostic categories, messages and codes
//! - Centralized traversal limits

// Centralized limits and thresholds
pub mod limits;

// Byte spans, line/column positions and line maps
pub mod position;
pub use position::{LineMap, Position, TextSpan};

// Diagnostics shared by the parser, the suggestion pass and the code fix
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticMessage};
