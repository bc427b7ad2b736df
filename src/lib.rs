//! asyncify: rewrite promise `.then`/`.catch` chains as `async`/`await`.
//!
//! The work is split across one crate per phase; this crate re-exports
//! them and offers one-call helpers for whole files.

// Shared positions, line maps and diagnostics
pub use asyncify_common as common;
pub use asyncify_common::{Diagnostic, DiagnosticCategory, LineMap, TextSpan};

// Scanner, parser and binder
pub use asyncify_binder as binder;
pub use asyncify_parser as parser;
pub use asyncify_scanner as scanner;

// Promise type oracle
pub use asyncify_checker as checker;
pub use asyncify_checker::{OracleOptions, PromiseTypeOracle, TypeOracle};

// Printer for synthesized statements
pub use asyncify_emitter as emitter;
pub use asyncify_emitter::PrintOptions;

// Conversion, suggestions and code fixes
pub use asyncify_lsp as lsp;
pub use asyncify_lsp::{
    CodeFixInfo, ConvertToAsyncCodeFix, FunctionConversion, ParsedSource, TextEdit,
    apply_text_changes,
};

pub mod tracing_config;

/// Convert every flagged function of `source` with default options.
/// Source that does not parse, or holds nothing to convert, comes back as is.
pub fn convert_source(file_name: &str, source: &str) -> String {
    convert_source_with(&ConvertToAsyncCodeFix::default(), file_name, source)
}

pub fn convert_source_with(fix: &ConvertToAsyncCodeFix, file_name: &str, source: &str) -> String {
    let edits: Vec<TextEdit> = fix
        .all_conversions(file_name, source)
        .iter()
        .flat_map(FunctionConversion::edits)
        .collect();
    apply_text_changes(source, &edits)
}

/// "This may be converted to an async function." suggestions for `source`.
pub fn suggest_source(file_name: &str, source: &str) -> Vec<Diagnostic> {
    ConvertToAsyncCodeFix::default().get_suggestions(file_name, source)
}
