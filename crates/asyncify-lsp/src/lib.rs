//! Convert-to-async language service for the asyncify converter.
//!
//! This crate provides:
//! - `convert_to_async` - chain recognition, gluing, naming, rewriting and
//!   splicing for one function
//! - `ConvertToAsyncSuggestions` - the "may be converted" suggestion pass
//! - `code_actions` - tsserver-shaped code fixes built on the above

pub mod code_actions;
pub mod convert_to_async;

pub use code_actions::{
    CodeFixFileChange, CodeFixInfo, CodeFixPosition, CodeFixRegistry, CodeFixTextChange,
    ConvertToAsyncCodeFix, apply_text_changes,
};
pub use convert_to_async::{
    ConvertToAsync, ConvertToAsyncSuggestions, FunctionConversion, TextEdit,
};

use asyncify_binder::BinderState;
use asyncify_parser::{NodeArena, NodeIndex, ParseDiagnostic, ParserState};

/// A parsed and bound source file.
pub struct ParsedSource {
    pub file_name: String,
    pub source_text: String,
    pub arena: NodeArena,
    pub root: NodeIndex,
    pub binder: BinderState,
    pub parse_diagnostics: Vec<ParseDiagnostic>,
}

impl ParsedSource {
    pub fn parse(file_name: &str, source_text: &str) -> ParsedSource {
        let mut parser = ParserState::new(file_name.to_string(), source_text.to_string());
        let root = parser.parse_source_file();
        let parse_diagnostics = parser.get_diagnostics().to_vec();
        let arena = parser.into_arena();
        let mut binder = BinderState::new();
        binder.bind_source_file(&arena, root);
        ParsedSource {
            file_name: file_name.to_string(),
            source_text: source_text.to_string(),
            arena,
            root,
            binder,
            parse_diagnostics,
        }
    }

    pub fn has_parse_errors(&self) -> bool {
        !self.parse_diagnostics.is_empty()
    }
}
