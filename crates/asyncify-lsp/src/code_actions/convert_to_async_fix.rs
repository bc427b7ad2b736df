//! The "Convert to async function" code fix.

use super::code_action_fixes::{CodeFixFileChange, CodeFixInfo, CodeFixRegistry, CodeFixTextChange};
use crate::ParsedSource;
use crate::convert_to_async::{
    ConvertToAsync, ConvertToAsyncSuggestions, FunctionConversion, TextEdit,
};
use asyncify_checker::{OracleOptions, PromiseTypeOracle};
use asyncify_common::diagnostics::diagnostic_codes;
use asyncify_common::{Diagnostic, LineMap, TextSpan};
use asyncify_emitter::PrintOptions;
use tracing::{debug, info_span};

/// Parses, binds and converts one file per request. Nothing is cached
/// between requests.
#[derive(Clone, Debug, Default)]
pub struct ConvertToAsyncCodeFix {
    oracle_options: OracleOptions,
    print_options: PrintOptions,
}

impl ConvertToAsyncCodeFix {
    pub fn new(oracle_options: OracleOptions, print_options: PrintOptions) -> ConvertToAsyncCodeFix {
        ConvertToAsyncCodeFix {
            oracle_options,
            print_options,
        }
    }

    pub fn oracle_options(&self) -> &OracleOptions {
        &self.oracle_options
    }

    /// Suggestion diagnostics for every convertible function.
    pub fn get_suggestions(&self, file_name: &str, source: &str) -> Vec<Diagnostic> {
        let parsed = ParsedSource::parse(file_name, source);
        if parsed.has_parse_errors() {
            return Vec::new();
        }
        let oracle = PromiseTypeOracle::new(&parsed.arena, &parsed.binder, &self.oracle_options);
        let converter = self.converter(&parsed, &oracle);
        ConvertToAsyncSuggestions::collect(&converter, &self.oracle_options, file_name)
    }

    /// Edits converting the innermost function at `position`.
    pub fn conversion_at(&self, file_name: &str, source: &str, position: u32) -> Vec<TextEdit> {
        let parsed = ParsedSource::parse(file_name, source);
        if parsed.has_parse_errors() {
            return Vec::new();
        }
        let oracle = PromiseTypeOracle::new(&parsed.arena, &parsed.binder, &self.oracle_options);
        let converter = self.converter(&parsed, &oracle);
        converter
            .find_function_at(position)
            .and_then(|func| converter.convert_function(func))
            .map(|conversion| conversion.edits())
            .unwrap_or_default()
    }

    /// Edits converting the outermost convertible function called `name`.
    pub fn conversion_named(&self, file_name: &str, source: &str, name: &str) -> Vec<TextEdit> {
        let parsed = ParsedSource::parse(file_name, source);
        if parsed.has_parse_errors() {
            return Vec::new();
        }
        let oracle = PromiseTypeOracle::new(&parsed.arena, &parsed.binder, &self.oracle_options);
        let converter = self.converter(&parsed, &oracle);
        converter
            .find_function_named(name)
            .and_then(|func| converter.convert_function(func))
            .map(|conversion| conversion.edits())
            .unwrap_or_default()
    }

    /// Edits converting every flagged function. A function whose edits
    /// overlap an already accepted conversion is skipped.
    pub fn all_conversions(&self, file_name: &str, source: &str) -> Vec<FunctionConversion> {
        let parsed = ParsedSource::parse(file_name, source);
        if parsed.has_parse_errors() {
            return Vec::new();
        }
        let oracle = PromiseTypeOracle::new(&parsed.arena, &parsed.binder, &self.oracle_options);
        let converter = self.converter(&parsed, &oracle);
        let flagged: Vec<u32> =
            ConvertToAsyncSuggestions::collect(&converter, &self.oracle_options, file_name)
                .iter()
                .map(|diagnostic| diagnostic.start)
                .collect();

        let mut accepted: Vec<FunctionConversion> = Vec::new();
        for func in converter.convertible_functions() {
            let Some(node) = parsed.arena.get(func) else {
                continue;
            };
            let span = TextSpan::from_bounds(node.pos, node.end);
            if !flagged.iter().any(|&start| span.contains(start)) {
                continue;
            }
            let Some(conversion) = converter.convert_function(func) else {
                continue;
            };
            let overlaps = accepted.iter().any(|existing| {
                existing.edits().iter().any(|a| {
                    conversion
                        .edits()
                        .iter()
                        .any(|b| a.span.overlaps(&b.span) || a.span.start == b.span.start)
                })
            });
            if overlaps {
                debug!(func = func.0, "skip overlapping conversion");
                continue;
            }
            accepted.push(conversion);
        }
        accepted
    }

    /// Code fixes for the function at `position`, in tsserver's shape.
    pub fn get_code_actions(&self, file_name: &str, source: &str, position: u32) -> Vec<CodeFixInfo> {
        let _span = info_span!("get_code_actions", file_name, position).entered();
        let edits = self.conversion_at(file_name, source, position);
        if edits.is_empty() {
            return Vec::new();
        }
        self.code_fix(file_name, source, &edits).into_iter().collect()
    }

    /// One code fix per convertible function in the file.
    pub fn get_all_code_actions(&self, file_name: &str, source: &str) -> Vec<CodeFixInfo> {
        let _span = info_span!("get_all_code_actions", file_name).entered();
        self.all_conversions(file_name, source)
            .iter()
            .filter_map(|conversion| self.code_fix(file_name, source, &conversion.edits()))
            .collect()
    }

    fn converter<'a>(
        &self,
        parsed: &'a ParsedSource,
        oracle: &'a PromiseTypeOracle<'a>,
    ) -> ConvertToAsync<'a> {
        ConvertToAsync::new(&parsed.arena, &parsed.binder, oracle, &parsed.source_text)
            .with_print_options(self.print_options.clone())
    }

    fn code_fix(&self, file_name: &str, source: &str, edits: &[TextEdit]) -> Option<CodeFixInfo> {
        let (fix_name, fix_id, description, fix_all_description) =
            CodeFixRegistry::fixes_for_error_code(
                diagnostic_codes::THIS_MAY_BE_CONVERTED_TO_AN_ASYNC_FUNCTION,
            )
            .into_iter()
            .next()?;
        let line_map = LineMap::build(source);
        Some(CodeFixInfo {
            fix_name: fix_name.to_string(),
            description: description.to_string(),
            changes: vec![CodeFixFileChange {
                file_name: file_name.to_string(),
                text_changes: edits
                    .iter()
                    .map(|edit| CodeFixTextChange::from_edit(edit, &line_map, source))
                    .collect(),
            }],
            commands: Vec::new(),
            fix_id: Some(fix_id.to_string()),
            fix_all_description: Some(fix_all_description.to_string()),
        })
    }
}
