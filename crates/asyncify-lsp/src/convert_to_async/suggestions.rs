//! "This may be converted to an async function." suggestion diagnostics.

use super::ConvertToAsync;
use asyncify_checker::{OracleOptions, is_promise_type_text};
use asyncify_common::Diagnostic;
use asyncify_common::diagnostics::diagnostic_messages;
use tracing::debug;

pub struct ConvertToAsyncSuggestions;

impl ConvertToAsyncSuggestions {
    /// One suggestion per non-async function holding a convertible chain
    /// whose declared return type (if any) is a promise or `void`. The
    /// span is the function's name, or the whole function when anonymous.
    pub fn collect(
        converter: &ConvertToAsync<'_>,
        options: &OracleOptions,
        file_name: &str,
    ) -> Vec<Diagnostic> {
        let arena = converter.arena();
        let mut diagnostics = Vec::new();
        for func in converter.convertible_functions() {
            let Some(node) = arena.get(func) else {
                continue;
            };
            let Some(data) = arena.get_function(node) else {
                continue;
            };
            if data.is_async {
                continue;
            }
            if let Some(return_type) = arena
                .get(data.type_annotation)
                .and_then(|n| arena.get_type_node(n))
                && !returns_async_compatible(&return_type.text, options)
            {
                continue;
            }

            let span_node = if data.name.is_some() { data.name } else { func };
            let Some(span) = arena.get(span_node) else {
                continue;
            };
            diagnostics.push(Diagnostic::from_message(
                file_name,
                span.pos,
                span.end.saturating_sub(span.pos),
                &diagnostic_messages::THIS_MAY_BE_CONVERTED_TO_AN_ASYNC_FUNCTION,
            ));
        }
        debug!(count = diagnostics.len(), "convert-to-async suggestions");
        diagnostics
    }
}

fn returns_async_compatible(text: &str, options: &OracleOptions) -> bool {
    text.trim() == "void" || is_promise_type_text(text, options)
}

#[cfg(test)]
#[path = "tests/suggestions_tests.rs"]
mod tests;
