use crate::convert_to_async::TextEdit;
use asyncify_common::LineMap;
use asyncify_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFixInfo {
    /// The internal name of the code fix (e.g., "convertToAsyncFunction").
    pub fix_name: String,
    /// Human-readable description of the fix.
    pub description: String,
    /// The file changes to apply.
    pub changes: Vec<CodeFixFileChange>,
    /// Optional commands to run after applying the fix.
    pub commands: Vec<serde_json::Value>,
    /// An identifier for fix-all support.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_id: Option<String>,
    /// Human-readable description of the fix-all action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_all_description: Option<String>,
}

/// A file change in a code fix.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFixFileChange {
    pub file_name: String,
    pub text_changes: Vec<CodeFixTextChange>,
}

/// A text change within a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFixTextChange {
    pub start: CodeFixPosition,
    pub end: CodeFixPosition,
    pub new_text: String,
}

/// A position in the tsserver protocol (1-based line/offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodeFixPosition {
    pub line: u32,
    pub offset: u32,
}

impl CodeFixTextChange {
    pub fn from_edit(edit: &TextEdit, line_map: &LineMap, source: &str) -> CodeFixTextChange {
        let (start_line, start_offset) = line_map.offset_to_line_offset(edit.span.start, source);
        let (end_line, end_offset) = line_map.offset_to_line_offset(edit.span.end(), source);
        CodeFixTextChange {
            start: CodeFixPosition {
                line: start_line,
                offset: start_offset,
            },
            end: CodeFixPosition {
                line: end_line,
                offset: end_offset,
            },
            new_text: edit.new_text.clone(),
        }
    }
}

/// Mapping from diagnostic codes to code fix metadata.
pub struct CodeFixRegistry;

impl CodeFixRegistry {
    /// Get code fixes applicable for a given error code.
    /// Returns a list of (`fix_name`, `fix_id`, `description`, `fix_all_description`) tuples.
    pub fn fixes_for_error_code(
        error_code: u32,
    ) -> Vec<(&'static str, &'static str, &'static str, &'static str)> {
        match error_code {
            // This may be converted to an async function.
            diagnostic_codes::THIS_MAY_BE_CONVERTED_TO_AN_ASYNC_FUNCTION => vec![(
                "convertToAsyncFunction",
                "convertToAsyncFunction",
                diagnostic_messages::CONVERT_TO_ASYNC_FUNCTION.message,
                diagnostic_messages::CONVERT_ALL_TO_ASYNC_FUNCTIONS.message,
            )],
            _ => vec![],
        }
    }

    /// Diagnostic codes some fix is registered for.
    pub fn supported_error_codes() -> Vec<u32> {
        vec![diagnostic_codes::THIS_MAY_BE_CONVERTED_TO_AN_ASYNC_FUNCTION]
    }
}

/// Apply byte-offset edits to `source`. Edits must not overlap; they are
/// applied back to front so earlier offsets stay valid. Edits that fall
/// outside the text or off a character boundary are skipped.
pub fn apply_text_changes(source: &str, edits: &[TextEdit]) -> String {
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| (edit.span.start, edit.span.length));

    let mut result = source.to_string();
    for edit in sorted.into_iter().rev() {
        let start = edit.span.start as usize;
        let end = edit.span.end() as usize;
        if end > result.len() || !result.is_char_boundary(start) || !result.is_char_boundary(end) {
            continue;
        }
        result.replace_range(start..end, &edit.new_text);
    }
    result
}

#[cfg(test)]
#[path = "tests/code_action_fixes_tests.rs"]
mod tests;
