//! Text edits for a converted function.
//!
//! Each chain group is replaced as one range running from the start of its
//! first statement to the end of its last, so untouched statements keep
//! their exact text, comments and formatting. The function itself gets an
//! `async` modifier inserted in front of it.

use super::chain_gluer::ChainGroup;
use super::chain_recognizer::RootKind;
use super::rewriter::{RootRewrite, block_of};
use asyncify_common::TextSpan;
use asyncify_emitter::{PrintOptions, Printer};
use asyncify_parser::{NodeArena, NodeIndex, syntax_kind_ext};
use serde::Serialize;

/// Replace `span` of the source text with `new_text`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub span: TextSpan,
    pub new_text: String,
}

impl TextEdit {
    pub fn insert(pos: u32, text: impl Into<String>) -> TextEdit {
        TextEdit {
            span: TextSpan::new(pos, 0),
            new_text: text.into(),
        }
    }

    pub fn replace(start: u32, end: u32, text: impl Into<String>) -> TextEdit {
        TextEdit {
            span: TextSpan::from_bounds(start, end),
            new_text: text.into(),
        }
    }
}

pub struct StatementSplicer<'a> {
    source_text: &'a str,
    options: &'a PrintOptions,
}

impl<'a> StatementSplicer<'a> {
    pub fn new(source_text: &'a str, options: &'a PrintOptions) -> StatementSplicer<'a> {
        StatementSplicer {
            source_text,
            options,
        }
    }

    /// The edit replacing `group` with its rewritten statements. `source`
    /// holds the group's original positions; `synth` holds the rewrite.
    /// A single statement kept as written needs no edit.
    pub fn splice(
        &self,
        source: &NodeArena,
        synth: &mut NodeArena,
        group: &ChainGroup,
        rewrite: &RootRewrite,
    ) -> Option<TextEdit> {
        if rewrite.verbatim && group.statements.len() == 1 {
            return None;
        }
        let start = source.get(group.first())?.pos;
        let end = source.get(group.root())?.end;

        if group.kind == RootKind::ArrowBody {
            let options = PrintOptions {
                base_indent: self.line_indent(start),
                ..self.options.clone()
            };
            let block = block_of(synth, rewrite.statements.clone());
            let new_text = Printer::new(synth, options).print_node(block);
            return Some(TextEdit::replace(start, end, new_text));
        }

        // Statements sharing a line with other code, such as a one-line
        // body `{ return p.then(f); }`, are moved onto lines of their own.
        let opens_line = !self.shares_line_before(start);
        let closes_line = !self.shares_line_after(end);
        let outer_indent = self.line_indent(start);
        let base_indent = if opens_line {
            outer_indent.clone()
        } else {
            format!("{outer_indent}{}", " ".repeat(self.options.indent_size))
        };
        let options = PrintOptions {
            base_indent: base_indent.clone(),
            ..self.options.clone()
        };
        let printed = Printer::new(synth, options).print_statements(&rewrite.statements);

        let new_line = &self.options.new_line;
        let (start, mut new_text) = if opens_line {
            (start, printed)
        } else {
            let start = start - self.blanks_before(start);
            (start, format!("{new_line}{base_indent}{printed}"))
        };
        let end = if closes_line {
            end
        } else {
            new_text.push_str(new_line);
            new_text.push_str(&outer_indent);
            end + self.blanks_after(end)
        };
        Some(TextEdit::replace(start, end, new_text))
    }

    /// Code other than indentation precedes `pos` on its line.
    fn shares_line_before(&self, pos: u32) -> bool {
        let before = self.source_text.get(..pos as usize).unwrap_or("");
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        !before[line_start..].trim().is_empty()
    }

    /// Code other than a line comment follows `pos` on its line.
    fn shares_line_after(&self, pos: u32) -> bool {
        let after = self.source_text.get(pos as usize..).unwrap_or("");
        let line = after.split('\n').next().unwrap_or("").trim();
        !line.is_empty() && !line.starts_with("//")
    }

    fn blanks_before(&self, pos: u32) -> u32 {
        let before = self.source_text.get(..pos as usize).unwrap_or("");
        let blanks = before.len() - before.trim_end_matches([' ', '\t']).len();
        u32::try_from(blanks).unwrap_or(0)
    }

    fn blanks_after(&self, pos: u32) -> u32 {
        let after = self.source_text.get(pos as usize..).unwrap_or("");
        let blanks = after.len() - after.trim_start_matches([' ', '\t']).len();
        u32::try_from(blanks).unwrap_or(0)
    }

    /// Insertion of `async ` in front of a function-like node, or `None`
    /// when it is already async or cannot be made async.
    pub fn async_marker(&self, arena: &NodeArena, func: NodeIndex) -> Option<TextEdit> {
        let node = arena.get(func)?;
        let data = arena.get_function(node)?;
        if data.is_async {
            return None;
        }
        let pos = match node.kind {
            syntax_kind_ext::FUNCTION_DECLARATION | syntax_kind_ext::FUNCTION_EXPRESSION => {
                let from = data
                    .modifiers
                    .as_ref()
                    .and_then(|list| list.nodes.last())
                    .and_then(|&last| arena.get(last))
                    .map_or(node.pos, |m| m.end);
                self.find_keyword(from, node.end, "function")?
            }
            syntax_kind_ext::METHOD_DECLARATION => arena.get(data.name)?.pos,
            syntax_kind_ext::ARROW_FUNCTION => node.pos,
            _ => return None,
        };
        Some(TextEdit::insert(pos, "async "))
    }

    fn find_keyword(&self, from: u32, to: u32, keyword: &str) -> Option<u32> {
        let text = self.source_text.get(from as usize..to as usize)?;
        let offset = text.find(keyword)?;
        u32::try_from(offset).ok().map(|offset| from + offset)
    }

    /// Whitespace that starts the line holding `pos`.
    fn line_indent(&self, pos: u32) -> String {
        let before = self.source_text.get(..pos as usize).unwrap_or("");
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        self.source_text[line_start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/statement_splicer_tests.rs"]
mod tests;
