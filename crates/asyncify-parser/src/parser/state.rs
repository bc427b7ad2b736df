//! Parser state - token handling, diagnostics and look-ahead.
//!
//! `ParserState` is a recursive descent parser over `ScannerState`.
//! Statement, expression and type rules live in the sibling
//! `state_*` modules as further `impl ParserState` blocks.

use super::base::NodeIndex;
use super::node::{IdentifierData, NodeArena};
use asyncify_common::diagnostics::{DiagnosticMessage, diagnostic_messages, format_message};
use asyncify_common::limits::MAX_PARSER_RECURSION_DEPTH;
use asyncify_scanner::{ScannerSnapshot, ScannerState, SyntaxKind, token_to_string};

/// `await` parses as an operator.
pub const CONTEXT_FLAG_ASYNC: u32 = 1 << 0;
/// `yield` parses as an operator.
pub const CONTEXT_FLAG_GENERATOR: u32 = 1 << 1;
/// `in` is not a binary operator (for-statement initializers).
pub const CONTEXT_FLAG_DISALLOW_IN: u32 = 1 << 2;

/// A syntax error found while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub start: u32,
    pub length: u32,
    pub message: String,
    pub code: u32,
}

/// Saved parser position for speculative parsing.
pub(crate) struct ParserSnapshot {
    scanner: ScannerSnapshot,
    current_token: SyntaxKind,
    last_token_end: u32,
    diagnostics_len: usize,
}

pub struct ParserState {
    pub(crate) scanner: ScannerState,
    pub arena: NodeArena,
    pub(crate) file_name: String,
    pub(crate) current_token: SyntaxKind,
    /// End of the most recently consumed token; nodes end here.
    pub(crate) last_token_end: u32,
    pub(crate) context_flags: u32,
    pub(crate) recursion_depth: u32,
    pub parse_diagnostics: Vec<ParseDiagnostic>,
}

impl ParserState {
    pub fn new(file_name: String, source_text: String) -> ParserState {
        let capacity = source_text.len() / 4;
        ParserState {
            scanner: ScannerState::new(source_text, true),
            arena: NodeArena::with_capacity(capacity),
            file_name,
            current_token: SyntaxKind::Unknown,
            last_token_end: 0,
            context_flags: CONTEXT_FLAG_ASYNC,
            recursion_depth: 0,
            parse_diagnostics: Vec::new(),
        }
    }

    pub fn get_arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn into_arena(self) -> NodeArena {
        self.arena
    }

    pub fn get_diagnostics(&self) -> &[ParseDiagnostic] {
        &self.parse_diagnostics
    }

    pub fn source_text(&self) -> &str {
        self.scanner.source_text()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    #[inline]
    pub(crate) fn token(&self) -> SyntaxKind {
        self.current_token
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.current_token == kind
    }

    #[inline]
    pub(crate) fn u32_from_usize(&self, value: usize) -> u32 {
        u32::try_from(value).unwrap_or(u32::MAX)
    }

    /// Start of the current token, excluding leading trivia
    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.u32_from_usize(self.scanner.get_token_start())
    }

    #[inline]
    pub(crate) fn token_end(&self) -> u32 {
        self.u32_from_usize(self.scanner.get_token_end())
    }

    /// End of the last consumed token.
    #[inline]
    pub(crate) fn node_end(&self) -> u32 {
        self.last_token_end
    }

    #[inline]
    pub(crate) fn has_preceding_line_break(&self) -> bool {
        self.scanner.has_preceding_line_break()
    }

    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.last_token_end = self.token_end();
        self.current_token = self.scanner.scan();
        self.current_token
    }

    /// Consume the current token if it is `kind`.
    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or report "'x' expected.".
    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        let text = token_to_string(kind).unwrap_or("token");
        let message = format_message(diagnostic_messages::TOKEN_EXPECTED.message, &[text]);
        self.error_at_current_token(message, diagnostic_messages::TOKEN_EXPECTED.code);
        false
    }

    /// Automatic semicolon insertion.
    pub(crate) fn parse_semicolon(&mut self) -> bool {
        if self.parse_optional(SyntaxKind::SemicolonToken) {
            return true;
        }
        if self.can_parse_semicolon() {
            return true;
        }
        self.parse_expected(SyntaxKind::SemicolonToken)
    }

    pub(crate) fn can_parse_semicolon(&self) -> bool {
        self.is_token(SyntaxKind::SemicolonToken)
            || self.is_token(SyntaxKind::CloseBraceToken)
            || self.is_token(SyntaxKind::EndOfFileToken)
            || self.has_preceding_line_break()
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn error_at(&mut self, start: u32, length: u32, message: String, code: u32) {
        // One error per position keeps cascades out of the output.
        if self
            .parse_diagnostics
            .last()
            .is_some_and(|last| last.start == start)
        {
            return;
        }
        tracing::trace!(start, code, %message, "parse error");
        self.parse_diagnostics.push(ParseDiagnostic {
            start,
            length,
            message,
            code,
        });
    }

    pub(crate) fn error_at_current_token(&mut self, message: String, code: u32) {
        let start = self.token_pos();
        let length = self.token_end().saturating_sub(start);
        self.error_at(start, length, message, code);
    }

    pub(crate) fn error_message(&mut self, message: DiagnosticMessage) {
        self.error_at_current_token(message.message.to_string(), message.code);
    }

    pub(crate) fn error_expression_expected(&mut self) {
        self.error_message(diagnostic_messages::EXPRESSION_EXPECTED);
    }

    // =========================================================================
    // Recursion guard
    // =========================================================================

    /// Enter a nested rule; false once the depth limit is hit.
    pub(crate) fn enter_recursion(&mut self) -> bool {
        if self.recursion_depth >= MAX_PARSER_RECURSION_DEPTH {
            self.error_expression_expected();
            return false;
        }
        self.recursion_depth += 1;
        true
    }

    pub(crate) fn exit_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    // =========================================================================
    // Context flags
    // =========================================================================

    #[inline]
    pub(crate) fn in_context(&self, flag: u32) -> bool {
        self.context_flags & flag != 0
    }

    /// Run `f` with `set` flags added and `clear` flags removed.
    pub(crate) fn with_context<T>(
        &mut self,
        set: u32,
        clear: u32,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = self.context_flags;
        self.context_flags = (saved | set) & !clear;
        let result = f(self);
        self.context_flags = saved;
        result
    }

    // =========================================================================
    // Look-ahead
    // =========================================================================

    pub(crate) fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            scanner: self.scanner.save_state(),
            current_token: self.current_token,
            last_token_end: self.last_token_end,
            diagnostics_len: self.parse_diagnostics.len(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: ParserSnapshot) {
        self.scanner.restore_state(snapshot.scanner);
        self.current_token = snapshot.current_token;
        self.last_token_end = snapshot.last_token_end;
        self.parse_diagnostics.truncate(snapshot.diagnostics_len);
    }

    /// Run a token-level probe and rewind. The probe must not add nodes.
    pub(crate) fn look_ahead<T>(&mut self, probe: impl FnOnce(&mut Self) -> T) -> T {
        let snapshot = self.snapshot();
        let result = probe(self);
        self.restore(snapshot);
        result
    }

    pub(crate) fn next_token_is(&mut self, kind: SyntaxKind) -> bool {
        self.look_ahead(|p| p.next_token() == kind)
    }

    /// Next token is on the same line and satisfies `pred`.
    pub(crate) fn next_token_on_same_line(&mut self, pred: impl FnOnce(SyntaxKind) -> bool) -> bool {
        self.look_ahead(|p| {
            let next = p.next_token();
            !p.has_preceding_line_break() && pred(next)
        })
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Identifier in a binding or reference position.
    pub(crate) fn is_identifier(&self) -> bool {
        let token = self.token();
        if token == SyntaxKind::YieldKeyword && self.in_context(CONTEXT_FLAG_GENERATOR) {
            return false;
        }
        if token == SyntaxKind::AwaitKeyword && self.in_context(CONTEXT_FLAG_ASYNC) {
            return false;
        }
        token.is_identifier_like()
    }

    fn make_identifier(&mut self, text: String) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let end_pos = self.node_end();
        self.arena.add_identifier(
            SyntaxKind::Identifier as u16,
            start_pos,
            end_pos,
            IdentifierData { escaped_text: text },
        )
    }

    pub(crate) fn parse_identifier(&mut self) -> NodeIndex {
        if self.is_identifier() {
            let text = self.scanner.get_token_value().to_string();
            return self.make_identifier(text);
        }
        self.error_message(diagnostic_messages::IDENTIFIER_EXPECTED);
        NodeIndex::NONE
    }

    /// Identifier after `.` or in a property name: any keyword is allowed.
    pub(crate) fn parse_identifier_name(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::PrivateIdentifier) {
            let start_pos = self.token_pos();
            let text = self.scanner.get_token_value().to_string();
            self.next_token();
            let end_pos = self.node_end();
            return self.arena.add_identifier(
                SyntaxKind::PrivateIdentifier as u16,
                start_pos,
                end_pos,
                IdentifierData { escaped_text: text },
            );
        }
        if self.token() == SyntaxKind::Identifier || self.token().is_keyword() {
            let text = self.scanner.get_token_value().to_string();
            return self.make_identifier(text);
        }
        self.error_message(diagnostic_messages::IDENTIFIER_EXPECTED);
        NodeIndex::NONE
    }

    /// Source text of `[start, end)`.
    pub(crate) fn text_slice(&self, start: u32, end: u32) -> String {
        self.scanner
            .source_text()
            .get(start as usize..end as usize)
            .unwrap_or_default()
            .to_string()
    }
}
