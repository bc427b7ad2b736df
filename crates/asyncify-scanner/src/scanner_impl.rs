//! Scanner state machine.
//!
//! `ScannerState` turns source text into a stream of `SyntaxKind` tokens.
//! The parser drives it one token at a time and uses the `rescan_*`
//! methods where the lexical grammar depends on syntactic context
//! (`>` inside type arguments, regular expressions, template continuations).

use crate::char_codes::{
    is_identifier_part, is_identifier_start, is_line_break, is_white_space_single_line,
};
use crate::scanner::{SyntaxKind, keyword_to_kind};
use asyncify_common::diagnostics::{DiagnosticMessage, diagnostic_messages};

pub mod token_flags {
    pub const NONE: u32 = 0;
    pub const PRECEDING_LINE_BREAK: u32 = 1 << 0;
    pub const UNTERMINATED: u32 = 1 << 1;
}

/// A lexical error recorded while scanning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerDiagnostic {
    pub pos: usize,
    pub length: usize,
    pub message: &'static str,
    pub code: u32,
}

/// Everything needed to rewind the scanner after a speculative look-ahead.
#[derive(Clone, Debug)]
pub struct ScannerSnapshot {
    pos: usize,
    full_start: usize,
    token_start: usize,
    token: SyntaxKind,
    token_flags: u32,
    token_value: String,
    diagnostics_len: usize,
}

pub struct ScannerState {
    text: String,
    skip_trivia: bool,
    pos: usize,
    full_start: usize,
    token_start: usize,
    token: SyntaxKind,
    token_flags: u32,
    token_value: String,
    diagnostics: Vec<ScannerDiagnostic>,
}

impl ScannerState {
    pub fn new(text: String, skip_trivia: bool) -> ScannerState {
        ScannerState {
            text,
            skip_trivia,
            pos: 0,
            full_start: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_flags: token_flags::NONE,
            token_value: String::new(),
            diagnostics: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn source_text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn get_token(&self) -> SyntaxKind {
        self.token
    }

    /// Identifier name, cooked string value, or raw text for other literals.
    #[inline]
    pub fn get_token_value(&self) -> &str {
        &self.token_value
    }

    /// Raw source slice of the current token.
    #[inline]
    pub fn get_token_text(&self) -> &str {
        self.text.get(self.token_start..self.pos).unwrap_or("")
    }

    #[inline]
    pub fn get_token_start(&self) -> usize {
        self.token_start
    }

    #[inline]
    pub fn get_token_end(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn get_token_full_start(&self) -> usize {
        self.full_start
    }

    #[inline]
    pub fn get_token_flags(&self) -> u32 {
        self.token_flags
    }

    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.token_flags & token_flags::PRECEDING_LINE_BREAK != 0
    }

    #[inline]
    pub fn is_unterminated(&self) -> bool {
        self.token_flags & token_flags::UNTERMINATED != 0
    }

    pub fn get_scanner_diagnostics(&self) -> &[ScannerDiagnostic] {
        &self.diagnostics
    }

    pub fn save_state(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            pos: self.pos,
            full_start: self.full_start,
            token_start: self.token_start,
            token: self.token,
            token_flags: self.token_flags,
            token_value: self.token_value.clone(),
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub fn restore_state(&mut self, snapshot: ScannerSnapshot) {
        self.pos = snapshot.pos;
        self.full_start = snapshot.full_start;
        self.token_start = snapshot.token_start;
        self.token = snapshot.token;
        self.token_flags = snapshot.token_flags;
        self.token_value = snapshot.token_value;
        self.diagnostics.truncate(snapshot.diagnostics_len);
    }

    // =========================================================================
    // Character helpers
    // =========================================================================

    #[inline]
    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.text.as_bytes().get(pos).copied()
    }

    #[inline]
    fn char_at(&self, pos: usize) -> Option<char> {
        self.text.get(pos..).and_then(|rest| rest.chars().next())
    }

    #[inline]
    fn finish(&mut self, kind: SyntaxKind, len: usize) -> SyntaxKind {
        self.pos += len;
        self.token = kind;
        kind
    }

    fn error(&mut self, pos: usize, length: usize, message: DiagnosticMessage) {
        self.diagnostics.push(ScannerDiagnostic {
            pos,
            length,
            message: message.message,
            code: message.code,
        });
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Scan the next token.
    pub fn scan(&mut self) -> SyntaxKind {
        self.full_start = self.pos;
        self.token_flags = token_flags::NONE;

        loop {
            self.token_start = self.pos;
            self.token_value.clear();

            let Some(ch) = self.char_at(self.pos) else {
                self.token = SyntaxKind::EndOfFileToken;
                return self.token;
            };

            if is_line_break(ch) {
                self.token_flags |= token_flags::PRECEDING_LINE_BREAK;
                let len = if ch == '\r' && self.byte_at(self.pos + 1) == Some(b'\n') {
                    2
                } else {
                    ch.len_utf8()
                };
                self.pos += len;
                if self.skip_trivia {
                    continue;
                }
                self.token = SyntaxKind::NewLineTrivia;
                return self.token;
            }

            if is_white_space_single_line(ch) {
                while let Some(ws) = self.char_at(self.pos) {
                    if !is_white_space_single_line(ws) {
                        break;
                    }
                    self.pos += ws.len_utf8();
                }
                if self.skip_trivia {
                    continue;
                }
                self.token = SyntaxKind::WhitespaceTrivia;
                return self.token;
            }

            if ch == '/' {
                match self.byte_at(self.pos + 1) {
                    Some(b'/') => {
                        self.pos += 2;
                        while let Some(c) = self.char_at(self.pos) {
                            if is_line_break(c) {
                                break;
                            }
                            self.pos += c.len_utf8();
                        }
                        if self.skip_trivia {
                            continue;
                        }
                        self.token = SyntaxKind::SingleLineCommentTrivia;
                        return self.token;
                    }
                    Some(b'*') => {
                        self.scan_multi_line_comment();
                        if self.skip_trivia {
                            continue;
                        }
                        self.token = SyntaxKind::MultiLineCommentTrivia;
                        return self.token;
                    }
                    Some(b'=') => return self.finish(SyntaxKind::SlashEqualsToken, 2),
                    _ => return self.finish(SyntaxKind::SlashToken, 1),
                }
            }

            return self.scan_token(ch);
        }
    }

    fn scan_multi_line_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        loop {
            let Some(c) = self.char_at(self.pos) else {
                self.error(
                    start,
                    self.pos - start,
                    diagnostic_messages::DECLARATION_OR_STATEMENT_EXPECTED,
                );
                return;
            };
            if c == '*' && self.byte_at(self.pos + 1) == Some(b'/') {
                self.pos += 2;
                return;
            }
            if is_line_break(c) {
                self.token_flags |= token_flags::PRECEDING_LINE_BREAK;
            }
            self.pos += c.len_utf8();
        }
    }

    fn scan_token(&mut self, ch: char) -> SyntaxKind {
        let next = self.byte_at(self.pos + 1);
        let next2 = self.byte_at(self.pos + 2);
        match ch {
            '{' => self.finish(SyntaxKind::OpenBraceToken, 1),
            '}' => self.finish(SyntaxKind::CloseBraceToken, 1),
            '(' => self.finish(SyntaxKind::OpenParenToken, 1),
            ')' => self.finish(SyntaxKind::CloseParenToken, 1),
            '[' => self.finish(SyntaxKind::OpenBracketToken, 1),
            ']' => self.finish(SyntaxKind::CloseBracketToken, 1),
            ';' => self.finish(SyntaxKind::SemicolonToken, 1),
            ',' => self.finish(SyntaxKind::CommaToken, 1),
            ':' => self.finish(SyntaxKind::ColonToken, 1),
            '~' => self.finish(SyntaxKind::TildeToken, 1),
            '@' => self.finish(SyntaxKind::AtToken, 1),
            // `>` is always scanned alone; the parser rescans it in
            // expression context so `A<B<C>>` stays closable.
            '>' => self.finish(SyntaxKind::GreaterThanToken, 1),
            '.' => {
                if next.is_some_and(|b| b.is_ascii_digit()) {
                    self.scan_number()
                } else if next == Some(b'.') && next2 == Some(b'.') {
                    self.finish(SyntaxKind::DotDotDotToken, 3)
                } else {
                    self.finish(SyntaxKind::DotToken, 1)
                }
            }
            '?' => match (next, next2) {
                (Some(b'.'), d) if !d.is_some_and(|b| b.is_ascii_digit()) => {
                    self.finish(SyntaxKind::QuestionDotToken, 2)
                }
                (Some(b'?'), Some(b'=')) => self.finish(SyntaxKind::QuestionQuestionEqualsToken, 3),
                (Some(b'?'), _) => self.finish(SyntaxKind::QuestionQuestionToken, 2),
                _ => self.finish(SyntaxKind::QuestionToken, 1),
            },
            '<' => match (next, next2) {
                (Some(b'<'), Some(b'=')) => self.finish(SyntaxKind::LessThanLessThanEqualsToken, 3),
                (Some(b'<'), _) => self.finish(SyntaxKind::LessThanLessThanToken, 2),
                (Some(b'='), _) => self.finish(SyntaxKind::LessThanEqualsToken, 2),
                _ => self.finish(SyntaxKind::LessThanToken, 1),
            },
            '=' => match (next, next2) {
                (Some(b'='), Some(b'=')) => self.finish(SyntaxKind::EqualsEqualsEqualsToken, 3),
                (Some(b'='), _) => self.finish(SyntaxKind::EqualsEqualsToken, 2),
                (Some(b'>'), _) => self.finish(SyntaxKind::EqualsGreaterThanToken, 2),
                _ => self.finish(SyntaxKind::EqualsToken, 1),
            },
            '!' => match (next, next2) {
                (Some(b'='), Some(b'=')) => {
                    self.finish(SyntaxKind::ExclamationEqualsEqualsToken, 3)
                }
                (Some(b'='), _) => self.finish(SyntaxKind::ExclamationEqualsToken, 2),
                _ => self.finish(SyntaxKind::ExclamationToken, 1),
            },
            '+' => match next {
                Some(b'+') => self.finish(SyntaxKind::PlusPlusToken, 2),
                Some(b'=') => self.finish(SyntaxKind::PlusEqualsToken, 2),
                _ => self.finish(SyntaxKind::PlusToken, 1),
            },
            '-' => match next {
                Some(b'-') => self.finish(SyntaxKind::MinusMinusToken, 2),
                Some(b'=') => self.finish(SyntaxKind::MinusEqualsToken, 2),
                _ => self.finish(SyntaxKind::MinusToken, 1),
            },
            '*' => match (next, next2) {
                (Some(b'*'), Some(b'=')) => self.finish(SyntaxKind::AsteriskAsteriskEqualsToken, 3),
                (Some(b'*'), _) => self.finish(SyntaxKind::AsteriskAsteriskToken, 2),
                (Some(b'='), _) => self.finish(SyntaxKind::AsteriskEqualsToken, 2),
                _ => self.finish(SyntaxKind::AsteriskToken, 1),
            },
            '%' => match next {
                Some(b'=') => self.finish(SyntaxKind::PercentEqualsToken, 2),
                _ => self.finish(SyntaxKind::PercentToken, 1),
            },
            '&' => match (next, next2) {
                (Some(b'&'), Some(b'=')) => {
                    self.finish(SyntaxKind::AmpersandAmpersandEqualsToken, 3)
                }
                (Some(b'&'), _) => self.finish(SyntaxKind::AmpersandAmpersandToken, 2),
                (Some(b'='), _) => self.finish(SyntaxKind::AmpersandEqualsToken, 2),
                _ => self.finish(SyntaxKind::AmpersandToken, 1),
            },
            '|' => match (next, next2) {
                (Some(b'|'), Some(b'=')) => self.finish(SyntaxKind::BarBarEqualsToken, 3),
                (Some(b'|'), _) => self.finish(SyntaxKind::BarBarToken, 2),
                (Some(b'='), _) => self.finish(SyntaxKind::BarEqualsToken, 2),
                _ => self.finish(SyntaxKind::BarToken, 1),
            },
            '^' => match next {
                Some(b'=') => self.finish(SyntaxKind::CaretEqualsToken, 2),
                _ => self.finish(SyntaxKind::CaretToken, 1),
            },
            '"' | '\'' => self.scan_string(ch),
            '`' => self.scan_template(true),
            '#' => {
                if self.char_at(self.pos + 1).is_some_and(is_identifier_start) {
                    self.pos += 1;
                    self.scan_identifier_rest();
                    self.token_value = self.get_token_text().to_string();
                    self.token = SyntaxKind::PrivateIdentifier;
                    self.token
                } else {
                    self.error(self.pos, 1, diagnostic_messages::INVALID_CHARACTER);
                    self.finish(SyntaxKind::Unknown, 1)
                }
            }
            c if c.is_ascii_digit() => self.scan_number(),
            c if is_identifier_start(c) => {
                self.scan_identifier_rest();
                let text = self.get_token_text().to_string();
                self.token = keyword_to_kind(&text).unwrap_or(SyntaxKind::Identifier);
                self.token_value = text;
                self.token
            }
            c => {
                let len = c.len_utf8();
                self.error(self.pos, len, diagnostic_messages::INVALID_CHARACTER);
                self.finish(SyntaxKind::Unknown, len)
            }
        }
    }

    fn scan_identifier_rest(&mut self) {
        while let Some(c) = self.char_at(self.pos) {
            if !is_identifier_part(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn scan_digits(&mut self, is_digit: fn(u8) -> bool) {
        while let Some(b) = self.byte_at(self.pos) {
            if is_digit(b) || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let radix_prefix = self.byte_at(self.pos) == Some(b'0')
            && matches!(
                self.byte_at(self.pos + 1),
                Some(b'x' | b'X' | b'o' | b'O' | b'b' | b'B')
            );

        if radix_prefix {
            let marker = self.byte_at(self.pos + 1).unwrap_or(b'x');
            self.pos += 2;
            match marker {
                b'x' | b'X' => self.scan_digits(|b| b.is_ascii_hexdigit()),
                b'o' | b'O' => self.scan_digits(|b| (b'0'..=b'7').contains(&b)),
                _ => self.scan_digits(|b| b == b'0' || b == b'1'),
            }
        } else {
            self.scan_digits(|b| b.is_ascii_digit());
            if self.byte_at(self.pos) == Some(b'.') {
                self.pos += 1;
                self.scan_digits(|b| b.is_ascii_digit());
            }
            if matches!(self.byte_at(self.pos), Some(b'e' | b'E')) {
                let mut lookahead = self.pos + 1;
                if matches!(self.byte_at(lookahead), Some(b'+' | b'-')) {
                    lookahead += 1;
                }
                if self.byte_at(lookahead).is_some_and(|b| b.is_ascii_digit()) {
                    self.pos = lookahead;
                    self.scan_digits(|b| b.is_ascii_digit());
                }
            }
        }

        let kind = if self.byte_at(self.pos) == Some(b'n') {
            self.pos += 1;
            SyntaxKind::BigIntLiteral
        } else {
            SyntaxKind::NumericLiteral
        };
        self.token_value = self.get_token_text().to_string();
        self.token = kind;
        kind
    }

    fn scan_string(&mut self, quote: char) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();

        loop {
            let Some(c) = self.char_at(self.pos) else {
                self.token_flags |= token_flags::UNTERMINATED;
                self.error(
                    start,
                    self.pos - start,
                    diagnostic_messages::UNTERMINATED_STRING_LITERAL,
                );
                break;
            };
            if c == quote {
                self.pos += 1;
                break;
            }
            if is_line_break(c) {
                self.token_flags |= token_flags::UNTERMINATED;
                self.error(
                    start,
                    self.pos - start,
                    diagnostic_messages::UNTERMINATED_STRING_LITERAL,
                );
                break;
            }
            if c == '\\' {
                self.pos += 1;
                self.scan_escape_sequence(&mut value);
                continue;
            }
            value.push(c);
            self.pos += c.len_utf8();
        }

        self.token_value = value;
        self.token = SyntaxKind::StringLiteral;
        self.token
    }

    /// Cook one escape sequence; `self.pos` is just past the backslash.
    fn scan_escape_sequence(&mut self, out: &mut String) {
        let Some(c) = self.char_at(self.pos) else {
            return;
        };
        self.pos += c.len_utf8();
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'v' => out.push('\u{000B}'),
            '0' => out.push('\0'),
            '\r' => {
                if self.byte_at(self.pos) == Some(b'\n') {
                    self.pos += 1;
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            'x' => {
                let hex = self.text.get(self.pos..self.pos + 2).unwrap_or("");
                if let Some(decoded) = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                {
                    out.push(decoded);
                    self.pos += 2;
                } else {
                    out.push('x');
                }
            }
            'u' => {
                let (digits, consumed) = if self.byte_at(self.pos) == Some(b'{') {
                    let rest = self.text.get(self.pos + 1..).unwrap_or("");
                    match rest.find('}') {
                        Some(close) => (&rest[..close], close + 2),
                        None => ("", 0),
                    }
                } else {
                    (self.text.get(self.pos..self.pos + 4).unwrap_or(""), 4)
                };
                if let Some(decoded) =
                    u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
                {
                    out.push(decoded);
                    self.pos += consumed;
                } else {
                    out.push('u');
                }
            }
            other => out.push(other),
        }
    }

    /// Scan a template segment. `from_backtick` is true at the opening
    /// backtick and false when continuing after a substitution's `}`.
    fn scan_template(&mut self, from_backtick: bool) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        let content_start = self.pos;

        let kind = loop {
            let Some(c) = self.char_at(self.pos) else {
                self.token_flags |= token_flags::UNTERMINATED;
                self.error(
                    start,
                    self.pos - start,
                    diagnostic_messages::UNTERMINATED_TEMPLATE_LITERAL,
                );
                break if from_backtick {
                    SyntaxKind::NoSubstitutionTemplateLiteral
                } else {
                    SyntaxKind::TemplateTail
                };
            };
            match c {
                '`' => {
                    self.token_value = self.text[content_start..self.pos].to_string();
                    self.pos += 1;
                    break if from_backtick {
                        SyntaxKind::NoSubstitutionTemplateLiteral
                    } else {
                        SyntaxKind::TemplateTail
                    };
                }
                '$' if self.byte_at(self.pos + 1) == Some(b'{') => {
                    self.token_value = self.text[content_start..self.pos].to_string();
                    self.pos += 2;
                    break if from_backtick {
                        SyntaxKind::TemplateHead
                    } else {
                        SyntaxKind::TemplateMiddle
                    };
                }
                '\\' => {
                    self.pos += 1;
                    if let Some(escaped) = self.char_at(self.pos) {
                        self.pos += escaped.len_utf8();
                    }
                }
                other => self.pos += other.len_utf8(),
            }
        };

        self.token = kind;
        kind
    }

    // =========================================================================
    // Context-sensitive rescans
    // =========================================================================

    /// Combine a scanned `>` with following characters into `>=`, `>>`,
    /// `>>=`, `>>>` or `>>>=`.
    pub fn rescan_greater_token(&mut self) -> SyntaxKind {
        if self.token != SyntaxKind::GreaterThanToken {
            return self.token;
        }
        let (kind, extra) = match (
            self.byte_at(self.pos),
            self.byte_at(self.pos + 1),
            self.byte_at(self.pos + 2),
        ) {
            (Some(b'>'), Some(b'>'), Some(b'=')) => {
                (SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken, 3)
            }
            (Some(b'>'), Some(b'>'), _) => (SyntaxKind::GreaterThanGreaterThanGreaterThanToken, 2),
            (Some(b'>'), Some(b'='), _) => (SyntaxKind::GreaterThanGreaterThanEqualsToken, 2),
            (Some(b'>'), _, _) => (SyntaxKind::GreaterThanGreaterThanToken, 1),
            (Some(b'='), _, _) => (SyntaxKind::GreaterThanEqualsToken, 1),
            _ => return self.token,
        };
        self.finish(kind, extra)
    }

    /// Reinterpret a `/` or `/=` token as the start of a regular expression.
    pub fn rescan_slash_token(&mut self) -> SyntaxKind {
        if self.token != SyntaxKind::SlashToken && self.token != SyntaxKind::SlashEqualsToken {
            return self.token;
        }
        self.pos = self.token_start + 1;
        let mut in_class = false;

        loop {
            let Some(c) = self.char_at(self.pos) else {
                self.token_flags |= token_flags::UNTERMINATED;
                break;
            };
            if is_line_break(c) {
                self.token_flags |= token_flags::UNTERMINATED;
                break;
            }
            self.pos += c.len_utf8();
            match c {
                '\\' => {
                    if let Some(escaped) = self.char_at(self.pos) {
                        self.pos += escaped.len_utf8();
                    }
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                _ => {}
            }
        }

        self.scan_identifier_rest();
        self.token_value = self.get_token_text().to_string();
        self.token = SyntaxKind::RegularExpressionLiteral;
        self.token
    }

    /// Continue a template after the `}` closing a substitution.
    pub fn rescan_template_token(&mut self) -> SyntaxKind {
        if self.token != SyntaxKind::CloseBraceToken {
            return self.token;
        }
        self.pos = self.token_start;
        self.scan_template(false)
    }
}

#[cfg(test)]
#[path = "tests/scanner_impl_tests.rs"]
mod tests;
