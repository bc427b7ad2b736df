//! Parser state - type syntax.
//!
//! Types never influence the conversion, so they are skipped token by token
//! and kept as opaque `TYPE_NODE` text. The skip routines add no nodes,
//! which lets them run inside `look_ahead` probes.

use super::state::ParserState;
use crate::parser::{NodeIndex, node::TypeNodeData, syntax_kind_ext};
use asyncify_common::diagnostics::diagnostic_messages;
use asyncify_scanner::SyntaxKind;

impl ParserState {
    /// `: Type` if present.
    pub(crate) fn parse_type_annotation_opt(&mut self) -> NodeIndex {
        if self.parse_optional(SyntaxKind::ColonToken) {
            self.parse_type_node()
        } else {
            NodeIndex::NONE
        }
    }

    /// Return type of a signature, allowing type predicates.
    pub(crate) fn parse_return_type_opt(&mut self) -> NodeIndex {
        if !self.parse_optional(SyntaxKind::ColonToken) {
            return NodeIndex::NONE;
        }
        let start_pos = self.token_pos();
        self.skip_return_type();
        self.finish_type_node(start_pos)
    }

    pub(crate) fn parse_type_node(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.skip_type();
        self.finish_type_node(start_pos)
    }

    /// `<T, U extends X = Y>` if present.
    pub(crate) fn parse_type_parameters_opt(&mut self) -> NodeIndex {
        if !self.is_token(SyntaxKind::LessThanToken) {
            return NodeIndex::NONE;
        }
        let start_pos = self.token_pos();
        self.skip_type_argument_list();
        self.finish_type_node(start_pos)
    }

    /// `<A, B>` in a call or `new` expression.
    pub(crate) fn parse_type_arguments_node(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.skip_type_argument_list();
        self.finish_type_node(start_pos)
    }

    fn finish_type_node(&mut self, start_pos: u32) -> NodeIndex {
        let end_pos = self.node_end().max(start_pos);
        let text = self.text_slice(start_pos, end_pos);
        self.arena.add_type_node(
            syntax_kind_ext::TYPE_NODE,
            start_pos,
            end_pos,
            TypeNodeData { text },
        )
    }

    /// `<...>` after an expression is a type argument list when a call,
    /// or a tagged template, follows.
    pub(crate) fn is_start_of_call_type_arguments(&mut self) -> bool {
        if !self.is_token(SyntaxKind::LessThanToken) {
            return false;
        }
        self.look_ahead(|p| {
            let errors_before = p.parse_diagnostics.len();
            p.skip_type_argument_list();
            p.parse_diagnostics.len() == errors_before
                && matches!(
                    p.token(),
                    SyntaxKind::OpenParenToken
                        | SyntaxKind::NoSubstitutionTemplateLiteral
                        | SyntaxKind::TemplateHead
                )
        })
    }

    // =========================================================================
    // Skipping
    // =========================================================================

    fn skip_return_type(&mut self) {
        // asserts x [is T]
        if self.is_token(SyntaxKind::Identifier) && self.scanner.get_token_value() == "asserts" {
            let is_assertion = self.next_token_on_same_line(|next| {
                next.is_identifier_like() || next == SyntaxKind::ThisKeyword
            });
            if is_assertion {
                self.next_token();
                self.next_token();
                if self.is_contextual("is") {
                    self.next_token();
                    self.skip_type();
                }
                return;
            }
        }
        self.skip_type();
    }

    #[inline]
    pub(crate) fn is_contextual(&self, word: &str) -> bool {
        self.is_token(SyntaxKind::Identifier) && self.scanner.get_token_value() == word
    }

    pub(crate) fn skip_type(&mut self) {
        if !self.enter_recursion() {
            return;
        }
        if self.is_start_of_function_type() {
            self.parse_optional(SyntaxKind::AbstractKeyword);
            self.parse_optional(SyntaxKind::NewKeyword);
            if self.is_token(SyntaxKind::LessThanToken) {
                self.skip_type_argument_list();
            }
            self.skip_balanced(SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken);
            self.parse_expected(SyntaxKind::EqualsGreaterThanToken);
            self.skip_return_type();
            self.exit_recursion();
            return;
        }

        self.skip_union_type();

        if self.is_token(SyntaxKind::ExtendsKeyword) && !self.has_preceding_line_break() {
            self.next_token();
            self.skip_union_type();
            if self.parse_expected(SyntaxKind::QuestionToken) {
                self.skip_type();
                self.parse_expected(SyntaxKind::ColonToken);
                self.skip_type();
            }
        }
        self.exit_recursion();
    }

    fn is_start_of_function_type(&mut self) -> bool {
        match self.token() {
            SyntaxKind::LessThanToken | SyntaxKind::NewKeyword => true,
            SyntaxKind::AbstractKeyword => self.next_token_is(SyntaxKind::NewKeyword),
            SyntaxKind::OpenParenToken => self.look_ahead(|p| {
                p.skip_balanced(SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken);
                p.is_token(SyntaxKind::EqualsGreaterThanToken)
            }),
            _ => false,
        }
    }

    fn skip_union_type(&mut self) {
        // Leading `|` or `&` is allowed.
        if !self.parse_optional(SyntaxKind::BarToken) {
            self.parse_optional(SyntaxKind::AmpersandToken);
        }
        loop {
            self.skip_type_operator();
            if !(self.parse_optional(SyntaxKind::BarToken)
                || self.parse_optional(SyntaxKind::AmpersandToken))
            {
                break;
            }
        }
    }

    fn skip_type_operator(&mut self) {
        loop {
            match self.token() {
                SyntaxKind::KeyOfKeyword | SyntaxKind::ReadonlyKeyword => {
                    self.next_token();
                }
                SyntaxKind::Identifier if self.is_contextual("unique") => {
                    self.next_token();
                }
                SyntaxKind::Identifier if self.is_contextual("infer") => {
                    self.next_token();
                    self.next_token();
                    if self.is_token(SyntaxKind::ExtendsKeyword) {
                        // `infer U extends X ? ...` belongs to the outer conditional
                        let constraint = self.look_ahead(|p| {
                            p.next_token();
                            p.skip_union_type();
                            !p.is_token(SyntaxKind::QuestionToken)
                        });
                        if constraint {
                            self.next_token();
                            self.skip_union_type();
                        }
                    }
                    return;
                }
                _ => break,
            }
        }
        self.skip_postfix_type();
    }

    fn skip_postfix_type(&mut self) {
        self.skip_primary_type();
        loop {
            if self.is_token(SyntaxKind::OpenBracketToken) && !self.has_preceding_line_break() {
                self.next_token();
                if !self.is_token(SyntaxKind::CloseBracketToken) {
                    self.skip_type();
                }
                self.parse_expected(SyntaxKind::CloseBracketToken);
            } else if self.is_contextual("is") && !self.has_preceding_line_break() {
                self.next_token();
                self.skip_type();
            } else {
                break;
            }
        }
    }

    fn skip_primary_type(&mut self) {
        match self.token() {
            SyntaxKind::OpenParenToken => {
                self.next_token();
                self.skip_type();
                self.parse_expected(SyntaxKind::CloseParenToken);
            }
            SyntaxKind::OpenBraceToken => {
                self.skip_balanced(SyntaxKind::OpenBraceToken, SyntaxKind::CloseBraceToken);
            }
            SyntaxKind::OpenBracketToken => {
                self.skip_balanced(SyntaxKind::OpenBracketToken, SyntaxKind::CloseBracketToken);
            }
            SyntaxKind::TypeOfKeyword => {
                self.next_token();
                self.skip_entity_name();
            }
            SyntaxKind::ImportKeyword => {
                self.next_token();
                self.skip_balanced(SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken);
                while self.parse_optional(SyntaxKind::DotToken) {
                    self.next_token();
                }
                self.skip_type_arguments_opt();
            }
            SyntaxKind::MinusToken => {
                self.next_token();
                self.next_token();
            }
            SyntaxKind::TemplateHead => self.skip_template_substitutions(),
            SyntaxKind::StringLiteral
            | SyntaxKind::NumericLiteral
            | SyntaxKind::BigIntLiteral
            | SyntaxKind::NoSubstitutionTemplateLiteral
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NullKeyword
            | SyntaxKind::VoidKeyword
            | SyntaxKind::ThisKeyword
            | SyntaxKind::AsteriskToken
            | SyntaxKind::QuestionToken => {
                self.next_token();
            }
            token if token == SyntaxKind::Identifier || token.is_keyword() => {
                self.skip_entity_name();
            }
            _ => {
                self.error_message(diagnostic_messages::TYPE_EXPECTED);
            }
        }
    }

    /// `A.B.C<T>`
    fn skip_entity_name(&mut self) {
        self.next_token();
        while self.is_token(SyntaxKind::DotToken) {
            self.next_token();
            self.next_token();
        }
        self.skip_type_arguments_opt();
    }

    fn skip_type_arguments_opt(&mut self) {
        if self.is_token(SyntaxKind::LessThanToken) && !self.has_preceding_line_break() {
            self.skip_type_argument_list();
        }
    }

    /// `<T, U extends X = Y>` or `<A, B>`.
    fn skip_type_argument_list(&mut self) {
        if !self.parse_expected(SyntaxKind::LessThanToken) {
            return;
        }
        while !self.is_token(SyntaxKind::GreaterThanToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let pos_before = self.token_pos();
            // Type parameter modifiers and constraints
            while matches!(
                self.token(),
                SyntaxKind::ConstKeyword | SyntaxKind::InKeyword
            ) || (self.is_contextual("out")
                && self.next_token_on_same_line(|next| next.is_identifier_like()))
            {
                self.next_token();
            }
            self.skip_type();
            if self.parse_optional(SyntaxKind::ExtendsKeyword) {
                self.skip_type();
            }
            if self.parse_optional(SyntaxKind::EqualsToken) {
                self.skip_type();
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
            if self.token_pos() == pos_before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThanToken);
    }

    // =========================================================================
    // Token-level balanced skipping (also used for verbatim declarations)
    // =========================================================================

    /// Skip from `open` to its matching `close`, inclusive.
    pub(crate) fn skip_balanced(&mut self, open: SyntaxKind, close: SyntaxKind) {
        if !self.parse_expected(open) {
            return;
        }
        let mut depth = 1usize;
        loop {
            match self.token() {
                SyntaxKind::EndOfFileToken => {
                    self.parse_expected(close);
                    return;
                }
                SyntaxKind::TemplateHead => {
                    self.skip_template_substitutions();
                    continue;
                }
                token if token == open => depth += 1,
                token if token == close => {
                    depth -= 1;
                    if depth == 0 {
                        self.next_token();
                        return;
                    }
                }
                _ => {}
            }
            self.next_token();
        }
    }

    /// Skip a template starting at `TemplateHead` through its tail.
    pub(crate) fn skip_template_substitutions(&mut self) {
        self.next_token();
        loop {
            let mut depth = 0usize;
            loop {
                match self.token() {
                    SyntaxKind::EndOfFileToken => return,
                    SyntaxKind::TemplateHead => {
                        self.skip_template_substitutions();
                        continue;
                    }
                    SyntaxKind::OpenBraceToken => depth += 1,
                    SyntaxKind::CloseBraceToken if depth == 0 => break,
                    SyntaxKind::CloseBraceToken => depth -= 1,
                    _ => {}
                }
                self.next_token();
            }
            self.current_token = self.scanner.rescan_template_token();
            let done = self.is_token(SyntaxKind::TemplateTail);
            self.next_token();
            if done {
                return;
            }
        }
    }
}
