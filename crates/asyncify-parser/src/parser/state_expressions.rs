//! Parser state - expression parsing methods

use super::state::{
    CONTEXT_FLAG_ASYNC, CONTEXT_FLAG_DISALLOW_IN, CONTEXT_FLAG_GENERATOR, ParserState,
};
use crate::parser::{NodeIndex, NodeList, node::*, node_flags, syntax_kind_ext};
use asyncify_scanner::SyntaxKind;

/// Binary operator precedence; 0 means "not a binary operator".
fn binary_precedence(kind: SyntaxKind) -> u8 {
    match kind {
        SyntaxKind::QuestionQuestionToken => 4,
        SyntaxKind::BarBarToken => 5,
        SyntaxKind::AmpersandAmpersandToken => 6,
        SyntaxKind::BarToken => 7,
        SyntaxKind::CaretToken => 8,
        SyntaxKind::AmpersandToken => 9,
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::ExclamationEqualsToken
        | SyntaxKind::EqualsEqualsEqualsToken
        | SyntaxKind::ExclamationEqualsEqualsToken => 10,
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken
        | SyntaxKind::InstanceOfKeyword
        | SyntaxKind::InKeyword
        | SyntaxKind::AsKeyword
        | SyntaxKind::SatisfiesKeyword => 11,
        SyntaxKind::LessThanLessThanToken
        | SyntaxKind::GreaterThanGreaterThanToken
        | SyntaxKind::GreaterThanGreaterThanGreaterThanToken => 12,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => 13,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => 14,
        SyntaxKind::AsteriskAsteriskToken => 15,
        _ => 0,
    }
}

impl ParserState {
    // =========================================================================
    // Parse Methods - Expressions
    // =========================================================================

    /// Parse an expression (including comma operator)
    pub fn parse_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut left = self.parse_assignment_expression();

        while self.is_token(SyntaxKind::CommaToken) {
            self.next_token();
            let right = self.parse_assignment_expression();
            if right.is_none() {
                self.error_expression_expected();
                break;
            }
            let end_pos = self.node_end();
            left = self.arena.add_binary_expr(
                syntax_kind_ext::BINARY_EXPRESSION,
                start_pos,
                end_pos,
                BinaryExprData {
                    left,
                    operator_token: SyntaxKind::CommaToken as u16,
                    right,
                },
            );
        }

        left
    }

    /// Expression with `in` allowed again (inside brackets and parentheses).
    pub(crate) fn parse_expression_allow_in(&mut self) -> NodeIndex {
        self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_expression())
    }

    pub(crate) fn parse_assignment_expression_allow_in(&mut self) -> NodeIndex {
        self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| {
            p.parse_assignment_expression()
        })
    }

    /// Parse assignment expression
    pub(crate) fn parse_assignment_expression(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            return NodeIndex::NONE;
        }
        let result = self.parse_assignment_expression_worker();
        self.exit_recursion();
        result
    }

    fn parse_assignment_expression_worker(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::YieldKeyword) && self.in_context(CONTEXT_FLAG_GENERATOR) {
            return self.parse_yield_expression();
        }

        if let Some(is_async) = self.arrow_function_start() {
            return self.parse_arrow_function(is_async);
        }

        let start_pos = self.token_pos();
        let expr = self.parse_binary_expression(0);

        if self.is_token(SyntaxKind::GreaterThanToken) {
            self.current_token = self.scanner.rescan_greater_token();
        }

        if self.token().is_assignment_operator() {
            let operator = self.token();
            self.next_token();
            let right = self.parse_assignment_expression();
            let end_pos = self.node_end();
            return self.arena.add_binary_expr(
                syntax_kind_ext::BINARY_EXPRESSION,
                start_pos,
                end_pos,
                BinaryExprData {
                    left: expr,
                    operator_token: operator as u16,
                    right,
                },
            );
        }

        if self.is_token(SyntaxKind::QuestionToken) {
            self.next_token();
            let when_true = self.parse_assignment_expression_allow_in();
            self.parse_expected(SyntaxKind::ColonToken);
            let when_false = self.parse_assignment_expression();
            let end_pos = self.node_end();
            return self.arena.add_conditional_expr(
                syntax_kind_ext::CONDITIONAL_EXPRESSION,
                start_pos,
                end_pos,
                ConditionalExprData {
                    condition: expr,
                    when_true,
                    when_false,
                },
            );
        }

        expr
    }

    fn parse_yield_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let asterisk_token = !self.has_preceding_line_break()
            && self.parse_optional(SyntaxKind::AsteriskToken);
        let expression = if !self.has_preceding_line_break() && self.is_start_of_expression() {
            self.parse_assignment_expression()
        } else {
            NodeIndex::NONE
        };
        let end_pos = self.node_end();
        self.arena.add_unary_expr_ex(
            syntax_kind_ext::YIELD_EXPRESSION,
            start_pos,
            end_pos,
            UnaryExprDataEx {
                expression,
                asterisk_token,
            },
        )
    }

    pub(crate) fn is_start_of_expression(&self) -> bool {
        match self.token() {
            SyntaxKind::CloseParenToken
            | SyntaxKind::CloseBracketToken
            | SyntaxKind::CloseBraceToken
            | SyntaxKind::SemicolonToken
            | SyntaxKind::CommaToken
            | SyntaxKind::ColonToken
            | SyntaxKind::EndOfFileToken
            | SyntaxKind::EqualsGreaterThanToken => false,
            token => !(token.is_assignment_operator() || binary_precedence(token) > 0)
                || matches!(
                    token,
                    SyntaxKind::PlusToken
                        | SyntaxKind::MinusToken
                        | SyntaxKind::LessThanToken
                        | SyntaxKind::SlashToken
                        | SyntaxKind::SlashEqualsToken
                ),
        }
    }

    // =========================================================================
    // Arrow functions
    // =========================================================================

    /// `Some(is_async)` when the current token starts an arrow function.
    fn arrow_function_start(&mut self) -> Option<bool> {
        match self.token() {
            SyntaxKind::AsyncKeyword => {
                let is_async_arrow = self.look_ahead(|p| {
                    p.next_token();
                    if p.has_preceding_line_break() {
                        return false;
                    }
                    if p.token().is_identifier_like() {
                        p.next_token();
                        return p.is_token(SyntaxKind::EqualsGreaterThanToken);
                    }
                    p.is_parenthesized_arrow()
                });
                if is_async_arrow {
                    return Some(true);
                }
                // `async => x`: `async` is the parameter
                if self.next_token_is(SyntaxKind::EqualsGreaterThanToken) {
                    return Some(false);
                }
                None
            }
            SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken => {
                self.look_ahead(|p| p.is_parenthesized_arrow()).then_some(false)
            }
            _ if self.is_identifier() => {
                let simple = self.next_token_on_same_line(|next| {
                    next == SyntaxKind::EqualsGreaterThanToken
                });
                simple.then_some(false)
            }
            _ => None,
        }
    }

    /// Probe: `<T>(...) =>` or `(...): R =>`. Consumes tokens.
    fn is_parenthesized_arrow(&mut self) -> bool {
        if self.is_token(SyntaxKind::LessThanToken) {
            let errors_before = self.parse_diagnostics.len();
            self.parse_type_parameters_probe();
            if self.parse_diagnostics.len() != errors_before {
                return false;
            }
        }
        if !self.is_token(SyntaxKind::OpenParenToken) {
            return false;
        }
        self.skip_balanced(SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken);
        if self.is_token(SyntaxKind::ColonToken) {
            let errors_before = self.parse_diagnostics.len();
            self.next_token();
            self.skip_type();
            if self.parse_diagnostics.len() != errors_before {
                return false;
            }
        }
        self.is_token(SyntaxKind::EqualsGreaterThanToken) && !self.has_preceding_line_break()
    }

    fn parse_type_parameters_probe(&mut self) {
        self.skip_balanced(SyntaxKind::LessThanToken, SyntaxKind::GreaterThanToken);
    }

    fn parse_arrow_function(&mut self, is_async: bool) -> NodeIndex {
        let start_pos = self.token_pos();
        if is_async {
            self.next_token();
        }

        let type_parameters = self.parse_type_parameters_opt();
        let mut flags = node_flags::NONE;
        let parameters = if self.is_token(SyntaxKind::OpenParenToken) {
            flags |= node_flags::PARENTHESIZED_PARAMETERS;
            self.with_async_context(is_async, false, |p| p.parse_parameter_list())
        } else {
            let param_start = self.token_pos();
            let name = self.parse_identifier();
            let param_end = self.node_end();
            let param = self.arena.add_parameter(
                syntax_kind_ext::PARAMETER,
                param_start,
                param_end,
                ParameterData {
                    modifiers: None,
                    dot_dot_dot_token: false,
                    name,
                    question_token: false,
                    type_annotation: NodeIndex::NONE,
                    initializer: NodeIndex::NONE,
                },
            );
            NodeList {
                nodes: vec![param],
                pos: param_start,
                end: param_end,
                has_trailing_comma: false,
            }
        };

        let type_annotation = self.parse_return_type_opt();
        self.parse_expected(SyntaxKind::EqualsGreaterThanToken);

        let body = if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_function_block(is_async, false)
        } else {
            self.with_async_context(is_async, false, |p| p.parse_assignment_expression())
        };

        let end_pos = self.node_end();
        let arrow = self.arena.add_function(
            syntax_kind_ext::ARROW_FUNCTION,
            start_pos,
            end_pos,
            FunctionData {
                modifiers: None,
                is_async,
                asterisk_token: false,
                name: NodeIndex::NONE,
                type_parameters,
                parameters,
                type_annotation,
                body,
            },
        );
        self.arena.set_flags(arrow, flags);
        arrow
    }

    /// Run `f` with the `await`/`yield` context of a function body.
    pub(crate) fn with_async_context<T>(
        &mut self,
        is_async: bool,
        is_generator: bool,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let mut set = 0;
        if is_async {
            set |= CONTEXT_FLAG_ASYNC;
        }
        if is_generator {
            set |= CONTEXT_FLAG_GENERATOR;
        }
        let clear = (CONTEXT_FLAG_ASYNC | CONTEXT_FLAG_GENERATOR | CONTEXT_FLAG_DISALLOW_IN) & !set;
        self.with_context(set, clear, f)
    }

    // =========================================================================
    // Binary and unary expressions
    // =========================================================================

    /// Parse binary expression with precedence climbing
    pub(crate) fn parse_binary_expression(&mut self, min_precedence: u8) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut left = self.parse_unary_expression();

        loop {
            if self.is_token(SyntaxKind::GreaterThanToken) {
                self.current_token = self.scanner.rescan_greater_token();
            }
            let operator = self.token();
            let precedence = binary_precedence(operator);
            if precedence == 0 {
                break;
            }
            if operator == SyntaxKind::InKeyword && self.in_context(CONTEXT_FLAG_DISALLOW_IN) {
                break;
            }

            // `**` is right-associative
            let binds = if operator == SyntaxKind::AsteriskAsteriskToken {
                precedence >= min_precedence
            } else {
                precedence > min_precedence
            };
            if !binds {
                break;
            }

            if matches!(operator, SyntaxKind::AsKeyword | SyntaxKind::SatisfiesKeyword) {
                if self.has_preceding_line_break() {
                    break;
                }
                self.next_token();
                let type_node = self.parse_type_node();
                let end_pos = self.node_end();
                let kind = if operator == SyntaxKind::AsKeyword {
                    syntax_kind_ext::AS_EXPRESSION
                } else {
                    syntax_kind_ext::SATISFIES_EXPRESSION
                };
                left = self.arena.add_type_assertion(
                    kind,
                    start_pos,
                    end_pos,
                    TypeAssertionData {
                        expression: left,
                        type_node,
                    },
                );
                continue;
            }

            self.next_token();
            let right = self.parse_binary_expression(precedence);
            let end_pos = self.node_end();
            left = self.arena.add_binary_expr(
                syntax_kind_ext::BINARY_EXPRESSION,
                start_pos,
                end_pos,
                BinaryExprData {
                    left,
                    operator_token: operator as u16,
                    right,
                },
            );
        }

        left
    }

    pub(crate) fn parse_unary_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        match self.token() {
            SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::TildeToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken => {
                let operator = self.token();
                self.next_token();
                let operand = self.parse_unary_expression();
                let end_pos = self.node_end();
                self.arena.add_unary_expr(
                    syntax_kind_ext::PREFIX_UNARY_EXPRESSION,
                    start_pos,
                    end_pos,
                    UnaryExprData {
                        operator: operator as u16,
                        operand,
                    },
                )
            }
            SyntaxKind::TypeOfKeyword => {
                self.parse_simple_unary(syntax_kind_ext::TYPE_OF_EXPRESSION)
            }
            SyntaxKind::VoidKeyword => self.parse_simple_unary(syntax_kind_ext::VOID_EXPRESSION),
            SyntaxKind::DeleteKeyword => {
                self.parse_simple_unary(syntax_kind_ext::DELETE_EXPRESSION)
            }
            SyntaxKind::AwaitKeyword if self.in_context(CONTEXT_FLAG_ASYNC) => {
                self.parse_simple_unary(syntax_kind_ext::AWAIT_EXPRESSION)
            }
            SyntaxKind::LessThanToken => {
                // <T>expr
                self.next_token();
                let type_node = self.parse_type_node();
                self.parse_expected(SyntaxKind::GreaterThanToken);
                let expression = self.parse_unary_expression();
                let end_pos = self.node_end();
                self.arena.add_type_assertion(
                    syntax_kind_ext::AS_EXPRESSION,
                    start_pos,
                    end_pos,
                    TypeAssertionData {
                        expression,
                        type_node,
                    },
                )
            }
            _ => self.parse_postfix_expression(),
        }
    }

    fn parse_simple_unary(&mut self, kind: u16) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let expression = self.parse_unary_expression();
        let end_pos = self.node_end();
        self.arena.add_unary_expr_ex(
            kind,
            start_pos,
            end_pos,
            UnaryExprDataEx {
                expression,
                asterisk_token: false,
            },
        )
    }

    fn parse_postfix_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let expression = self.parse_left_hand_side_expression();
        if matches!(
            self.token(),
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken
        ) && !self.has_preceding_line_break()
        {
            let operator = self.token();
            self.next_token();
            let end_pos = self.node_end();
            return self.arena.add_unary_expr(
                syntax_kind_ext::POSTFIX_UNARY_EXPRESSION,
                start_pos,
                end_pos,
                UnaryExprData {
                    operator: operator as u16,
                    operand: expression,
                },
            );
        }
        expression
    }

    // =========================================================================
    // Left-hand side: member access, calls, new
    // =========================================================================

    pub(crate) fn parse_left_hand_side_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let expression = if self.is_token(SyntaxKind::NewKeyword) {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        self.parse_member_and_call_rest(start_pos, expression, true)
    }

    fn parse_new_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();

        if self.is_token(SyntaxKind::DotToken) {
            // new.target
            let end_pos = self.token_pos();
            let new_ident = self.arena.add_identifier(
                SyntaxKind::Identifier as u16,
                start_pos,
                end_pos.min(start_pos + 3),
                IdentifierData {
                    escaped_text: "new".to_string(),
                },
            );
            return self.parse_member_and_call_rest(start_pos, new_ident, false);
        }

        let callee_start = self.token_pos();
        let callee = if self.is_token(SyntaxKind::NewKeyword) {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        let expression = self.parse_member_and_call_rest(callee_start, callee, false);

        let type_arguments = if self.is_start_of_call_type_arguments() {
            self.parse_type_arguments_node()
        } else {
            NodeIndex::NONE
        };
        let arguments = if self.is_token(SyntaxKind::OpenParenToken) {
            Some(self.parse_argument_list())
        } else {
            None
        };

        let end_pos = self.node_end();
        self.arena.add_call_expr(
            syntax_kind_ext::NEW_EXPRESSION,
            start_pos,
            end_pos,
            CallExprData {
                expression,
                type_arguments,
                arguments,
            },
        )
    }

    fn parse_member_and_call_rest(
        &mut self,
        start_pos: u32,
        mut expression: NodeIndex,
        allow_calls: bool,
    ) -> NodeIndex {
        loop {
            match self.token() {
                SyntaxKind::DotToken => {
                    self.next_token();
                    let name = self.parse_identifier_name();
                    expression = self.add_access(start_pos, expression, name, false, false);
                }
                SyntaxKind::QuestionDotToken => {
                    self.next_token();
                    if self.is_token(SyntaxKind::OpenParenToken) && allow_calls {
                        let arguments = self.parse_argument_list();
                        let end_pos = self.node_end();
                        expression = self.arena.add_call_expr(
                            syntax_kind_ext::CALL_EXPRESSION,
                            start_pos,
                            end_pos,
                            CallExprData {
                                expression,
                                type_arguments: NodeIndex::NONE,
                                arguments: Some(arguments),
                            },
                        );
                        self.arena.set_flags(expression, node_flags::OPTIONAL_CHAIN);
                    } else if self.parse_optional(SyntaxKind::OpenBracketToken) {
                        let argument = self.parse_expression_allow_in();
                        self.parse_expected(SyntaxKind::CloseBracketToken);
                        expression = self.add_access(start_pos, expression, argument, true, true);
                    } else {
                        let name = self.parse_identifier_name();
                        expression = self.add_access(start_pos, expression, name, true, false);
                    }
                }
                SyntaxKind::OpenBracketToken => {
                    self.next_token();
                    let argument = self.parse_expression_allow_in();
                    self.parse_expected(SyntaxKind::CloseBracketToken);
                    expression = self.add_access(start_pos, expression, argument, false, true);
                }
                SyntaxKind::ExclamationToken if !self.has_preceding_line_break() => {
                    self.next_token();
                    let end_pos = self.node_end();
                    expression = self.arena.add_unary_expr_ex(
                        syntax_kind_ext::NON_NULL_EXPRESSION,
                        start_pos,
                        end_pos,
                        UnaryExprDataEx {
                            expression,
                            asterisk_token: false,
                        },
                    );
                }
                SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead => {
                    let template = self.parse_template_literal();
                    let end_pos = self.node_end();
                    expression = self.arena.add_tagged_template(
                        syntax_kind_ext::TAGGED_TEMPLATE_EXPRESSION,
                        start_pos,
                        end_pos,
                        TaggedTemplateData {
                            tag: expression,
                            template,
                        },
                    );
                }
                SyntaxKind::LessThanToken
                    if allow_calls && self.is_start_of_call_type_arguments() =>
                {
                    let type_arguments = self.parse_type_arguments_node();
                    if self.is_token(SyntaxKind::OpenParenToken) {
                        let arguments = self.parse_argument_list();
                        let end_pos = self.node_end();
                        expression = self.arena.add_call_expr(
                            syntax_kind_ext::CALL_EXPRESSION,
                            start_pos,
                            end_pos,
                            CallExprData {
                                expression,
                                type_arguments,
                                arguments: Some(arguments),
                            },
                        );
                    }
                }
                SyntaxKind::OpenParenToken if allow_calls => {
                    let arguments = self.parse_argument_list();
                    let end_pos = self.node_end();
                    expression = self.arena.add_call_expr(
                        syntax_kind_ext::CALL_EXPRESSION,
                        start_pos,
                        end_pos,
                        CallExprData {
                            expression,
                            type_arguments: NodeIndex::NONE,
                            arguments: Some(arguments),
                        },
                    );
                }
                _ => break,
            }
        }
        expression
    }

    fn add_access(
        &mut self,
        start_pos: u32,
        expression: NodeIndex,
        name_or_argument: NodeIndex,
        question_dot_token: bool,
        element: bool,
    ) -> NodeIndex {
        let end_pos = self.node_end();
        let kind = if element {
            syntax_kind_ext::ELEMENT_ACCESS_EXPRESSION
        } else {
            syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION
        };
        let access = self.arena.add_access_expr(
            kind,
            start_pos,
            end_pos,
            AccessExprData {
                expression,
                name_or_argument,
                question_dot_token,
            },
        );
        if question_dot_token {
            self.arena.set_flags(access, node_flags::OPTIONAL_CHAIN);
        }
        access
    }

    /// `( arg, ...spread, )`
    pub(crate) fn parse_argument_list(&mut self) -> NodeList {
        let list_pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let mut nodes = Vec::new();
        let mut has_trailing_comma = false;

        while !self.is_token(SyntaxKind::CloseParenToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            has_trailing_comma = false;
            let argument = if self.is_token(SyntaxKind::DotDotDotToken) {
                self.parse_spread(syntax_kind_ext::SPREAD_ELEMENT)
            } else {
                self.parse_assignment_expression_allow_in()
            };
            if argument.is_none() {
                break;
            }
            nodes.push(argument);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
            has_trailing_comma = true;
        }

        self.parse_expected(SyntaxKind::CloseParenToken);
        NodeList {
            nodes,
            pos: list_pos,
            end: self.node_end(),
            has_trailing_comma,
        }
    }

    fn parse_spread(&mut self, kind: u16) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let expression = self.parse_assignment_expression_allow_in();
        let end_pos = self.node_end();
        self.arena.add_unary_expr_ex(
            kind,
            start_pos,
            end_pos,
            UnaryExprDataEx {
                expression,
                asterisk_token: false,
            },
        )
    }

    // =========================================================================
    // Primary expressions
    // =========================================================================

    fn parse_primary_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        match self.token() {
            SyntaxKind::ThisKeyword
            | SyntaxKind::SuperKeyword
            | SyntaxKind::NullKeyword
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword => {
                let kind = self.token() as u16;
                self.next_token();
                let end_pos = self.node_end();
                self.arena.add_token(kind, start_pos, end_pos)
            }
            SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral | SyntaxKind::StringLiteral => {
                self.parse_literal()
            }
            SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead => {
                self.parse_template_literal()
            }
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken => {
                self.current_token = self.scanner.rescan_slash_token();
                self.parse_literal()
            }
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let expression = self.parse_expression_allow_in();
                self.parse_expected(SyntaxKind::CloseParenToken);
                let end_pos = self.node_end();
                self.arena.add_parenthesized(
                    syntax_kind_ext::PARENTHESIZED_EXPRESSION,
                    start_pos,
                    end_pos,
                    ParenthesizedData { expression },
                )
            }
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenBraceToken => self.parse_object_literal(),
            SyntaxKind::FunctionKeyword => self.parse_function_expression(start_pos, false),
            SyntaxKind::AsyncKeyword
                if self.next_token_on_same_line(|next| next == SyntaxKind::FunctionKeyword) =>
            {
                self.next_token();
                self.parse_function_expression(start_pos, true)
            }
            SyntaxKind::ClassKeyword => {
                self.parse_class(syntax_kind_ext::CLASS_EXPRESSION, start_pos, None)
            }
            SyntaxKind::ImportKeyword => {
                // import(...) and import.meta
                self.next_token();
                let end_pos = self.node_end();
                self.arena.add_identifier(
                    SyntaxKind::Identifier as u16,
                    start_pos,
                    end_pos,
                    IdentifierData {
                        escaped_text: "import".to_string(),
                    },
                )
            }
            SyntaxKind::PrivateIdentifier => self.parse_identifier_name(),
            _ if self.is_identifier() => self.parse_identifier(),
            _ => {
                self.error_expression_expected();
                NodeIndex::NONE
            }
        }
    }

    pub(crate) fn parse_literal(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let kind = self.token() as u16;
        let text = self.scanner.get_token_value().to_string();
        let raw_text = self.scanner.get_token_text().to_string();
        self.next_token();
        let end_pos = self.node_end();
        self.arena.add_literal(
            kind,
            start_pos,
            end_pos,
            LiteralData {
                text,
                raw_text: Some(raw_text),
            },
        )
    }

    pub(crate) fn parse_template_literal(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::NoSubstitutionTemplateLiteral) {
            return self.parse_literal();
        }

        let start_pos = self.token_pos();
        let head = self.parse_literal();
        let mut spans = Vec::new();
        let spans_pos = self.token_pos();

        loop {
            let span_start = self.token_pos();
            let expression = self.parse_expression_allow_in();
            if !self.is_token(SyntaxKind::CloseBraceToken) {
                self.parse_expected(SyntaxKind::CloseBraceToken);
                break;
            }
            self.current_token = self.scanner.rescan_template_token();
            let is_tail = self.is_token(SyntaxKind::TemplateTail);
            let literal = self.parse_literal();
            let span_end = self.node_end();
            spans.push(self.arena.add_template_span(
                syntax_kind_ext::TEMPLATE_SPAN,
                span_start,
                span_end,
                TemplateSpanData {
                    expression,
                    literal,
                },
            ));
            if is_tail {
                break;
            }
        }

        let end_pos = self.node_end();
        self.arena.add_template_expr(
            syntax_kind_ext::TEMPLATE_EXPRESSION,
            start_pos,
            end_pos,
            TemplateExprData {
                head,
                template_spans: NodeList {
                    nodes: spans,
                    pos: spans_pos,
                    end: end_pos,
                    has_trailing_comma: false,
                },
            },
        )
    }

    fn parse_array_literal(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let multi_line = self.has_preceding_line_break();
        let list_pos = self.token_pos();
        let mut elements = Vec::new();
        let mut has_trailing_comma = false;

        while !self.is_token(SyntaxKind::CloseBracketToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            has_trailing_comma = false;
            if self.is_token(SyntaxKind::CommaToken) {
                let pos = self.token_pos();
                elements.push(self.arena.add_token(
                    syntax_kind_ext::OMITTED_EXPRESSION,
                    pos,
                    pos,
                ));
                self.next_token();
                continue;
            }
            let element = if self.is_token(SyntaxKind::DotDotDotToken) {
                self.parse_spread(syntax_kind_ext::SPREAD_ELEMENT)
            } else {
                self.parse_assignment_expression_allow_in()
            };
            if element.is_none() {
                break;
            }
            elements.push(element);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
            has_trailing_comma = true;
        }

        let list_end = self.token_pos();
        self.parse_expected(SyntaxKind::CloseBracketToken);
        let end_pos = self.node_end();
        self.arena.add_literal_expr(
            syntax_kind_ext::ARRAY_LITERAL_EXPRESSION,
            start_pos,
            end_pos,
            LiteralExprData {
                elements: NodeList {
                    nodes: elements,
                    pos: list_pos,
                    end: list_end,
                    has_trailing_comma,
                },
                multi_line,
            },
        )
    }

    fn parse_object_literal(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let multi_line = self.has_preceding_line_break();
        let list_pos = self.token_pos();
        let mut properties = Vec::new();
        let mut has_trailing_comma = false;

        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            has_trailing_comma = false;
            let pos_before = self.token_pos();
            let property = self.parse_object_literal_element();
            if property.is_some() {
                properties.push(property);
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                if self.token_pos() == pos_before {
                    self.next_token();
                    continue;
                }
                break;
            }
            has_trailing_comma = true;
        }

        let list_end = self.token_pos();
        self.parse_expected(SyntaxKind::CloseBraceToken);
        let end_pos = self.node_end();
        self.arena.add_literal_expr(
            syntax_kind_ext::OBJECT_LITERAL_EXPRESSION,
            start_pos,
            end_pos,
            LiteralExprData {
                elements: NodeList {
                    nodes: properties,
                    pos: list_pos,
                    end: list_end,
                    has_trailing_comma,
                },
                multi_line,
            },
        )
    }

    fn parse_object_literal_element(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        if self.is_token(SyntaxKind::DotDotDotToken) {
            return self.parse_spread(syntax_kind_ext::SPREAD_ASSIGNMENT);
        }

        let is_async = self.is_token(SyntaxKind::AsyncKeyword)
            && self.next_token_on_same_line(is_property_name_start_or_asterisk);
        if is_async {
            self.next_token();
        }
        let asterisk_token = self.parse_optional(SyntaxKind::AsteriskToken);

        if !is_async && !asterisk_token {
            let accessor = match self.token() {
                SyntaxKind::GetKeyword => Some(syntax_kind_ext::GET_ACCESSOR),
                SyntaxKind::SetKeyword => Some(syntax_kind_ext::SET_ACCESSOR),
                _ => None,
            };
            if let Some(kind) = accessor {
                let is_accessor = self.look_ahead(|p| {
                    p.next_token();
                    is_property_name_start(p.token())
                });
                if is_accessor {
                    self.next_token();
                    let name = self.parse_property_name();
                    return self.parse_method_rest(kind, start_pos, None, false, false, name);
                }
            }
        }

        let name = self.parse_property_name();
        if is_async
            || asterisk_token
            || self.is_token(SyntaxKind::OpenParenToken)
            || self.is_token(SyntaxKind::LessThanToken)
        {
            return self.parse_method_rest(
                syntax_kind_ext::METHOD_DECLARATION,
                start_pos,
                None,
                is_async,
                asterisk_token,
                name,
            );
        }

        if self.parse_optional(SyntaxKind::ColonToken) {
            let initializer = self.parse_assignment_expression_allow_in();
            let end_pos = self.node_end();
            return self.arena.add_property_assignment(
                syntax_kind_ext::PROPERTY_ASSIGNMENT,
                start_pos,
                end_pos,
                PropertyAssignmentData { name, initializer },
            );
        }

        // Shorthand, optionally with a destructuring default
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_assignment_expression_allow_in()
        } else {
            NodeIndex::NONE
        };
        let end_pos = self.node_end();
        self.arena.add_property_assignment(
            syntax_kind_ext::SHORTHAND_PROPERTY_ASSIGNMENT,
            start_pos,
            end_pos,
            PropertyAssignmentData { name, initializer },
        )
    }

    /// Identifier, keyword, string, number, private name or `[computed]`.
    pub(crate) fn parse_property_name(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral => {
                self.parse_literal()
            }
            SyntaxKind::OpenBracketToken => {
                let start_pos = self.token_pos();
                self.next_token();
                let expression = self.parse_assignment_expression_allow_in();
                self.parse_expected(SyntaxKind::CloseBracketToken);
                let end_pos = self.node_end();
                self.arena.add_computed_property(
                    syntax_kind_ext::COMPUTED_PROPERTY_NAME,
                    start_pos,
                    end_pos,
                    ComputedPropertyData { expression },
                )
            }
            _ => self.parse_identifier_name(),
        }
    }

    fn parse_function_expression(&mut self, start_pos: u32, is_async: bool) -> NodeIndex {
        self.parse_expected(SyntaxKind::FunctionKeyword);
        let asterisk_token = self.parse_optional(SyntaxKind::AsteriskToken);
        let name = if self.is_identifier() {
            self.with_async_context(is_async, asterisk_token, |p| p.parse_identifier())
        } else {
            NodeIndex::NONE
        };
        self.parse_function_rest(
            syntax_kind_ext::FUNCTION_EXPRESSION,
            start_pos,
            None,
            is_async,
            asterisk_token,
            name,
        )
    }

    /// Method-like member after its name: signature and body.
    pub(crate) fn parse_method_rest(
        &mut self,
        kind: u16,
        start_pos: u32,
        modifiers: Option<NodeList>,
        is_async: bool,
        asterisk_token: bool,
        name: NodeIndex,
    ) -> NodeIndex {
        // Optional method marker
        self.parse_optional(SyntaxKind::QuestionToken);
        self.parse_function_rest(kind, start_pos, modifiers, is_async, asterisk_token, name)
    }

    /// Type parameters, parameters, return type and body of any
    /// function-like node. A missing body (overloads, `declare`) is NONE.
    pub(crate) fn parse_function_rest(
        &mut self,
        kind: u16,
        start_pos: u32,
        modifiers: Option<NodeList>,
        is_async: bool,
        asterisk_token: bool,
        name: NodeIndex,
    ) -> NodeIndex {
        let type_parameters = self.parse_type_parameters_opt();
        let parameters =
            self.with_async_context(is_async, asterisk_token, |p| p.parse_parameter_list());
        let type_annotation = self.parse_return_type_opt();
        let body = if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_function_block(is_async, asterisk_token)
        } else {
            self.parse_semicolon();
            NodeIndex::NONE
        };
        let end_pos = self.node_end();
        self.arena.add_function(
            kind,
            start_pos,
            end_pos,
            FunctionData {
                modifiers,
                is_async,
                asterisk_token,
                name,
                type_parameters,
                parameters,
                type_annotation,
                body,
            },
        )
    }

    pub(crate) fn parse_function_block(&mut self, is_async: bool, is_generator: bool) -> NodeIndex {
        self.with_async_context(is_async, is_generator, |p| p.parse_block())
    }

    // =========================================================================
    // Parameters and binding names
    // =========================================================================

    pub(crate) fn parse_parameter_list(&mut self) -> NodeList {
        let list_pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let mut nodes = Vec::new();
        let mut has_trailing_comma = false;

        while !self.is_token(SyntaxKind::CloseParenToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            has_trailing_comma = false;
            let pos_before = self.token_pos();
            let parameter = self.parse_parameter();
            nodes.push(parameter);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
            has_trailing_comma = true;
            if self.token_pos() == pos_before {
                break;
            }
        }

        self.parse_expected(SyntaxKind::CloseParenToken);
        NodeList {
            nodes,
            pos: list_pos,
            end: self.node_end(),
            has_trailing_comma,
        }
    }

    fn parse_parameter(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut modifier_nodes = Vec::new();
        while is_parameter_modifier(self.token())
            && self.next_token_on_same_line(|next| {
                next.is_identifier_like()
                    || matches!(
                        next,
                        SyntaxKind::OpenBraceToken
                            | SyntaxKind::OpenBracketToken
                            | SyntaxKind::ThisKeyword
                    )
            })
        {
            let pos = self.token_pos();
            let kind = self.token() as u16;
            self.next_token();
            let end = self.node_end();
            modifier_nodes.push(self.arena.add_token(kind, pos, end));
        }
        let modifiers = (!modifier_nodes.is_empty()).then(|| NodeList::from_nodes(modifier_nodes));

        let dot_dot_dot_token = self.parse_optional(SyntaxKind::DotDotDotToken);
        let name = if self.is_token(SyntaxKind::ThisKeyword) {
            let pos = self.token_pos();
            self.next_token();
            let end = self.node_end();
            self.arena.add_identifier(
                SyntaxKind::Identifier as u16,
                pos,
                end,
                IdentifierData {
                    escaped_text: "this".to_string(),
                },
            )
        } else {
            self.parse_binding_name()
        };
        let question_token = self.parse_optional(SyntaxKind::QuestionToken);
        let type_annotation = self.parse_type_annotation_opt();
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_assignment_expression_allow_in()
        } else {
            NodeIndex::NONE
        };
        let end_pos = self.node_end();
        self.arena.add_parameter(
            syntax_kind_ext::PARAMETER,
            start_pos,
            end_pos,
            ParameterData {
                modifiers,
                dot_dot_dot_token,
                name,
                question_token,
                type_annotation,
                initializer,
            },
        )
    }

    /// Identifier or destructuring pattern.
    pub(crate) fn parse_binding_name(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::OpenBraceToken => self.parse_object_binding_pattern(),
            SyntaxKind::OpenBracketToken => self.parse_array_binding_pattern(),
            _ => self.parse_identifier(),
        }
    }

    fn parse_object_binding_pattern(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let list_pos = self.token_pos();
        let mut elements = Vec::new();

        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let element_start = self.token_pos();
            let dot_dot_dot_token = self.parse_optional(SyntaxKind::DotDotDotToken);
            let (property_name, name) = if dot_dot_dot_token {
                (NodeIndex::NONE, self.parse_identifier())
            } else {
                let property = self.parse_property_name();
                if self.parse_optional(SyntaxKind::ColonToken) {
                    (property, self.parse_binding_name())
                } else {
                    (NodeIndex::NONE, property)
                }
            };
            let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_assignment_expression_allow_in()
            } else {
                NodeIndex::NONE
            };
            let element_end = self.node_end();
            elements.push(self.arena.add_binding_element(
                syntax_kind_ext::BINDING_ELEMENT,
                element_start,
                element_end,
                BindingElementData {
                    dot_dot_dot_token,
                    property_name,
                    name,
                    initializer,
                },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }

        let list_end = self.token_pos();
        self.parse_expected(SyntaxKind::CloseBraceToken);
        let end_pos = self.node_end();
        self.arena.add_binding_pattern(
            syntax_kind_ext::OBJECT_BINDING_PATTERN,
            start_pos,
            end_pos,
            BindingPatternData {
                elements: NodeList {
                    nodes: elements,
                    pos: list_pos,
                    end: list_end,
                    has_trailing_comma: false,
                },
            },
        )
    }

    fn parse_array_binding_pattern(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let list_pos = self.token_pos();
        let mut elements = Vec::new();

        while !self.is_token(SyntaxKind::CloseBracketToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.is_token(SyntaxKind::CommaToken) {
                let pos = self.token_pos();
                elements.push(self.arena.add_token(
                    syntax_kind_ext::OMITTED_EXPRESSION,
                    pos,
                    pos,
                ));
                self.next_token();
                continue;
            }
            let element_start = self.token_pos();
            let dot_dot_dot_token = self.parse_optional(SyntaxKind::DotDotDotToken);
            let name = self.parse_binding_name();
            let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_assignment_expression_allow_in()
            } else {
                NodeIndex::NONE
            };
            let element_end = self.node_end();
            elements.push(self.arena.add_binding_element(
                syntax_kind_ext::BINDING_ELEMENT,
                element_start,
                element_end,
                BindingElementData {
                    dot_dot_dot_token,
                    property_name: NodeIndex::NONE,
                    name,
                    initializer,
                },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }

        let list_end = self.token_pos();
        self.parse_expected(SyntaxKind::CloseBracketToken);
        let end_pos = self.node_end();
        self.arena.add_binding_pattern(
            syntax_kind_ext::ARRAY_BINDING_PATTERN,
            start_pos,
            end_pos,
            BindingPatternData {
                elements: NodeList {
                    nodes: elements,
                    pos: list_pos,
                    end: list_end,
                    has_trailing_comma: false,
                },
            },
        )
    }
}

pub(crate) fn is_property_name_start(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::Identifier
        || kind.is_keyword()
        || matches!(
            kind,
            SyntaxKind::StringLiteral
                | SyntaxKind::NumericLiteral
                | SyntaxKind::BigIntLiteral
                | SyntaxKind::OpenBracketToken
                | SyntaxKind::PrivateIdentifier
        )
}

pub(crate) fn is_property_name_start_or_asterisk(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::AsteriskToken || is_property_name_start(kind)
}

fn is_parameter_modifier(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::PublicKeyword
            | SyntaxKind::PrivateKeyword
            | SyntaxKind::ProtectedKeyword
            | SyntaxKind::ReadonlyKeyword
            | SyntaxKind::OverrideKeyword
    )
}
