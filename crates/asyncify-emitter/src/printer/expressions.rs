use super::{Printer, get_operator_text, precedence};
use asyncify_parser::node::Node;
use asyncify_parser::{NodeIndex, node_flags, syntax_kind_ext};
use asyncify_scanner::SyntaxKind;

impl<'a> Printer<'a> {
    // =========================================================================
    // Precedence
    // =========================================================================

    pub(super) fn expression_precedence(&self, node: &Node) -> u8 {
        match node.kind {
            syntax_kind_ext::BINARY_EXPRESSION => self
                .arena
                .get_binary_expr(node)
                .map_or(precedence::PRIMARY, |bin| binary_operator_precedence(bin.operator_token)),
            syntax_kind_ext::ARROW_FUNCTION
            | syntax_kind_ext::YIELD_EXPRESSION
            | syntax_kind_ext::SPREAD_ELEMENT => precedence::ASSIGNMENT,
            syntax_kind_ext::CONDITIONAL_EXPRESSION => precedence::CONDITIONAL,
            syntax_kind_ext::AS_EXPRESSION | syntax_kind_ext::SATISFIES_EXPRESSION => {
                precedence::RELATIONAL
            }
            syntax_kind_ext::PREFIX_UNARY_EXPRESSION
            | syntax_kind_ext::DELETE_EXPRESSION
            | syntax_kind_ext::TYPE_OF_EXPRESSION
            | syntax_kind_ext::VOID_EXPRESSION
            | syntax_kind_ext::AWAIT_EXPRESSION => precedence::UNARY,
            syntax_kind_ext::POSTFIX_UNARY_EXPRESSION => precedence::POSTFIX,
            syntax_kind_ext::NEW_EXPRESSION => {
                // `new Foo` without arguments cannot be called directly.
                let has_args = self
                    .arena
                    .get_call_expr(node)
                    .is_some_and(|call| call.arguments.is_some());
                if has_args {
                    precedence::LEFT_HAND_SIDE
                } else {
                    precedence::POSTFIX
                }
            }
            syntax_kind_ext::CALL_EXPRESSION
            | syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION
            | syntax_kind_ext::ELEMENT_ACCESS_EXPRESSION
            | syntax_kind_ext::TAGGED_TEMPLATE_EXPRESSION
            | syntax_kind_ext::NON_NULL_EXPRESSION => precedence::LEFT_HAND_SIDE,
            _ => precedence::PRIMARY,
        }
    }

    // =========================================================================
    // Member access and calls
    // =========================================================================

    pub(super) fn emit_access_expression(&mut self, node: &Node) {
        let Some(access) = self.arena.get_access_expr(node) else {
            return;
        };

        self.emit_receiver(access.expression);
        if node.kind == syntax_kind_ext::ELEMENT_ACCESS_EXPRESSION {
            self.write(if access.question_dot_token { "?.[" } else { "[" });
            self.emit_operand(access.name_or_argument, precedence::COMMA);
            self.write("]");
        } else {
            self.write(if access.question_dot_token { "?." } else { "." });
            self.emit(access.name_or_argument);
        }
    }

    pub(super) fn emit_call_expression(&mut self, node: &Node) {
        let Some(call) = self.arena.get_call_expr(node) else {
            return;
        };

        self.emit_receiver(call.expression);
        if node.has_flag(node_flags::OPTIONAL_CHAIN) {
            self.write("?.");
        }
        self.emit(call.type_arguments);
        self.write("(");
        if let Some(args) = &call.arguments {
            self.emit_comma_list(&args.nodes);
        }
        self.write(")");
    }

    pub(super) fn emit_new_expression(&mut self, node: &Node) {
        let Some(call) = self.arena.get_call_expr(node) else {
            return;
        };

        self.write("new ");
        // A call inside the callee would take the arguments.
        let callee_is_call = self.arena.get(call.expression).is_some_and(|callee| {
            callee.kind == syntax_kind_ext::CALL_EXPRESSION || self.contains_call_on_left(callee)
        });
        if callee_is_call {
            self.write("(");
            self.emit(call.expression);
            self.write(")");
        } else {
            self.emit_receiver(call.expression);
        }
        self.emit(call.type_arguments);
        if let Some(args) = &call.arguments {
            self.write("(");
            self.emit_comma_list(&args.nodes);
            self.write(")");
        }
    }

    fn contains_call_on_left(&self, node: &Node) -> bool {
        let mut current = node;
        loop {
            let next = match current.kind {
                syntax_kind_ext::CALL_EXPRESSION => return true,
                syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION
                | syntax_kind_ext::ELEMENT_ACCESS_EXPRESSION => {
                    self.arena.get_access_expr(current).map(|a| a.expression)
                }
                _ => None,
            };
            match next.and_then(|idx| self.arena.get(idx)) {
                Some(n) => current = n,
                None => return false,
            }
        }
    }

    /// Callee or receiver position.
    fn emit_receiver(&mut self, idx: NodeIndex) {
        let Some(node) = self.arena.get(idx) else {
            return;
        };
        // `1.toString()` would lex as a malformed number.
        let bare_integer = node.kind == SyntaxKind::NumericLiteral as u16
            && self
                .arena
                .get_literal(node)
                .and_then(|lit| lit.raw_text.as_deref())
                .is_some_and(|raw| raw.bytes().all(|b| b.is_ascii_digit()));
        if bare_integer {
            self.write("(");
            self.emit(idx);
            self.write(")");
            return;
        }
        self.emit_operand(idx, precedence::LEFT_HAND_SIDE);
    }

    pub(super) fn emit_tagged_template(&mut self, node: &Node) {
        let Some(tagged) = self.arena.get_tagged_template(node) else {
            return;
        };
        self.emit_receiver(tagged.tag);
        self.emit(tagged.template);
    }

    pub(super) fn emit_parenthesized(&mut self, node: &Node) {
        let Some(paren) = self.arena.get_parenthesized(node) else {
            return;
        };
        self.write("(");
        self.emit(paren.expression);
        self.write(")");
    }

    // =========================================================================
    // Operators
    // =========================================================================

    pub(super) fn emit_keyword_unary(&mut self, node: &Node) {
        let Some(unary) = self.arena.get_unary_expr_ex(node) else {
            return;
        };

        let keyword = match node.kind {
            syntax_kind_ext::DELETE_EXPRESSION => "delete",
            syntax_kind_ext::TYPE_OF_EXPRESSION => "typeof",
            syntax_kind_ext::VOID_EXPRESSION => "void",
            syntax_kind_ext::AWAIT_EXPRESSION => "await",
            _ => "yield",
        };
        self.write(keyword);

        if node.kind == syntax_kind_ext::YIELD_EXPRESSION {
            if unary.asterisk_token {
                self.write("*");
            }
            if unary.expression.is_some() {
                self.write_space();
                self.emit_operand(unary.expression, precedence::ASSIGNMENT);
            }
            return;
        }

        self.write_space();
        self.emit_operand(unary.expression, precedence::UNARY);
    }

    pub(super) fn emit_spread(&mut self, node: &Node) {
        let Some(unary) = self.arena.get_unary_expr_ex(node) else {
            return;
        };
        self.write("...");
        self.emit_operand(unary.expression, precedence::ASSIGNMENT);
    }

    pub(super) fn emit_non_null(&mut self, node: &Node) {
        let Some(unary) = self.arena.get_unary_expr_ex(node) else {
            return;
        };
        self.emit_operand(unary.expression, precedence::LEFT_HAND_SIDE);
        self.write("!");
    }

    pub(super) fn emit_prefix_unary(&mut self, node: &Node) {
        let Some(unary) = self.arena.get_unary_expr(node) else {
            return;
        };

        self.write(get_operator_text(unary.operator));
        // `- -x` and `+ +x` must not fuse into `--x` / `++x`.
        if let Some(operand) = self.arena.get(unary.operand)
            && operand.kind == syntax_kind_ext::PREFIX_UNARY_EXPRESSION
            && let Some(inner) = self.arena.get_unary_expr(operand)
        {
            let op = unary.operator;
            let inner_op = inner.operator;
            let plus = [SyntaxKind::PlusToken as u16, SyntaxKind::PlusPlusToken as u16];
            let minus = [SyntaxKind::MinusToken as u16, SyntaxKind::MinusMinusToken as u16];
            if (plus.contains(&op) && plus.contains(&inner_op))
                || (minus.contains(&op) && minus.contains(&inner_op))
            {
                self.write_space();
            }
        }
        self.emit_operand(unary.operand, precedence::UNARY);
    }

    pub(super) fn emit_postfix_unary(&mut self, node: &Node) {
        let Some(unary) = self.arena.get_unary_expr(node) else {
            return;
        };
        self.emit_operand(unary.operand, precedence::LEFT_HAND_SIDE);
        self.write(get_operator_text(unary.operator));
    }

    pub(super) fn emit_binary_expression(&mut self, node: &Node) {
        let Some(binary) = self.arena.get_binary_expr(node) else {
            return;
        };

        let op = binary.operator_token;
        let prec = binary_operator_precedence(op);
        let (left_min, right_min) = if prec == precedence::ASSIGNMENT {
            (precedence::LEFT_HAND_SIDE, precedence::ASSIGNMENT)
        } else if prec == precedence::EXPONENT {
            (prec + 1, prec)
        } else {
            (prec, prec + 1)
        };

        self.emit_operand(binary.left, left_min);
        if op == SyntaxKind::CommaToken as u16 {
            self.write(", ");
        } else {
            self.write_space();
            self.write(get_operator_text(op));
            self.write_space();
        }
        self.emit_operand(binary.right, right_min);
    }

    pub(super) fn emit_conditional(&mut self, node: &Node) {
        let Some(cond) = self.arena.get_conditional_expr(node) else {
            return;
        };
        self.emit_operand(cond.condition, precedence::COALESCE);
        self.write(" ? ");
        self.emit_operand(cond.when_true, precedence::ASSIGNMENT);
        self.write(" : ");
        self.emit_operand(cond.when_false, precedence::ASSIGNMENT);
    }

    pub(super) fn emit_type_assertion(&mut self, node: &Node) {
        let Some(assertion) = self.arena.get_type_assertion(node) else {
            return;
        };
        self.emit_operand(assertion.expression, precedence::RELATIONAL);
        self.write(if node.kind == syntax_kind_ext::AS_EXPRESSION {
            " as "
        } else {
            " satisfies "
        });
        self.emit(assertion.type_node);
    }

    /// Leftmost expression of `idx`, the one that starts its text.
    pub(super) fn leftmost_expression(&self, mut idx: NodeIndex) -> NodeIndex {
        loop {
            let Some(node) = self.arena.get(idx) else {
                return idx;
            };
            let next = match node.kind {
                syntax_kind_ext::CALL_EXPRESSION => {
                    self.arena.get_call_expr(node).map(|c| c.expression)
                }
                syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION
                | syntax_kind_ext::ELEMENT_ACCESS_EXPRESSION => {
                    self.arena.get_access_expr(node).map(|a| a.expression)
                }
                syntax_kind_ext::BINARY_EXPRESSION => {
                    self.arena.get_binary_expr(node).map(|b| b.left)
                }
                syntax_kind_ext::CONDITIONAL_EXPRESSION => {
                    self.arena.get_conditional_expr(node).map(|c| c.condition)
                }
                syntax_kind_ext::POSTFIX_UNARY_EXPRESSION => {
                    self.arena.get_unary_expr(node).map(|u| u.operand)
                }
                syntax_kind_ext::NON_NULL_EXPRESSION => {
                    self.arena.get_unary_expr_ex(node).map(|u| u.expression)
                }
                syntax_kind_ext::AS_EXPRESSION | syntax_kind_ext::SATISFIES_EXPRESSION => {
                    self.arena.get_type_assertion(node).map(|a| a.expression)
                }
                syntax_kind_ext::TAGGED_TEMPLATE_EXPRESSION => {
                    self.arena.get_tagged_template(node).map(|t| t.tag)
                }
                _ => None,
            };
            match next {
                Some(next) if next.is_some() => idx = next,
                _ => return idx,
            }
        }
    }
}

/// Precedence of a binary operator token.
pub(super) fn binary_operator_precedence(op: u16) -> u8 {
    let Some(kind) = SyntaxKind::from_u16(op) else {
        return precedence::PRIMARY;
    };
    if kind.is_assignment_operator() {
        return precedence::ASSIGNMENT;
    }
    match kind {
        SyntaxKind::CommaToken => precedence::COMMA,
        SyntaxKind::QuestionQuestionToken => precedence::COALESCE,
        SyntaxKind::BarBarToken => 4,
        SyntaxKind::AmpersandAmpersandToken => 5,
        SyntaxKind::BarToken => 6,
        SyntaxKind::CaretToken => 7,
        SyntaxKind::AmpersandToken => 8,
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::ExclamationEqualsToken
        | SyntaxKind::EqualsEqualsEqualsToken
        | SyntaxKind::ExclamationEqualsEqualsToken => 9,
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken
        | SyntaxKind::InstanceOfKeyword
        | SyntaxKind::InKeyword => precedence::RELATIONAL,
        SyntaxKind::LessThanLessThanToken
        | SyntaxKind::GreaterThanGreaterThanToken
        | SyntaxKind::GreaterThanGreaterThanGreaterThanToken => 11,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => 12,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => 13,
        SyntaxKind::AsteriskAsteriskToken => precedence::EXPONENT,
        _ => precedence::PRIMARY,
    }
}
