//! `Printer`: node-to-text rendering.

use crate::source_writer::SourceWriter;
use asyncify_parser::{NodeArena, NodeIndex, syntax_kind_ext};
use asyncify_scanner::{SyntaxKind, token_to_string};
use serde::{Deserialize, Serialize};
use tracing::trace;

mod declarations;
mod expressions;
mod literals;
mod statements;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintOptions {
    pub indent_size: usize,
    /// Prefix for every line after the first.
    pub base_indent: String,
    pub new_line: String,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            indent_size: 4,
            base_indent: String::new(),
            new_line: "\n".to_string(),
        }
    }
}

pub struct Printer<'a> {
    pub(crate) arena: &'a NodeArena,
    pub(crate) writer: SourceWriter,
}

impl<'a> Printer<'a> {
    pub fn new(arena: &'a NodeArena, options: PrintOptions) -> Printer<'a> {
        Printer {
            arena,
            writer: SourceWriter::new(options.indent_size, &options.base_indent, &options.new_line),
        }
    }

    /// Print statements one per line.
    pub fn print_statements(&mut self, statements: &[NodeIndex]) -> String {
        trace!(count = statements.len(), "print_statements");
        for (i, &stmt) in statements.iter().enumerate() {
            if i > 0 {
                self.write_line();
            }
            self.emit(stmt);
        }
        self.writer.take_output()
    }

    /// Print a single statement or expression.
    pub fn print_node(&mut self, node: NodeIndex) -> String {
        self.emit(node);
        self.writer.take_output()
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    pub(crate) fn emit(&mut self, idx: NodeIndex) {
        let Some(node) = self.arena.get(idx) else {
            return;
        };

        match node.kind {
            // Statements
            syntax_kind_ext::BLOCK => self.emit_block(node),
            syntax_kind_ext::EMPTY_STATEMENT => self.write(";"),
            syntax_kind_ext::VARIABLE_STATEMENT => self.emit_variable_statement(node),
            syntax_kind_ext::VARIABLE_DECLARATION_LIST => self.emit_variable_declaration_list(node),
            syntax_kind_ext::VARIABLE_DECLARATION => self.emit_variable_declaration(node),
            syntax_kind_ext::EXPRESSION_STATEMENT => self.emit_expression_statement(node),
            syntax_kind_ext::EXPORT_ASSIGNMENT => self.emit_export_assignment(node),
            syntax_kind_ext::IF_STATEMENT => self.emit_if_statement(node),
            syntax_kind_ext::DO_STATEMENT => self.emit_do_statement(node),
            syntax_kind_ext::WHILE_STATEMENT => self.emit_while_statement(node),
            syntax_kind_ext::FOR_STATEMENT => self.emit_for_statement(node),
            syntax_kind_ext::FOR_IN_STATEMENT | syntax_kind_ext::FOR_OF_STATEMENT => {
                self.emit_for_in_of_statement(node)
            }
            syntax_kind_ext::CONTINUE_STATEMENT | syntax_kind_ext::BREAK_STATEMENT => {
                self.emit_jump_statement(node)
            }
            syntax_kind_ext::RETURN_STATEMENT | syntax_kind_ext::THROW_STATEMENT => {
                self.emit_return_or_throw(node)
            }
            syntax_kind_ext::SWITCH_STATEMENT => self.emit_switch_statement(node),
            syntax_kind_ext::CASE_CLAUSE | syntax_kind_ext::DEFAULT_CLAUSE => {
                self.emit_case_clause(node)
            }
            syntax_kind_ext::LABELED_STATEMENT => self.emit_labeled_statement(node),
            syntax_kind_ext::TRY_STATEMENT => self.emit_try_statement(node),
            syntax_kind_ext::CATCH_CLAUSE => self.emit_catch_clause(node),
            syntax_kind_ext::DEBUGGER_STATEMENT => self.write("debugger;"),

            // Declarations
            syntax_kind_ext::FUNCTION_DECLARATION
            | syntax_kind_ext::FUNCTION_EXPRESSION
            | syntax_kind_ext::ARROW_FUNCTION
            | syntax_kind_ext::METHOD_DECLARATION
            | syntax_kind_ext::CONSTRUCTOR
            | syntax_kind_ext::GET_ACCESSOR
            | syntax_kind_ext::SET_ACCESSOR => self.emit_function_like(node),
            syntax_kind_ext::CLASS_DECLARATION | syntax_kind_ext::CLASS_EXPRESSION => {
                self.emit_class(node)
            }
            syntax_kind_ext::PARAMETER => self.emit_parameter(node),
            syntax_kind_ext::PROPERTY_DECLARATION => self.emit_property_declaration(node),
            syntax_kind_ext::SEMICOLON_CLASS_ELEMENT => self.write(";"),
            syntax_kind_ext::OBJECT_BINDING_PATTERN | syntax_kind_ext::ARRAY_BINDING_PATTERN => {
                self.emit_binding_pattern(node)
            }
            syntax_kind_ext::BINDING_ELEMENT => self.emit_binding_element(node),

            // Opaque text: types and untouched declarations
            syntax_kind_ext::TYPE_NODE
            | syntax_kind_ext::INTERFACE_DECLARATION
            | syntax_kind_ext::TYPE_ALIAS_DECLARATION
            | syntax_kind_ext::ENUM_DECLARATION
            | syntax_kind_ext::MODULE_DECLARATION
            | syntax_kind_ext::IMPORT_DECLARATION
            | syntax_kind_ext::EXPORT_DECLARATION => {
                if let Some(text) = self.arena.get_type_node(node) {
                    self.write(&text.text);
                }
            }

            // Expressions
            syntax_kind_ext::ARRAY_LITERAL_EXPRESSION => self.emit_array_literal(node),
            syntax_kind_ext::OBJECT_LITERAL_EXPRESSION => self.emit_object_literal(node),
            syntax_kind_ext::PROPERTY_ASSIGNMENT => self.emit_property_assignment(node),
            syntax_kind_ext::SHORTHAND_PROPERTY_ASSIGNMENT => self.emit_shorthand_property(node),
            syntax_kind_ext::COMPUTED_PROPERTY_NAME => self.emit_computed_property_name(node),
            syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION
            | syntax_kind_ext::ELEMENT_ACCESS_EXPRESSION => self.emit_access_expression(node),
            syntax_kind_ext::CALL_EXPRESSION => self.emit_call_expression(node),
            syntax_kind_ext::NEW_EXPRESSION => self.emit_new_expression(node),
            syntax_kind_ext::TAGGED_TEMPLATE_EXPRESSION => self.emit_tagged_template(node),
            syntax_kind_ext::PARENTHESIZED_EXPRESSION => self.emit_parenthesized(node),
            syntax_kind_ext::DELETE_EXPRESSION
            | syntax_kind_ext::TYPE_OF_EXPRESSION
            | syntax_kind_ext::VOID_EXPRESSION
            | syntax_kind_ext::AWAIT_EXPRESSION
            | syntax_kind_ext::YIELD_EXPRESSION => self.emit_keyword_unary(node),
            syntax_kind_ext::SPREAD_ELEMENT | syntax_kind_ext::SPREAD_ASSIGNMENT => {
                self.emit_spread(node)
            }
            syntax_kind_ext::NON_NULL_EXPRESSION => self.emit_non_null(node),
            syntax_kind_ext::PREFIX_UNARY_EXPRESSION => self.emit_prefix_unary(node),
            syntax_kind_ext::POSTFIX_UNARY_EXPRESSION => self.emit_postfix_unary(node),
            syntax_kind_ext::BINARY_EXPRESSION => self.emit_binary_expression(node),
            syntax_kind_ext::CONDITIONAL_EXPRESSION => self.emit_conditional(node),
            syntax_kind_ext::TEMPLATE_EXPRESSION => self.emit_template_expression(node),
            syntax_kind_ext::TEMPLATE_SPAN => self.emit_template_span(node),
            syntax_kind_ext::AS_EXPRESSION | syntax_kind_ext::SATISFIES_EXPRESSION => {
                self.emit_type_assertion(node)
            }
            syntax_kind_ext::OMITTED_EXPRESSION => {}

            k if k == SyntaxKind::Identifier as u16 || k == SyntaxKind::PrivateIdentifier as u16 => {
                if let Some(ident) = self.arena.get_identifier(node) {
                    self.write(&ident.escaped_text);
                }
            }
            _ if self.arena.get_literal(node).is_some() => self.emit_literal(node),
            k => {
                // Keyword expressions and modifiers are bare tokens.
                match SyntaxKind::from_u16(k).and_then(token_to_string) {
                    Some(text) => self.write(text),
                    None => {
                        trace!(kind = k, "no printer for node kind");
                    }
                }
            }
        }
    }

    // =========================================================================
    // Output helpers
    // =========================================================================

    pub(crate) fn write(&mut self, text: &str) {
        self.writer.write(text);
    }

    pub(crate) fn write_space(&mut self) {
        self.writer.write_space();
    }

    pub(crate) fn write_line(&mut self) {
        self.writer.write_line();
    }

    pub(crate) fn increase_indent(&mut self) {
        self.writer.increase_indent();
    }

    pub(crate) fn decrease_indent(&mut self) {
        self.writer.decrease_indent();
    }

    /// Emit a comma-separated list on one line.
    pub(crate) fn emit_comma_list(&mut self, nodes: &[NodeIndex]) {
        for (i, &node) in nodes.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_operand(node, precedence::ASSIGNMENT);
        }
    }

    /// Emit `idx`, parenthesized when it binds looser than `min_precedence`.
    pub(crate) fn emit_operand(&mut self, idx: NodeIndex, min_precedence: u8) {
        let Some(node) = self.arena.get(idx) else {
            return;
        };
        if self.expression_precedence(node) < min_precedence {
            self.write("(");
            self.emit(idx);
            self.write(")");
        } else {
            self.emit(idx);
        }
    }
}

/// Text of an operator token.
pub(crate) fn get_operator_text(operator: u16) -> &'static str {
    SyntaxKind::from_u16(operator)
        .and_then(token_to_string)
        .unwrap_or("")
}

/// Expression precedence levels, loosest first.
pub(crate) mod precedence {
    pub const COMMA: u8 = 0;
    pub const ASSIGNMENT: u8 = 1;
    pub const CONDITIONAL: u8 = 2;
    pub const COALESCE: u8 = 3;
    pub const RELATIONAL: u8 = 10;
    pub const EXPONENT: u8 = 14;
    pub const UNARY: u8 = 15;
    pub const POSTFIX: u8 = 16;
    pub const LEFT_HAND_SIDE: u8 = 17;
    pub const PRIMARY: u8 = 18;
}
