use super::{Printer, precedence};
use asyncify_parser::node::Node;
use asyncify_parser::{NodeIndex, node_flags, syntax_kind_ext};

impl<'a> Printer<'a> {
    // =========================================================================
    // Blocks
    // =========================================================================

    pub(super) fn emit_block(&mut self, node: &Node) {
        let Some(block) = self.arena.get_block(node) else {
            return;
        };

        if block.statements.is_empty() {
            if block.multi_line {
                self.write("{");
                self.write_line();
                self.write("}");
            } else {
                self.write("{ }");
            }
            return;
        }

        self.write("{");
        self.write_line();
        self.increase_indent();
        for &stmt in &block.statements.nodes {
            self.emit(stmt);
            self.write_line();
        }
        self.decrease_indent();
        self.write("}");
    }

    /// Body of `if`/loops: blocks stay on the header line, other statements
    /// go on their own indented line.
    fn emit_embedded_statement(&mut self, idx: NodeIndex) {
        let is_block = self
            .arena
            .get(idx)
            .is_some_and(|n| n.kind == syntax_kind_ext::BLOCK);
        if is_block {
            self.write_space();
            self.emit(idx);
        } else {
            self.write_line();
            self.increase_indent();
            self.emit(idx);
            self.decrease_indent();
        }
    }

    fn is_block(&self, idx: NodeIndex) -> bool {
        self.arena
            .get(idx)
            .is_some_and(|n| n.kind == syntax_kind_ext::BLOCK)
    }

    // =========================================================================
    // Variables
    // =========================================================================

    pub(super) fn emit_variable_statement(&mut self, node: &Node) {
        let Some(var) = self.arena.get_variable(node) else {
            return;
        };
        if let Some(modifiers) = &var.modifiers {
            self.emit_modifiers(&modifiers.nodes);
        }
        self.emit_declaration_keyword(node);
        self.emit_declarations(&var.declarations.nodes);
        self.write(";");
    }

    pub(super) fn emit_variable_declaration_list(&mut self, node: &Node) {
        let Some(var) = self.arena.get_variable(node) else {
            return;
        };
        self.emit_declaration_keyword(node);
        self.emit_declarations(&var.declarations.nodes);
    }

    fn emit_declaration_keyword(&mut self, node: &Node) {
        if node.has_flag(node_flags::CONST) {
            self.write("const ");
        } else if node.has_flag(node_flags::LET) {
            self.write("let ");
        } else {
            self.write("var ");
        }
    }

    fn emit_declarations(&mut self, declarations: &[NodeIndex]) {
        for (i, &decl) in declarations.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit(decl);
        }
    }

    pub(super) fn emit_variable_declaration(&mut self, node: &Node) {
        let Some(decl) = self.arena.get_variable_declaration(node) else {
            return;
        };
        self.emit(decl.name);
        if decl.exclamation_token {
            self.write("!");
        }
        if decl.type_annotation.is_some() {
            self.write(": ");
            self.emit(decl.type_annotation);
        }
        if decl.initializer.is_some() {
            self.write(" = ");
            self.emit_operand(decl.initializer, precedence::ASSIGNMENT);
        }
    }

    // =========================================================================
    // Expression statements
    // =========================================================================

    pub(super) fn emit_expression_statement(&mut self, node: &Node) {
        let Some(stmt) = self.arena.get_expression_statement(node) else {
            return;
        };

        // A statement cannot start with `{`, `function` or `class`.
        let leftmost = self.leftmost_expression(stmt.expression);
        let needs_parens = self.arena.get(leftmost).is_some_and(|n| {
            matches!(
                n.kind,
                syntax_kind_ext::OBJECT_LITERAL_EXPRESSION
                    | syntax_kind_ext::FUNCTION_EXPRESSION
                    | syntax_kind_ext::CLASS_EXPRESSION
            )
        });
        if needs_parens {
            self.write("(");
            self.emit(stmt.expression);
            self.write(")");
        } else {
            self.emit(stmt.expression);
        }
        self.write(";");
    }

    pub(super) fn emit_export_assignment(&mut self, node: &Node) {
        let Some(stmt) = self.arena.get_expression_statement(node) else {
            return;
        };
        self.write("export default ");
        self.emit_operand(stmt.expression, precedence::ASSIGNMENT);
        self.write(";");
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    pub(super) fn emit_if_statement(&mut self, node: &Node) {
        let Some(if_stmt) = self.arena.get_if_statement(node) else {
            return;
        };

        self.write("if (");
        self.emit(if_stmt.expression);
        self.write(")");
        self.emit_embedded_statement(if_stmt.then_statement);

        if if_stmt.else_statement.is_some() {
            if self.is_block(if_stmt.then_statement) {
                self.write(" ");
            } else {
                self.write_line();
            }
            self.write("else");
            let else_is_if = self
                .arena
                .get(if_stmt.else_statement)
                .is_some_and(|n| n.kind == syntax_kind_ext::IF_STATEMENT);
            if else_is_if {
                self.write_space();
                self.emit(if_stmt.else_statement);
            } else {
                self.emit_embedded_statement(if_stmt.else_statement);
            }
        }
    }

    pub(super) fn emit_do_statement(&mut self, node: &Node) {
        let Some(loop_data) = self.arena.get_loop(node) else {
            return;
        };
        self.write("do");
        self.emit_embedded_statement(loop_data.statement);
        if self.is_block(loop_data.statement) {
            self.write(" ");
        } else {
            self.write_line();
        }
        self.write("while (");
        self.emit(loop_data.condition);
        self.write(");");
    }

    pub(super) fn emit_while_statement(&mut self, node: &Node) {
        let Some(loop_data) = self.arena.get_loop(node) else {
            return;
        };
        self.write("while (");
        self.emit(loop_data.condition);
        self.write(")");
        self.emit_embedded_statement(loop_data.statement);
    }

    pub(super) fn emit_for_statement(&mut self, node: &Node) {
        let Some(loop_data) = self.arena.get_loop(node) else {
            return;
        };
        self.write("for (");
        self.emit(loop_data.initializer);
        self.write(";");
        if loop_data.condition.is_some() {
            self.write_space();
            self.emit(loop_data.condition);
        }
        self.write(";");
        if loop_data.incrementor.is_some() {
            self.write_space();
            self.emit(loop_data.incrementor);
        }
        self.write(")");
        self.emit_embedded_statement(loop_data.statement);
    }

    pub(super) fn emit_for_in_of_statement(&mut self, node: &Node) {
        let Some(for_data) = self.arena.get_for_in_of(node) else {
            return;
        };
        self.write("for ");
        if for_data.await_modifier {
            self.write("await ");
        }
        self.write("(");
        self.emit(for_data.initializer);
        if node.kind == syntax_kind_ext::FOR_IN_STATEMENT {
            self.write(" in ");
            self.emit(for_data.expression);
        } else {
            self.write(" of ");
            self.emit_operand(for_data.expression, precedence::ASSIGNMENT);
        }
        self.write(")");
        self.emit_embedded_statement(for_data.statement);
    }

    pub(super) fn emit_jump_statement(&mut self, node: &Node) {
        self.write(if node.kind == syntax_kind_ext::BREAK_STATEMENT {
            "break"
        } else {
            "continue"
        });
        if let Some(jump) = self.arena.get_jump_data(node)
            && jump.label.is_some()
        {
            self.write_space();
            self.emit(jump.label);
        }
        self.write(";");
    }

    pub(super) fn emit_return_or_throw(&mut self, node: &Node) {
        self.write(if node.kind == syntax_kind_ext::RETURN_STATEMENT {
            "return"
        } else {
            "throw"
        });
        if let Some(ret) = self.arena.get_return_statement(node)
            && ret.expression.is_some()
        {
            self.write_space();
            self.emit(ret.expression);
        }
        self.write(";");
    }

    pub(super) fn emit_switch_statement(&mut self, node: &Node) {
        let Some(switch) = self.arena.get_switch(node) else {
            return;
        };
        self.write("switch (");
        self.emit(switch.expression);
        self.write(") {");
        self.write_line();
        self.increase_indent();
        let clauses = self
            .arena
            .get(switch.case_block)
            .and_then(|n| self.arena.get_block(n))
            .map(|block| block.statements.nodes.clone())
            .unwrap_or_default();
        for clause in clauses {
            self.emit(clause);
            self.write_line();
        }
        self.decrease_indent();
        self.write("}");
    }

    pub(super) fn emit_case_clause(&mut self, node: &Node) {
        let Some(clause) = self.arena.get_case_clause(node) else {
            return;
        };
        if node.kind == syntax_kind_ext::DEFAULT_CLAUSE {
            self.write("default:");
        } else {
            self.write("case ");
            self.emit(clause.expression);
            self.write(":");
        }

        // `case x: { ... }` keeps the block on the label line.
        if let [single] = clause.statements.nodes.as_slice()
            && self.is_block(*single)
        {
            self.write_space();
            self.emit(*single);
            return;
        }

        self.increase_indent();
        for &stmt in &clause.statements.nodes {
            self.write_line();
            self.emit(stmt);
        }
        self.decrease_indent();
    }

    pub(super) fn emit_labeled_statement(&mut self, node: &Node) {
        let Some(labeled) = self.arena.get_labeled_statement(node) else {
            return;
        };
        self.emit(labeled.label);
        self.write(": ");
        self.emit(labeled.statement);
    }

    // =========================================================================
    // Exceptions
    // =========================================================================

    pub(super) fn emit_try_statement(&mut self, node: &Node) {
        let Some(try_data) = self.arena.get_try(node) else {
            return;
        };
        self.write("try ");
        self.emit(try_data.try_block);
        if try_data.catch_clause.is_some() {
            self.write_space();
            self.emit(try_data.catch_clause);
        }
        if try_data.finally_block.is_some() {
            self.write(" finally ");
            self.emit(try_data.finally_block);
        }
    }

    pub(super) fn emit_catch_clause(&mut self, node: &Node) {
        let Some(catch) = self.arena.get_catch_clause(node) else {
            return;
        };
        self.write("catch ");
        if catch.variable_declaration.is_some() {
            self.write("(");
            self.emit(catch.variable_declaration);
            self.write(") ");
        }
        self.emit(catch.block);
    }
}
