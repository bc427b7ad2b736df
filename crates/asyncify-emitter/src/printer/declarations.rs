use super::{Printer, precedence};
use asyncify_parser::node::{FunctionData, Node};
use asyncify_parser::{NodeIndex, node_flags, syntax_kind_ext};
use asyncify_scanner::{SyntaxKind, token_to_string};

impl<'a> Printer<'a> {
    // =========================================================================
    // Modifiers
    // =========================================================================

    /// Decorators and keyword modifiers, each followed by a space.
    pub(super) fn emit_modifiers(&mut self, modifiers: &[NodeIndex]) {
        for &modifier in modifiers {
            let Some(node) = self.arena.get(modifier) else {
                continue;
            };
            if let Some(text) = self.arena.get_type_node(node) {
                self.write(&text.text);
            } else if node.kind == SyntaxKind::Identifier as u16 && !node.has_data() {
                // The contextual `accessor` keyword.
                self.write("accessor");
            } else if let Some(text) = SyntaxKind::from_u16(node.kind).and_then(token_to_string) {
                self.write(text);
            }
            self.write_space();
        }
    }

    // =========================================================================
    // Functions
    // =========================================================================

    pub(super) fn emit_function_like(&mut self, node: &Node) {
        let Some(func) = self.arena.get_function(node) else {
            return;
        };

        if let Some(modifiers) = &func.modifiers {
            self.emit_modifiers(&modifiers.nodes);
        }
        if func.is_async {
            self.write("async ");
        }

        match node.kind {
            syntax_kind_ext::ARROW_FUNCTION => {
                self.emit(func.type_parameters);
                self.emit_arrow_parameters(node, func);
                if func.type_annotation.is_some() {
                    self.write(": ");
                    self.emit(func.type_annotation);
                }
                self.write(" => ");
                self.emit_arrow_body(func.body);
                return;
            }
            syntax_kind_ext::FUNCTION_DECLARATION | syntax_kind_ext::FUNCTION_EXPRESSION => {
                self.write("function");
                if func.asterisk_token {
                    self.write("*");
                }
                if func.name.is_some() {
                    self.write_space();
                    self.emit(func.name);
                }
            }
            syntax_kind_ext::GET_ACCESSOR => {
                self.write("get ");
                self.emit(func.name);
            }
            syntax_kind_ext::SET_ACCESSOR => {
                self.write("set ");
                self.emit(func.name);
            }
            syntax_kind_ext::CONSTRUCTOR => self.write("constructor"),
            _ => {
                if func.asterisk_token {
                    self.write("*");
                }
                self.emit(func.name);
            }
        }

        self.emit(func.type_parameters);
        self.write("(");
        self.emit_parameter_list(&func.parameters.nodes);
        self.write(")");
        if func.type_annotation.is_some() {
            self.write(": ");
            self.emit(func.type_annotation);
        }
        if func.body.is_some() {
            self.write_space();
            self.emit(func.body);
        } else {
            self.write(";");
        }
    }

    fn emit_parameter_list(&mut self, parameters: &[NodeIndex]) {
        for (i, &param) in parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit(param);
        }
    }

    fn emit_arrow_parameters(&mut self, node: &Node, func: &FunctionData) {
        let single_plain = match func.parameters.nodes.as_slice() {
            [only] => self
                .arena
                .get(*only)
                .and_then(|p| self.arena.get_parameter(p))
                .is_some_and(|param| {
                    param.modifiers.is_none()
                        && !param.dot_dot_dot_token
                        && !param.question_token
                        && param.type_annotation.is_none()
                        && param.initializer.is_none()
                        && self.arena.get(param.name).is_some_and(|n| n.is_identifier())
                }),
            _ => false,
        };
        let parenthesize = !single_plain
            || node.has_flag(node_flags::PARENTHESIZED_PARAMETERS)
            || func.type_parameters.is_some()
            || func.type_annotation.is_some();

        if parenthesize {
            self.write("(");
            self.emit_parameter_list(&func.parameters.nodes);
            self.write(")");
        } else {
            self.emit_parameter_list(&func.parameters.nodes);
        }
    }

    fn emit_arrow_body(&mut self, body: NodeIndex) {
        let Some(body_node) = self.arena.get(body) else {
            return;
        };
        if body_node.kind == syntax_kind_ext::BLOCK {
            self.emit(body);
            return;
        }
        // `=> {` would start a block.
        let leftmost = self.leftmost_expression(body);
        let starts_with_object = self
            .arena
            .get(leftmost)
            .is_some_and(|n| n.kind == syntax_kind_ext::OBJECT_LITERAL_EXPRESSION);
        if starts_with_object {
            self.write("(");
            self.emit(body);
            self.write(")");
        } else {
            self.emit_operand(body, precedence::ASSIGNMENT);
        }
    }

    pub(super) fn emit_parameter(&mut self, node: &Node) {
        let Some(param) = self.arena.get_parameter(node) else {
            return;
        };
        if let Some(modifiers) = &param.modifiers {
            self.emit_modifiers(&modifiers.nodes);
        }
        if param.dot_dot_dot_token {
            self.write("...");
        }
        self.emit(param.name);
        if param.question_token {
            self.write("?");
        }
        if param.type_annotation.is_some() {
            self.write(": ");
            self.emit(param.type_annotation);
        }
        if param.initializer.is_some() {
            self.write(" = ");
            self.emit_operand(param.initializer, precedence::ASSIGNMENT);
        }
    }

    // =========================================================================
    // Classes
    // =========================================================================

    pub(super) fn emit_class(&mut self, node: &Node) {
        let Some(class) = self.arena.get_class(node) else {
            return;
        };

        if let Some(modifiers) = &class.modifiers {
            self.emit_modifiers(&modifiers.nodes);
        }
        self.write("class");
        if class.name.is_some() {
            self.write_space();
            self.emit(class.name);
        }
        self.emit(class.type_parameters);
        if class.heritage_clauses.is_some() {
            self.write_space();
            self.emit(class.heritage_clauses);
        }

        if class.members.is_empty() {
            self.write(" { }");
            return;
        }
        self.write(" {");
        self.write_line();
        self.increase_indent();
        for &member in &class.members.nodes {
            self.emit(member);
            self.write_line();
        }
        self.decrease_indent();
        self.write("}");
    }

    pub(super) fn emit_property_declaration(&mut self, node: &Node) {
        let Some(prop) = self.arena.get_property_decl(node) else {
            return;
        };
        if let Some(modifiers) = &prop.modifiers {
            self.emit_modifiers(&modifiers.nodes);
        }
        self.emit(prop.name);
        if prop.question_token {
            self.write("?");
        }
        if prop.exclamation_token {
            self.write("!");
        }
        if prop.type_annotation.is_some() {
            self.write(": ");
            self.emit(prop.type_annotation);
        }
        if prop.initializer.is_some() {
            self.write(" = ");
            self.emit_operand(prop.initializer, precedence::ASSIGNMENT);
        }
        self.write(";");
    }

    // =========================================================================
    // Binding patterns
    // =========================================================================

    pub(super) fn emit_binding_pattern(&mut self, node: &Node) {
        let Some(pattern) = self.arena.get_binding_pattern(node) else {
            return;
        };

        if node.kind == syntax_kind_ext::ARRAY_BINDING_PATTERN {
            self.write("[");
            for (i, &element) in pattern.elements.nodes.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.emit(element);
            }
            // A trailing hole needs its own comma.
            let ends_with_hole = pattern
                .elements
                .nodes
                .last()
                .and_then(|&last| self.arena.get(last))
                .is_some_and(|n| n.kind == syntax_kind_ext::OMITTED_EXPRESSION);
            if ends_with_hole {
                self.write(",");
            }
            self.write("]");
            return;
        }

        if pattern.elements.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{ ");
        for (i, &element) in pattern.elements.nodes.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit(element);
        }
        self.write(" }");
    }

    pub(super) fn emit_binding_element(&mut self, node: &Node) {
        let Some(element) = self.arena.get_binding_element(node) else {
            return;
        };
        if element.dot_dot_dot_token {
            self.write("...");
        }
        if element.property_name.is_some() {
            self.emit(element.property_name);
            self.write(": ");
        }
        self.emit(element.name);
        if element.initializer.is_some() {
            self.write(" = ");
            self.emit_operand(element.initializer, precedence::ASSIGNMENT);
        }
    }
}
