use super::{Printer, precedence};
use asyncify_parser::node::Node;
use asyncify_parser::syntax_kind_ext;
use asyncify_scanner::SyntaxKind;

impl<'a> Printer<'a> {
    // =========================================================================
    // Array and object literals
    // =========================================================================

    pub(super) fn emit_array_literal(&mut self, node: &Node) {
        let Some(literal) = self.arena.get_literal_expr(node) else {
            return;
        };

        let elements = &literal.elements.nodes;
        if elements.is_empty() {
            self.write("[]");
            return;
        }

        if literal.multi_line {
            self.write("[");
            self.write_line();
            self.increase_indent();
            for (i, &element) in elements.iter().enumerate() {
                self.emit_operand(element, precedence::ASSIGNMENT);
                if i + 1 < elements.len() {
                    self.write(",");
                }
                self.write_line();
            }
            self.decrease_indent();
            self.write("]");
            return;
        }

        self.write("[");
        self.emit_comma_list(elements);
        let ends_with_hole = elements
            .last()
            .and_then(|&last| self.arena.get(last))
            .is_some_and(|n| n.kind == syntax_kind_ext::OMITTED_EXPRESSION);
        if ends_with_hole {
            self.write(",");
        }
        self.write("]");
    }

    pub(super) fn emit_object_literal(&mut self, node: &Node) {
        let Some(literal) = self.arena.get_literal_expr(node) else {
            return;
        };

        let properties = &literal.elements.nodes;
        if properties.is_empty() {
            self.write("{}");
            return;
        }

        if literal.multi_line {
            self.write("{");
            self.write_line();
            self.increase_indent();
            for (i, &prop) in properties.iter().enumerate() {
                self.emit(prop);
                if i + 1 < properties.len() {
                    self.write(",");
                }
                self.write_line();
            }
            self.decrease_indent();
            self.write("}");
            return;
        }

        self.write("{ ");
        for (i, &prop) in properties.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit(prop);
        }
        self.write(" }");
    }

    pub(super) fn emit_property_assignment(&mut self, node: &Node) {
        let Some(prop) = self.arena.get_property_assignment(node) else {
            return;
        };
        self.emit(prop.name);
        self.write(": ");
        self.emit_operand(prop.initializer, precedence::ASSIGNMENT);
    }

    pub(super) fn emit_shorthand_property(&mut self, node: &Node) {
        let Some(prop) = self.arena.get_property_assignment(node) else {
            return;
        };
        self.emit(prop.name);
        // Shorthand with a default, only valid as an assignment target.
        if prop.initializer.is_some() {
            self.write(" = ");
            self.emit_operand(prop.initializer, precedence::ASSIGNMENT);
        }
    }

    pub(super) fn emit_computed_property_name(&mut self, node: &Node) {
        let Some(computed) = self.arena.get_computed_property(node) else {
            return;
        };
        self.write("[");
        self.emit_operand(computed.expression, precedence::ASSIGNMENT);
        self.write("]");
    }

    // =========================================================================
    // Literals and templates
    // =========================================================================

    pub(super) fn emit_literal(&mut self, node: &Node) {
        let Some(literal) = self.arena.get_literal(node) else {
            return;
        };

        if let Some(raw) = &literal.raw_text {
            self.write(raw);
            return;
        }

        // Synthesized literals carry only their value.
        if node.kind == SyntaxKind::StringLiteral as u16 {
            let quoted = quote_string(&literal.text);
            self.write(&quoted);
        } else {
            self.write(&literal.text);
        }
    }

    pub(super) fn emit_template_expression(&mut self, node: &Node) {
        let Some(template) = self.arena.get_template_expr(node) else {
            return;
        };
        self.emit(template.head);
        for &span in &template.template_spans.nodes {
            self.emit(span);
        }
    }

    pub(super) fn emit_template_span(&mut self, node: &Node) {
        let Some(span) = self.arena.get_template_span(node) else {
            return;
        };
        self.emit(span.expression);
        self.emit(span.literal);
    }
}

/// Double-quoted string literal text for `value`.
fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
