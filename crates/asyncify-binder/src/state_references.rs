//! Reference pass: resolves identifier references against the scopes built
//! by the declaration pass.

use crate::state::BinderState;
use asyncify_parser::node::Node;
use asyncify_parser::{NodeAccess, NodeArena, NodeIndex, syntax_kind_ext};
use asyncify_scanner::SyntaxKind;
use tracing::trace;

impl BinderState {
    pub(crate) fn resolve_node(&mut self, arena: &NodeArena, idx: NodeIndex) {
        let Some(node) = arena.get(idx) else {
            return;
        };

        match node.kind {
            k if k == SyntaxKind::Identifier as u16 => self.resolve_identifier(arena, node, idx),
            syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION => {
                if let Some(access) = arena.get_access_expr(node) {
                    self.resolve_node(arena, access.expression);
                }
            }
            syntax_kind_ext::PROPERTY_ASSIGNMENT => {
                if let Some(prop) = arena.get_property_assignment(node) {
                    self.resolve_property_name(arena, prop.name);
                    self.resolve_node(arena, prop.initializer);
                }
            }
            syntax_kind_ext::PROPERTY_DECLARATION => {
                if let Some(prop) = arena.get_property_decl(node) {
                    self.resolve_property_name(arena, prop.name);
                    self.resolve_node(arena, prop.initializer);
                }
            }
            syntax_kind_ext::BINDING_ELEMENT => {
                if let Some(element) = arena.get_binding_element(node) {
                    self.resolve_property_name(arena, element.property_name);
                    self.resolve_node(arena, element.name);
                    self.resolve_node(arena, element.initializer);
                }
            }
            syntax_kind_ext::PARAMETER => {
                if let Some(param) = arena.get_parameter(node) {
                    if !arena.get(param.name).is_some_and(Node::is_identifier) {
                        self.resolve_node(arena, param.name);
                    }
                    self.resolve_node(arena, param.initializer);
                }
            }
            syntax_kind_ext::LABELED_STATEMENT => {
                if let Some(labeled) = arena.get_labeled_statement(node) {
                    self.resolve_node(arena, labeled.statement);
                }
            }
            syntax_kind_ext::BREAK_STATEMENT | syntax_kind_ext::CONTINUE_STATEMENT => {}
            _ if node.is_function_like() => self.resolve_function_like(arena, node, idx),
            _ => {
                let previous = self.current_scope;
                if let Some(scope) = self.scope_of_node(idx) {
                    self.current_scope = scope;
                }
                for child in arena.get_children(idx) {
                    self.resolve_node(arena, child);
                }
                self.current_scope = previous;
            }
        }
    }

    fn resolve_function_like(&mut self, arena: &NodeArena, node: &Node, idx: NodeIndex) {
        let Some(func) = arena.get_function(node) else {
            return;
        };

        // Method names are keys, not references; computed keys evaluate
        // outside the function.
        if !matches!(
            node.kind,
            syntax_kind_ext::FUNCTION_DECLARATION | syntax_kind_ext::FUNCTION_EXPRESSION
        ) {
            self.resolve_property_name(arena, func.name);
        }

        let previous = self.current_scope;
        if let Some(scope) = self.scope_of_node(idx) {
            self.current_scope = scope;
        }
        for &param in &func.parameters.nodes {
            self.resolve_node(arena, param);
        }
        self.resolve_node(arena, func.body);
        self.current_scope = previous;
    }

    /// Only computed keys contain references.
    fn resolve_property_name(&mut self, arena: &NodeArena, name: NodeIndex) {
        if let Some(node) = arena.get(name)
            && node.kind == syntax_kind_ext::COMPUTED_PROPERTY_NAME
        {
            self.resolve_node(arena, name);
        }
    }

    fn resolve_identifier(&mut self, arena: &NodeArena, node: &Node, idx: NodeIndex) {
        if self.node_symbols.contains_key(&idx.0) {
            return;
        }
        let Some(ident) = arena.get_identifier(node) else {
            return;
        };

        match self.resolve_name(&ident.escaped_text, self.current_scope) {
            Some(id) => {
                self.node_symbols.insert(idx.0, id);
                self.symbol_references.entry(id).or_default().push(idx);
            }
            None => {
                trace!(name = %ident.escaped_text, "unresolved reference");
                self.unresolved.push(idx);
                self.unresolved_nodes.insert(idx.0);
                self.unresolved_names.insert(ident.escaped_text.clone());
            }
        }
    }
}
