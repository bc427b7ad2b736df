//! Declaration pass: builds scopes and declares every binding.
//!
//! Declarations are collected for the whole file before any reference is
//! resolved, so hoisted `var` and function declarations resolve from
//! anywhere in their scope.

use crate::state::BinderState;
use crate::{ContainerKind, ScopeId, symbol_flags};
use asyncify_parser::node::Node;
use asyncify_parser::{NodeAccess, NodeArena, NodeIndex, node_flags, syntax_kind_ext};
use tracing::trace;

impl BinderState {
    pub(crate) fn declare_node(&mut self, arena: &NodeArena, idx: NodeIndex) {
        let Some(node) = arena.get(idx) else {
            return;
        };

        match node.kind {
            syntax_kind_ext::SOURCE_FILE => {
                let previous = self.current_scope;
                self.enter_scope(ContainerKind::SourceFile, idx);
                self.declare_children(arena, idx);
                self.exit_scope(previous);
            }
            _ if node.is_function_like() => self.declare_function_like(arena, node, idx),
            syntax_kind_ext::CLASS_DECLARATION | syntax_kind_ext::CLASS_EXPRESSION => {
                self.declare_class(arena, node, idx);
            }
            syntax_kind_ext::BLOCK
            | syntax_kind_ext::CASE_BLOCK
            | syntax_kind_ext::FOR_STATEMENT
            | syntax_kind_ext::FOR_IN_STATEMENT
            | syntax_kind_ext::FOR_OF_STATEMENT => {
                let previous = self.current_scope;
                self.enter_scope(ContainerKind::Block, idx);
                self.declare_children(arena, idx);
                self.exit_scope(previous);
            }
            syntax_kind_ext::CATCH_CLAUSE => {
                let previous = self.current_scope;
                let scope = self.enter_scope(ContainerKind::Block, idx);
                if let Some(clause) = arena.get_catch_clause(node) {
                    if let Some(decl_node) = arena.get(clause.variable_declaration)
                        && let Some(decl) = arena.get_variable_declaration(decl_node)
                    {
                        self.declare_binding_name(
                            arena,
                            decl.name,
                            clause.variable_declaration,
                            scope,
                            symbol_flags::CATCH_VARIABLE,
                        );
                    }
                    self.declare_node(arena, clause.block);
                }
                self.exit_scope(previous);
            }
            syntax_kind_ext::VARIABLE_STATEMENT | syntax_kind_ext::VARIABLE_DECLARATION_LIST => {
                let flags = u32::from(node.flags);
                if let Some(var) = arena.get_variable(node) {
                    for &decl in &var.declarations.nodes {
                        self.declare_variable_declaration(arena, decl, flags);
                    }
                }
            }
            _ => self.declare_children(arena, idx),
        }
    }

    fn declare_children(&mut self, arena: &NodeArena, idx: NodeIndex) {
        for child in arena.get_children(idx) {
            self.declare_node(arena, child);
        }
    }

    fn declare_variable_declaration(&mut self, arena: &NodeArena, idx: NodeIndex, list_flags: u32) {
        let Some(node) = arena.get(idx) else {
            return;
        };
        let Some(decl) = arena.get_variable_declaration(node) else {
            return;
        };

        let (scope, flags) = if list_flags & node_flags::BLOCK_SCOPED != 0 {
            let mut flags = symbol_flags::BLOCK_SCOPED_VARIABLE;
            if list_flags & node_flags::CONST != 0 {
                flags |= symbol_flags::CONST;
            }
            (self.current_scope, flags)
        } else {
            (
                self.function_scope_of(self.current_scope),
                symbol_flags::FUNCTION_SCOPED_VARIABLE,
            )
        };

        self.declare_binding_name(arena, decl.name, idx, scope, flags);
        self.declare_node(arena, decl.initializer);
    }

    /// Declare every identifier a binding name introduces. Default values
    /// and computed keys inside patterns are visited for nested functions.
    fn declare_binding_name(
        &mut self,
        arena: &NodeArena,
        name: NodeIndex,
        declaration: NodeIndex,
        scope: ScopeId,
        flags: u32,
    ) {
        let Some(node) = arena.get(name) else {
            return;
        };

        if let Some(ident) = arena.get_identifier(node) {
            trace!(name = %ident.escaped_text, scope = scope.0, "declare");
            self.declare_symbol(scope, &ident.escaped_text, flags, name, declaration);
            return;
        }

        let Some(pattern) = arena.get_binding_pattern(node) else {
            return;
        };
        for &element_idx in &pattern.elements.nodes {
            let Some(element_node) = arena.get(element_idx) else {
                continue;
            };
            let Some(element) = arena.get_binding_element(element_node) else {
                continue;
            };
            if let Some(key) = arena.get(element.property_name)
                && key.kind == syntax_kind_ext::COMPUTED_PROPERTY_NAME
            {
                self.declare_node(arena, element.property_name);
            }
            self.declare_binding_name(arena, element.name, element_idx, scope, flags);
            self.declare_node(arena, element.initializer);
        }
    }

    fn declare_function_like(&mut self, arena: &NodeArena, node: &Node, idx: NodeIndex) {
        let Some(func) = arena.get_function(node) else {
            return;
        };

        // Declarations bind their name in the enclosing scope.
        if node.kind == syntax_kind_ext::FUNCTION_DECLARATION {
            let scope = self.current_scope;
            self.declare_binding_name(arena, func.name, idx, scope, symbol_flags::FUNCTION);
        }

        let previous = self.current_scope;
        let scope = self.enter_scope(ContainerKind::Function, idx);

        // A named function expression sees its own name.
        if node.kind == syntax_kind_ext::FUNCTION_EXPRESSION {
            self.declare_binding_name(arena, func.name, idx, scope, symbol_flags::FUNCTION);
        }
        if let Some(name) = arena.get(func.name)
            && name.kind == syntax_kind_ext::COMPUTED_PROPERTY_NAME
        {
            // Computed method keys evaluate in the enclosing scope.
            self.exit_scope(previous);
            self.declare_node(arena, func.name);
            self.current_scope = scope;
        }

        for &param_idx in &func.parameters.nodes {
            let Some(param_node) = arena.get(param_idx) else {
                continue;
            };
            let Some(param) = arena.get_parameter(param_node) else {
                continue;
            };
            if arena.identifier_text(param.name) != Some("this") {
                self.declare_binding_name(
                    arena,
                    param.name,
                    param_idx,
                    scope,
                    symbol_flags::PARAMETER,
                );
            }
            self.declare_node(arena, param.initializer);
        }

        // The body block shares the function scope.
        if let Some(body) = arena.get(func.body) {
            if body.kind == syntax_kind_ext::BLOCK {
                self.node_scope_ids.insert(func.body.0, scope);
                self.declare_children(arena, func.body);
            } else {
                self.declare_node(arena, func.body);
            }
        }

        self.exit_scope(previous);
    }

    fn declare_class(&mut self, arena: &NodeArena, node: &Node, idx: NodeIndex) {
        let Some(class) = arena.get_class(node) else {
            return;
        };

        if node.kind == syntax_kind_ext::CLASS_DECLARATION {
            let scope = self.current_scope;
            self.declare_binding_name(arena, class.name, idx, scope, symbol_flags::CLASS);
        }

        let previous = self.current_scope;
        let scope = self.enter_scope(ContainerKind::Class, idx);
        if node.kind == syntax_kind_ext::CLASS_EXPRESSION {
            self.declare_binding_name(arena, class.name, idx, scope, symbol_flags::CLASS);
        }
        for &member in &class.members.nodes {
            self.declare_node(arena, member);
        }
        self.exit_scope(previous);
    }
}
