//! `PromiseTypeOracle`: answers promise-likeness from declarations.
//!
//! There is no type system behind this oracle. An expression is
//! promise-like when its shape or the declaration behind it says so:
//! an `async` callee, a `Promise<...>` annotation, a configured promise
//! factory, a `.then` on something promise-like, and so on. Inferred
//! return types are approximated from `return` statements.

use crate::oracle::TypeOracle;
use crate::options::OracleOptions;
use asyncify_binder::{BinderState, SymbolId};
use asyncify_parser::node::{FunctionData, Node};
use asyncify_parser::syntax::{skip_parentheses, visit_function_scope};
use asyncify_parser::{NodeArena, NodeIndex, syntax_kind_ext};
use asyncify_scanner::SyntaxKind;
use rustc_hash::FxHashSet;
use std::cell::RefCell;
use tracing::trace;

/// Static methods of the promise constructor that return promises.
const PROMISE_STATICS: &[&str] = &["all", "allSettled", "any", "race", "reject", "resolve"];

pub struct PromiseTypeOracle<'a> {
    arena: &'a NodeArena,
    binder: &'a BinderState,
    options: &'a OracleOptions,
    /// Nodes whose answer is being computed; re-entry answers `false`.
    in_progress: RefCell<FxHashSet<u32>>,
}

impl<'a> PromiseTypeOracle<'a> {
    pub fn new(
        arena: &'a NodeArena,
        binder: &'a BinderState,
        options: &'a OracleOptions,
    ) -> PromiseTypeOracle<'a> {
        PromiseTypeOracle {
            arena,
            binder,
            options,
            in_progress: RefCell::new(FxHashSet::default()),
        }
    }

    pub fn arena(&self) -> &'a NodeArena {
        self.arena
    }

    pub fn binder(&self) -> &'a BinderState {
        self.binder
    }

    pub fn options(&self) -> &'a OracleOptions {
        self.options
    }

    /// True when the type text names a promise type.
    pub fn is_promise_type(&self, type_node: NodeIndex) -> bool {
        self.type_text(type_node)
            .is_some_and(|text| is_promise_type_text(text, self.options))
    }

    /// Declared return type text of a function-like node.
    pub fn return_type_text(&self, func_idx: NodeIndex) -> Option<&'a str> {
        let node = self.arena.get(func_idx)?;
        let func = self.arena.get_function(node)?;
        self.type_text(func.type_annotation)
    }

    /// True when calling the function-like node yields a promise: it is
    /// `async`, declares a promise return type, or every `return` in its
    /// body produces a promise.
    pub fn function_returns_promise(&self, func_idx: NodeIndex) -> bool {
        self.guarded(func_idx, |this| {
            let Some(node) = this.arena.get(func_idx) else {
                return false;
            };
            let Some(func) = this.arena.get_function(node) else {
                return false;
            };
            this.function_data_returns_promise(func_idx, func)
        })
    }

    fn function_data_returns_promise(&self, func_idx: NodeIndex, func: &FunctionData) -> bool {
        if func.is_async && !func.asterisk_token {
            return true;
        }
        if func.type_annotation.is_some() {
            return self.is_promise_type(func.type_annotation);
        }

        let Some(body) = self.arena.get(func.body) else {
            return false;
        };
        if body.kind != syntax_kind_ext::BLOCK {
            return self.is_promise_like(func.body);
        }

        let mut saw_return = false;
        let mut all_promise = true;
        visit_function_scope(self.arena, func_idx, &mut |idx| {
            if !all_promise {
                return false;
            }
            let Some(node) = self.arena.get(idx) else {
                return false;
            };
            if node.kind == syntax_kind_ext::RETURN_STATEMENT {
                saw_return = true;
                all_promise = self
                    .arena
                    .get_return_statement(node)
                    .is_some_and(|ret| ret.expression.is_some() && self.is_promise_like(ret.expression));
                return false;
            }
            true
        });
        saw_return && all_promise
    }

    fn guarded(&self, idx: NodeIndex, f: impl FnOnce(&Self) -> bool) -> bool {
        if !self.in_progress.borrow_mut().insert(idx.0) {
            return false;
        }
        let result = f(self);
        self.in_progress.borrow_mut().remove(&idx.0);
        result
    }

    fn type_text(&self, type_node: NodeIndex) -> Option<&'a str> {
        let node = self.arena.get(type_node)?;
        self.arena.get_type_node(node).map(|t| t.text.as_str())
    }

    fn promise_like_worker(&self, idx: NodeIndex) -> bool {
        let Some(node) = self.arena.get(idx) else {
            return false;
        };

        match node.kind {
            syntax_kind_ext::PARENTHESIZED_EXPRESSION => self
                .arena
                .get_parenthesized(node)
                .is_some_and(|p| self.is_promise_like(p.expression)),
            syntax_kind_ext::NON_NULL_EXPRESSION => self
                .arena
                .get_unary_expr_ex(node)
                .is_some_and(|u| self.is_promise_like(u.expression)),
            syntax_kind_ext::SATISFIES_EXPRESSION => self
                .arena
                .get_type_assertion(node)
                .is_some_and(|a| self.is_promise_like(a.expression)),
            syntax_kind_ext::AS_EXPRESSION => self
                .arena
                .get_type_assertion(node)
                .is_some_and(|a| self.is_promise_type(a.type_node)),
            syntax_kind_ext::CALL_EXPRESSION => self.call_returns_promise(node),
            syntax_kind_ext::NEW_EXPRESSION => self.arena.get_call_expr(node).is_some_and(|call| {
                self.arena
                    .identifier_text(call.expression)
                    .is_some_and(|name| self.is_global_promise_name(call.expression, name))
            }),
            syntax_kind_ext::CONDITIONAL_EXPRESSION => {
                self.arena.get_conditional_expr(node).is_some_and(|cond| {
                    self.is_promise_like(cond.when_true) && self.is_promise_like(cond.when_false)
                })
            }
            syntax_kind_ext::BINARY_EXPRESSION => self.arena.get_binary_expr(node).is_some_and(|bin| {
                bin.operator_token == SyntaxKind::CommaToken as u16
                    && self.is_promise_like(bin.right)
            }),
            k if k == SyntaxKind::Identifier as u16 => self.identifier_is_promise(idx),
            _ => false,
        }
    }

    fn call_returns_promise(&self, node: &Node) -> bool {
        let Some(call) = self.arena.get_call_expr(node) else {
            return false;
        };
        let callee = skip_parentheses(self.arena, call.expression);
        let Some(callee_node) = self.arena.get(callee) else {
            return false;
        };

        if callee_node.kind == syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION {
            let Some(access) = self.arena.get_access_expr(callee_node) else {
                return false;
            };
            let Some(name) = self.arena.identifier_text(access.name_or_argument) else {
                return false;
            };
            if matches!(name, "then" | "catch" | "finally") {
                return self.is_promise_like(access.expression);
            }
            if PROMISE_STATICS.contains(&name)
                && let Some(receiver) = self.arena.identifier_text(access.expression)
                && self.is_global_promise_name(access.expression, receiver)
            {
                return true;
            }
            if self.options.is_promise_member(name) {
                return true;
            }
            if self
                .arena
                .get(access.expression)
                .is_some_and(|n| n.kind == SyntaxKind::ThisKeyword as u16)
            {
                return self.this_member_returns_promise(callee, name);
            }
            return false;
        }

        self.callee_returns_promise(callee)
    }

    /// A promise type name that no local declaration shadows.
    fn is_global_promise_name(&self, ident: NodeIndex, name: &str) -> bool {
        self.options.is_promise_type_name(name) && self.binder.get_node_symbol(ident).is_none()
    }

    fn callee_returns_promise(&self, callee: NodeIndex) -> bool {
        let Some(node) = self.arena.get(callee) else {
            return false;
        };
        if node.is_function_expression_or_arrow() {
            return self.function_returns_promise(callee);
        }
        let Some(name) = self.arena.identifier_text(callee) else {
            return false;
        };
        match self.binder.symbol_of_node(callee) {
            Some(symbol) => self.declaration_returns_promise(symbol.declaration),
            None => self.options.is_promise_global(name),
        }
    }

    /// Calling the binding declared by `decl` returns a promise.
    fn declaration_returns_promise(&self, decl: NodeIndex) -> bool {
        let Some(node) = self.arena.get(decl) else {
            return false;
        };
        match node.kind {
            syntax_kind_ext::FUNCTION_DECLARATION => self.function_returns_promise(decl),
            syntax_kind_ext::VARIABLE_DECLARATION => {
                let Some(var) = self.arena.get_variable_declaration(node) else {
                    return false;
                };
                if let Some(text) = self.type_text(var.type_annotation) {
                    return returns_promise_type_text(text, self.options);
                }
                let init = skip_parentheses(self.arena, var.initializer);
                self.guarded(decl, |this| this.callee_returns_promise(init))
            }
            syntax_kind_ext::PARAMETER => self
                .arena
                .get_parameter(node)
                .and_then(|param| self.type_text(param.type_annotation))
                .is_some_and(|text| returns_promise_type_text(text, self.options)),
            _ => false,
        }
    }

    /// `this.name(...)` inside a class whose member `name` returns a promise.
    fn this_member_returns_promise(&self, from: NodeIndex, name: &str) -> bool {
        let mut current = self.arena.parent_of(from);
        // `this` is rebound by every non-arrow function; the first one up
        // the tree must be a class member.
        while let Some(node) = self.arena.get(current) {
            if node.is_class_like() {
                break;
            }
            if node.is_function_like() && node.kind != syntax_kind_ext::ARROW_FUNCTION {
                current = self.arena.parent_of(current);
                break;
            }
            current = self.arena.parent_of(current);
        }
        let Some(class_node) = self.arena.get(current) else {
            return false;
        };
        let Some(class) = self.arena.get_class(class_node) else {
            return false;
        };

        for &member_idx in &class.members.nodes {
            let Some(member) = self.arena.get(member_idx) else {
                continue;
            };
            match member.kind {
                syntax_kind_ext::METHOD_DECLARATION => {
                    if let Some(func) = self.arena.get_function(member)
                        && self.arena.identifier_text(func.name) == Some(name)
                    {
                        return self.function_returns_promise(member_idx);
                    }
                }
                syntax_kind_ext::PROPERTY_DECLARATION => {
                    if let Some(prop) = self.arena.get_property_decl(member)
                        && self.arena.identifier_text(prop.name) == Some(name)
                    {
                        if let Some(text) = self.type_text(prop.type_annotation) {
                            return returns_promise_type_text(text, self.options);
                        }
                        return self.callee_returns_promise(skip_parentheses(
                            self.arena,
                            prop.initializer,
                        ));
                    }
                }
                _ => {}
            }
        }
        false
    }

    fn identifier_is_promise(&self, idx: NodeIndex) -> bool {
        let Some(symbol) = self.binder.symbol_of_node(idx) else {
            return false;
        };
        let Some(decl) = self.arena.get(symbol.declaration) else {
            return false;
        };
        match decl.kind {
            syntax_kind_ext::VARIABLE_DECLARATION => {
                let Some(var) = self.arena.get_variable_declaration(decl) else {
                    return false;
                };
                // Names bound by a destructuring pattern carry no type here.
                if var.name != symbol.name_node {
                    return false;
                }
                if var.type_annotation.is_some() {
                    return self.is_promise_type(var.type_annotation);
                }
                var.initializer.is_some() && self.is_promise_like(var.initializer)
            }
            syntax_kind_ext::PARAMETER => self
                .arena
                .get_parameter(decl)
                .is_some_and(|param| self.is_promise_type(param.type_annotation)),
            _ => false,
        }
    }

    fn first_param_name_of_function(&self, func_idx: NodeIndex) -> Option<String> {
        let node = self.arena.get(func_idx)?;
        let func = self.arena.get_function(node)?;
        let param_idx = func.parameters.first()?;
        let param_node = self.arena.get(param_idx)?;
        let param = self.arena.get_parameter(param_node)?;
        self.arena.identifier_text(param.name).map(str::to_string)
    }
}

impl TypeOracle for PromiseTypeOracle<'_> {
    fn is_promise_like(&self, expr: NodeIndex) -> bool {
        let result = self.guarded(expr, |this| this.promise_like_worker(expr));
        trace!(node = expr.0, result, "is_promise_like");
        result
    }

    fn resolve_symbol(&self, identifier: NodeIndex) -> Option<SymbolId> {
        self.binder.get_node_symbol(identifier)
    }

    fn signature_first_param_name(&self, expr: NodeIndex) -> Option<String> {
        let expr = skip_parentheses(self.arena, expr);
        let node = self.arena.get(expr)?;
        if node.is_function_like() {
            return self.first_param_name_of_function(expr);
        }

        let symbol = self.binder.symbol_of_node(expr)?;
        let decl = self.arena.get(symbol.declaration)?;
        match decl.kind {
            syntax_kind_ext::FUNCTION_DECLARATION => {
                self.first_param_name_of_function(symbol.declaration)
            }
            syntax_kind_ext::VARIABLE_DECLARATION => {
                let var = self.arena.get_variable_declaration(decl)?;
                let init = skip_parentheses(self.arena, var.initializer);
                if self.arena.get(init)?.is_function_expression_or_arrow() {
                    self.first_param_name_of_function(init)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

// =============================================================================
// Type text helpers
// =============================================================================

/// True when `text` is a promise type reference such as `Promise<T>` or
/// `PromiseLike<T>`, optionally parenthesized. Unions and arrays are not.
pub fn is_promise_type_text(text: &str, options: &OracleOptions) -> bool {
    let text = strip_outer_parens(text.trim());
    let (name, args) = match text.find('<') {
        Some(open) => (&text[..open], &text[open..]),
        None => (text, ""),
    };
    if !options.is_promise_type_name(name.trim()) {
        return false;
    }
    args.is_empty() || closing_angle(args) == Some(args.len() - 1)
}

/// True when `text` is a function type whose return type is a promise.
pub fn returns_promise_type_text(text: &str, options: &OracleOptions) -> bool {
    let text = strip_outer_parens(text.trim());
    match top_level_arrow(text) {
        Some(arrow) => is_promise_type_text(&text[arrow + 2..], options),
        None => false,
    }
}

fn strip_outer_parens(mut text: &str) -> &str {
    while text.starts_with('(') && matching_close(text) == Some(text.len() - 1) {
        text = text[1..text.len() - 1].trim();
    }
    text
}

/// Index of the bracket closing the one `text` starts with.
fn matching_close(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the `>` closing the `<` that `text` starts with. Arrow `=>`
/// inside the arguments does not count.
fn closing_angle(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'=' => {}
            b'>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte index of the first `=>` not nested in brackets.
fn top_level_arrow(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'>' if i > 0 && bytes[i - 1] == b'=' => {
                if depth == 0 {
                    return Some(i - 1);
                }
            }
            b'>' => depth -= 1,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[path = "tests/promise_oracle_tests.rs"]
mod tests;
