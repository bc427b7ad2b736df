//! Chain-to-statements rewriting.
//!
//! A pattern dispatch over chain links. Each call gets the link to convert,
//! the binding (if any) its value must be written to, and the terminal sink
//! the outermost link hands its value to. Whether a link's value flows on
//! to a later handler is read from the has-successor map, never re-derived.
//!
//! The rewriter is total: a link it cannot convert is kept as one awaited
//! expression, with any names it reserved and any returns it patched
//! rolled back.

use super::chain_recognizer::{
    Callback, ChainLink, HasSuccessorMap, classify, classify_callback, is_chain_root,
};
use super::identifier_synthesizer::{
    SynthKey, SynthTable, Unsupported, fulfillment_binding, rejection_binding,
};
use asyncify_binder::BinderState;
use asyncify_checker::TypeOracle;
use asyncify_common::limits::{MAX_CALLBACK_NESTING, MAX_CHAIN_LINKS};
use asyncify_parser::node::{
    BinaryExprData, BlockData, CallExprData, CatchClauseData, ExprStatementData, IdentifierData,
    ReturnData, TryData, UnaryExprDataEx, VariableData, VariableDeclarationData,
};
use asyncify_parser::syntax::{
    contains_this_reference, is_side_effect_free, skip_parentheses, visit_function_scope,
};
use asyncify_parser::{NodeArena, NodeIndex, NodeList, node_flags, syntax_kind_ext};
use asyncify_scanner::SyntaxKind;
use tracing::trace;

/// Where a link's value goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sink {
    /// Out of the converted function.
    Return,
    /// Into a binding a later handler reads.
    Bind(SynthKey),
    /// Nowhere; only the side effects matter.
    Discard,
}

/// Statements produced for one root chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootRewrite {
    pub statements: Vec<NodeIndex>,
    /// The outermost link could not be converted and was kept as written.
    pub verbatim: bool,
}

pub struct Rewriter<'a> {
    arena: &'a mut NodeArena,
    oracle: &'a dyn TypeOracle,
    binder: &'a BinderState,
    names: &'a mut SynthTable,
    successors: &'a mut HasSuccessorMap,
    in_try: bool,
    depth: u32,
    nesting: u32,
    /// Return statements whose expression was wrapped in `await`, with the
    /// expression they held before.
    patched_returns: Vec<(NodeIndex, NodeIndex)>,
}

impl<'a> Rewriter<'a> {
    pub fn new(
        arena: &'a mut NodeArena,
        oracle: &'a dyn TypeOracle,
        binder: &'a BinderState,
        names: &'a mut SynthTable,
        successors: &'a mut HasSuccessorMap,
    ) -> Rewriter<'a> {
        Rewriter {
            arena,
            oracle,
            binder,
            names,
            successors,
            in_try: false,
            depth: 0,
            nesting: 0,
            patched_returns: Vec::new(),
        }
    }

    /// The chain already sits in a user `try` block, so returned promises
    /// must be awaited for the `catch` to observe their rejection.
    pub fn inside_try(mut self, in_try: bool) -> Self {
        self.in_try = in_try;
        self
    }

    /// Rewrite one glued chain whose links are already in the
    /// has-successor map.
    pub fn rewrite_root(&mut self, chain: NodeIndex, terminal: Sink) -> RootRewrite {
        let snapshot = self.names.clone();
        let patch_mark = self.patched_returns.len();
        match self.try_rewrite(chain, None, terminal) {
            Ok(statements) => RootRewrite {
                statements,
                verbatim: false,
            },
            Err(Unsupported) => {
                *self.names = snapshot;
                self.unpatch_returns(patch_mark);
                RootRewrite {
                    statements: self.verbatim(chain, None, terminal),
                    verbatim: true,
                }
            }
        }
    }

    /// Rewrite `node`, keeping it as written when it cannot be converted.
    #[tracing::instrument(level = "trace", skip(self))]
    fn rewrite(
        &mut self,
        node: NodeIndex,
        prev_arg: Option<SynthKey>,
        terminal: Sink,
    ) -> Vec<NodeIndex> {
        let snapshot = self.names.clone();
        let patch_mark = self.patched_returns.len();
        match self.try_rewrite(node, prev_arg, terminal) {
            Ok(statements) => statements,
            Err(Unsupported) => {
                *self.names = snapshot;
                self.unpatch_returns(patch_mark);
                self.verbatim(node, prev_arg, terminal)
            }
        }
    }

    fn verbatim(
        &mut self,
        node: NodeIndex,
        prev_arg: Option<SynthKey>,
        terminal: Sink,
    ) -> Vec<NodeIndex> {
        let node = skip_parentheses(self.arena, node);
        trace!(node = node.0, "keep link as written");
        let sink = self.sink_for(node, prev_arg, terminal);
        self.write_value(node, sink, true)
    }

    fn try_rewrite(
        &mut self,
        node: NodeIndex,
        prev_arg: Option<SynthKey>,
        terminal: Sink,
    ) -> Result<Vec<NodeIndex>, Unsupported> {
        if self.depth >= MAX_CHAIN_LINKS {
            return Err(Unsupported);
        }
        self.depth += 1;
        let result = self.dispatch(node, prev_arg, terminal);
        self.depth -= 1;
        result
    }

    fn dispatch(
        &mut self,
        node: NodeIndex,
        prev_arg: Option<SynthKey>,
        terminal: Sink,
    ) -> Result<Vec<NodeIndex>, Unsupported> {
        let node = skip_parentheses(self.arena, node);
        match classify(self.arena, self.oracle, node) {
            ChainLink::ThenCall {
                callee,
                on_fulfilled,
                on_rejected,
                ..
            } => self.rewrite_then(node, callee, on_fulfilled, on_rejected, prev_arg, terminal),
            ChainLink::CatchCall {
                callee,
                on_rejected,
                ..
            } => {
                let handler = classify_callback(self.arena, self.oracle, on_rejected);
                let sink = self.sink_for(node, prev_arg, terminal);
                self.rewrite_catch(callee, handler, prev_arg, terminal, sink)
            }
            ChainLink::PropertyChain { receiver } => Ok(self.rewrite(receiver, prev_arg, terminal)),
            ChainLink::FinallyCall { .. } => Err(Unsupported),
            ChainLink::PromiseProducingCall => {
                let sink = self.sink_for(node, prev_arg, terminal);
                Ok(self.write_value(node, sink, true))
            }
            ChainLink::Other => {
                let sink = self.sink_for(node, prev_arg, terminal);
                Ok(self.write_value(node, sink, false))
            }
        }
    }

    fn sink_for(&self, node: NodeIndex, prev_arg: Option<SynthKey>, terminal: Sink) -> Sink {
        if self.successors.has_successor(node) {
            prev_arg.map_or(Sink::Discard, Sink::Bind)
        } else {
            terminal
        }
    }

    // =========================================================================
    // Links
    // =========================================================================

    fn rewrite_then(
        &mut self,
        node: NodeIndex,
        callee: NodeIndex,
        on_fulfilled: NodeIndex,
        on_rejected: NodeIndex,
        prev_arg: Option<SynthKey>,
        terminal: Sink,
    ) -> Result<Vec<NodeIndex>, Unsupported> {
        let fulfilled = classify_callback(self.arena, self.oracle, on_fulfilled);
        let rejected = classify_callback(self.arena, self.oracle, on_rejected);
        let sink = self.sink_for(node, prev_arg, terminal);

        match (fulfilled, rejected) {
            (Callback::Absent, Callback::Absent) => Ok(self.rewrite(callee, prev_arg, terminal)),
            (Callback::Absent, handler) => {
                self.rewrite_catch(callee, handler, prev_arg, terminal, sink)
            }
            (fulfilled, Callback::Absent) => {
                let arg = fulfillment_binding(self.arena, self.binder, fulfilled)?;
                let mut statements = self.rewrite(callee, arg, terminal);
                statements.extend(self.callback_body(fulfilled, arg, sink)?);
                Ok(statements)
            }
            (fulfilled, rejected) => {
                let arg = fulfillment_binding(self.arena, self.binder, fulfilled)?;
                let catch_key = rejection_binding(self.arena, self.binder, rejected)?;
                let mut statements = self.hoist(sink);
                let try_statements = self.in_try_block(|this| {
                    let mut statements = this.rewrite(callee, arg, terminal);
                    statements.extend(this.callback_body(fulfilled, arg, sink)?);
                    Ok(statements)
                })?;
                let catch_statements = self.callback_body(rejected, Some(catch_key), sink)?;
                statements.push(self.try_statement(try_statements, catch_key, catch_statements));
                Ok(statements)
            }
        }
    }

    fn rewrite_catch(
        &mut self,
        callee: NodeIndex,
        handler: Callback,
        prev_arg: Option<SynthKey>,
        terminal: Sink,
        sink: Sink,
    ) -> Result<Vec<NodeIndex>, Unsupported> {
        let catch_key = rejection_binding(self.arena, self.binder, handler)?;
        let mut statements = self.hoist(sink);
        let try_statements = self.in_try_block(|this| Ok(this.rewrite(callee, prev_arg, terminal)))?;
        let catch_statements = self.callback_body(handler, Some(catch_key), sink)?;
        statements.push(self.try_statement(try_statements, catch_key, catch_statements));
        Ok(statements)
    }

    fn in_try_block<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, Unsupported>,
    ) -> Result<T, Unsupported> {
        let was_in_try = std::mem::replace(&mut self.in_try, true);
        let result = f(self);
        self.in_try = was_in_try;
        result
    }

    /// `let x;` ahead of a `try` whose two branches both write `x`.
    fn hoist(&mut self, sink: Sink) -> Vec<NodeIndex> {
        let Sink::Bind(key) = sink else {
            return Vec::new();
        };
        let Some(name) = self.names.name(key).map(str::to_string) else {
            return Vec::new();
        };
        if self.names.mark_declared(key) {
            return Vec::new();
        }
        vec![self.variable_statement(&name, NodeIndex::NONE, node_flags::LET)]
    }

    // =========================================================================
    // Callback bodies
    // =========================================================================

    fn callback_body(
        &mut self,
        callback: Callback,
        arg: Option<SynthKey>,
        sink: Sink,
    ) -> Result<Vec<NodeIndex>, Unsupported> {
        match callback {
            Callback::Reference(handler) => {
                let args = match arg.and_then(|key| self.names.name(key)).map(str::to_string) {
                    Some(name) => vec![self.identifier(&name)],
                    None => Vec::new(),
                };
                let call = self.call(handler, args);
                Ok(self.write_value(call, sink, true))
            }
            Callback::Literal(func) => self.literal_body(func, sink),
            Callback::Absent | Callback::Unsupported(_) => Err(Unsupported),
        }
    }

    fn literal_body(&mut self, func: NodeIndex, sink: Sink) -> Result<Vec<NodeIndex>, Unsupported> {
        let node = *self.arena.get(func).ok_or(Unsupported)?;
        let data = self.arena.get_function(&node).ok_or(Unsupported)?;
        let body = data.body;
        if data.asterisk_token || data.is_async {
            return Err(Unsupported);
        }
        if node.kind == syntax_kind_ext::FUNCTION_EXPRESSION
            && contains_this_reference(self.arena, body)
        {
            return Err(Unsupported);
        }

        let Some(statements) = self.arena.get_statements(body).map(|list| list.nodes.clone())
        else {
            return self.value_body(body, sink);
        };

        let mut out = Vec::new();
        let mut returned = false;
        for stmt in statements {
            let Some(&stmt_node) = self.arena.get(stmt) else {
                continue;
            };
            match stmt_node.kind {
                syntax_kind_ext::RETURN_STATEMENT => {
                    let expression = self
                        .arena
                        .get_return_statement(&stmt_node)
                        .map_or(NodeIndex::NONE, |r| r.expression);
                    if expression.is_some() {
                        out.extend(self.value_body(expression, sink)?);
                    } else {
                        match sink {
                            Sink::Return => out.push(self.return_statement(NodeIndex::NONE)),
                            Sink::Bind(_) => {
                                let undefined = self.identifier("undefined");
                                out.extend(self.write_value(undefined, sink, false));
                            }
                            Sink::Discard => {}
                        }
                    }
                    returned = true;
                    break;
                }
                syntax_kind_ext::EXPRESSION_STATEMENT
                    if self
                        .arena
                        .get_expression_statement(&stmt_node)
                        .is_some_and(|s| is_chain_root(self.arena, self.oracle, s.expression)) =>
                {
                    let expression = self
                        .arena
                        .get_expression_statement(&stmt_node)
                        .map_or(NodeIndex::NONE, |s| s.expression);
                    out.extend(self.nested_chain(expression, Sink::Discard)?);
                }
                _ => {
                    // A `return` below the top level would leave the
                    // converted function instead of producing a value.
                    if contains_return(self.arena, stmt) {
                        if sink != Sink::Return {
                            return Err(Unsupported);
                        }
                        if self.in_try {
                            self.await_nested_returns(stmt);
                        }
                    }
                    out.push(stmt);
                }
            }
        }

        if !returned && matches!(sink, Sink::Bind(_)) {
            let undefined = self.identifier("undefined");
            out.extend(self.write_value(undefined, sink, false));
        }
        Ok(out)
    }

    /// A handler's produced value: a nested chain is rewritten in place,
    /// anything else is written to the sink.
    fn value_body(&mut self, expr: NodeIndex, sink: Sink) -> Result<Vec<NodeIndex>, Unsupported> {
        if is_chain_root(self.arena, self.oracle, expr) {
            return self.nested_chain(expr, sink);
        }
        let inner = skip_parentheses(self.arena, expr);
        let is_promise = self.oracle.is_promise_like(self.arena.original_of(inner));
        Ok(self.write_value(expr, sink, is_promise))
    }

    /// Inside a `try`, a promise returned from a nested statement must be
    /// awaited there or its rejection skips the `catch`.
    fn await_nested_returns(&mut self, stmt: NodeIndex) {
        let arena = &*self.arena;
        let mut returns = Vec::new();
        visit_function_scope(arena, stmt, &mut |idx| {
            let Some(node) = arena.get(idx) else {
                return false;
            };
            if node.kind == syntax_kind_ext::RETURN_STATEMENT {
                returns.push(idx);
                return false;
            }
            true
        });

        for ret in returns {
            let Some(expression) = self
                .arena
                .get(ret)
                .and_then(|n| self.arena.get_return_statement(n))
                .map(|r| r.expression)
            else {
                continue;
            };
            if expression.is_none() {
                continue;
            }
            let inner = skip_parentheses(self.arena, expression);
            if !self.oracle.is_promise_like(self.arena.original_of(inner)) {
                continue;
            }
            trace!(statement = ret.0, "await nested return");
            let awaited = self.await_expression(expression);
            if let Some(data) = self.arena.get_return_statement_mut(ret) {
                data.expression = awaited;
                self.patched_returns.push((ret, expression));
            }
        }
    }

    fn unpatch_returns(&mut self, mark: usize) {
        while self.patched_returns.len() > mark {
            let Some((ret, expression)) = self.patched_returns.pop() else {
                break;
            };
            if let Some(data) = self.arena.get_return_statement_mut(ret) {
                data.expression = expression;
            }
        }
    }

    fn nested_chain(&mut self, expr: NodeIndex, terminal: Sink) -> Result<Vec<NodeIndex>, Unsupported> {
        if self.nesting >= MAX_CALLBACK_NESTING {
            return Err(Unsupported);
        }
        self.nesting += 1;
        self.successors.mark_chain(self.arena, self.oracle, expr, false);
        let statements = self.rewrite(expr, None, terminal);
        self.nesting -= 1;
        Ok(statements)
    }

    // =========================================================================
    // Sinks
    // =========================================================================

    fn write_value(&mut self, expr: NodeIndex, sink: Sink, is_promise: bool) -> Vec<NodeIndex> {
        match sink {
            Sink::Return => {
                let value = if is_promise && self.in_try {
                    self.await_expression(expr)
                } else {
                    expr
                };
                vec![self.return_statement(value)]
            }
            Sink::Bind(key) => {
                let value = if is_promise {
                    self.await_expression(expr)
                } else {
                    expr
                };
                vec![self.write_binding(key, value)]
            }
            Sink::Discard => {
                if is_promise {
                    let value = self.await_expression(expr);
                    vec![self.expression_statement(value)]
                } else if is_side_effect_free(self.arena, expr) {
                    Vec::new()
                } else {
                    vec![self.expression_statement(expr)]
                }
            }
        }
    }

    /// First write declares (`const`, or `let` when more writes follow);
    /// later writes assign.
    fn write_binding(&mut self, key: SynthKey, value: NodeIndex) -> NodeIndex {
        let Some(entry) = self.names.get(key).cloned() else {
            return self.expression_statement(value);
        };
        let statement = if entry.declared {
            let target = self.identifier(&entry.name);
            let assignment = self.arena.add_binary_expr(
                syntax_kind_ext::BINARY_EXPRESSION,
                0,
                0,
                BinaryExprData {
                    left: target,
                    operator_token: SyntaxKind::EqualsToken as u16,
                    right: value,
                },
            );
            self.expression_statement(assignment)
        } else {
            self.names.mark_declared(key);
            let flags = if entry.remaining_uses > 1 {
                node_flags::LET
            } else {
                node_flags::CONST
            };
            self.variable_statement(&entry.name, value, flags)
        };
        self.names.consume(key);
        statement
    }

    // =========================================================================
    // Node factories
    // =========================================================================

    fn identifier(&mut self, name: &str) -> NodeIndex {
        self.arena.add_identifier(
            SyntaxKind::Identifier as u16,
            0,
            0,
            IdentifierData {
                escaped_text: name.to_string(),
            },
        )
    }

    fn await_expression(&mut self, expression: NodeIndex) -> NodeIndex {
        self.arena.add_unary_expr_ex(
            syntax_kind_ext::AWAIT_EXPRESSION,
            0,
            0,
            UnaryExprDataEx {
                expression,
                asterisk_token: false,
            },
        )
    }

    fn call(&mut self, callee: NodeIndex, args: Vec<NodeIndex>) -> NodeIndex {
        self.arena.add_call_expr(
            syntax_kind_ext::CALL_EXPRESSION,
            0,
            0,
            CallExprData {
                expression: callee,
                type_arguments: NodeIndex::NONE,
                arguments: Some(NodeList::from_nodes(args)),
            },
        )
    }

    fn return_statement(&mut self, expression: NodeIndex) -> NodeIndex {
        self.arena.add_return(
            syntax_kind_ext::RETURN_STATEMENT,
            0,
            0,
            ReturnData { expression },
        )
    }

    fn expression_statement(&mut self, expression: NodeIndex) -> NodeIndex {
        self.arena.add_expr_statement(
            syntax_kind_ext::EXPRESSION_STATEMENT,
            0,
            0,
            ExprStatementData { expression },
        )
    }

    fn variable_declaration(&mut self, name: &str, initializer: NodeIndex) -> NodeIndex {
        let name = self.identifier(name);
        self.arena.add_variable_declaration(
            syntax_kind_ext::VARIABLE_DECLARATION,
            0,
            0,
            VariableDeclarationData {
                name,
                exclamation_token: false,
                type_annotation: NodeIndex::NONE,
                initializer,
            },
        )
    }

    fn variable_statement(&mut self, name: &str, initializer: NodeIndex, flags: u32) -> NodeIndex {
        let declaration = self.variable_declaration(name, initializer);
        self.arena.add_variable_with_flags(
            syntax_kind_ext::VARIABLE_STATEMENT,
            0,
            0,
            VariableData {
                modifiers: None,
                declarations: NodeList::from_nodes(vec![declaration]),
            },
            flags | node_flags::SYNTHESIZED,
        )
    }

    fn block(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        block_of(self.arena, statements)
    }

    fn try_statement(
        &mut self,
        try_statements: Vec<NodeIndex>,
        catch_key: SynthKey,
        catch_statements: Vec<NodeIndex>,
    ) -> NodeIndex {
        let try_block = self.block(try_statements);
        let name = self.names.name(catch_key).map(str::to_string);
        self.names.mark_declared(catch_key);
        let variable_declaration = match name {
            Some(name) => self.variable_declaration(&name, NodeIndex::NONE),
            None => NodeIndex::NONE,
        };
        let block = self.block(catch_statements);
        let catch_clause = self.arena.add_catch_clause(
            syntax_kind_ext::CATCH_CLAUSE,
            0,
            0,
            CatchClauseData {
                variable_declaration,
                block,
            },
        );
        self.arena.add_try(
            syntax_kind_ext::TRY_STATEMENT,
            0,
            0,
            TryData {
                try_block,
                catch_clause,
                finally_block: NodeIndex::NONE,
            },
        )
    }
}

/// True when `stmt` holds a `return` outside any nested function.
fn contains_return(arena: &NodeArena, stmt: NodeIndex) -> bool {
    if arena
        .get(stmt)
        .is_some_and(|n| n.is_function_like() || n.is_class_like())
    {
        return false;
    }
    let mut found = false;
    visit_function_scope(arena, stmt, &mut |idx| {
        if found {
            return false;
        }
        if arena
            .get(idx)
            .is_some_and(|n| n.kind == syntax_kind_ext::RETURN_STATEMENT)
        {
            found = true;
            return false;
        }
        true
    });
    found
}

/// Wrap converted statements in a block, for arrow functions whose
/// expression body was a chain.
pub fn block_of(arena: &mut NodeArena, statements: Vec<NodeIndex>) -> NodeIndex {
    arena.add_block(
        syntax_kind_ext::BLOCK,
        0,
        0,
        BlockData {
            statements: NodeList::from_nodes(statements),
            multi_line: true,
        },
    )
}

#[cfg(test)]
#[path = "tests/rewriter_tests.rs"]
mod tests;
