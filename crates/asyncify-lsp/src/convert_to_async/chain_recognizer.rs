//! Promise chain recognition.
//!
//! Classifies the links of a `.then`/`.catch`/`.finally` chain, finds the
//! statements of a function body that hold a convertible chain, and builds
//! the has-successor map that tells the rewriter whether a link's value is
//! consumed by a later fulfillment handler.

use asyncify_checker::TypeOracle;
use asyncify_common::limits::MAX_CHAIN_LINKS;
use asyncify_parser::syntax::{skip_parentheses, visit_function_scope};
use asyncify_parser::{NodeArena, NodeIndex, syntax_kind_ext};
use asyncify_scanner::SyntaxKind;
use rustc_hash::FxHashMap;

/// One node of a promise chain.
///
/// Handler fields are `NodeIndex::NONE` when the argument is missing; an
/// explicit `null` or `undefined` argument is kept and classified as
/// [`Callback::Absent`] by [`classify_callback`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainLink {
    /// `receiver.then(on_fulfilled, on_rejected)`.
    ThenCall {
        callee: NodeIndex,
        receiver: NodeIndex,
        on_fulfilled: NodeIndex,
        on_rejected: NodeIndex,
    },
    /// `receiver.catch(on_rejected)`.
    CatchCall {
        callee: NodeIndex,
        receiver: NodeIndex,
        on_rejected: NodeIndex,
    },
    /// `receiver.finally(...)`, always kept as written.
    FinallyCall { receiver: NodeIndex },
    /// A promise-like expression that is not itself a chain link.
    PromiseProducingCall,
    /// A property access between a link and the value it is called on.
    PropertyChain { receiver: NodeIndex },
    Other,
}

/// Shape of a handler argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Callback {
    /// Missing, `null` or `undefined`.
    Absent,
    /// Arrow function or function expression.
    Literal(NodeIndex),
    /// A function passed by name.
    Reference(NodeIndex),
    /// Anything the rewriter cannot inline (generators, member accesses,
    /// calls returning functions, ...).
    Unsupported(NodeIndex),
}

impl Callback {
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Callback::Absent)
    }
}

/// How a root statement's value leaves the function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootKind {
    /// `return chain;`
    Return,
    /// `chain;`
    Expression,
    /// `() => chain`
    ArrowBody,
    /// `v = chain; return v;`, where the returned variable keeps the
    /// chain's value.
    ReturnBinding,
}

/// A statement (or arrow expression body) whose expression is a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RootStatement {
    pub node: NodeIndex,
    pub expression: NodeIndex,
    pub kind: RootKind,
}

/// `const v = value;` with a single declarator, or `v = value;`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Definition {
    /// The identifier written.
    pub target: NodeIndex,
    pub value: NodeIndex,
    /// A declaration rather than an assignment.
    pub declares: bool,
}

pub fn definition_of(arena: &NodeArena, stmt: NodeIndex) -> Option<Definition> {
    let node = arena.get(stmt)?;
    let definition = match node.kind {
        syntax_kind_ext::VARIABLE_STATEMENT => {
            let var = arena.get_variable(node)?;
            let [declaration] = var.declarations.nodes.as_slice() else {
                return None;
            };
            let decl = arena.get_variable_declaration(arena.get(*declaration)?)?;
            Definition {
                target: decl.name,
                value: decl.initializer,
                declares: true,
            }
        }
        syntax_kind_ext::EXPRESSION_STATEMENT => {
            let expression = arena.get_expression_statement(node)?.expression;
            let expression = skip_parentheses(arena, expression);
            let binary = arena.get_binary_expr(arena.get(expression)?)?;
            if binary.operator_token != SyntaxKind::EqualsToken as u16 {
                return None;
            }
            Definition {
                target: skip_parentheses(arena, binary.left),
                value: binary.right,
                declares: false,
            }
        }
        _ => return None,
    };
    let target_is_identifier = arena
        .get(definition.target)
        .is_some_and(|n| n.kind == SyntaxKind::Identifier as u16);
    (target_is_identifier && definition.value.is_some()).then_some(definition)
}

/// Classify `idx`, which must already have its parentheses skipped.
///
/// Structure is read from `arena`; promise-likeness is asked of the oracle
/// through `original_of`, so nodes synthesized while gluing classify like
/// the source nodes they were derived from.
pub fn classify(arena: &NodeArena, oracle: &dyn TypeOracle, idx: NodeIndex) -> ChainLink {
    let Some(node) = arena.get(idx) else {
        return ChainLink::Other;
    };

    match node.kind {
        syntax_kind_ext::CALL_EXPRESSION => {
            if let Some(link) = classify_method_call(arena, oracle, idx) {
                return link;
            }
        }
        syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION => {
            if !oracle.is_promise_like(arena.original_of(idx))
                && let Some(access) = arena.get_access_expr(node)
            {
                return ChainLink::PropertyChain {
                    receiver: access.expression,
                };
            }
        }
        _ => {}
    }

    if oracle.is_promise_like(arena.original_of(idx)) {
        ChainLink::PromiseProducingCall
    } else {
        ChainLink::Other
    }
}

fn classify_method_call(
    arena: &NodeArena,
    oracle: &dyn TypeOracle,
    idx: NodeIndex,
) -> Option<ChainLink> {
    let node = arena.get(idx)?;
    let call = arena.get_call_expr(node)?;
    let callee = skip_parentheses(arena, call.expression);
    let callee_node = arena.get(callee)?;
    if callee_node.kind != syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION {
        return None;
    }
    let access = arena.get_access_expr(callee_node)?;
    if access.question_dot_token {
        return None;
    }
    let method = arena.identifier_text(access.name_or_argument)?;
    if !matches!(method, "then" | "catch" | "finally") {
        return None;
    }
    if !oracle.is_promise_like(arena.original_of(access.expression)) {
        return None;
    }

    let args: &[NodeIndex] = call
        .arguments
        .as_ref()
        .map_or(&[][..], |list| list.nodes.as_slice());
    let has_spread = args.iter().any(|&arg| {
        arena
            .get(arg)
            .is_some_and(|n| n.kind == syntax_kind_ext::SPREAD_ELEMENT)
    });
    // A link with a shape we cannot rewrite is still a promise.
    if has_spread {
        return Some(ChainLink::PromiseProducingCall);
    }
    let arg = |i: usize| args.get(i).copied().unwrap_or(NodeIndex::NONE);

    let link = match method {
        "then" if args.len() <= 2 => ChainLink::ThenCall {
            callee,
            receiver: access.expression,
            on_fulfilled: arg(0),
            on_rejected: arg(1),
        },
        "catch" if args.len() == 1 => ChainLink::CatchCall {
            callee,
            receiver: access.expression,
            on_rejected: arg(0),
        },
        "finally" => ChainLink::FinallyCall {
            receiver: access.expression,
        },
        _ => ChainLink::PromiseProducingCall,
    };
    Some(link)
}

/// Classify a handler argument.
pub fn classify_callback(arena: &NodeArena, oracle: &dyn TypeOracle, idx: NodeIndex) -> Callback {
    if idx.is_none() {
        return Callback::Absent;
    }
    let idx = skip_parentheses(arena, idx);
    let Some(node) = arena.get(idx) else {
        return Callback::Absent;
    };

    match node.kind {
        k if k == SyntaxKind::NullKeyword as u16 => Callback::Absent,
        syntax_kind_ext::ARROW_FUNCTION | syntax_kind_ext::FUNCTION_EXPRESSION => {
            let is_generator = arena
                .get_function(node)
                .is_some_and(|func| func.asterisk_token);
            if is_generator {
                Callback::Unsupported(idx)
            } else {
                Callback::Literal(idx)
            }
        }
        k if k == SyntaxKind::Identifier as u16 => {
            let is_undefined = arena.identifier_text(idx) == Some("undefined")
                && oracle.resolve_symbol(arena.original_of(idx)).is_none();
            if is_undefined {
                Callback::Absent
            } else {
                Callback::Reference(idx)
            }
        }
        _ => Callback::Unsupported(idx),
    }
}

/// The links of the chain starting at `expr`, outermost first. Every index
/// has its parentheses skipped.
pub fn chain_spine(
    arena: &NodeArena,
    oracle: &dyn TypeOracle,
    expr: NodeIndex,
) -> Vec<(NodeIndex, ChainLink)> {
    let mut spine = Vec::new();
    let mut current = expr;
    for _ in 0..MAX_CHAIN_LINKS {
        let idx = skip_parentheses(arena, current);
        let link = classify(arena, oracle, idx);
        spine.push((idx, link));
        current = match link {
            ChainLink::ThenCall { receiver, .. }
            | ChainLink::CatchCall { receiver, .. }
            | ChainLink::FinallyCall { receiver }
            | ChainLink::PropertyChain { receiver } => receiver,
            ChainLink::PromiseProducingCall | ChainLink::Other => break,
        };
    }
    spine
}

/// True when `expr` itself is a `.then` or `.catch` link. A chain ending
/// in `.finally` is not convertible as a whole.
pub fn is_chain_root(arena: &NodeArena, oracle: &dyn TypeOracle, expr: NodeIndex) -> bool {
    let idx = skip_parentheses(arena, expr);
    matches!(
        classify(arena, oracle, idx),
        ChainLink::ThenCall { .. } | ChainLink::CatchCall { .. }
    )
}

/// The innermost value of the chain starting at `expr`.
pub fn chain_leaf(arena: &NodeArena, oracle: &dyn TypeOracle, expr: NodeIndex) -> NodeIndex {
    chain_spine(arena, oracle, expr)
        .last()
        .map_or(expr, |&(idx, _)| idx)
}

/// Statements of `func` whose expression is a convertible chain, in source
/// order. Nested functions and classes are not searched.
pub fn find_root_statements(
    arena: &NodeArena,
    oracle: &dyn TypeOracle,
    func: NodeIndex,
) -> Vec<RootStatement> {
    let Some(body) = arena
        .get(func)
        .and_then(|node| arena.get_function(node))
        .map(|data| data.body)
    else {
        return Vec::new();
    };
    let Some(body_node) = arena.get(body) else {
        return Vec::new();
    };

    if body_node.kind != syntax_kind_ext::BLOCK {
        if is_chain_root(arena, oracle, body) {
            return vec![RootStatement {
                node: body,
                expression: body,
                kind: RootKind::ArrowBody,
            }];
        }
        return Vec::new();
    }

    let mut roots = Vec::new();
    visit_function_scope(arena, body, &mut |idx| {
        let Some(node) = arena.get(idx) else {
            return false;
        };
        let (expression, kind) = match node.kind {
            syntax_kind_ext::RETURN_STATEMENT => (
                arena.get_return_statement(node).map(|r| r.expression),
                RootKind::Return,
            ),
            syntax_kind_ext::EXPRESSION_STATEMENT => (
                arena.get_expression_statement(node).map(|s| s.expression),
                RootKind::Expression,
            ),
            _ => return true,
        };
        let Some(expression) = expression.filter(|e| e.is_some()) else {
            return false;
        };
        if is_chain_root(arena, oracle, expression) {
            roots.push(RootStatement {
                node: idx,
                expression,
                kind,
            });
        } else if kind == RootKind::Return && returns_chain_result(arena, oracle, idx, expression) {
            roots.push(RootStatement {
                node: idx,
                expression,
                kind: RootKind::ReturnBinding,
            });
        }
        false
    });
    roots
}

/// `return v;` right after a statement that stores a chain in `v`.
fn returns_chain_result(
    arena: &NodeArena,
    oracle: &dyn TypeOracle,
    stmt: NodeIndex,
    expression: NodeIndex,
) -> bool {
    let returned = skip_parentheses(arena, expression);
    if returned != expression
        || !arena
            .get(returned)
            .is_some_and(|n| n.kind == SyntaxKind::Identifier as u16)
    {
        return false;
    }
    let Some(siblings) = arena.get_statements(arena.parent_of(stmt)) else {
        return false;
    };
    let Some(position) = siblings.nodes.iter().position(|&s| s == stmt) else {
        return false;
    };
    let Some(definition) = position
        .checked_sub(1)
        .and_then(|previous| definition_of(arena, siblings.nodes[previous]))
    else {
        return false;
    };
    let symbol = oracle.resolve_symbol(returned);
    symbol.is_some()
        && symbol == oracle.resolve_symbol(definition.target)
        && is_chain_root(arena, oracle, definition.value)
}

/// Chain expressions a callback literal's body hands to the rewriter: its
/// expression body, or the top-level `return` and expression statements
/// of its block body.
pub fn callback_chain_roots(
    arena: &NodeArena,
    oracle: &dyn TypeOracle,
    callback: NodeIndex,
) -> Vec<NodeIndex> {
    let Some(body) = arena
        .get(callback)
        .and_then(|node| arena.get_function(node))
        .map(|data| data.body)
    else {
        return Vec::new();
    };

    let Some(statements) = arena.get_statements(body) else {
        return if is_chain_root(arena, oracle, body) {
            vec![body]
        } else {
            Vec::new()
        };
    };

    statements
        .nodes
        .iter()
        .filter_map(|&stmt| {
            let node = arena.get(stmt)?;
            let expression = match node.kind {
                syntax_kind_ext::RETURN_STATEMENT => arena.get_return_statement(node)?.expression,
                syntax_kind_ext::EXPRESSION_STATEMENT => {
                    arena.get_expression_statement(node)?.expression
                }
                _ => return None,
            };
            (expression.is_some() && is_chain_root(arena, oracle, expression)).then_some(expression)
        })
        .collect()
}

/// True when `stmt` sits inside the `try` block of a `try` statement
/// between it and `func`.
pub fn is_inside_try_block(arena: &NodeArena, stmt: NodeIndex, func: NodeIndex) -> bool {
    let mut child = stmt;
    let mut current = arena.parent_of(stmt);
    while current.is_some() && current != func {
        if let Some(node) = arena.get(current)
            && let Some(try_data) = arena.get_try(node)
            && try_data.try_block == child
        {
            return true;
        }
        child = current;
        current = arena.parent_of(current);
    }
    false
}

/// For every chain link: does its value flow into a later fulfillment
/// handler? Once an entry is `true` it stays `true`.
#[derive(Clone, Debug, Default)]
pub struct HasSuccessorMap {
    entries: FxHashMap<NodeIndex, bool>,
}

impl HasSuccessorMap {
    pub fn new() -> HasSuccessorMap {
        HasSuccessorMap::default()
    }

    /// Record `value` for `node`. Never lowers an existing `true`.
    pub fn raise(&mut self, node: NodeIndex, value: bool) {
        let entry = self.entries.entry(node).or_insert(value);
        *entry |= value;
    }

    pub fn get(&self, node: NodeIndex) -> Option<bool> {
        self.entries.get(&node).copied()
    }

    /// Missing entries count as `false`.
    pub fn has_successor(&self, node: NodeIndex) -> bool {
        self.get(node).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record entries for every link of the chain starting at `expr`.
    /// `consumed` says whether `expr`'s own value feeds a later handler.
    ///
    /// A `.then` with a fulfillment handler consumes its receiver. `.catch`,
    /// `.then(null, onRejected)` and `.then()` pass their receiver's value
    /// through, so the receiver inherits their own flag.
    pub fn mark_chain(
        &mut self,
        arena: &NodeArena,
        oracle: &dyn TypeOracle,
        expr: NodeIndex,
        consumed: bool,
    ) {
        let mut current = expr;
        let mut consumed = consumed;
        for _ in 0..MAX_CHAIN_LINKS {
            let idx = skip_parentheses(arena, current);
            match classify(arena, oracle, idx) {
                ChainLink::ThenCall {
                    receiver,
                    on_fulfilled,
                    ..
                } => {
                    self.raise(idx, consumed);
                    if !classify_callback(arena, oracle, on_fulfilled).is_absent() {
                        consumed = true;
                    }
                    current = receiver;
                }
                ChainLink::CatchCall { receiver, .. } => {
                    self.raise(idx, consumed);
                    current = receiver;
                }
                ChainLink::PropertyChain { receiver } => current = receiver,
                ChainLink::FinallyCall { .. } | ChainLink::PromiseProducingCall => {
                    self.raise(idx, consumed);
                    return;
                }
                ChainLink::Other => return,
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/chain_recognizer_tests.rs"]
mod tests;
