//! Split-chain gluing.
//!
//! `const p = f().then(a); return p.then(b);` is one chain written across
//! two statements. The gluer substitutes the stored value back in for the
//! variable, producing a single `f().then(a).then(b)` tree in the cloned
//! arena, and remembers that both statements are replaced together.
//! Reassignments (`p = p.then(a);`) glue the same way, and a chain stored
//! right before `return p;` keeps `p` as the binding of its final value.

use super::chain_recognizer::{RootKind, RootStatement, chain_leaf, definition_of};
use asyncify_binder::{BinderState, SymbolId};
use asyncify_checker::TypeOracle;
use asyncify_parser::node::{AccessExprData, CallExprData, ParenthesizedData};
use asyncify_parser::{NodeArena, NodeIndex, syntax_kind_ext};
use asyncify_scanner::SyntaxKind;
use rustc_hash::FxHashSet;
use tracing::trace;

/// Statements that convert as one chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainGroup {
    /// Contiguous statements in source order; the last one is the root.
    pub statements: Vec<NodeIndex>,
    /// The glued chain expression.
    pub chain: NodeIndex,
    pub kind: RootKind,
    /// Variable the chain's value is stored in before the root returns it.
    pub result: Option<SymbolId>,
}

impl ChainGroup {
    pub fn root(&self) -> NodeIndex {
        self.statements.last().copied().unwrap_or(NodeIndex::NONE)
    }

    pub fn first(&self) -> NodeIndex {
        self.statements.first().copied().unwrap_or(NodeIndex::NONE)
    }
}

pub struct ChainGluer<'a> {
    binder: &'a BinderState,
    oracle: &'a dyn TypeOracle,
}

impl<'a> ChainGluer<'a> {
    pub fn new(binder: &'a BinderState, oracle: &'a dyn TypeOracle) -> ChainGluer<'a> {
        ChainGluer { binder, oracle }
    }

    /// Group every root with the statements that feed it. Roots are
    /// processed in order and never share a statement. A `return v;` root
    /// whose chain could not be glued is dropped.
    pub fn glue(&self, arena: &mut NodeArena, roots: &[RootStatement]) -> Vec<ChainGroup> {
        let mut groups: Vec<ChainGroup> = Vec::with_capacity(roots.len());
        for root in roots {
            let claimed_until = groups.last().map(ChainGroup::root);
            let group = self.glue_root(arena, root, claimed_until);
            if root.kind == RootKind::ReturnBinding && group.statements.len() < 2 {
                trace!(statement = root.node.0, "returned variable holds no glued chain");
                continue;
            }
            groups.push(group);
        }
        groups
    }

    fn glue_root(
        &self,
        arena: &mut NodeArena,
        root: &RootStatement,
        claimed_until: Option<NodeIndex>,
    ) -> ChainGroup {
        let mut group = ChainGroup {
            statements: vec![root.node],
            chain: root.expression,
            kind: root.kind,
            result: None,
        };
        if root.kind == RootKind::ArrowBody {
            return group;
        }

        // References the glued statements replace or keep reading.
        let mut accounted: FxHashSet<NodeIndex> = FxHashSet::default();
        if root.kind == RootKind::ReturnBinding {
            let Some(symbol) = self.binder.get_node_symbol(root.expression) else {
                return group;
            };
            group.result = Some(symbol);
            accounted.insert(root.expression);
        }

        let parent = arena.parent_of(root.node);
        let Some(siblings) = arena.get_statements(parent).map(|list| list.nodes.clone()) else {
            return group;
        };
        let Some(mut position) = siblings.iter().position(|&stmt| stmt == root.node) else {
            return group;
        };

        while position > 0 {
            let previous = siblings[position - 1];
            if Some(previous) == claimed_until {
                break;
            }
            let Some(definition) = definition_of(arena, previous) else {
                break;
            };
            let Some(symbol) = self.binder.get_node_symbol(definition.target) else {
                break;
            };
            let leaf = chain_leaf(arena, self.oracle, group.chain);
            let leaf_is_identifier = arena
                .get(leaf)
                .is_some_and(|n| n.kind == SyntaxKind::Identifier as u16);
            let leaf_original = arena.original_of(leaf);
            if !leaf_is_identifier || self.binder.get_node_symbol(leaf_original) != Some(symbol) {
                break;
            }
            if !self.oracle.is_promise_like(arena.original_of(definition.value)) {
                break;
            }

            let mut pending = accounted.clone();
            pending.insert(leaf_original);
            if !definition.declares {
                pending.insert(definition.target);
            }
            let next_leaf = arena.original_of(chain_leaf(arena, self.oracle, definition.value));
            if !self.references_settled(arena, symbol, previous, &pending, next_leaf) {
                break;
            }

            trace!(statement = previous.0, "glue split chain");
            group.chain = substitute_leaf(arena, group.chain, leaf, definition.value);
            group.statements.insert(0, previous);
            accounted = pending;
            position -= 1;
        }
        group
    }

    /// True when every reference to `symbol` from `from` onwards is one the
    /// group replaces, or `next_leaf`, which keeps reading the variable's
    /// earlier value.
    fn references_settled(
        &self,
        arena: &NodeArena,
        symbol: SymbolId,
        from: NodeIndex,
        accounted: &FxHashSet<NodeIndex>,
        next_leaf: NodeIndex,
    ) -> bool {
        let start = arena.get(from).map_or(0, |n| n.pos);
        self.binder.references_of(symbol).iter().all(|&reference| {
            let later = arena.get(reference).is_some_and(|n| n.pos >= start);
            !later || reference == next_leaf || accounted.contains(&reference)
        })
    }
}

/// Rebuild the spine from `node` down to `leaf`, putting `replacement` in
/// the leaf's place. New nodes record the node they were derived from.
fn substitute_leaf(
    arena: &mut NodeArena,
    node: NodeIndex,
    leaf: NodeIndex,
    replacement: NodeIndex,
) -> NodeIndex {
    if node == leaf {
        return replacement;
    }
    let Some(&source) = arena.get(node) else {
        return node;
    };

    let rebuilt = match source.kind {
        syntax_kind_ext::PARENTHESIZED_EXPRESSION => {
            let Some(inner) = arena.get_parenthesized(&source).map(|p| p.expression) else {
                return node;
            };
            let expression = substitute_leaf(arena, inner, leaf, replacement);
            arena.add_parenthesized(
                source.kind,
                source.pos,
                source.end,
                ParenthesizedData { expression },
            )
        }
        syntax_kind_ext::CALL_EXPRESSION => {
            let Some(call) = arena.get_call_expr(&source).cloned() else {
                return node;
            };
            let expression = substitute_leaf(arena, call.expression, leaf, replacement);
            arena.add_call_expr(
                source.kind,
                source.pos,
                source.end,
                CallExprData {
                    expression,
                    ..call
                },
            )
        }
        syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION => {
            let Some(access) = arena.get_access_expr(&source).cloned() else {
                return node;
            };
            let expression = substitute_leaf(arena, access.expression, leaf, replacement);
            arena.add_access_expr(
                source.kind,
                source.pos,
                source.end,
                AccessExprData {
                    expression,
                    ..access
                },
            )
        }
        _ => return node,
    };
    arena.set_flags(rebuilt, u32::from(source.flags));
    arena.set_original(rebuilt, node);
    rebuilt
}

#[cfg(test)]
#[path = "tests/chain_gluer_tests.rs"]
mod tests;
