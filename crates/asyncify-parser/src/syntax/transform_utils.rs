//! Transform utilities for syntax analysis.

use crate::parser::{NodeArena, NodeIndex, NodeAccess, syntax_kind_ext};
use asyncify_scanner::SyntaxKind;

/// Strip any number of enclosing parentheses.
#[must_use]
pub fn skip_parentheses(arena: &NodeArena, mut node_idx: NodeIndex) -> NodeIndex {
    while let Some(node) = arena.get(node_idx) {
        let Some(paren) = arena.get_parenthesized(node) else {
            break;
        };
        node_idx = paren.expression;
    }
    node_idx
}

/// Strip parentheses, `as`/`satisfies` assertions and non-null assertions.
#[must_use]
pub fn skip_outer_expressions(arena: &NodeArena, mut node_idx: NodeIndex) -> NodeIndex {
    loop {
        let Some(node) = arena.get(node_idx) else {
            return node_idx;
        };
        node_idx = if let Some(paren) = arena.get_parenthesized(node) {
            paren.expression
        } else if let Some(assertion) = arena.get_type_assertion(node) {
            assertion.expression
        } else if node.kind == syntax_kind_ext::NON_NULL_EXPRESSION
            && let Some(inner) = arena.get_unary_expr_ex(node)
        {
            inner.expression
        } else {
            return node_idx;
        };
    }
}

/// Expressions that can be dropped when their value is unused.
#[must_use]
pub fn is_side_effect_free(arena: &NodeArena, node_idx: NodeIndex) -> bool {
    let node_idx = skip_parentheses(arena, node_idx);
    let Some(node) = arena.get(node_idx) else {
        return true;
    };
    node.kind == SyntaxKind::Identifier as u16
        || node.kind == SyntaxKind::ThisKeyword as u16
        || node.kind == SyntaxKind::NullKeyword as u16
        || node.kind == SyntaxKind::TrueKeyword as u16
        || node.kind == SyntaxKind::FalseKeyword as u16
        || node.kind == SyntaxKind::StringLiteral as u16
        || node.kind == SyntaxKind::NumericLiteral as u16
        || node.kind == SyntaxKind::BigIntLiteral as u16
        || node.kind == SyntaxKind::NoSubstitutionTemplateLiteral as u16
}

/// Check if an AST node contains a reference to `this` or `super`.
///
/// Regular functions and classes bind their own `this`, so they are not
/// searched; arrow functions are.
#[must_use]
pub fn contains_this_reference(arena: &NodeArena, node_idx: NodeIndex) -> bool {
    let Some(node) = arena.get(node_idx) else {
        return false;
    };
    if node.kind == SyntaxKind::ThisKeyword as u16 || node.kind == SyntaxKind::SuperKeyword as u16
    {
        return true;
    }
    if (node.is_function_like() && node.kind != syntax_kind_ext::ARROW_FUNCTION)
        || node.is_class_like()
    {
        return false;
    }
    arena
        .get_children(node_idx)
        .into_iter()
        .any(|child| contains_this_reference(arena, child))
}

/// Visit `root` and its descendants in source order without entering
/// nested function-like nodes or classes. The visitor returns `false` to
/// skip a node's children.
pub fn visit_function_scope(
    arena: &NodeArena,
    root: NodeIndex,
    visitor: &mut dyn FnMut(NodeIndex) -> bool,
) {
    let mut stack = vec![root];
    while let Some(node_idx) = stack.pop() {
        let Some(node) = arena.get(node_idx) else {
            continue;
        };
        if node_idx != root && (node.is_function_like() || node.is_class_like()) {
            continue;
        }
        if !visitor(node_idx) {
            continue;
        }
        let children = arena.get_children(node_idx);
        stack.extend(children.into_iter().rev());
    }
}
