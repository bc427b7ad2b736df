//! Centralized limits for recursive algorithms.
//!
//! Every recursive walk in the workspace (parser, binder, chain recognizer,
//! rewriter, printer) checks one of these before descending, so that
//! adversarial input degrades into "no edit" rather than a stack overflow.

/// Maximum nesting depth the parser accepts for expressions and statements.
///
/// ```typescript
/// // Deeply nested parentheses or calls:
/// f(f(f(f(f(f(f(f(f(f(/* ... 1000 levels ... */))))))))));
/// ```
pub const MAX_PARSER_RECURSION_DEPTH: u32 = 1_000;

/// Maximum depth for generic AST traversals (binder, identifier collection).
pub const MAX_AST_DEPTH: u32 = 1_000;

/// Maximum number of chain links followed when unwinding a single chain.
///
/// ```typescript
/// p.then(a).then(b).then(c) /* ... */ .then(z);
/// ```
pub const MAX_CHAIN_LINKS: u32 = 500;

/// Maximum nesting of callback bodies that contain their own chains.
///
/// ```typescript
/// return a().then(x => b(x).then(y => c(y).then(z => /* ... */)));
/// ```
pub const MAX_CALLBACK_NESTING: u32 = 64;

/// Maximum numeric suffix tried when making a synthesized name unique.
pub const MAX_NAME_SUFFIX: u32 = 10_000;
