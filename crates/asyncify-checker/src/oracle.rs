//! The query surface the converter consumes.

use asyncify_binder::SymbolId;
use asyncify_parser::NodeIndex;

/// Pure type queries over one bound source file.
///
/// Every index passed in refers to the arena the oracle was built over.
/// Nodes the converter synthesizes must be mapped back with
/// `NodeArena::original_of` first.
pub trait TypeOracle {
    /// True when `expr` evaluates to a promise or promise-like value.
    fn is_promise_like(&self, expr: NodeIndex) -> bool;

    /// The binding an identifier declares or refers to.
    fn resolve_symbol(&self, identifier: NodeIndex) -> Option<SymbolId>;

    /// Declared name of the first parameter of a callable expression or of
    /// the function an identifier names. `None` when the first parameter is
    /// missing or is a binding pattern.
    fn signature_first_param_name(&self, expr: NodeIndex) -> Option<String>;
}
