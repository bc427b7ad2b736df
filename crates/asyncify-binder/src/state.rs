//! Binder state and the queries later phases run against it.

use crate::{ContainerKind, Scope, ScopeId, Symbol, SymbolArena, SymbolId, SymbolTable};
use asyncify_parser::{NodeArena, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, debug_span};

pub struct BinderState {
    pub symbols: SymbolArena,
    pub scopes: Vec<Scope>,
    /// Identifier node (declaration name or resolved reference) to symbol.
    pub node_symbols: FxHashMap<u32, SymbolId>,
    /// Scope-creating node to its scope.
    pub node_scope_ids: FxHashMap<u32, ScopeId>,
    /// Resolved references per symbol, in source order. Declaration names
    /// are not references.
    pub symbol_references: FxHashMap<SymbolId, Vec<NodeIndex>>,
    /// Identifier references that resolved to no declaration.
    pub unresolved: Vec<NodeIndex>,
    pub(crate) unresolved_nodes: FxHashSet<u32>,
    pub(crate) unresolved_names: FxHashSet<String>,
    pub(crate) current_scope: ScopeId,
}

impl Default for BinderState {
    fn default() -> Self {
        BinderState::new()
    }
}

impl BinderState {
    pub fn new() -> BinderState {
        BinderState {
            symbols: SymbolArena::new(),
            scopes: Vec::new(),
            node_symbols: FxHashMap::default(),
            node_scope_ids: FxHashMap::default(),
            symbol_references: FxHashMap::default(),
            unresolved: Vec::new(),
            unresolved_nodes: FxHashSet::default(),
            unresolved_names: FxHashSet::default(),
            current_scope: ScopeId::NONE,
        }
    }

    /// Bind a whole source file: declare every binding, then resolve every
    /// reference.
    pub fn bind_source_file(&mut self, arena: &NodeArena, root: NodeIndex) {
        let _span = debug_span!("bind_source_file", root = root.0).entered();

        self.current_scope = ScopeId::NONE;
        self.declare_node(arena, root);

        self.current_scope = ScopeId::NONE;
        self.resolve_node(arena, root);

        debug!(
            symbols = self.symbols.len(),
            scopes = self.scopes.len(),
            unresolved = self.unresolved.len(),
            "bound source file"
        );
    }

    // =========================================================================
    // Scope bookkeeping
    // =========================================================================

    pub(crate) fn enter_scope(&mut self, kind: ContainerKind, node: NodeIndex) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: self.current_scope,
            kind,
            container_node: node,
            table: SymbolTable::new(),
        });
        self.node_scope_ids.insert(node.0, id);
        self.current_scope = id;
        id
    }

    pub(crate) fn exit_scope(&mut self, previous: ScopeId) {
        self.current_scope = previous;
    }

    /// Nearest enclosing function (or source file) scope.
    pub(crate) fn function_scope_of(&self, mut scope: ScopeId) -> ScopeId {
        while let Some(s) = self.scopes.get(scope.0 as usize) {
            if s.is_function_scope() {
                return scope;
            }
            scope = s.parent;
        }
        scope
    }

    /// Declare `name` in `scope`. A redeclaration in the same scope reuses
    /// the first symbol.
    pub(crate) fn declare_symbol(
        &mut self,
        scope: ScopeId,
        name: &str,
        flags: u32,
        name_node: NodeIndex,
        declaration: NodeIndex,
    ) -> SymbolId {
        let existing = self
            .scopes
            .get(scope.0 as usize)
            .and_then(|s| s.table.get(name));
        let id = match existing {
            Some(id) => id,
            None => {
                let id = self
                    .symbols
                    .alloc(flags, name.to_string(), name_node, declaration, scope);
                if let Some(s) = self.scopes.get_mut(scope.0 as usize) {
                    s.table.set(name.to_string(), id);
                }
                id
            }
        };
        self.node_symbols.insert(name_node.0, id);
        id
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Resolve `name` starting from `scope`, walking outwards.
    pub fn resolve_name(&self, name: &str, mut scope: ScopeId) -> Option<SymbolId> {
        while let Some(s) = self.scopes.get(scope.0 as usize) {
            if let Some(id) = s.table.get(name) {
                return Some(id);
            }
            scope = s.parent;
        }
        None
    }

    #[inline]
    pub fn get_node_symbol(&self, node: NodeIndex) -> Option<SymbolId> {
        self.node_symbols.get(&node.0).copied()
    }

    #[inline]
    pub fn get_symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    /// Symbol an identifier node declares or refers to.
    pub fn symbol_of_node(&self, node: NodeIndex) -> Option<&Symbol> {
        self.get_node_symbol(node).and_then(|id| self.symbols.get(id))
    }

    pub fn references_of(&self, id: SymbolId) -> &[NodeIndex] {
        self.symbol_references
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True when `node` is an identifier reference that resolved to nothing.
    pub fn is_unresolved(&self, node: NodeIndex) -> bool {
        self.unresolved_nodes.contains(&node.0)
    }

    /// True when some reference in the file uses `name` without a
    /// declaration in scope.
    pub fn has_unresolved_name(&self, name: &str) -> bool {
        self.unresolved_names.contains(name)
    }

    pub fn scope_of_node(&self, node: NodeIndex) -> Option<ScopeId> {
        self.node_scope_ids.get(&node.0).copied()
    }

    pub fn get_scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    /// Symbols whose declaring name lies inside `[pos, end)`.
    pub fn symbols_declared_in(&self, arena: &NodeArena, pos: u32, end: u32) -> Vec<SymbolId> {
        self.symbols
            .iter()
            .filter(|sym| {
                arena
                    .get(sym.name_node)
                    .is_some_and(|n| n.pos >= pos && n.end <= end)
            })
            .map(|sym| sym.id)
            .collect()
    }
}
