//! Name binder for the asyncify converter.
//!
//! Builds lexical scopes over a parsed `NodeArena`, declares one symbol per
//! binding, and resolves every identifier reference to the symbol it names.
//! Identifiers that resolve to nothing are recorded as unresolved (globals,
//! imports and ambient declarations all land there).

use asyncify_parser::NodeIndex;
use rustc_hash::FxHashMap;
use serde::Serialize;

mod state;
pub use state::BinderState;

mod state_node_binding;
mod state_references;

/// Symbol flags.
pub mod symbol_flags {
    pub const NONE: u32 = 0;
    pub const FUNCTION_SCOPED_VARIABLE: u32 = 1 << 0;
    pub const BLOCK_SCOPED_VARIABLE: u32 = 1 << 1;
    pub const PARAMETER: u32 = 1 << 2;
    pub const FUNCTION: u32 = 1 << 3;
    pub const CLASS: u32 = 1 << 4;
    pub const CATCH_VARIABLE: u32 = 1 << 5;
    /// Declared with `const`.
    pub const CONST: u32 = 1 << 6;

    pub const VARIABLE: u32 = FUNCTION_SCOPED_VARIABLE | BLOCK_SCOPED_VARIABLE;
    pub const VALUE: u32 = VARIABLE | PARAMETER | FUNCTION | CLASS | CATCH_VARIABLE;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub const NONE: SymbolId = SymbolId(u32::MAX);

    #[inline]
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const NONE: ScopeId = ScopeId(u32::MAX);

    #[inline]
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// A declared binding.
#[derive(Clone, Debug, Serialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub flags: u32,
    pub escaped_name: String,
    /// The identifier that introduces the binding.
    pub name_node: NodeIndex,
    /// The declaring node: variable declaration, parameter, binding element,
    /// function or class.
    pub declaration: NodeIndex,
    pub scope: ScopeId,
}

impl Symbol {
    #[inline]
    pub fn has_any_flags(&self, flags: u32) -> bool {
        self.flags & flags != 0
    }
}

#[derive(Clone, Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> SymbolArena {
        SymbolArena::default()
    }

    pub fn alloc(
        &mut self,
        flags: u32,
        escaped_name: String,
        name_node: NodeIndex,
        declaration: NodeIndex,
        scope: ScopeId,
    ) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            flags,
            escaped_name,
            name_node,
            declaration,
            scope,
        });
        id
    }

    #[inline]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}

/// Names declared directly in one scope.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: FxHashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).copied()
    }

    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn set(&mut self, name: String, id: SymbolId) {
        self.symbols.insert(name, id);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ContainerKind {
    SourceFile,
    Function,
    Block,
    Class,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub parent: ScopeId,
    pub kind: ContainerKind,
    pub container_node: NodeIndex,
    pub table: SymbolTable,
}

impl Scope {
    #[inline]
    pub fn is_function_scope(&self) -> bool {
        matches!(self.kind, ContainerKind::SourceFile | ContainerKind::Function)
    }
}
