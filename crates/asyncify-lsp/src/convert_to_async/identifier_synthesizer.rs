//! Names for the bindings a conversion flattens into one function body.
//!
//! Callback parameters and locals become locals of the converted function,
//! so every binding owned by the function or by one of its inlined callbacks
//! gets a name that is unique among them and distinct from every name the
//! body reads from an outer scope. Values that had no binding of their own
//! (the result passed to a named handler, a rejection whose handler takes no
//! parameter) get a minted name.

use super::chain_gluer::ChainGroup;
use super::chain_recognizer::{
    Callback, ChainLink, callback_chain_roots, chain_spine, classify_callback,
};
use asyncify_binder::{BinderState, Symbol, SymbolId};
use asyncify_checker::TypeOracle;
use asyncify_common::limits::{MAX_CALLBACK_NESTING, MAX_NAME_SUFFIX};
use asyncify_parser::node::IdentifierData;
use asyncify_parser::{NodeArena, NodeIndex, syntax_kind_ext};
use asyncify_scanner::SyntaxKind;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

/// Placeholder for a fulfillment value whose handler names no parameter.
const RESULT_NAME: &str = "result";
/// Placeholder for a rejection reason.
const ERROR_NAME: &str = "e";

/// Identity of a synthesized binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SynthKey {
    /// The first parameter of an inlined callback literal.
    Param(SymbolId),
    /// A value with no source binding, keyed by the handler it flows into.
    Minted(NodeIndex),
    /// A variable of the converted function that receives a chain's final
    /// value.
    Variable(SymbolId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynthIdentifier {
    pub name: String,
    /// Writes still expected. The first write declares the binding; `let`
    /// is chosen when more than one write is expected.
    pub remaining_uses: u32,
    pub declared: bool,
}

/// Per-conversion name table. Cheap enough to clone, which is how the
/// rewriter rolls back a link it could not convert.
#[derive(Clone, Debug, Default)]
pub struct SynthTable {
    entries: FxHashMap<SynthKey, SynthIdentifier>,
    taken: FxHashSet<String>,
}

impl SynthTable {
    pub fn new() -> SynthTable {
        SynthTable::default()
    }

    pub fn get(&self, key: SynthKey) -> Option<&SynthIdentifier> {
        self.entries.get(&key)
    }

    pub fn name(&self, key: SynthKey) -> Option<&str> {
        self.entries.get(&key).map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Mark `name` as used without reserving a variant of it.
    pub fn pin(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    /// Reserve `base`, or `base_N` with the smallest free `N >= 1`.
    pub fn reserve(&mut self, base: &str) -> Option<String> {
        if self.taken.insert(base.to_string()) {
            return Some(base.to_string());
        }
        (1..=MAX_NAME_SUFFIX).find_map(|n| {
            let candidate = format!("{base}_{n}");
            self.taken
                .insert(candidate.clone())
                .then_some(candidate)
        })
    }

    pub fn insert(&mut self, key: SynthKey, name: String) {
        self.entries.insert(
            key,
            SynthIdentifier {
                name,
                remaining_uses: 1,
                declared: false,
            },
        );
    }

    pub fn seed_uses(&mut self, key: SynthKey, uses: u32) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.remaining_uses = uses.max(1);
        }
    }

    /// Returns whether the binding was already declared.
    pub fn mark_declared(&mut self, key: SynthKey) -> bool {
        self.entries
            .get_mut(&key)
            .is_some_and(|entry| std::mem::replace(&mut entry.declared, true))
    }

    /// Record one write. Returns the writes left.
    pub fn consume(&mut self, key: SynthKey) -> u32 {
        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.remaining_uses = entry.remaining_uses.saturating_sub(1);
                entry.remaining_uses
            }
            None => 0,
        }
    }
}

/// The link could not be rewritten; its expression is kept verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unsupported;

/// Binding a fulfillment value is written to before the handler body runs.
/// `None` when the handler ignores its argument.
pub(crate) fn fulfillment_binding(
    arena: &NodeArena,
    binder: &BinderState,
    callback: Callback,
) -> Result<Option<SynthKey>, Unsupported> {
    match callback {
        Callback::Absent => Ok(None),
        Callback::Unsupported(_) => Err(Unsupported),
        Callback::Reference(idx) => Ok(Some(SynthKey::Minted(idx))),
        Callback::Literal(func) => {
            literal_parameter(arena, binder, func).map(|sym| sym.map(SynthKey::Param))
        }
    }
}

/// Binding a rejection reason is caught into.
pub(crate) fn rejection_binding(
    arena: &NodeArena,
    binder: &BinderState,
    callback: Callback,
) -> Result<SynthKey, Unsupported> {
    match callback {
        Callback::Absent | Callback::Unsupported(_) => Err(Unsupported),
        Callback::Reference(idx) => Ok(SynthKey::Minted(idx)),
        Callback::Literal(func) => Ok(literal_parameter(arena, binder, func)?
            .map_or(SynthKey::Minted(func), SynthKey::Param)),
    }
}

/// The symbol of a callback literal's only parameter. `None` when there is
/// no parameter, or when it is an unread `_`.
fn literal_parameter(
    arena: &NodeArena,
    binder: &BinderState,
    func: NodeIndex,
) -> Result<Option<SymbolId>, Unsupported> {
    let data = arena
        .get(func)
        .and_then(|node| arena.get_function(node))
        .ok_or(Unsupported)?;
    let param = match data.parameters.nodes.as_slice() {
        [] => return Ok(None),
        [param] => *param,
        _ => return Err(Unsupported),
    };
    let param = arena
        .get(param)
        .and_then(|node| arena.get_parameter(node))
        .ok_or(Unsupported)?;
    if param.dot_dot_dot_token || param.initializer.is_some() {
        return Err(Unsupported);
    }
    let is_identifier = arena
        .get(param.name)
        .is_some_and(|n| n.kind == SyntaxKind::Identifier as u16);
    if !is_identifier {
        return Err(Unsupported);
    }
    let symbol = binder.symbol_of_node(param.name).ok_or(Unsupported)?;
    if symbol.escaped_name == "_" && binder.references_of(symbol.id).is_empty() {
        return Ok(None);
    }
    Ok(Some(symbol.id))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HandlerRole {
    Fulfillment,
    Rejection,
}

#[derive(Clone, Copy, Debug)]
struct HandlerSite {
    callback: Callback,
    role: HandlerRole,
}

/// Every handler of the chain at `expr`, including those of chains nested
/// in inlined callback bodies.
fn collect_handlers(
    arena: &NodeArena,
    oracle: &dyn TypeOracle,
    expr: NodeIndex,
    depth: u32,
    out: &mut Vec<HandlerSite>,
) {
    if depth > MAX_CALLBACK_NESTING {
        return;
    }
    for (_, link) in chain_spine(arena, oracle, expr) {
        let handlers = match link {
            ChainLink::ThenCall {
                on_fulfilled,
                on_rejected,
                ..
            } => [
                (on_fulfilled, HandlerRole::Fulfillment),
                (on_rejected, HandlerRole::Rejection),
            ],
            ChainLink::CatchCall { on_rejected, .. } => [
                (on_rejected, HandlerRole::Rejection),
                (NodeIndex::NONE, HandlerRole::Rejection),
            ],
            _ => continue,
        };
        for (arg, role) in handlers {
            let callback = classify_callback(arena, oracle, arg);
            if callback.is_absent() {
                continue;
            }
            out.push(HandlerSite { callback, role });
            if let Callback::Literal(func) = callback {
                for nested in callback_chain_roots(arena, oracle, func) {
                    collect_handlers(arena, oracle, nested, depth + 1, out);
                }
            }
        }
    }
}

fn callback_node(callback: Callback) -> NodeIndex {
    match callback {
        Callback::Literal(idx) | Callback::Reference(idx) | Callback::Unsupported(idx) => idx,
        Callback::Absent => NodeIndex::NONE,
    }
}

pub struct IdentifierSynthesizer<'a> {
    source: &'a NodeArena,
    binder: &'a BinderState,
    oracle: &'a dyn TypeOracle,
}

impl<'a> IdentifierSynthesizer<'a> {
    pub fn new(
        source: &'a NodeArena,
        binder: &'a BinderState,
        oracle: &'a dyn TypeOracle,
    ) -> IdentifierSynthesizer<'a> {
        IdentifierSynthesizer {
            source,
            binder,
            oracle,
        }
    }

    /// Rename the bindings of `func` and its inlined callbacks inside
    /// `clone`, and name the values that need a minted binding. `chains`
    /// are the glued chain expressions, which live in `clone`.
    ///
    /// Returns `None` when no free name could be found.
    pub fn synthesize(
        &self,
        func: NodeIndex,
        chains: &[NodeIndex],
        clone: &mut NodeArena,
    ) -> Option<SynthTable> {
        let func_node = self.source.get(func)?;
        let (func_pos, func_end) = (func_node.pos, func_node.end);

        let mut sites = Vec::new();
        for &chain in chains {
            collect_handlers(clone, self.oracle, chain, 0, &mut sites);
        }
        sites.sort_by_key(|site| {
            self.source
                .get(callback_node(site.callback))
                .map_or(u32::MAX, |n| n.pos)
        });

        let mut owners: FxHashSet<NodeIndex> = FxHashSet::default();
        owners.insert(func);
        owners.extend(sites.iter().filter_map(|site| match site.callback {
            Callback::Literal(idx) => Some(idx),
            _ => None,
        }));

        let mut table = SynthTable::new();
        let declared_inside = self.binder.symbols_declared_in(self.source, func_pos, func_end);
        let declared_set: FxHashSet<SymbolId> = declared_inside.iter().copied().collect();

        // Names the body reads from outside keep meaning what they meant.
        for &node in &self.binder.unresolved {
            if self.source.get(node).is_some_and(|n| n.pos >= func_pos && n.end <= func_end)
                && let Some(name) = self.source.identifier_text(node)
            {
                table.pin(name);
            }
        }
        for symbol in self.binder.symbols.iter() {
            if declared_set.contains(&symbol.id) {
                continue;
            }
            let read_inside = self.binder.references_of(symbol.id).iter().any(|&reference| {
                self.source
                    .get(reference)
                    .is_some_and(|n| n.pos >= func_pos && n.end <= func_end)
            });
            if read_inside {
                table.pin(symbol.escaped_name.clone());
            }
        }

        let mut candidates: Vec<&Symbol> = Vec::new();
        for &id in &declared_inside {
            let Some(symbol) = self.binder.get_symbol(id) else {
                continue;
            };
            if owners.contains(&self.binding_owner(symbol)) {
                candidates.push(symbol);
            } else {
                table.pin(symbol.escaped_name.clone());
            }
        }
        candidates.sort_by_key(|symbol| self.source.get(symbol.name_node).map_or(0, |n| n.pos));

        let mut final_names: FxHashMap<SymbolId, String> = FxHashMap::default();
        for symbol in candidates {
            let name = table.reserve(&symbol.escaped_name)?;
            if name != symbol.escaped_name {
                trace!(from = %symbol.escaped_name, to = %name, "rename binding");
                rename_binding(clone, self.binder, symbol, &name);
            }
            final_names.insert(symbol.id, name);
        }

        for site in &sites {
            let key = match site.role {
                HandlerRole::Fulfillment => fulfillment_binding(self.source, self.binder, site.callback),
                HandlerRole::Rejection => {
                    rejection_binding(self.source, self.binder, site.callback).map(Some)
                }
            };
            match key {
                Ok(Some(SynthKey::Param(symbol))) => {
                    if let Some(name) = final_names.get(&symbol) {
                        table.insert(SynthKey::Param(symbol), name.clone());
                    }
                }
                Ok(Some(key @ SynthKey::Minted(handler))) => {
                    if table.get(key).is_some() {
                        continue;
                    }
                    let base = self.minted_base(handler, site.role);
                    let name = table.reserve(&base)?;
                    table.insert(key, name);
                }
                Ok(None) | Ok(Some(SynthKey::Variable(_))) | Err(Unsupported) => {}
            }
        }

        debug!(bindings = table.len(), "synthesized names");
        Some(table)
    }

    /// Seed write counts once chains are glued. A binding is written once
    /// per path that can produce its value.
    pub fn seed_write_counts(&self, arena: &NodeArena, table: &mut SynthTable, chain: NodeIndex) {
        self.seed_chain(arena, table, chain, 0);
    }

    fn seed_chain(&self, arena: &NodeArena, table: &mut SynthTable, chain: NodeIndex, depth: u32) {
        if depth > MAX_CALLBACK_NESTING {
            return;
        }
        for (_, link) in chain_spine(arena, self.oracle, chain) {
            let handlers = match link {
                ChainLink::ThenCall {
                    receiver,
                    on_fulfilled,
                    on_rejected,
                    ..
                } => {
                    let fulfillment = classify_callback(arena, self.oracle, on_fulfilled);
                    if let Ok(Some(key)) = fulfillment_binding(arena, self.binder, fulfillment) {
                        table.seed_uses(key, self.writer_count(arena, receiver));
                    }
                    [on_fulfilled, on_rejected]
                }
                ChainLink::CatchCall { on_rejected, .. } => [on_rejected, NodeIndex::NONE],
                _ => continue,
            };
            for handler in handlers {
                if let Callback::Literal(func) = classify_callback(arena, self.oracle, handler) {
                    for nested in callback_chain_roots(arena, self.oracle, func) {
                        self.seed_chain(arena, table, nested, depth + 1);
                    }
                }
            }
        }
    }

    /// Bind the variable a group's root returns. The chain's first write
    /// declares it, unless its declaration lies outside the group.
    pub fn bind_result(&self, clone: &NodeArena, table: &mut SynthTable, group: &ChainGroup) {
        let Some(symbol) = group.result.and_then(|id| self.binder.get_symbol(id)) else {
            return;
        };
        let key = SynthKey::Variable(symbol.id);
        let name = clone
            .identifier_text(symbol.name_node)
            .unwrap_or(symbol.escaped_name.as_str())
            .to_string();
        table.pin(name.clone());
        table.insert(key, name);
        table.seed_uses(key, self.writer_count(clone, group.chain));

        let start = self.source.get(group.first()).map_or(u32::MAX, |n| n.pos);
        let end = self.source.get(group.root()).map_or(0, |n| n.end);
        let declared_in_group = self
            .source
            .get(symbol.name_node)
            .is_some_and(|n| n.pos >= start && n.end <= end);
        if !declared_in_group {
            table.mark_declared(key);
        }
    }

    /// Number of statements that may write the value of `expr`.
    fn writer_count(&self, arena: &NodeArena, expr: NodeIndex) -> u32 {
        let mut extra = 0;
        for (_, link) in chain_spine(arena, self.oracle, expr) {
            match link {
                ChainLink::ThenCall {
                    on_fulfilled,
                    on_rejected,
                    ..
                } => {
                    let fulfills = !classify_callback(arena, self.oracle, on_fulfilled).is_absent();
                    let rejects = !classify_callback(arena, self.oracle, on_rejected).is_absent();
                    match (fulfills, rejects) {
                        (true, true) => return extra + 2,
                        (true, false) => return extra + 1,
                        (false, true) => extra += 1,
                        (false, false) => {}
                    }
                }
                ChainLink::CatchCall { .. } => extra += 1,
                ChainLink::PropertyChain { .. } => {}
                _ => break,
            }
        }
        extra + 1
    }

    fn minted_base(&self, handler: NodeIndex, role: HandlerRole) -> String {
        let fallback = match role {
            HandlerRole::Fulfillment => RESULT_NAME,
            HandlerRole::Rejection => ERROR_NAME,
        };
        let is_literal = self
            .source
            .get(handler)
            .is_some_and(|n| n.is_function_expression_or_arrow());
        if is_literal {
            return fallback.to_string();
        }
        self.oracle
            .signature_first_param_name(handler)
            .filter(|name| name != "_")
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Nearest function-like node enclosing a binding's declaration. A
    /// function declaration's own name belongs to the enclosing scope.
    fn binding_owner(&self, symbol: &Symbol) -> NodeIndex {
        let mut current = self.source.parent_of(symbol.name_node);
        if let Some(node) = self.source.get(current)
            && node.kind == syntax_kind_ext::FUNCTION_DECLARATION
        {
            current = self.source.parent_of(current);
        }
        while let Some(node) = self.source.get(current) {
            if node.is_function_like() {
                return current;
            }
            current = self.source.parent_of(current);
        }
        NodeIndex::NONE
    }
}

/// Rename a binding's declaration and every reference to it inside `clone`,
/// keeping object keys that were spelled by the old name.
fn rename_binding(clone: &mut NodeArena, binder: &BinderState, symbol: &Symbol, new_name: &str) {
    let old_name = symbol.escaped_name.as_str();
    rename_identifier(clone, symbol.name_node, old_name, new_name);
    for &reference in binder.references_of(symbol.id) {
        rename_identifier(clone, reference, old_name, new_name);
    }
}

fn rename_identifier(clone: &mut NodeArena, idx: NodeIndex, old_name: &str, new_name: &str) {
    let parent = clone.parent_of(idx);
    if let Some(&parent_node) = clone.get(parent) {
        match parent_node.kind {
            // `{ x }` becomes `{ x: x_1 }`.
            syntax_kind_ext::SHORTHAND_PROPERTY_ASSIGNMENT => {
                let key = detached_identifier(clone, idx, old_name);
                if let Some(prop) = clone
                    .property_assignments
                    .get_mut(parent_node.data_index as usize)
                    && prop.name == idx
                    && prop.initializer.is_none()
                {
                    prop.name = key;
                    prop.initializer = idx;
                    if let Some(node) = clone.get_mut(parent) {
                        node.kind = syntax_kind_ext::PROPERTY_ASSIGNMENT;
                    }
                }
            }
            // `const { x } = o` becomes `const { x: x_1 } = o`.
            syntax_kind_ext::BINDING_ELEMENT => {
                let key = detached_identifier(clone, idx, old_name);
                if let Some(element) = clone
                    .binding_elements
                    .get_mut(parent_node.data_index as usize)
                    && element.name == idx
                    && element.property_name.is_none()
                {
                    element.property_name = key;
                }
            }
            _ => {}
        }
    }
    if let Some(ident) = clone.get_identifier_mut(idx) {
        ident.escaped_text = new_name.to_string();
    }
}

fn detached_identifier(clone: &mut NodeArena, like: NodeIndex, text: &str) -> NodeIndex {
    let (pos, end) = clone.get(like).map_or((0, 0), |n| (n.pos, n.end));
    clone.add_identifier(
        SyntaxKind::Identifier as u16,
        pos,
        end,
        IdentifierData {
            escaped_text: text.to_string(),
        },
    )
}

#[cfg(test)]
#[path = "tests/identifier_synthesizer_tests.rs"]
mod tests;
