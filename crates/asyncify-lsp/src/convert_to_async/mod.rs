//! Convert promise chains to async/await.
//!
//! A conversion runs five phases over one function:
//! 1. the chain recognizer finds the statements holding a chain,
//! 2. the gluer merges chains split across `const p = ...; p.then(...)`
//!    or `p = p.then(...)`,
//! 3. the identifier synthesizer picks collision-free names,
//! 4. the rewriter turns each chain into statements,
//! 5. the statement splicer renders those as text edits.
//!
//! Phases 2 to 4 work on a clone of the parsed arena; the source arena,
//! the binder and the type oracle are never mutated.

pub mod chain_gluer;
pub mod chain_recognizer;
pub mod identifier_synthesizer;
pub mod rewriter;
pub mod statement_splicer;
pub mod suggestions;

pub use chain_gluer::{ChainGluer, ChainGroup};
pub use chain_recognizer::{
    Callback, ChainLink, HasSuccessorMap, RootKind, RootStatement, classify, classify_callback,
    find_root_statements, is_chain_root,
};
pub use identifier_synthesizer::{IdentifierSynthesizer, SynthIdentifier, SynthKey, SynthTable};
pub use rewriter::{Rewriter, RootRewrite, Sink};
pub use statement_splicer::{StatementSplicer, TextEdit};
pub use suggestions::ConvertToAsyncSuggestions;

use asyncify_binder::BinderState;
use asyncify_checker::TypeOracle;
use asyncify_common::TextSpan;
use asyncify_emitter::PrintOptions;
use asyncify_parser::{NodeArena, NodeIndex, syntax_kind_ext};
use serde::Serialize;
use tracing::{debug, debug_span};

/// Edits converting one function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionConversion {
    pub function: NodeIndex,
    pub statement_edits: Vec<TextEdit>,
    /// `None` when the function was already async.
    pub async_marker: Option<TextEdit>,
}

impl FunctionConversion {
    /// All edits in ascending source order.
    pub fn edits(&self) -> Vec<TextEdit> {
        let mut edits: Vec<TextEdit> = self
            .async_marker
            .iter()
            .chain(&self.statement_edits)
            .cloned()
            .collect();
        edits.sort_by_key(|edit| (edit.span.start, edit.span.length));
        edits
    }

    /// Smallest span covering every edit.
    pub fn span(&self) -> TextSpan {
        let edits = self.edits();
        let start = edits.iter().map(|e| e.span.start).min().unwrap_or(0);
        let end = edits.iter().map(|e| e.span.end()).max().unwrap_or(start);
        TextSpan::from_bounds(start, end)
    }
}

pub struct ConvertToAsync<'a> {
    arena: &'a NodeArena,
    binder: &'a BinderState,
    oracle: &'a dyn TypeOracle,
    source_text: &'a str,
    print_options: PrintOptions,
}

impl<'a> ConvertToAsync<'a> {
    pub fn new(
        arena: &'a NodeArena,
        binder: &'a BinderState,
        oracle: &'a dyn TypeOracle,
        source_text: &'a str,
    ) -> ConvertToAsync<'a> {
        ConvertToAsync {
            arena,
            binder,
            oracle,
            source_text,
            print_options: PrintOptions::default(),
        }
    }

    pub fn with_print_options(mut self, print_options: PrintOptions) -> Self {
        self.print_options = print_options;
        self
    }

    pub fn arena(&self) -> &'a NodeArena {
        self.arena
    }

    /// Function declarations, function expressions, arrows and methods with
    /// a body. Generators, constructors and accessors cannot become async.
    pub fn is_convertible_function(&self, func: NodeIndex) -> bool {
        let Some(node) = self.arena.get(func) else {
            return false;
        };
        if !matches!(
            node.kind,
            syntax_kind_ext::FUNCTION_DECLARATION
                | syntax_kind_ext::FUNCTION_EXPRESSION
                | syntax_kind_ext::ARROW_FUNCTION
                | syntax_kind_ext::METHOD_DECLARATION
        ) {
            return false;
        }
        self.arena
            .get_function(node)
            .is_some_and(|data| !data.asterisk_token && data.body.is_some())
    }

    /// True when `func` is convertible and holds at least one chain.
    pub fn has_convertible_chain(&self, func: NodeIndex) -> bool {
        self.is_convertible_function(func)
            && !find_root_statements(self.arena, self.oracle, func).is_empty()
    }

    /// Innermost convertible function containing `position` that holds a
    /// chain.
    pub fn find_function_at(&self, position: u32) -> Option<NodeIndex> {
        (0..self.arena.len() as u32)
            .map(NodeIndex)
            .filter(|&idx| {
                self.arena
                    .get(idx)
                    .is_some_and(|n| TextSpan::from_bounds(n.pos, n.end).contains(position))
            })
            .filter(|&idx| self.has_convertible_chain(idx))
            .min_by_key(|&idx| {
                self.arena
                    .get(idx)
                    .map_or(u32::MAX, |n| n.end.saturating_sub(n.pos))
            })
    }

    /// The name `func` is known by: its own name, or the variable or
    /// property it initializes.
    pub fn function_name(&self, func: NodeIndex) -> Option<&'a str> {
        let arena = self.arena;
        let data = arena.get(func).and_then(|n| arena.get_function(n))?;
        if data.name.is_some() {
            return arena.identifier_text(data.name);
        }
        let parent = arena.get(arena.parent_of(func))?;
        let name = if let Some(decl) = arena.get_variable_declaration(parent) {
            (decl.initializer == func).then_some(decl.name)?
        } else if let Some(prop) = arena.get_property_assignment(parent) {
            (prop.initializer == func).then_some(prop.name)?
        } else {
            return None;
        };
        arena.identifier_text(name)
    }

    /// Outermost convertible function called `name`.
    pub fn find_function_named(&self, name: &str) -> Option<NodeIndex> {
        self.convertible_functions()
            .into_iter()
            .find(|&func| self.function_name(func) == Some(name))
    }

    /// Every function-like node holding a chain, outermost first.
    pub fn convertible_functions(&self) -> Vec<NodeIndex> {
        let mut functions: Vec<NodeIndex> = (0..self.arena.len() as u32)
            .map(NodeIndex)
            .filter(|&idx| self.has_convertible_chain(idx))
            .collect();
        functions.sort_by_key(|&idx| {
            self.arena
                .get(idx)
                .map_or((u32::MAX, 0), |n| (n.pos, u32::MAX - n.end))
        });
        functions
    }

    /// Convert `func`. `None` means "no edit": the node is not a
    /// convertible function, holds no chain, or no chain could be rewritten.
    pub fn convert_function(&self, func: NodeIndex) -> Option<FunctionConversion> {
        let _span = debug_span!("convert_function", func = func.0).entered();
        if !self.is_convertible_function(func) {
            return None;
        }
        let roots = find_root_statements(self.arena, self.oracle, func);
        if roots.is_empty() {
            debug!("no chain to convert");
            return None;
        }

        let mut clone = self.arena.clone();
        let groups = ChainGluer::new(self.binder, self.oracle).glue(&mut clone, &roots);
        let chains: Vec<NodeIndex> = groups.iter().map(|group| group.chain).collect();

        let synthesizer = IdentifierSynthesizer::new(self.arena, self.binder, self.oracle);
        let mut names = synthesizer.synthesize(func, &chains, &mut clone)?;
        for &chain in &chains {
            synthesizer.seed_write_counts(&clone, &mut names, chain);
        }

        for group in &groups {
            synthesizer.bind_result(&clone, &mut names, group);
        }

        let mut successors = HasSuccessorMap::new();
        for &chain in &chains {
            successors.mark_chain(&clone, self.oracle, chain, false);
        }

        let mut rewrites = Vec::with_capacity(groups.len());
        for group in &groups {
            let in_try = chain_recognizer::is_inside_try_block(self.arena, group.root(), func);
            let mut rewriter =
                Rewriter::new(&mut clone, self.oracle, self.binder, &mut names, &mut successors)
                    .inside_try(in_try);
            let mut rewrite = rewriter.rewrite_root(group.chain, terminal_sink(group));
            // `return v;` stays, reading the binding the chain wrote.
            if group.result.is_some() {
                rewrite.statements.push(group.root());
            }
            rewrites.push(rewrite);
        }

        if rewrites.iter().all(|rewrite| rewrite.verbatim) {
            debug!("every chain kept as written");
            return None;
        }

        let splicer = StatementSplicer::new(self.source_text, &self.print_options);
        let statement_edits: Vec<TextEdit> = groups
            .iter()
            .zip(&rewrites)
            .filter_map(|(group, rewrite)| splicer.splice(self.arena, &mut clone, group, rewrite))
            .collect();
        let async_marker = splicer.async_marker(self.arena, func);

        debug!(edits = statement_edits.len(), "converted function");
        Some(FunctionConversion {
            function: func,
            statement_edits,
            async_marker,
        })
    }
}

/// Where a group's value goes once its last link has run.
pub fn terminal_sink(group: &ChainGroup) -> Sink {
    match (group.result, group.kind) {
        (Some(symbol), _) => Sink::Bind(SynthKey::Variable(symbol)),
        (None, RootKind::Expression) => Sink::Discard,
        (None, RootKind::Return | RootKind::ArrowBody | RootKind::ReturnBinding) => Sink::Return,
    }
}

#[cfg(test)]
#[path = "tests/convert_to_async_tests.rs"]
mod tests;
