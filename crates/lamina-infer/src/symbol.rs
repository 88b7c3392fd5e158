//! Scoped symbol table with lexical shadowing.

use std::collections::BTreeMap;

use lamina_term::{Constant, Nameable, Term};
use lamina_types::{Judgment, Type};

/// The judgments recorded for one name; the last one is visible.
#[derive(Debug, Clone)]
pub struct Symbol<N> {
    judgments: Vec<Judgment<N>>,
}

impl<N: Nameable> Symbol<N> {
    fn new() -> Self {
        // Most symbols are never shadowed.
        Self {
            judgments: Vec::with_capacity(1),
        }
    }

    /// The visible judgment.
    pub fn get(&self) -> Option<&Judgment<N>> {
        self.judgments.last()
    }

    /// Number of stacked judgments, shadowed ones included.
    pub fn depth(&self) -> usize {
        self.judgments.len()
    }

    fn shadow(&mut self, judgment: Judgment<N>) {
        self.judgments.push(judgment);
    }

    /// Reveals the previous judgment. True when nothing is left.
    fn unshadow(&mut self) -> bool {
        self.judgments.pop();
        self.judgments.is_empty()
    }
}

/// Name -> [`Symbol`], plus a queue of removals to run later.
#[derive(Debug, Clone)]
pub struct SymbolTable<N> {
    symbols: BTreeMap<String, Symbol<N>>,
    removals: Vec<N>,
}

impl<N: Nameable> Default for SymbolTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Nameable> SymbolTable<N> {
    pub fn new() -> Self {
        Self {
            symbols: BTreeMap::new(),
            removals: Vec::new(),
        }
    }

    /// Binds `name`, shadowing any earlier binding of it.
    pub fn add(&mut self, name: N, ty: impl Into<Type<N>>) {
        let key = name.name().to_string();
        let judgment = Judgment::new(Term::Const(Constant::new(name)), ty);
        self.symbols
            .entry(key)
            .or_insert_with(Symbol::new)
            .shadow(judgment);
    }

    pub fn get(&self, name: &str) -> Option<&Judgment<N>> {
        self.symbols.get(name).and_then(Symbol::get)
    }

    pub fn symbol(&self, name: &str) -> Option<&Symbol<N>> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Drops the visible binding of `name`, revealing the one it shadowed.
    /// The entry goes away with its last binding. False when `name` was
    /// not bound.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(symbol) = self.symbols.get_mut(name) else {
            return false;
        };
        if symbol.unshadow() {
            self.symbols.remove(name);
        }
        true
    }

    /// Queues a removal for [`SymbolTable::flush_removals`].
    pub fn remove_later(&mut self, name: N) {
        self.removals.push(name);
    }

    pub fn pending_removals(&self) -> usize {
        self.removals.len()
    }

    /// Runs queued removals, most recent first.
    pub fn flush_removals(&mut self) {
        while let Some(name) = self.removals.pop() {
            self.remove(name.name());
        }
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Every recorded judgment, shadowed ones included.
    pub fn judgments(&self) -> impl Iterator<Item = &Judgment<N>> {
        self.symbols.values().flat_map(|s| s.judgments.iter())
    }
}
