use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Integer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol<'s> {
    pub name: &'s str,
    pub ty: Type,
    /// Set on the first write. Nothing reads it to diagnose use before initialization.
    pub initialized: bool,
}

/// The single flat namespace for variables. A name can be declared at most once for the
/// table's lifetime, and blocks do not open new scopes.
#[derive(Debug, Default)]
pub struct SymbolTable<'s> {
    symbols: FxHashMap<&'s str, Symbol<'s>>,
}

impl<'s> SymbolTable<'s> {
    pub fn new() -> SymbolTable<'s> {
        SymbolTable::default()
    }

    /// Declares `name`, returning `false` if it is already present.
    pub fn declare(&mut self, name: &'s str, ty: Type) -> bool {
        match self.symbols.entry(name) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Symbol {
                    name,
                    ty,
                    initialized: false,
                });
                true
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol<'s>> {
        self.symbols.get(name)
    }

    /// Marks `name` as written, returning `false` if it was never declared.
    pub fn mark_initialized(&mut self, name: &str) -> bool {
        if let Some(symbol) = self.symbols.get_mut(name) {
            symbol.initialized = true;
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
