//! Lexical scopes.
//!
//! Scopes live in a flat per-package arena with parent indices. Each scope
//! carries its symbols in declaration order plus a name index, an optional
//! expected type (the return-type context for function bodies), flags, and
//! the counter map used to keep generated names unique.

use crate::symbol::SymbolId;
use rustc_hash::FxHashMap;
use sabre_ir::{DeclId, Name, StmtId};
use sabre_types::TypeId;

/// Id of a [`Scope`] within its package's [`ScopeArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ScopeId(pub u32);

impl ScopeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The AST node a scope belongs to; every node owns at most one scope.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeOwner {
    Decl(DeclId),
    Stmt(StmtId),
}

/// Scope flags.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct ScopeFlags(u8);

impl ScopeFlags {
    pub const NONE: ScopeFlags = ScopeFlags(0);
    pub const INSIDE_LOOP: ScopeFlags = ScopeFlags(1);

    pub const fn contains(self, other: ScopeFlags) -> bool {
        self.0 & other.0 != 0
    }
}

/// A lexical scope.
#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    /// Used when generating mangled names; empty for block scopes.
    pub name: Name,
    pub flags: ScopeFlags,
    /// Return-type context for enclosed `return` statements.
    pub expected_type: Option<TypeId>,
    /// Symbols in declaration order.
    pub symbols: Vec<SymbolId>,
    by_name: FxHashMap<Name, SymbolId>,
    /// Collision counters for generated names.
    pub generated_names: FxHashMap<Name, usize>,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>, name: Name, flags: ScopeFlags) -> Self {
        Scope {
            parent,
            name,
            flags,
            expected_type: None,
            symbols: Vec::new(),
            by_name: FxHashMap::default(),
            generated_names: FxHashMap::default(),
        }
    }
}

/// Flat storage for one package's scopes.
#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(scope);
        id
    }

    /// # Panics
    /// Panics if `id` was not produced by this arena.
    #[inline]
    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    /// Append and index a symbol in `scope`.
    pub fn add_symbol(&mut self, scope: ScopeId, name: Name, sym: SymbolId) {
        let scope = self.get_mut(scope);
        scope.symbols.push(sym);
        scope.by_name.insert(name, sym);
    }

    /// Look a name up in one scope only.
    pub fn shallow_find(&self, scope: ScopeId, name: Name) -> Option<SymbolId> {
        self.get(scope).by_name.get(&name).copied()
    }

    /// Look a name up in a scope and its ancestors.
    pub fn find(&self, scope: ScopeId, name: Name) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(sym) = self.shallow_find(id, name) {
                return Some(sym);
            }
            current = self.get(id).parent;
        }
        None
    }

    /// Whether any scope on the parent chain carries `flag`.
    pub fn find_flag(&self, scope: ScopeId, flag: ScopeFlags) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.get(id).flags.contains(flag) {
                return true;
            }
            current = self.get(id).parent;
        }
        false
    }

    /// The nearest enclosing expected type (return context).
    pub fn expected_type(&self, scope: ScopeId) -> Option<TypeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(t) = self.get(id).expected_type {
                return Some(t);
            }
            current = self.get(id).parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_walks_parents() {
        let mut arena = ScopeArena::new();
        let root = arena.add(Scope::new(None, Name::EMPTY, ScopeFlags::NONE));
        let child = arena.add(Scope::new(Some(root), Name::EMPTY, ScopeFlags::NONE));

        let name = Name::new(7);
        arena.add_symbol(root, name, SymbolId(0));

        assert_eq!(arena.find(child, name), Some(SymbolId(0)));
        assert_eq!(arena.shallow_find(child, name), None);
    }

    #[test]
    fn loop_flag_is_visible_from_nested_scopes() {
        let mut arena = ScopeArena::new();
        let root = arena.add(Scope::new(None, Name::EMPTY, ScopeFlags::NONE));
        let looped = arena.add(Scope::new(Some(root), Name::EMPTY, ScopeFlags::INSIDE_LOOP));
        let inner = arena.add(Scope::new(Some(looped), Name::EMPTY, ScopeFlags::NONE));

        assert!(arena.find_flag(inner, ScopeFlags::INSIDE_LOOP));
        assert!(!arena.find_flag(root, ScopeFlags::INSIDE_LOOP));
    }
}
