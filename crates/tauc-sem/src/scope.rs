//! Scope tree for name resolution.
//!
//! Scopes form a tree held in an arena; parent edges are indices, so there
//! are no cyclic owning references. Lookup walks the parent chain and
//! returns the first hit.

use indexmap::IndexMap;
use tauc_util::{define_idx, IndexVec, Span};

use crate::symbol::SymbolId;

define_idx!(ScopeId);

/// Kind of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The program-level scope holding function names.
    Global,
    /// A function's scope holding its parameters.
    Func,
    /// A block scope holding `var` declarations.
    Local,
}

/// A single scope: its bindings, parent, kind, and source span.
#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub bindings: IndexMap<String, SymbolId>,
    pub span: Span,
}

/// Arena of scopes.
#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: IndexVec<ScopeId, Scope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope and return its id.
    pub fn push(&mut self, kind: ScopeKind, parent: Option<ScopeId>, span: Span) -> ScopeId {
        self.scopes.push(Scope {
            kind,
            parent,
            bindings: IndexMap::new(),
            span,
        })
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn kind(&self, id: ScopeId) -> ScopeKind {
        self.scopes[id].kind
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Bind `name` in `scope`. Returns false if the name is already bound
    /// there (the caller reports the duplicate).
    pub fn define(&mut self, scope: ScopeId, name: &str, symbol: SymbolId) -> bool {
        let bindings = &mut self.scopes[scope].bindings;
        if bindings.contains_key(name) {
            return false;
        }
        bindings.insert(name.to_string(), symbol);
        true
    }

    /// Resolve `name` starting at `scope` and walking outward.
    pub fn resolve_from(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = scope;
        loop {
            let s = &self.scopes[current];
            if let Some(&symbol) = s.bindings.get(name) {
                return Some(symbol);
            }
            current = s.parent?;
        }
    }

    /// True if `candidate` is `from` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, candidate: ScopeId, from: ScopeId) -> bool {
        let mut current = Some(from);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.scopes[id].parent;
        }
        false
    }
}
