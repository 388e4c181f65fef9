//! Lexical scopes
//!
//! A scope maps variable names to values and links to at most one outer
//! scope. Lookups and assignments that miss locally continue outward until a
//! binding is found or the chain ends.
//!
//! Scopes are shared (`ScopeRef = Rc<Scope>`): the code that created a scope
//! and every closure that captured it hold a reference, and a scope lives as
//! long as either does. The `outer` link never changes after construction;
//! only the bindings are mutable.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::errors::{ScopeError, ScopeResult};
use super::types::Val;

/// Shared handle to a scope
pub type ScopeRef = Rc<Scope>;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// The lifecycle point that created a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// Program start
    Global,
    /// One-time scope holding `let` loop declarations before the first iteration
    Loop,
    /// Per-iteration binding environment (sibling of the loop scope)
    Iteration,
    /// A `{ ... }` body execution
    Block,
    /// A closure invocation
    Call,
}

/* ===================== Scope ===================== */

pub struct Scope {
    id: u64,
    kind: ScopeKind,
    outer: Option<ScopeRef>,
    bindings: RefCell<HashMap<String, Val>>,
}

impl Scope {
    /// Create a scope with the given outer scope
    pub fn new(kind: ScopeKind, outer: Option<ScopeRef>) -> ScopeRef {
        let scope = Rc::new(Scope {
            id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            outer,
            bindings: RefCell::new(HashMap::new()),
        });
        trace!(
            scope_id = scope.id,
            kind = ?kind,
            outer_id = ?scope.outer.as_ref().map(|o| o.id),
            "created scope"
        );
        scope
    }

    /// Create a root scope with no outer scope
    pub fn global() -> ScopeRef {
        Scope::new(ScopeKind::Global, None)
    }

    /// Create a scope whose outer scope is `self`
    pub fn child(self: &Rc<Self>, kind: ScopeKind) -> ScopeRef {
        Scope::new(kind, Some(Rc::clone(self)))
    }

    /// Create (or re-create) a variable in this scope
    ///
    /// The new binding shadows same-named variables in outer scopes for every
    /// lookup made through this scope or its descendants. Redeclaring a name
    /// in the same scope overwrites its value.
    pub fn create_variable(&self, name: impl Into<String>, initial: Val) {
        self.bindings.borrow_mut().insert(name.into(), initial);
    }

    /// Create a variable initialized to `undefined`
    pub fn declare(&self, name: impl Into<String>) {
        self.create_variable(name, Val::Undefined);
    }

    /// Read the nearest binding for `name`
    pub fn get(&self, name: &str) -> ScopeResult<Val> {
        let mut scope = self;
        loop {
            if let Some(value) = scope.bindings.borrow().get(name) {
                return Ok(value.clone());
            }
            match &scope.outer {
                Some(outer) => scope = &**outer,
                None => return Err(ScopeError::UnboundVariable(name.to_string())),
            }
        }
    }

    /// Overwrite the nearest binding for `name`
    ///
    /// Never creates a binding.
    pub fn set(&self, name: &str, value: Val) -> ScopeResult<()> {
        let mut scope = self;
        loop {
            if let Some(slot) = scope.bindings.borrow_mut().get_mut(name) {
                *slot = value;
                return Ok(());
            }
            match &scope.outer {
                Some(outer) => scope = &**outer,
                None => return Err(ScopeError::UnboundVariable(name.to_string())),
            }
        }
    }

    /// Whether this scope itself (not an outer one) binds `name`
    pub fn has_own(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    /// Names bound directly in this scope, sorted
    pub fn own_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn outer(&self) -> Option<&ScopeRef> {
        self.outer.as_ref()
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of outer links between this scope and the root (root is 0)
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut scope = self;
        while let Some(outer) = &scope.outer {
            depth += 1;
            scope = &**outer;
        }
        depth
    }
}

impl fmt::Debug for Scope {
    // Only the outer id is printed; the full chain is reachable through `outer()`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("outer", &self.outer.as_ref().map(|o| o.id))
            .field("bindings", &self.bindings.borrow())
            .finish()
    }
}
