//! Closures
//!
//! A closure pairs a callable with the scope that was current when the
//! function literal was evaluated. Calling it creates a fresh call-local
//! scope whose outer scope is that captured scope, so the body sees exactly
//! the bindings it was created next to, however late it runs.

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use super::errors::ScopeResult;
use super::scheduler::Task;
use super::scope::{ScopeKind, ScopeRef};

/// Function body of a closure, run against its call-local scope
pub type ClosureBody = dyn Fn(&ScopeRef) -> ScopeResult<()>;

#[derive(Clone)]
pub struct Closure {
    body: Rc<ClosureBody>,
    definition_scope: ScopeRef,
}

impl Closure {
    /// Create a closure capturing `definition_scope`
    pub fn new(
        body: impl Fn(&ScopeRef) -> ScopeResult<()> + 'static,
        definition_scope: ScopeRef,
    ) -> Self {
        Self {
            body: Rc::new(body),
            definition_scope,
        }
    }

    /// The scope captured at creation time
    pub fn definition_scope(&self) -> &ScopeRef {
        &self.definition_scope
    }

    /// Invoke the closure
    ///
    /// The call-local scope is dropped when the call returns. The caller's
    /// own scope is untouched: it was never handed to the body.
    pub fn call(&self) -> ScopeResult<()> {
        let local = self.definition_scope.child(ScopeKind::Call);
        trace!(
            call_scope = local.id(),
            definition_scope = self.definition_scope.id(),
            "invoking closure"
        );
        (self.body)(&local)
    }

    /// Wrap the closure as a deferred task
    pub fn into_task(self) -> Task {
        Box::new(move || self.call())
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("definition_scope", &self.definition_scope.id())
            .finish_non_exhaustive()
    }
}
