//! Counting loop definitions
//!
//! A [`ForLoop`] is the pre-compiled form of
//!
//! ```text
//! for (<declaration> <variables> = <init>; <test>; <afterthought>) { <body> }
//! ```
//!
//! Every clause is a Rust callable that receives the scope it must read and
//! write through. There is no global "current scope": the controller passes
//! the governing scope in explicitly.

use std::fmt;
use std::rc::Rc;

use super::closure::Closure;
use super::errors::ScopeResult;
use super::scheduler::Scheduler;
use super::scope::ScopeRef;
use super::types::{BindingStrategy, Declaration, Val};

/// Initializer / afterthought clause
pub type UpdateFn = Rc<dyn Fn(&ScopeRef) -> ScopeResult<()>>;

/// Loop predicate
pub type TestFn = Rc<dyn Fn(&ScopeRef) -> ScopeResult<bool>>;

/// One statement of the loop body
pub type StatementFn = Rc<dyn Fn(&mut BodyContext<'_>) -> ScopeResult<()>>;

/* ===================== ForLoop ===================== */

#[derive(Clone)]
pub struct ForLoop {
    pub declaration: Declaration,
    /// Loop variable names, in declaration order
    pub variables: Vec<String>,
    pub init: UpdateFn,
    pub test: TestFn,
    pub afterthought: UpdateFn,
    pub body: Vec<StatementFn>,
}

impl ForLoop {
    /// Start a loop definition
    ///
    /// With no further clauses the loop runs forever (`for (;;)`), so callers
    /// are expected to supply at least a test.
    ///
    /// # Panics
    ///
    /// If `variables` is empty. A counting loop must declare something to
    /// count with.
    pub fn new<I, S>(declaration: Declaration, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variables: Vec<String> = variables.into_iter().map(Into::into).collect();
        assert!(
            !variables.is_empty(),
            "a for loop must declare at least one loop variable"
        );

        Self {
            declaration,
            variables,
            init: Rc::new(no_op),
            test: Rc::new(always),
            afterthought: Rc::new(no_op),
            body: Vec::new(),
        }
    }

    pub fn init(mut self, init: impl Fn(&ScopeRef) -> ScopeResult<()> + 'static) -> Self {
        self.init = Rc::new(init);
        self
    }

    pub fn test(mut self, test: impl Fn(&ScopeRef) -> ScopeResult<bool> + 'static) -> Self {
        self.test = Rc::new(test);
        self
    }

    pub fn afterthought(
        mut self,
        afterthought: impl Fn(&ScopeRef) -> ScopeResult<()> + 'static,
    ) -> Self {
        self.afterthought = Rc::new(afterthought);
        self
    }

    /// Append a statement to the body
    pub fn statement(
        mut self,
        statement: impl Fn(&mut BodyContext<'_>) -> ScopeResult<()> + 'static,
    ) -> Self {
        self.body.push(Rc::new(statement));
        self
    }

    pub fn strategy(&self) -> BindingStrategy {
        self.declaration.into()
    }
}

fn no_op(_: &ScopeRef) -> ScopeResult<()> {
    Ok(())
}

fn always(_: &ScopeRef) -> ScopeResult<bool> {
    Ok(true)
}

impl fmt::Debug for ForLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForLoop")
            .field("declaration", &self.declaration)
            .field("variables", &self.variables)
            .field("statements", &self.body.len())
            .finish_non_exhaustive()
    }
}

/* ===================== Body Context ===================== */

/// What a body statement can see while it runs
///
/// `scope()` is the block scope of the current body execution. Closures made
/// through this context capture that scope.
pub struct BodyContext<'a> {
    scope: ScopeRef,
    scheduler: &'a mut dyn Scheduler,
    scheduled: usize,
}

impl<'a> BodyContext<'a> {
    pub fn new(scope: ScopeRef, scheduler: &'a mut dyn Scheduler) -> Self {
        Self {
            scope,
            scheduler,
            scheduled: 0,
        }
    }

    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }

    pub fn get(&self, name: &str) -> ScopeResult<Val> {
        self.scope.get(name)
    }

    pub fn set(&self, name: &str, value: Val) -> ScopeResult<()> {
        self.scope.set(name, value)
    }

    /// Evaluate a function literal: capture the current scope
    pub fn closure(&self, body: impl Fn(&ScopeRef) -> ScopeResult<()> + 'static) -> Closure {
        Closure::new(body, Rc::clone(&self.scope))
    }

    /// Hand a closure to the scheduler
    pub fn schedule(&mut self, closure: Closure) {
        self.scheduled += 1;
        self.scheduler.schedule(closure.into_task());
    }

    /// `setTimeout(() => ...)`: create a closure here and schedule it
    pub fn defer(&mut self, body: impl Fn(&ScopeRef) -> ScopeResult<()> + 'static) {
        let closure = self.closure(body);
        self.schedule(closure);
    }

    /// Tasks scheduled through this context
    pub fn scheduled(&self) -> usize {
        self.scheduled
    }
}
