//! Phase handlers
//!
//! Each loop phase has its own handler that does the phase's work, moves
//! the controller to the next phase and returns. Handlers never loop.
//!
//! Shared binding (`var`):
//!
//! ```text
//! Setup         declare variables in the enclosing scope
//! Init          run init against the enclosing scope
//! Test          false -> Done
//! Body          block scope (outer = enclosing), run statements
//! Afterthought  mutate the one shared binding -> Test
//! ```
//!
//! Per-iteration binding (`let`):
//!
//! ```text
//! Setup         loop scope (outer = enclosing), declare variables there
//! Init          run init against the loop scope, then copy forward
//!               into the first iteration scope
//! Test          false -> Done
//! Body          block scope (outer = iteration scope), run statements,
//!               then copy forward into the next iteration scope
//! Afterthought  mutate the binding in the *new* iteration scope -> Test
//! ```
//!
//! "Copy forward" always parents the new iteration scope on the enclosing
//! scope, making it a sibling of the loop scope rather than a child of the
//! scope it copies from. Nothing keeps the loop scope alive once the first
//! iteration scope exists.

use std::rc::Rc;

use tracing::{debug, trace};

use super::controller::LoopController;
use super::errors::ScopeResult;
use super::program::BodyContext;
use super::scheduler::Scheduler;
use super::scope::ScopeKind;
use super::types::{BindingStrategy, LoopPhase};

/* ===================== Phase Handlers ===================== */

/// Declare the loop variables
pub fn execute_setup(ctl: &mut LoopController) -> ScopeResult<()> {
    match ctl.strategy {
        BindingStrategy::SharedBinding => {
            for name in &ctl.program.variables {
                ctl.enclosing.declare(name.as_str());
            }
            ctl.current = Rc::clone(&ctl.enclosing);
        }
        BindingStrategy::PerIterationBinding => {
            let loop_scope = ctl.enclosing.child(ScopeKind::Loop);
            for name in &ctl.program.variables {
                loop_scope.declare(name.as_str());
            }
            debug!(
                loop_scope = loop_scope.id(),
                variables = ?ctl.program.variables,
                "created loop scope"
            );
            ctl.record_scope(ScopeKind::Loop);
            ctl.current = loop_scope;
        }
    }

    ctl.phase = LoopPhase::Init;
    Ok(())
}

/// Run the initializer
pub fn execute_init(ctl: &mut LoopController) -> ScopeResult<()> {
    (ctl.program.init)(&ctl.current)?;

    if ctl.strategy == BindingStrategy::PerIterationBinding {
        copy_forward(ctl)?;
    }

    ctl.phase = LoopPhase::Test;
    Ok(())
}

/// Evaluate the predicate
pub fn execute_test(ctl: &mut LoopController) -> ScopeResult<()> {
    if (ctl.program.test)(&ctl.current)? {
        ctl.phase = LoopPhase::Body;
    } else {
        finish(ctl)?;
    }
    Ok(())
}

/// Run one execution of the body
///
/// An empty body creates no block scope.
pub fn execute_body(ctl: &mut LoopController, scheduler: &mut dyn Scheduler) -> ScopeResult<()> {
    if !ctl.program.body.is_empty() {
        let block = ctl.current.child(ScopeKind::Block);
        ctl.record_scope(ScopeKind::Block);

        let statements = ctl.program.body.clone();
        let mut cx = BodyContext::new(block, scheduler);
        let result = statements
            .iter()
            .try_for_each(|statement| statement(&mut cx));

        // Count tasks even when a later statement failed; they are already queued
        ctl.tasks_scheduled += cx.scheduled();
        result?;
    }

    ctl.iterations += 1;

    if ctl.strategy == BindingStrategy::PerIterationBinding {
        copy_forward(ctl)?;
    }

    ctl.phase = LoopPhase::Afterthought;
    Ok(())
}

/// Run the update clause
pub fn execute_afterthought(ctl: &mut LoopController) -> ScopeResult<()> {
    (ctl.program.afterthought)(&ctl.current)?;
    ctl.phase = LoopPhase::Test;
    Ok(())
}

/* ===================== Scope Transitions ===================== */

/// Create the next iteration scope from the current one
///
/// Every loop variable is copied in declaration order.
fn copy_forward(ctl: &mut LoopController) -> ScopeResult<()> {
    let from = Rc::clone(&ctl.current);
    let next = ctl.enclosing.child(ScopeKind::Iteration);

    for name in &ctl.program.variables {
        let value = from.get(name)?;
        trace!(
            from = from.id(),
            to = next.id(),
            name = name.as_str(),
            value = %value,
            "copied loop variable"
        );
        next.create_variable(name.as_str(), value);
    }

    ctl.record_scope(ScopeKind::Iteration);
    ctl.current = next;
    Ok(())
}

/// Leave the loop: remember the final values and return to the enclosing scope
fn finish(ctl: &mut LoopController) -> ScopeResult<()> {
    ctl.final_bindings = ctl
        .program
        .variables
        .iter()
        .map(|name| ctl.current.get(name).map(|value| (name.clone(), value)))
        .collect::<ScopeResult<_>>()?;

    ctl.current = Rc::clone(&ctl.enclosing);
    ctl.phase = LoopPhase::Done;
    Ok(())
}
