//! Core execution loop
//!
//! `step()` advances the controller by exactly one phase. `run_until_done()`
//! calls it until the loop finishes or a clause fails.
//!
//! ## Failure
//! An `UnboundVariable` raised by any clause ends the loop on the spot: the
//! controller moves to `Done`, marks itself failed, points its current scope
//! back at the enclosing scope and hands the error to the caller. Tasks
//! already scheduled stay with the scheduler.

use std::rc::Rc;

use tracing::debug;

use super::controller::{LoopController, LoopReport, Step};
use super::errors::{ScopeError, ScopeResult};
use super::phases::{execute_afterthought, execute_body, execute_init, execute_setup, execute_test};
use super::scheduler::Scheduler;
use super::types::LoopPhase;

/* ===================== Public API ===================== */

/// Run the loop until it completes
pub fn run_until_done(
    ctl: &mut LoopController,
    scheduler: &mut dyn Scheduler,
) -> ScopeResult<LoopReport> {
    loop {
        match step(ctl, scheduler)? {
            Step::Continue => continue,
            Step::Done => break,
        }
    }

    let report = ctl.report();
    debug!(
        strategy = ?report.strategy,
        iterations = report.iterations,
        iteration_scopes = report.scopes.iteration_scopes,
        tasks = report.tasks_scheduled,
        "loop finished"
    );
    Ok(report)
}

/// Execute one phase of the loop
///
/// Calling `step` on a finished (or failed) loop is a no-op returning `Done`.
pub fn step(ctl: &mut LoopController, scheduler: &mut dyn Scheduler) -> ScopeResult<Step> {
    let result = match ctl.phase {
        LoopPhase::Done => return Ok(Step::Done),
        LoopPhase::Setup => execute_setup(ctl),
        LoopPhase::Init => execute_init(ctl),
        LoopPhase::Test => execute_test(ctl),
        LoopPhase::Body => execute_body(ctl, scheduler),
        LoopPhase::Afterthought => execute_afterthought(ctl),
    };

    if let Err(err) = result {
        abort(ctl, &err);
        return Err(err);
    }

    Ok(match ctl.phase {
        LoopPhase::Done => Step::Done,
        _ => Step::Continue,
    })
}

/* ===================== Failure ===================== */

fn abort(ctl: &mut LoopController, err: &ScopeError) {
    debug!(phase = ?ctl.phase, error = %err, "loop aborted");
    ctl.failed = true;
    ctl.phase = LoopPhase::Done;
    ctl.current = Rc::clone(&ctl.enclosing);
}
