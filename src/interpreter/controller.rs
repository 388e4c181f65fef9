//! Loop controller state
//!
//! The controller holds everything needed to drive one counting loop:
//! - phase: where in the loop lifecycle we are
//! - enclosing: the scope that was current when the loop was entered
//! - current: the scope the next clause runs against
//!
//! The phase handlers live in `phases.rs` and the driver in `exec_loop.rs`.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::errors::ScopeResult;
use super::exec_loop::run_until_done;
use super::program::ForLoop;
use super::scheduler::Scheduler;
use super::scope::{ScopeKind, ScopeRef};
use super::types::{BindingStrategy, Declaration, LoopPhase, Val};

/* ===================== Controller ===================== */

#[derive(Debug)]
pub struct LoopController {
    pub(super) program: ForLoop,
    pub(super) strategy: BindingStrategy,
    pub(super) phase: LoopPhase,

    /// Scope that was current at loop entry; restored when the loop ends
    pub(super) enclosing: ScopeRef,

    /// Scope the next clause runs against
    pub(super) current: ScopeRef,

    pub(super) stats: ScopeStats,
    pub(super) iterations: usize,
    pub(super) tasks_scheduled: usize,
    pub(super) failed: bool,

    /// Loop variable values as they stood when the loop finished
    pub(super) final_bindings: BTreeMap<String, Val>,
}

impl LoopController {
    /// Prepare a loop entered while `enclosing` is the current scope
    ///
    /// Nothing runs until the first `step`.
    pub fn new(program: ForLoop, enclosing: ScopeRef) -> Self {
        let strategy = program.strategy();
        Self {
            program,
            strategy,
            phase: LoopPhase::Setup,
            current: Rc::clone(&enclosing),
            enclosing,
            stats: ScopeStats::default(),
            iterations: 0,
            tasks_scheduled: 0,
            failed: false,
            final_bindings: BTreeMap::new(),
        }
    }

    /// Drive the loop to completion
    pub fn run(&mut self, scheduler: &mut dyn Scheduler) -> ScopeResult<LoopReport> {
        run_until_done(self, scheduler)
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn strategy(&self) -> BindingStrategy {
        self.strategy
    }

    pub fn current_scope(&self) -> &ScopeRef {
        &self.current
    }

    pub fn enclosing_scope(&self) -> &ScopeRef {
        &self.enclosing
    }

    /// Completed body executions
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub(super) fn record_scope(&mut self, kind: ScopeKind) {
        match kind {
            ScopeKind::Loop => self.stats.loop_scopes += 1,
            ScopeKind::Iteration => self.stats.iteration_scopes += 1,
            ScopeKind::Block => self.stats.block_scopes += 1,
            ScopeKind::Global | ScopeKind::Call => {}
        }
    }

    pub fn report(&self) -> LoopReport {
        LoopReport {
            declaration: self.program.declaration,
            strategy: self.strategy,
            phase: self.phase,
            failed: self.failed,
            iterations: self.iterations,
            scopes: self.stats,
            tasks_scheduled: self.tasks_scheduled,
            final_bindings: self.final_bindings.clone(),
        }
    }
}

/* ===================== Reporting ===================== */

/// Scopes the controller created, by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeStats {
    pub loop_scopes: usize,
    pub iteration_scopes: usize,
    pub block_scopes: usize,
}

/// Summary of one loop run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopReport {
    pub declaration: Declaration,
    pub strategy: BindingStrategy,
    pub phase: LoopPhase,
    pub failed: bool,
    pub iterations: usize,
    pub scopes: ScopeStats,
    pub tasks_scheduled: usize,
    pub final_bindings: BTreeMap<String, Val>,
}

/* ===================== Step Result ===================== */

/// Result of executing one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Continue to next step
    Continue,
    /// Loop complete
    Done,
}
