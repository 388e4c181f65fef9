//! Deferred task scheduling
//!
//! Closures created inside a loop body are not called right away; they are
//! handed to a scheduler, the way a timer callback is queued by the host.
//! The only guarantees are that a task runs after the synchronous code that
//! scheduled it, and that tasks run in the order they were scheduled.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, warn};

use super::errors::{ScopeError, ScopeResult};

/// A zero-argument deferred callback
pub type Task = Box<dyn FnOnce() -> ScopeResult<()>>;

/// Accepts callbacks for later execution
pub trait Scheduler {
    fn schedule(&mut self, task: Task);
}

/* ===================== Task Queue ===================== */

/// FIFO in-process scheduler
///
/// Nothing runs until the owner calls [`TaskQueue::run_pending`], which is
/// how "after the synchronous code finishes" is expressed here.
#[derive(Default)]
pub struct TaskQueue {
    pending: VecDeque<Task>,
    total_scheduled: usize,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of tasks ever scheduled on this queue
    pub fn total_scheduled(&self) -> usize {
        self.total_scheduled
    }

    /// Run every pending task in registration order
    ///
    /// A failing task doesn't stop the ones after it. Failures are returned
    /// in the order they happened.
    pub fn run_pending(&mut self) -> Vec<ScopeError> {
        let mut failures = Vec::new();
        let mut ran = 0usize;

        while let Some(task) = self.pending.pop_front() {
            ran += 1;
            if let Err(err) = task() {
                warn!(error = %err, "deferred task failed");
                failures.push(err);
            }
        }

        debug!(ran, failed = failures.len(), "drained task queue");
        failures
    }
}

impl Scheduler for TaskQueue {
    fn schedule(&mut self, task: Task) {
        self.total_scheduled += 1;
        self.pending.push_back(task);
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.pending.len())
            .field("total_scheduled", &self.total_scheduled)
            .finish()
    }
}
