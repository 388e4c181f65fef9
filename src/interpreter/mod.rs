//! # Loop Interpreter - Scope Chains and Per-Iteration Bindings
//!
//! Models how a lexically scoped language resolves names through nested
//! scopes, and why closures created in `for (let i ...)` each see their own
//! `i` while closures created in `for (var i ...)` all see the last one.
//!
//! ## Core Principles
//!
//! 1. **Shared scopes**: scopes are `Rc`-shared so a captured scope outlives the loop
//! 2. **Explicit scope passing**: every clause receives the scope it runs against
//! 3. **Phase-driven loop**: `LoopController` advances one `LoopPhase` per `step()`
//! 4. **Deferred closures**: bodies hand closures to a `Scheduler`; nothing runs early
//!
//! ## Example
//!
//! ```
//! use loopscope_core::interpreter::{Declaration, ForLoop, LoopController, Scope, TaskQueue, Val};
//! use loopscope_core::interpreter::{OutputSink, Recorder};
//!
//! let out = Recorder::new();
//! let sink = out.clone();
//! let program = ForLoop::new(Declaration::Let, ["i"])
//!     .init(|s| s.set("i", Val::from(0)))
//!     .test(|s| Ok(s.get("i")?.lt(&Val::from(3))))
//!     .afterthought(|s| s.set("i", s.get("i")?.add(&Val::from(1))))
//!     .statement(move |cx| {
//!         let sink = sink.clone();
//!         cx.defer(move |local| {
//!             sink.emit(local.get("i")?);
//!             Ok(())
//!         });
//!         Ok(())
//!     });
//!
//! let mut queue = TaskQueue::new();
//! LoopController::new(program, Scope::global()).run(&mut queue).unwrap();
//! queue.run_pending();
//!
//! assert_eq!(out.values(), vec![Val::from(0), Val::from(1), Val::from(2)]);
//! ```

pub mod closure;
pub mod controller;
pub mod errors;
pub mod exec_loop;
pub mod phases;
pub mod program;
pub mod scheduler;
pub mod scope;
pub mod sink;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use closure::Closure;
pub use controller::{LoopController, LoopReport, ScopeStats, Step};
pub use errors::{ScopeError, ScopeResult};
pub use exec_loop::{run_until_done, step};
pub use program::{BodyContext, ForLoop};
pub use scheduler::{Scheduler, Task, TaskQueue};
pub use scope::{Scope, ScopeKind, ScopeRef};
pub use sink::{ConsoleSink, OutputSink, Recorder};
pub use types::{BindingStrategy, Declaration, LoopPhase, Val};
