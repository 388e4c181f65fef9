//! Type definitions for the loop interpreter
//!
//! - Runtime values (Val)
//! - Loop phases and binding strategies (LoopPhase, Declaration, BindingStrategy)

pub mod phase;
pub mod values;

pub use phase::{BindingStrategy, Declaration, LoopPhase};
pub use values::Val;
