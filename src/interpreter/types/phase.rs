//! Loop lifecycle phases and binding strategies

use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution phase of a counting loop
///
/// ```text
/// Setup -> Init -> Test -> Body -> Afterthought -> Test -> ... -> Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum LoopPhase {
    /// Create the loop variables (in the enclosing scope, or in a fresh loop scope)
    Setup = 0,
    /// Run the initializer, then derive the first iteration scope if needed
    Init = 1,
    /// Evaluate the loop predicate
    Test = 2,
    /// Run the body statements in a block scope
    Body = 3,
    /// Run the update expression
    Afterthought = 4,
    /// Loop finished, either normally or by a fatal error
    Done = 5,
}

/// How the loop variable was declared in source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Declaration {
    /// `for (var i = ...)`
    Var,
    /// `for (let i = ...)`
    Let,
}

/// Which scoping protocol governs the loop variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingStrategy {
    /// One binding in the enclosing scope, mutated in place by every iteration
    SharedBinding,
    /// A fresh binding per iteration, copied forward from the previous one
    PerIterationBinding,
}

impl From<Declaration> for BindingStrategy {
    fn from(declaration: Declaration) -> Self {
        match declaration {
            Declaration::Var => BindingStrategy::SharedBinding,
            Declaration::Let => BindingStrategy::PerIterationBinding,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Var => write!(f, "var"),
            Declaration::Let => write!(f, "let"),
        }
    }
}

impl fmt::Display for BindingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingStrategy::SharedBinding => write!(f, "shared binding"),
            BindingStrategy::PerIterationBinding => write!(f, "per-iteration binding"),
        }
    }
}
