//! Runtime errors
//!
//! The interpreter has exactly one runtime failure: touching a name that no
//! scope in the chain defines. It is never recovered inside the interpreter.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// Raised by `Scope::get` / `Scope::set` when the name is unbound
    #[error("{0} is not defined")]
    UnboundVariable(String),
}

pub type ScopeResult<T> = std::result::Result<T, ScopeError>;
