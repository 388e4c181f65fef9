pub mod cli;
pub mod config;
pub mod interpreter;
pub mod scenarios;

// Re-export main types
pub use interpreter::{
    BindingStrategy, Closure, Declaration, ForLoop, LoopController, LoopReport, Scope, ScopeError,
    ScopeRef, TaskQueue, Val,
};
pub use scenarios::{run_scenario, run_scenario_with, Scenario, ScenarioRun};
