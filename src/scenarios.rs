//! Prebuilt counting loops
//!
//! Each scenario is one of the classic demonstrations of loop-variable
//! capture, built for `for (<declaration> i = 0; i < n; i++)`:
//!
//! - `direct-log`: the body logs `i` synchronously
//! - `deferred-log`: the body schedules `() => log(i)` for later
//! - `multi-variable`: `for (<declaration> i = 0, n = N; i < n; i++)` with a deferred log of `i`
//!
//! `run_scenario` runs the loop, drains the task queue and reports what was
//! logged.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::interpreter::{
    BodyContext, Declaration, ForLoop, LoopController, LoopReport, OutputSink, Recorder, Scope,
    ScopeRef, ScopeResult, TaskQueue, Val,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    DirectLog,
    DeferredLog,
    MultiVariable,
}

/// What a scenario run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRun {
    pub scenario: Scenario,
    pub report: LoopReport,
    /// Every logged value, synchronous ones first, then deferred ones in queue order
    pub outputs: Vec<Val>,
    /// How many of `outputs` were logged while the loop itself was running
    pub synchronous_outputs: usize,
    /// Errors raised by deferred closures
    pub deferred_failures: Vec<String>,
}

/// Build the loop for `scenario`, logging into `sink`
pub fn build_scenario(
    scenario: Scenario,
    declaration: Declaration,
    iterations: u32,
    sink: Rc<dyn OutputSink>,
) -> ForLoop {
    match scenario {
        Scenario::DirectLog => counting_loop(declaration, iterations).statement(
            move |cx: &mut BodyContext<'_>| {
                sink.emit(cx.get("i")?);
                Ok(())
            },
        ),
        Scenario::DeferredLog => {
            counting_loop(declaration, iterations).statement(deferred_log(sink))
        }
        Scenario::MultiVariable => ForLoop::new(declaration, ["i", "n"])
            .init(move |s| {
                s.set("i", Val::from(0))?;
                s.set("n", Val::from(iterations))
            })
            .test(|s| Ok(s.get("i")?.lt(&s.get("n")?)))
            .afterthought(increment_i)
            .statement(deferred_log(sink)),
    }
}

/// Run a scenario in a fresh global scope and drain its deferred tasks
pub fn run_scenario(
    scenario: Scenario,
    declaration: Declaration,
    iterations: u32,
) -> ScopeResult<ScenarioRun> {
    run_scenario_with(scenario, declaration, iterations, None)
}

/// Like [`run_scenario`], also passing every logged value to `echo` as it is emitted
pub fn run_scenario_with(
    scenario: Scenario,
    declaration: Declaration,
    iterations: u32,
    echo: Option<Rc<dyn OutputSink>>,
) -> ScopeResult<ScenarioRun> {
    let recorder = Recorder::new();
    let sink: Rc<dyn OutputSink> = match echo {
        Some(echo) => Rc::new((recorder.clone(), echo)),
        None => Rc::new(recorder.clone()),
    };
    let program = build_scenario(scenario, declaration, iterations, sink);

    let mut queue = TaskQueue::new();
    let report = LoopController::new(program, Scope::global()).run(&mut queue)?;
    let synchronous_outputs = recorder.len();

    let deferred_failures = queue
        .run_pending()
        .into_iter()
        .map(|err| err.to_string())
        .collect();

    info!(
        ?scenario,
        %declaration,
        iterations,
        logged = recorder.len(),
        "scenario complete"
    );

    Ok(ScenarioRun {
        scenario,
        report,
        outputs: recorder.values(),
        synchronous_outputs,
        deferred_failures,
    })
}

/* ===================== Building Blocks ===================== */

/// `for (<declaration> i = 0; i < n; i++)` without a body
fn counting_loop(declaration: Declaration, n: u32) -> ForLoop {
    ForLoop::new(declaration, ["i"])
        .init(|s| s.set("i", Val::from(0)))
        .test(move |s| Ok(s.get("i")?.lt(&Val::from(n))))
        .afterthought(increment_i)
}

fn increment_i(scope: &ScopeRef) -> ScopeResult<()> {
    scope.set("i", scope.get("i")?.add(&Val::from(1)))
}

/// `setTimeout(() => log(i))`
fn deferred_log(
    sink: Rc<dyn OutputSink>,
) -> impl Fn(&mut BodyContext<'_>) -> ScopeResult<()> + 'static {
    move |cx: &mut BodyContext<'_>| {
        let sink = Rc::clone(&sink);
        cx.defer(move |local| {
            sink.emit(local.get("i")?);
            Ok(())
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(values: &[f64]) -> Vec<Val> {
        values.iter().map(|n| Val::Num(*n)).collect()
    }

    #[test]
    fn test_deferred_log_let() {
        let run = run_scenario(Scenario::DeferredLog, Declaration::Let, 3).unwrap();

        assert_eq!(run.outputs, nums(&[0.0, 1.0, 2.0]));
        assert_eq!(run.synchronous_outputs, 0);
        assert!(run.deferred_failures.is_empty());
    }

    #[test]
    fn test_deferred_log_var() {
        let run = run_scenario(Scenario::DeferredLog, Declaration::Var, 3).unwrap();

        assert_eq!(run.outputs, nums(&[3.0, 3.0, 3.0]));
        assert_eq!(run.report.tasks_scheduled, 3);
    }

    #[test]
    fn test_direct_log_is_synchronous_for_both_declarations() {
        for declaration in [Declaration::Var, Declaration::Let] {
            let run = run_scenario(Scenario::DirectLog, declaration, 3).unwrap();

            assert_eq!(run.outputs, nums(&[0.0, 1.0, 2.0]));
            assert_eq!(run.synchronous_outputs, 3);
            assert_eq!(run.report.tasks_scheduled, 0);
        }
    }

    #[test]
    fn test_multi_variable() {
        let let_run = run_scenario(Scenario::MultiVariable, Declaration::Let, 4).unwrap();
        let var_run = run_scenario(Scenario::MultiVariable, Declaration::Var, 4).unwrap();

        assert_eq!(let_run.outputs, nums(&[0.0, 1.0, 2.0, 3.0]));
        assert_eq!(var_run.outputs, nums(&[4.0, 4.0, 4.0, 4.0]));
        assert_eq!(let_run.report.final_bindings.len(), 2);
    }

    #[test]
    fn test_echo_sees_values_in_emit_order() {
        let echo = Recorder::new();
        let run = run_scenario_with(
            Scenario::DeferredLog,
            Declaration::Var,
            2,
            Some(Rc::new(echo.clone())),
        )
        .unwrap();

        assert_eq!(echo.values(), nums(&[2.0, 2.0]));
        assert_eq!(echo.values(), run.outputs);
    }

    #[test]
    fn test_zero_iterations_logs_nothing() {
        let run = run_scenario(Scenario::DeferredLog, Declaration::Let, 0).unwrap();

        assert!(run.outputs.is_empty());
        assert_eq!(run.report.iterations, 0);
    }

    #[test]
    fn test_run_serializes_to_json() {
        let run = run_scenario(Scenario::DeferredLog, Declaration::Let, 1).unwrap();
        let json = serde_json::to_value(&run).unwrap();

        assert_eq!(json["scenario"], "deferred-log");
        assert_eq!(json["report"]["declaration"], "let");
        assert_eq!(json["report"]["strategy"], "per_iteration_binding");
        assert_eq!(json["report"]["scopes"]["iteration_scopes"], 2);
    }
}
