//! Test helpers for interpreter tests
//!
//! Common builders for counting loops and logging bodies

use crate::interpreter::{
    BodyContext, Declaration, ForLoop, LoopController, LoopReport, OutputSink, Recorder, Scope,
    ScopeRef, ScopeResult, TaskQueue, Val,
};

/// `for (<declaration> i = 0; i < n; i++)` with an empty body
pub fn counting_loop(declaration: Declaration, n: u32) -> ForLoop {
    ForLoop::new(declaration, ["i"])
        .init(|s| s.set("i", Val::from(0)))
        .test(move |s| Ok(s.get("i")?.lt(&Val::from(n))))
        .afterthought(|s| s.set("i", s.get("i")?.add(&Val::from(1))))
}

/// Body statement `setTimeout(() => log(<name>))`
pub fn defer_log(
    out: &Recorder,
    name: &'static str,
) -> impl Fn(&mut BodyContext<'_>) -> ScopeResult<()> + 'static {
    let out = out.clone();
    move |cx: &mut BodyContext<'_>| {
        let out = out.clone();
        cx.defer(move |local| {
            out.emit(local.get(name)?);
            Ok(())
        });
        Ok(())
    }
}

/// Body statement `log(<name>)`
pub fn log_now(
    out: &Recorder,
    name: &'static str,
) -> impl Fn(&mut BodyContext<'_>) -> ScopeResult<()> + 'static {
    let out = out.clone();
    move |cx: &mut BodyContext<'_>| {
        out.emit(cx.get(name)?);
        Ok(())
    }
}

/// Run a loop against a fresh global scope and return everything needed to inspect it
pub fn run_in_global(program: ForLoop) -> (ScopeRef, TaskQueue, LoopReport) {
    let global = Scope::global();
    let mut queue = TaskQueue::new();
    let report = LoopController::new(program, global.clone())
        .run(&mut queue)
        .expect("loop failed");
    (global, queue, report)
}

pub fn nums(values: &[f64]) -> Vec<Val> {
    values.iter().map(|n| Val::Num(*n)).collect()
}
