//! Tests for closures and the task queue

use crate::interpreter::{
    Closure, OutputSink, Recorder, Scheduler, Scope, ScopeError, ScopeKind, TaskQueue, Val,
};
use std::rc::Rc;

#[test]
fn test_closure_reads_through_definition_scope() {
    let global = Scope::global();
    global.create_variable("i", Val::from(1));
    let out = Recorder::new();

    let sink = out.clone();
    let closure = Closure::new(
        move |local| {
            sink.emit(local.get("i")?);
            Ok(())
        },
        global.clone(),
    );

    global.set("i", Val::from(2)).unwrap();
    closure.call().unwrap();

    // Captures the scope, not a copy of the value
    assert_eq!(out.values(), vec![Val::from(2)]);
}

#[test]
fn test_each_call_gets_a_fresh_local_scope() {
    let global = Scope::global();
    let seen = Recorder::new();

    let sink = seen.clone();
    let closure = Closure::new(
        move |local| {
            assert_eq!(local.kind(), ScopeKind::Call);
            assert_eq!(local.outer().map(|o| o.kind()), Some(ScopeKind::Global));
            // A local created in one call must not leak into the next
            sink.emit(Val::from(local.has_own("tmp")));
            local.create_variable("tmp", Val::from(1));
            Ok(())
        },
        global.clone(),
    );

    closure.call().unwrap();
    closure.call().unwrap();

    assert_eq!(seen.values(), vec![Val::from(false), Val::from(false)]);
    assert!(!global.has_own("tmp"));
}

#[test]
fn test_closure_can_mutate_captured_binding() {
    let global = Scope::global();
    global.create_variable("count", Val::from(0));

    let closure = Closure::new(
        |local| local.set("count", local.get("count")?.add(&Val::from(1))),
        global.clone(),
    );
    closure.call().unwrap();
    closure.call().unwrap();

    assert_eq!(global.get("count"), Ok(Val::from(2)));
}

#[test]
fn test_closure_propagates_unbound_variable() {
    let closure = Closure::new(|local| local.get("missing").map(|_| ()), Scope::global());

    assert_eq!(
        closure.call(),
        Err(ScopeError::UnboundVariable("missing".to_string()))
    );
}

#[test]
fn test_definition_scope_is_fixed() {
    let global = Scope::global();
    let closure = Closure::new(|_| Ok(()), global.clone());
    let copy = closure.clone();

    assert!(Rc::ptr_eq(closure.definition_scope(), &global));
    assert!(Rc::ptr_eq(copy.definition_scope(), &global));
}

#[test]
fn test_task_queue_runs_in_registration_order() {
    let out = Recorder::new();
    let mut queue = TaskQueue::new();

    for n in 0..3 {
        let sink = out.clone();
        queue.schedule(Box::new(move || {
            sink.emit(Val::from(n));
            Ok(())
        }));
    }

    assert_eq!(queue.len(), 3);
    assert!(out.is_empty(), "nothing runs before the queue is drained");

    let failures = queue.run_pending();

    assert!(failures.is_empty());
    assert!(queue.is_empty());
    assert_eq!(queue.total_scheduled(), 3);
    assert_eq!(out.values(), vec![Val::from(0), Val::from(1), Val::from(2)]);
}

#[test]
fn test_failing_task_does_not_stop_later_tasks() {
    let out = Recorder::new();
    let mut queue = TaskQueue::new();
    let global = Scope::global();

    queue.schedule(Closure::new(|local| local.get("nope").map(|_| ()), global.clone()).into_task());
    let sink = out.clone();
    queue.schedule(Box::new(move || {
        sink.emit(Val::from("after"));
        Ok(())
    }));

    let failures = queue.run_pending();

    assert_eq!(failures, vec![ScopeError::UnboundVariable("nope".to_string())]);
    assert_eq!(out.values(), vec![Val::from("after")]);
}
