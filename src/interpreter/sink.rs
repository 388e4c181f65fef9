//! Output sinks
//!
//! Whatever a closure body wants to report (the `console.log` of the
//! demonstrations) goes through an [`OutputSink`].

use std::cell::RefCell;
use std::rc::Rc;

use super::types::Val;

pub trait OutputSink {
    fn emit(&self, value: Val);
}

impl<S: OutputSink + ?Sized> OutputSink for Rc<S> {
    fn emit(&self, value: Val) {
        (**self).emit(value)
    }
}

/// Emits to both sinks, left first
impl<A: OutputSink, B: OutputSink> OutputSink for (A, B) {
    fn emit(&self, value: Val) {
        self.0.emit(value.clone());
        self.1.emit(value);
    }
}

/// Collects emitted values; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    values: Rc<RefCell<Vec<Val>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn values(&self) -> Vec<Val> {
        self.values.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl OutputSink for Recorder {
    fn emit(&self, value: Val) {
        self.values.borrow_mut().push(value);
    }
}

/// Prints each value on its own line to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn emit(&self, value: Val) {
        println!("{value}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_clones_share_buffer() {
        let recorder = Recorder::new();
        let clone = recorder.clone();

        clone.emit(Val::from(1));

        assert_eq!(recorder.values(), vec![Val::from(1)]);
    }

    #[test]
    fn test_pair_emits_to_both_sinks() {
        let left = Recorder::new();
        let right = Recorder::new();
        let pair: Rc<dyn OutputSink> = Rc::new((left.clone(), right.clone()));

        pair.emit(Val::from(0));
        pair.emit(Val::from("done"));

        assert_eq!(left.values(), vec![Val::from(0), Val::from("done")]);
        assert_eq!(left.values(), right.values());
    }

    #[test]
    fn test_console_sink_in_pair() {
        let recorder = Recorder::new();
        let sink = (ConsoleSink, recorder.clone());

        sink.emit(Val::from(2));

        assert_eq!(recorder.len(), 1);
    }
}
