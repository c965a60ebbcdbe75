//! Utilities for structured reporting of query and experiment results.
//!
//! A thread-local reporter collects key/value pairs within nested contexts
//! (kept alive through RAII guards) and dumps everything as a single JSON
//! object when reporting ends.
//! When no reporter is installed all reporting calls are no-ops, so library
//! code can report unconditionally.

use serde_json::{Map, Value};
use std::{cell::RefCell, mem::swap};

pub use serde_json::json;

#[derive(Debug, Default)]
pub struct Reporter {
    current: Map<String, Value>,
    context_stack: Vec<(String, Map<String, Value>)>,
}

impl Reporter {
    fn push_context(&mut self, key: String) {
        let mut parent = Map::new();
        swap(&mut parent, &mut self.current);
        self.context_stack.push((key, parent));
    }

    fn pop_context(&mut self) {
        let (key, mut parent) = self.context_stack.pop().expect("tried to pop from empty context");
        swap(&mut parent, &mut self.current);
        let prev = self.current.insert(key, Value::Object(parent));
        debug_assert!(prev.is_none());
    }

    fn report(&mut self, key: String, val: Value) {
        let prev = self.current.insert(key, val);
        if !cfg!(feature = "report-allow-override") {
            assert!(prev.is_none());
        }
    }
}

thread_local! {
    static REPORTER: RefCell<Option<Reporter>> = const { RefCell::new(None) };
}

#[must_use]
pub struct ContextGuard(());

impl Drop for ContextGuard {
    fn drop(&mut self) {
        REPORTER.with(|reporter| {
            if let Some(r) = reporter.borrow_mut().as_mut() {
                r.pop_context()
            }
        });
    }
}

pub fn push_context(key: String) -> ContextGuard {
    REPORTER.with(|reporter| {
        if let Some(r) = reporter.borrow_mut().as_mut() {
            r.push_context(key)
        }
    });
    ContextGuard(())
}

pub fn report(key: String, val: Value) {
    if cfg!(feature = "report-to-stderr") {
        eprintln!("{}: {}", key, val);
    }
    report_silent(key, val)
}

pub fn report_silent(key: String, val: Value) {
    REPORTER.with(|reporter| {
        if let Some(r) = reporter.borrow_mut().as_mut() {
            r.report(key, val)
        }
    });
}

#[must_use]
pub struct ReportingGuard(());

impl Drop for ReportingGuard {
    fn drop(&mut self) {
        REPORTER.with(|reporter| {
            if let Some(mut r) = reporter.borrow_mut().take() {
                assert!(r.context_stack.is_empty());
                let mut object = Map::new();
                swap(&mut object, &mut r.current);
                println!("{}", Value::Object(object));
            };
        });
    }
}

#[macro_export]
macro_rules! report {
    ($k:expr, $($json:tt)+) => { report($k.to_string(), json!($($json)+)) };
}

#[macro_export]
macro_rules! report_silent {
    ($k:expr, $($json:tt)+) => { report_silent($k.to_string(), json!($($json)+)) };
}

/// Install a reporter for the current thread.
/// The returned guard dumps everything reported as JSON on stdout when dropped.
pub fn enable_reporting(program: &str) -> ReportingGuard {
    REPORTER.with(|reporter| reporter.replace(Some(Reporter::default())));

    report!("program", program);
    report!("start_time", format!("{}", time::OffsetDateTime::now_utc()));
    report!("args", std::env::args().collect::<Vec<String>>());

    ReportingGuard(())
}

pub mod benchmark;
pub use self::benchmark::*;
