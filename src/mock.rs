//! Test doubles
//!
//! A capturing console writer and scripted tracker backends.

use crate::error::BoxError;
use crate::logging::{Tracker, TrackerContext, TrackerFactory};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Console writer whose contents can be read back
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Calls observed by a [`MockTracker`]
#[derive(Debug, Default)]
pub struct TrackerEvents {
    pub init_project: Option<String>,
    pub init_session: Option<String>,
    pub logged: Vec<(Option<u64>, Vec<(String, f64)>)>,
    pub finished: usize,
}

/// Tracker that records every call
pub struct MockTracker {
    events: Arc<Mutex<TrackerEvents>>,
    fail_log: bool,
}

impl Tracker for MockTracker {
    fn log(&mut self, step: Option<u64>, metrics: &[(&str, f64)]) -> Result<(), BoxError> {
        if self.fail_log {
            return Err("backend rejected metrics".into());
        }
        let metrics = metrics.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        self.events.lock().unwrap().logged.push((step, metrics));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), BoxError> {
        self.events.lock().unwrap().finished += 1;
        Ok(())
    }
}

/// Factory producing [`MockTracker`]s, or failing on demand
pub struct MockTrackerFactory {
    backend: String,
    events: Arc<Mutex<TrackerEvents>>,
    fail_init: bool,
    fail_log: bool,
}

impl MockTrackerFactory {
    pub fn new(backend: &str) -> Self {
        Self {
            backend: backend.to_string(),
            events: Arc::new(Mutex::new(TrackerEvents::default())),
            fail_init: false,
            fail_log: false,
        }
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn failing_log(mut self) -> Self {
        self.fail_log = true;
        self
    }

    pub fn events(&self) -> Arc<Mutex<TrackerEvents>> {
        Arc::clone(&self.events)
    }
}

impl TrackerFactory for MockTrackerFactory {
    fn backend(&self) -> &str {
        &self.backend
    }

    fn init(&self, ctx: &TrackerContext<'_>) -> Result<Box<dyn Tracker>, BoxError> {
        if self.fail_init {
            return Err("connection refused".into());
        }
        let mut events = self.events.lock().unwrap();
        events.init_project = Some(ctx.config.project.clone());
        events.init_session = Some(ctx.config.session_id.clone());
        Ok(Box::new(MockTracker {
            events: Arc::clone(&self.events),
            fail_log: self.fail_log,
        }))
    }
}
