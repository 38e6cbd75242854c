//! Session logger
//!
//! Owns the lifecycle of one logging session: the log file, the interceptor
//! installed on the [`Output`], and any tracker sessions.

use super::interceptor::Interceptor;
use super::output::Output;
use super::style::{GREEN, LIGHT_YELLOW};
use super::tracker::{Tracker, TrackerContext, TrackerFactory};
use crate::config::Config;
use crate::error::LoggerError;
use crate::secrets::CredentialStore;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;

/// Logger lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    Uninitialized,
    Started,
    Stopped,
}

impl LoggerState {
    fn as_str(&self) -> &'static str {
        match self {
            LoggerState::Uninitialized => "uninitialized",
            LoggerState::Started => "started",
            LoggerState::Stopped => "stopped",
        }
    }
}

/// Where one session's log lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSession {
    /// Session identifier
    pub id: String,
    /// `{logger.dir}/{project}`
    pub dir: PathBuf,
    /// `{logger.dir}/{project}/{session_id}.log`
    pub file: PathBuf,
}

impl LogSession {
    /// Derive the log location from a configuration
    pub fn for_config(config: &Config) -> Self {
        let dir = config.logger.dir.join(&config.project);
        let file = dir.join(format!("{}.log", config.session_id));
        Self {
            id: config.session_id.clone(),
            dir,
            file,
        }
    }
}

struct ActiveTracker {
    backend: String,
    tracker: Box<dyn Tracker>,
}

/// Session logger
///
/// `start` is valid once. `stop` is safe from any state and also runs on
/// drop, so the original output is restored on every exit path.
pub struct Logger {
    output: Output,
    credentials: Arc<dyn CredentialStore>,
    factories: Vec<Box<dyn TrackerFactory>>,
    state: LoggerState,
    session: Option<LogSession>,
    trackers: Vec<ActiveTracker>,
}

impl Logger {
    /// Create a logger for `output`
    pub fn new(output: Output, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            output,
            credentials,
            factories: Vec::new(),
            state: LoggerState::Uninitialized,
            session: None,
            trackers: Vec::new(),
        }
    }

    /// Make a tracker backend available to `start`
    pub fn register_tracker(&mut self, factory: Box<dyn TrackerFactory>) {
        self.factories.push(factory);
    }

    pub fn with_tracker(mut self, factory: Box<dyn TrackerFactory>) -> Self {
        self.register_tracker(factory);
        self
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn state(&self) -> LoggerState {
        self.state
    }

    /// The current session, once started
    pub fn session(&self) -> Option<&LogSession> {
        self.session.as_ref()
    }

    /// Backends with a running tracker session
    pub fn active_trackers(&self) -> Vec<&str> {
        self.trackers.iter().map(|t| t.backend.as_str()).collect()
    }

    /// Open the session log and start intercepting output
    ///
    /// A tracker block with no registered backend only produces a warning.
    /// A backend that fails to start aborts with
    /// [`LoggerError::TrackerInitFailed`] after everything acquired so far
    /// has been released.
    pub fn start(&mut self, config: &Config) -> Result<(), LoggerError> {
        if self.state != LoggerState::Uninitialized {
            return Err(LoggerError::InvalidState {
                operation: "start",
                state: self.state.as_str(),
            });
        }

        let session = LogSession::for_config(config);

        // Claim the sink before touching a log file another session may own.
        self.output.intercept(Interceptor::new(
            session.file.clone(),
            config.logger.log_system_messages,
        ))?;

        if let Err(e) = create_log_file(&session) {
            self.output.restore();
            return Err(e.into());
        }

        log::debug!("Logger started for session {}", session.id);
        self.state = LoggerState::Started;
        self.session = Some(session);

        if let Err(e) = self.announce_and_start_trackers(config) {
            self.stop();
            return Err(e);
        }

        Ok(())
    }

    fn announce_and_start_trackers(&mut self, config: &Config) -> Result<(), LoggerError> {
        if let Some(session) = &self.session {
            self.output.system_info(&format!(
                "Logging file {LIGHT_YELLOW}{}.log{GREEN} created in \
                 {LIGHT_YELLOW}{}{GREEN} directory.",
                session.id,
                session.dir.display()
            ))?;
        }
        self.start_trackers(config)
    }

    fn start_trackers(&mut self, config: &Config) -> Result<(), LoggerError> {
        for (backend, settings) in config.tracker_blocks() {
            let Some(factory) = self.factories.iter().find(|f| f.backend() == backend) else {
                log::warn!("No {} tracker backend registered, tracking disabled", backend);
                self.output.system_warning(&format!(
                    "{backend} is configured but no {backend} backend is available. \
                     Tracking with {backend} is disabled."
                ))?;
                continue;
            };

            let ctx = TrackerContext {
                config,
                settings,
                credentials: self.credentials.as_ref(),
            };

            match factory.init(&ctx) {
                Ok(tracker) => {
                    self.trackers.push(ActiveTracker {
                        backend: backend.to_string(),
                        tracker,
                    });
                    self.output
                        .system_info(&format!("{} session initialized.", backend))?;
                }
                Err(e) => {
                    let _ = self
                        .output
                        .system_error(&format!("Failed to start {} session.", backend));
                    return Err(LoggerError::TrackerInitFailed {
                        backend: backend.to_string(),
                        detail: e.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Forward metrics to every running tracker
    ///
    /// Every tracker receives the metrics even if an earlier one fails; the
    /// first failure is returned.
    pub fn log_metrics(
        &mut self,
        step: Option<u64>,
        metrics: &[(&str, f64)],
    ) -> Result<(), LoggerError> {
        if self.state != LoggerState::Started {
            return Err(LoggerError::InvalidState {
                operation: "log metrics",
                state: self.state.as_str(),
            });
        }

        let mut first_error = None;
        for active in &mut self.trackers {
            if let Err(e) = active.tracker.log(step, metrics) {
                log::warn!("{} tracker rejected metrics: {}", active.backend, e);
                first_error.get_or_insert(LoggerError::Tracker {
                    backend: active.backend.clone(),
                    detail: e.to_string(),
                });
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Restore the original output and close tracker sessions
    pub fn stop(&mut self) {
        if self.state != LoggerState::Started {
            return;
        }

        self.output.restore();

        for mut active in self.trackers.drain(..) {
            if let Err(e) = active.tracker.finish() {
                log::warn!("Failed to finish {} tracker: {}", active.backend, e);
            }
        }

        self.state = LoggerState::Stopped;
        log::debug!("Logger stopped");
    }
}

fn create_log_file(session: &LogSession) -> std::io::Result<()> {
    fs::create_dir_all(&session.dir)?;
    File::create(&session.file)?;
    Ok(())
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.stop();
    }
}
