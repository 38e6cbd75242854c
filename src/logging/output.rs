//! The swappable print capability
//!
//! [`Output`] is a cloneable handle to the program's console writer. A
//! [`Logger`](super::Logger) installs an [`Interceptor`] on it for the
//! duration of a session; while installed, every printed line is also
//! appended, timestamped and without colors, to the session log file. The
//! console always receives the original text.

use super::interceptor::Interceptor;
use super::style::{paint, GREEN, RED, YELLOW};
use crate::error::LoggerError;
use std::fmt::{self, Display};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Where a printed line comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Printed by user code
    User,
    /// Status messages emitted by fenn itself
    System,
}

/// Separator and terminator for [`Output::print`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    pub sep: String,
    pub end: String,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            sep: " ".to_string(),
            end: "\n".to_string(),
        }
    }
}

struct OutputState {
    console: Box<dyn Write + Send>,
    interceptor: Option<Interceptor>,
}

/// Shared handle to the console sink
#[derive(Clone)]
pub struct Output {
    state: Arc<Mutex<OutputState>>,
}

impl Output {
    /// Output writing to the process stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Output writing to an arbitrary console writer
    pub fn new<W: Write + Send + 'static>(console: W) -> Self {
        Self {
            state: Arc::new(Mutex::new(OutputState {
                console: Box::new(console),
                interceptor: None,
            })),
        }
    }

    /// Print `objects` joined by `options.sep`, followed by `options.end`
    pub fn print(&self, objects: &[&dyn Display], options: &PrintOptions) -> io::Result<()> {
        self.emit(objects, options, Origin::User)
    }

    /// Print a single line
    pub fn println(&self, message: impl Display) -> io::Result<()> {
        self.print(&[&message], &PrintOptions::default())
    }

    pub fn system_info(&self, message: &str) -> io::Result<()> {
        self.system(GREEN, message)
    }

    pub fn system_warning(&self, message: &str) -> io::Result<()> {
        self.system(YELLOW, message)
    }

    pub fn system_error(&self, message: &str) -> io::Result<()> {
        self.system(RED, message)
    }

    /// Whether an interceptor is currently installed
    pub fn is_intercepted(&self) -> bool {
        self.lock().interceptor.is_some()
    }

    /// Install `interceptor`; only one may be active at a time
    pub(crate) fn intercept(&self, interceptor: Interceptor) -> Result<(), LoggerError> {
        let mut state = self.lock();
        if state.interceptor.is_some() {
            return Err(LoggerError::SinkBusy);
        }
        log::debug!("Intercepting output to {}", interceptor.log_file().display());
        state.interceptor = Some(interceptor);
        Ok(())
    }

    /// Remove the installed interceptor, if any
    pub(crate) fn restore(&self) -> Option<Interceptor> {
        self.lock().interceptor.take()
    }

    fn system(&self, color: &str, message: &str) -> io::Result<()> {
        let line = paint(color, &format!("[fenn] {}", message));
        self.emit(&[&line], &PrintOptions::default(), Origin::System)
    }

    fn emit(
        &self,
        objects: &[&dyn Display],
        options: &PrintOptions,
        origin: Origin,
    ) -> io::Result<()> {
        let line = objects
            .iter()
            .map(|o| o.to_string())
            .collect::<Vec<_>>()
            .join(&options.sep);

        let mut state = self.lock();

        let recorded = match &state.interceptor {
            Some(interceptor) => interceptor.record(&line, origin),
            None => Ok(()),
        };

        state.console.write_all(line.as_bytes())?;
        state.console.write_all(options.end.as_bytes())?;
        state.console.flush()?;

        recorded
    }

    fn lock(&self) -> MutexGuard<'_, OutputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("intercepted", &self.is_intercepted())
            .finish()
    }
}
