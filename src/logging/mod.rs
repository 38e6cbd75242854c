//! Session logging
//!
//! [`Output`] is the print capability handed to user code. [`Logger`] owns a
//! session: it installs an [`Interceptor`] that mirrors every printed line
//! into `{dir}/{project}/{session_id}.log`, optionally starts experiment
//! trackers, and restores everything on stop.

mod interceptor;
mod logger;
mod output;
pub mod style;
mod tracker;

pub use interceptor::{format_entry, strip_ansi, timestamp, Interceptor};
pub use logger::{LogSession, Logger, LoggerState};
pub use output::{Origin, Output, PrintOptions};
pub use tracker::{Tracker, TrackerContext, TrackerFactory};
