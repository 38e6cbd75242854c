//! Experiment-tracker seam
//!
//! Trackers are external metric backends (Weights & Biases, TensorBoard, ...).
//! fenn ships no client for them; host programs register a
//! [`TrackerFactory`] per backend and the logger starts one when the
//! configuration carries that backend's block.

use crate::config::Config;
use crate::error::BoxError;
use crate::secrets::CredentialStore;
use serde_yml::Value;

/// A running tracker session
pub trait Tracker: Send {
    /// Record numeric metrics, optionally at a training step
    fn log(&mut self, step: Option<u64>, metrics: &[(&str, f64)]) -> Result<(), BoxError>;

    /// Flush and close the session
    fn finish(&mut self) -> Result<(), BoxError>;
}

/// What a backend sees when it is initialized
pub struct TrackerContext<'a> {
    /// Full session configuration (`project`, `session_id`, user keys)
    pub config: &'a Config,
    /// This backend's configuration block
    pub settings: &'a Value,
    /// Credential lookup, e.g. for `WANDB_API_KEY`
    pub credentials: &'a dyn CredentialStore,
}

/// Creates tracker sessions for one backend
pub trait TrackerFactory: Send + Sync {
    /// Config block name this factory answers to (`wandb`, `tensorboard`)
    fn backend(&self) -> &str;

    /// Start a session; an error aborts the run
    fn init(&self, ctx: &TrackerContext<'_>) -> Result<Box<dyn Tracker>, BoxError>;
}
