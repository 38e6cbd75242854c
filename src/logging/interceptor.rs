//! Log-file side of the output interceptor

use super::output::Origin;
use chrono::Local;
use regex::Regex;
use std::borrow::Cow;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

// OSC strings first, then two-byte escapes and CSI sequences.
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B(?:\][^\x07\x1B]*(?:\x07|\x1B\\)|[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])")
        .expect("ANSI escape pattern is valid")
});

/// Remove ANSI escape sequences from `text`
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}

/// Current local time, second precision
pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// One log-file line: `[timestamp] text`, colors removed
pub fn format_entry(timestamp: &str, line: &str) -> String {
    format!("[{}] {}\n", timestamp, strip_ansi(line))
}

/// Appends printed lines to the session log file
#[derive(Debug, Clone)]
pub struct Interceptor {
    log_file: PathBuf,
    log_system_messages: bool,
}

impl Interceptor {
    pub fn new(log_file: impl Into<PathBuf>, log_system_messages: bool) -> Self {
        Self {
            log_file: log_file.into(),
            log_system_messages,
        }
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Append `line` to the log file unless it is an exempt system message
    pub fn record(&self, line: &str, origin: Origin) -> io::Result<()> {
        if origin == Origin::System && !self.log_system_messages {
            return Ok(());
        }

        let entry = format_entry(&timestamp(), line);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;
        file.write_all(entry.as_bytes())
    }
}
