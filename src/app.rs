//! Application runner
//!
//! [`App::run`] loads credentials and configuration, starts the session
//! logger, prints the resolved configuration and hands a [`Context`] to the
//! entrypoint. The logger is stopped whether the entrypoint returns, fails
//! or panics.

use crate::config::{Config, ConfigFile, DEFAULT_CONFIG_FILE};
use crate::error::{AppError, BoxError, LoggerError, Result};
use crate::logging::style::{paint, LIGHT_YELLOW, PATH_COLORS, RESET};
use crate::logging::{Logger, Output, TrackerFactory};
use crate::notification::Notifier;
use crate::secrets::{CredentialStore, KeyStore, DEFAULT_ENV_FILE};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Credential name the deprecated `wandb.key` entry is moved to
pub const WANDB_API_KEY: &str = "WANDB_API_KEY";

/// Install `env_logger` unless the host program already set up a logger
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .try_init();
}

/// A fenn application
pub struct App {
    config_file: PathBuf,
    env_file: PathBuf,
    config: Option<Config>,
    credentials: Option<KeyStore>,
    output: Output,
    trackers: Vec<Box<dyn TrackerFactory>>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            env_file: PathBuf::from(DEFAULT_ENV_FILE),
            config: None,
            credentials: None,
            output: Output::stdout(),
            trackers: Vec::new(),
        }
    }

    /// Read configuration from `path` instead of `fenn.yaml`
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = path.into();
        self
    }

    /// Read secrets from `path` instead of `.env`
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = path.into();
        self
    }

    /// Use an already built configuration; no file is read
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use `store` instead of loading the env file
    pub fn with_credentials(mut self, store: KeyStore) -> Self {
        self.credentials = Some(store);
        self
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// Register a tracker backend for the session logger
    pub fn with_tracker(mut self, factory: impl TrackerFactory + 'static) -> Self {
        self.trackers.push(Box::new(factory));
        self
    }

    /// Run `entrypoint` inside a logging session
    pub fn run<F, T, E>(self, entrypoint: F) -> Result<T>
    where
        F: FnOnce(&mut Context<'_>) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        init_logging();

        let mut keystore = match self.credentials {
            Some(store) => store,
            None => KeyStore::from_env_file(&self.env_file)?,
        };

        let mut config = match self.config {
            Some(config) => config,
            None => load_config(&self.output, &self.config_file)?,
        };

        if let Some(key) = config.take_deprecated_wandb_key() {
            keystore.set(WANDB_API_KEY, key);
            log::warn!("wandb.key in the config file is deprecated");
            self.output.system_warning(&format!(
                "WANDB key in yaml file is deprecated. \
             Please use {LIGHT_YELLOW}.env{RESET} instead."
            ))?;
        }

        let credentials: Arc<dyn CredentialStore> = Arc::new(keystore);
        let mut logger = Logger::new(self.output.clone(), Arc::clone(&credentials));
        for factory in self.trackers {
            logger.register_tracker(factory);
        }

        logger.start(&config)?;
        print_config(logger.output(), &config)?;
        logger.output().system_info("Application starting.")?;

        let mut ctx = Context {
            config: &config,
            logger: &mut logger,
            credentials,
        };
        let result = entrypoint(&mut ctx);

        logger.stop();
        result.map_err(|e| AppError::Entrypoint(e.into()))
    }
}

fn load_config(output: &Output, path: &Path) -> Result<Config> {
    let default = if path == Path::new(DEFAULT_CONFIG_FILE) {
        " (default)"
    } else {
        ""
    };

    match ConfigFile::load(path) {
        Ok(config) => {
            output.system_info(&format!(
                "Configuration file {}{} loaded.",
                path.display(),
                default
            ))?;
            Ok(config)
        }
        Err(e) => {
            let _ = output.system_error(&format!(
                "Configuration file {}{} could not be loaded: {}",
                path.display(),
                default,
                e
            ));
            Err(e.into())
        }
    }
}

/// Print every `path/to/key: value` pair with colored path segments
fn print_config(output: &Output, config: &Config) -> Result<()> {
    for (path, value) in config.flatten()? {
        let colored: Vec<String> = path
            .split('/')
            .enumerate()
            .map(|(i, part)| paint(PATH_COLORS[i % PATH_COLORS.len()], part))
            .collect();
        output.println(format!("{}: {}", colored.join("/"), value))?;
    }
    Ok(())
}

/// What the entrypoint sees of the running application
pub struct Context<'a> {
    config: &'a Config,
    logger: &'a mut Logger,
    credentials: Arc<dyn CredentialStore>,
}

impl Context<'_> {
    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// The intercepted output; prints go to the console and the session log
    pub fn output(&self) -> &Output {
        self.logger.output()
    }

    pub fn println(&self, message: impl Display) -> Result<()> {
        self.logger.output().println(message)?;
        Ok(())
    }

    pub fn credentials(&self) -> Arc<dyn CredentialStore> {
        Arc::clone(&self.credentials)
    }

    /// An empty notifier sharing the application's credentials
    pub fn notifier(&self) -> Notifier {
        Notifier::new(self.credentials())
    }

    /// Forward metrics to every running tracker
    pub fn log_metrics(
        &mut self,
        step: Option<u64>,
        metrics: &[(&str, f64)],
    ) -> std::result::Result<(), LoggerError> {
        self.logger.log_metrics(step, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::mock::{MockTrackerFactory, SharedBuffer};
    use tempfile::TempDir;

    fn app(dir: &TempDir, console: &SharedBuffer) -> App {
        let config = ConfigBuilder::new("mnist")
            .session_id("quiet_pine_0001")
            .log_dir(dir.path())
            .set("seed", 7)
            .build();

        App::new()
            .with_config(config)
            .with_credentials(KeyStore::in_memory())
            .with_output(Output::new(console.clone()))
    }

    #[test]
    fn test_run_prints_config_and_returns_value() {
        let dir = TempDir::new().unwrap();
        let console = SharedBuffer::new();

        let value = app(&dir, &console)
            .run(|ctx| {
                assert_eq!(ctx.session_id(), "quiet_pine_0001");
                ctx.println("hello")?;
                Ok::<_, AppError>(42)
            })
            .unwrap();

        assert_eq!(value, 42);
        let shown = console.contents();
        assert!(shown.contains("Application starting."));
        assert!(shown.contains(&format!("{}: 7", paint(PATH_COLORS[0], "seed"))));

        let log = std::fs::read_to_string(dir.path().join("mnist/quiet_pine_0001.log")).unwrap();
        assert!(log.contains("] seed: 7\n"));
        assert!(log.contains("] hello\n"));
        assert!(!log.contains("Application starting."));
    }

    #[test]
    fn test_entrypoint_error_restores_output() {
        let dir = TempDir::new().unwrap();
        let console = SharedBuffer::new();
        let output = Output::new(console.clone());

        let result = app(&dir, &console)
            .with_output(output.clone())
            .run(|_| Err::<(), _>("diverged"));

        match result {
            Err(AppError::Entrypoint(e)) => assert_eq!(e.to_string(), "diverged"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
        assert!(!output.is_intercepted());
    }

    #[test]
    fn test_deprecated_wandb_key_moves_to_credentials() {
        let dir = TempDir::new().unwrap();
        let console = SharedBuffer::new();
        let factory = MockTrackerFactory::new("wandb");
        let events = factory.events();

        let config = ConfigBuilder::new("mnist")
            .log_dir(dir.path())
            .wandb(serde_yml::from_str("entity: lab\nkey: abc123").unwrap())
            .build();

        App::new()
            .with_config(config)
            .with_credentials(KeyStore::in_memory())
            .with_output(Output::new(console.clone()))
            .with_tracker(factory)
            .run(|ctx| {
                assert_eq!(ctx.credentials().get(WANDB_API_KEY).unwrap(), "abc123");
                assert!(ctx.config().get("wandb/key").is_none());
                ctx.log_metrics(Some(1), &[("loss", 0.5)])?;
                Ok::<_, AppError>(())
            })
            .unwrap();

        assert!(console.contents().contains("deprecated"));
        let events = events.lock().unwrap();
        assert_eq!(events.logged.len(), 1);
        assert_eq!(events.finished, 1);
    }

    #[test]
    fn test_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let console = SharedBuffer::new();

        let result = App::new()
            .with_config_file(dir.path().join("fenn.yaml"))
            .with_credentials(KeyStore::in_memory())
            .with_output(Output::new(console.clone()))
            .run(|_| Ok::<_, AppError>(()));

        assert!(matches!(
            result,
            Err(AppError::Config(crate::error::ConfigError::FileNotFound(_)))
        ));
        assert!(console.contents().contains("could not be loaded"));
    }
}
