//! Credential lookup
//!
//! Secrets (webhook URLs, API keys) are resolved by name from the process
//! environment and a dotenv-style file.

mod keystore;

pub use keystore::{CredentialStore, KeyStore, DEFAULT_ENV_FILE};
