//! Configuration management for bucketlog
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! After loading, any string setting of the form `${NAME}` is replaced by the
//! value of the environment variable `NAME`. This happens once; the resulting
//! [`Config`] is immutable for the life of the process.
//!
//! # Usage
//!
//! ```no_run
//! use bucketlog::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Exporting into bucket: {}", config.storage.bucket);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `BUCKETLOG__<section>__<key>`
//!
//! Examples:
//! - `BUCKETLOG__EXPORT__RETENTION_DAYS=90`
//! - `BUCKETLOG__STORAGE__BUCKET=prod-logs`
//! - `BUCKETLOG__EXPORT__ROTATE_AT_BYTES=10MB`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/bucketlog.toml`.
//! This can be overridden using the `BUCKETLOG_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{Config, ExportConfig, StorageConfig, StorageProvider};
pub use sources::resolve_env_refs;
pub use validation::{MIN_ROTATE_AT_BYTES, ValidationError};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Setting '{field}' references unset environment variable '{name}'")]
    UnresolvedEnvReference { field: String, name: String },

    #[error("Setting '{field}' has a malformed environment reference: {value}")]
    MalformedEnvReference { field: String, value: String },
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`BUCKETLOG__*`)
    /// 2. TOML file (default: `config/bucketlog.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - An `${NAME}` reference cannot be resolved
    /// - Validation fails
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(sources::default_path())
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load without validating, so callers can decide what an invalid
    /// configuration means (the exporter simply stays inactive).
    pub fn load_unvalidated(path: PathBuf) -> Result<Self, ConfigError> {
        sources::load(path)
    }

    /// `$BUCKETLOG_CONFIG`, or `config/bucketlog.toml`
    pub fn default_path() -> PathBuf {
        sources::default_path()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
