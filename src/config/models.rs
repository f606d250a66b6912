use crate::export::Level;
use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// What gets exported and how the log objects are laid out
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Key prefix for log objects; empty means bucket root
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Objects older than this many days are purged; 0 disables the sweep
    #[serde(default)]
    pub retention_days: u32,
    /// The current object is archived once it grows past this size
    #[serde(default = "default_rotate_at_bytes")]
    pub rotate_at_bytes: ByteSize,
    /// Severities routed to the exporter
    #[serde(default = "default_levels")]
    pub levels: Vec<Level>,
    /// Objects requested per listing call
    #[serde(default = "default_list_page_size")]
    pub list_page_size: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            directory: default_directory(),
            retention_days: 0,
            rotate_at_bytes: default_rotate_at_bytes(),
            levels: default_levels(),
            list_page_size: default_list_page_size(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_directory() -> String {
    "logs".to_string()
}

fn default_rotate_at_bytes() -> ByteSize {
    ByteSize(5_000_000) // 5 MB
}

fn default_levels() -> Vec<Level> {
    vec![Level::Error, Level::Warning]
}

fn default_list_page_size() -> usize {
    1000
}

/// Storage provider type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    S3,
    /// Process-local bucket, for development and dry runs
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub provider: StorageProvider,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub region: String,
    /// Custom endpoint for S3-compatible services
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing)]
    pub access_key_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub secret_access_key: Option<String>,
}
