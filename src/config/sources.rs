use super::ConfigError;
use super::models::Config;
use config::{Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "BUCKETLOG_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/bucketlog.toml";
const ENV_PREFIX: &str = "BUCKETLOG";
const ENV_SEPARATOR: &str = "__";

/// Path of the configuration file, honouring `BUCKETLOG_CONFIG`
pub fn default_path() -> PathBuf {
    env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
///
/// `${NAME}` references are then resolved against the process environment.
pub fn load(config_path: PathBuf) -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let mut config = load_from_sources(config_path)?;
    resolve_env_refs(&mut config, |name| env::var(name).ok())?;
    load_secrets(&mut config);

    Ok(config)
}

/// Fall back to the AWS-style variables when no credentials were configured
fn load_secrets(config: &mut Config) {
    if config.storage.access_key_id.is_none() {
        config.storage.access_key_id = env::var("AWS_ACCESS_KEY_ID").ok();
    }
    if config.storage.secret_access_key.is_none() {
        config.storage.secret_access_key = env::var("AWS_SECRET_ACCESS_KEY").ok();
    }
}

/// Load configuration from a specific path and environment, without
/// resolving references. Useful for testing with custom config files.
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // BUCKETLOG__EXPORT__RETENTION_DAYS -> export.retention_days
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    Ok(config.try_deserialize()?)
}

/// Replace `${NAME}` references in every string setting using `lookup`.
pub fn resolve_env_refs<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let storage = &mut config.storage;

    resolve_field("export.directory", &mut config.export.directory, &lookup)?;
    resolve_field("storage.bucket", &mut storage.bucket, &lookup)?;
    resolve_field("storage.region", &mut storage.region, &lookup)?;

    let optional = [
        ("storage.endpoint", &mut storage.endpoint),
        ("storage.access_key_id", &mut storage.access_key_id),
        ("storage.secret_access_key", &mut storage.secret_access_key),
    ];
    for (field, value) in optional {
        if let Some(value) = value.as_mut() {
            resolve_field(field, value, &lookup)?;
        }
    }

    Ok(())
}

fn resolve_field<F>(field: &str, value: &mut String, lookup: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if !value.contains("${") {
        return Ok(());
    }

    let mut resolved = String::with_capacity(value.len());
    let mut rest = value.as_str();

    while let Some(start) = rest.find("${") {
        resolved.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| ConfigError::MalformedEnvReference {
            field: field.to_string(),
            value: value.clone(),
        })?;

        let name = &after[..end];
        if name.is_empty() {
            return Err(ConfigError::MalformedEnvReference {
                field: field.to_string(),
                value: value.clone(),
            });
        }

        let substitute = lookup(name).ok_or_else(|| ConfigError::UnresolvedEnvReference {
            field: field.to_string(),
            name: name.to_string(),
        })?;
        resolved.push_str(&substitute);
        rest = &after[end + 1..];
    }
    resolved.push_str(rest);

    *value = resolved;
    Ok(())
}
