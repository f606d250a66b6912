use super::models::{Config, StorageProvider};
use thiserror::Error;

/// Smallest accepted rotation threshold
pub const MIN_ROTATE_AT_BYTES: u64 = 1_000_000;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Storage bucket name is empty")]
    MissingBucket,

    #[error("Storage region is empty")]
    MissingRegion,

    #[error("Storage provider is S3 but missing credentials (access_key_id or secret_access_key)")]
    MissingS3Credentials,

    #[error("rotate_at_bytes ({actual}) is below the minimum of {minimum}")]
    RotateThresholdTooSmall { actual: u64, minimum: u64 },

    #[error("Invalid log directory '{0}': empty or relative path segment")]
    InvalidDirectory(String),

    #[error("No log levels configured for export")]
    NoLevelsConfigured,

    #[error("list_page_size must be positive")]
    InvalidListPageSize,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_export(config)?;
    validate_storage(config)?;
    Ok(())
}

fn validate_export(config: &Config) -> Result<(), ValidationError> {
    let export = &config.export;

    if export.rotate_at_bytes.as_u64() < MIN_ROTATE_AT_BYTES {
        return Err(ValidationError::RotateThresholdTooSmall {
            actual: export.rotate_at_bytes.as_u64(),
            minimum: MIN_ROTATE_AT_BYTES,
        });
    }

    let directory = export.directory.trim_matches('/');
    if !directory.is_empty()
        && directory
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(ValidationError::InvalidDirectory(export.directory.clone()));
    }

    if export.levels.is_empty() {
        return Err(ValidationError::NoLevelsConfigured);
    }

    if export.list_page_size == 0 {
        return Err(ValidationError::InvalidListPageSize);
    }

    Ok(())
}

/// Bucket is always required; region and credentials only for S3
fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    let storage = &config.storage;

    if storage.bucket.trim().is_empty() {
        return Err(ValidationError::MissingBucket);
    }

    if storage.provider == StorageProvider::S3 {
        if storage.region.trim().is_empty() {
            return Err(ValidationError::MissingRegion);
        }

        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        if !present(&storage.access_key_id) || !present(&storage.secret_access_key) {
            return Err(ValidationError::MissingS3Credentials);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::ByteSize;

    fn create_test_config() -> Config {
        let mut config = Config::default();
        config.export.retention_days = 90;
        config.storage.bucket = "test-bucket".to_string();
        config.storage.region = "us-east-1".to_string();
        config.storage.access_key_id = Some("AKIAEXAMPLE".to_string());
        config.storage.secret_access_key = Some("secret".to_string());
        config
    }

    #[test]
    fn test_valid_config() {
        let config = create_test_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_bucket() {
        let mut config = create_test_config();
        config.storage.bucket = "  ".to_string();

        assert!(matches!(validate(&config), Err(ValidationError::MissingBucket)));
    }

    #[test]
    fn test_missing_region() {
        let mut config = create_test_config();
        config.storage.region.clear();

        assert!(matches!(validate(&config), Err(ValidationError::MissingRegion)));
    }

    #[test]
    fn test_s3_credentials_missing() {
        let mut config = create_test_config();
        config.storage.access_key_id = None;
        assert!(matches!(validate(&config), Err(ValidationError::MissingS3Credentials)));

        let mut config = create_test_config();
        config.storage.secret_access_key = Some(String::new());
        assert!(matches!(validate(&config), Err(ValidationError::MissingS3Credentials)));
    }

    #[test]
    fn test_memory_provider_needs_no_credentials() {
        let mut config = create_test_config();
        config.storage.provider = StorageProvider::Memory;
        config.storage.region.clear();
        config.storage.access_key_id = None;

        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rotate_threshold_minimum() {
        let mut config = create_test_config();
        config.export.rotate_at_bytes = ByteSize(999_999);
        assert!(matches!(
            validate(&config),
            Err(ValidationError::RotateThresholdTooSmall { actual: 999_999, .. })
        ));

        config.export.rotate_at_bytes = ByteSize(MIN_ROTATE_AT_BYTES);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_directory_segments() {
        let mut config = create_test_config();

        for ok in ["", "/", "logs", "/logs/", "app/logs"] {
            config.export.directory = ok.to_string();
            assert!(validate(&config).is_ok(), "{ok} should be accepted");
        }

        for bad in ["app//logs", "../logs", "app/./logs"] {
            config.export.directory = bad.to_string();
            assert!(
                matches!(validate(&config), Err(ValidationError::InvalidDirectory(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_no_levels() {
        let mut config = create_test_config();
        config.export.levels.clear();

        assert!(matches!(validate(&config), Err(ValidationError::NoLevelsConfigured)));
    }
}
