use crate::{ConfigError, FromEnv, env_or_default, env_parse};
use std::path::PathBuf;

/// Default request body ceiling for uploads (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Where uploaded attachments are written and how large a request may be.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

impl FromEnv for UploadConfig {
    /// - `UPLOAD_DIR`: defaults to `uploads`
    /// - `UPLOAD_MAX_BYTES`: defaults to 10 MiB
    fn from_env() -> Result<Self, ConfigError> {
        let max_bytes: usize =
            env_parse("UPLOAD_MAX_BYTES", &DEFAULT_MAX_UPLOAD_BYTES.to_string())?;

        if max_bytes == 0 {
            return Err(ConfigError::ParseError {
                key: "UPLOAD_MAX_BYTES".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            dir: PathBuf::from(env_or_default("UPLOAD_DIR", "uploads")),
            max_bytes,
        })
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_config_defaults() {
        temp_env::with_vars(
            [("UPLOAD_DIR", None::<&str>), ("UPLOAD_MAX_BYTES", None::<&str>)],
            || {
                let config = UploadConfig::from_env().unwrap();
                assert_eq!(config.dir, PathBuf::from("uploads"));
                assert_eq!(config.max_bytes, DEFAULT_MAX_UPLOAD_BYTES);
            },
        );
    }

    #[test]
    fn test_upload_config_custom_values() {
        temp_env::with_vars(
            [
                ("UPLOAD_DIR", Some("/var/lib/events/blobs")),
                ("UPLOAD_MAX_BYTES", Some("2048")),
            ],
            || {
                let config = UploadConfig::from_env().unwrap();
                assert_eq!(config.dir, PathBuf::from("/var/lib/events/blobs"));
                assert_eq!(config.max_bytes, 2048);
            },
        );
    }

    #[test]
    fn test_upload_config_rejects_zero_limit() {
        temp_env::with_var("UPLOAD_MAX_BYTES", Some("0"), || {
            let err = UploadConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("UPLOAD_MAX_BYTES"));
        });
    }

    #[test]
    fn test_upload_config_rejects_garbage_limit() {
        temp_env::with_var("UPLOAD_MAX_BYTES", Some("ten megs"), || {
            assert!(UploadConfig::from_env().is_err());
        });
    }
}
