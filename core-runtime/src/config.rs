//! # Configuration Management
//!
//! Runtime configuration loaded from `TANKVIEW_*` environment variables.
//! Both required inputs, the service-account key file and the target
//! folder id, are validated at startup; a missing or malformed value
//! fails fast with [`ConfigError`] before any network call happens.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Default bind address for the HTTP surface.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default maximum folder traversal depth below the target folder.
const DEFAULT_MAX_DEPTH: u32 = 4;

/// Default streaming chunk size (4 MiB).
const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Allowed chunk size bounds.
const MIN_CHUNK_SIZE: usize = 64 * 1024;
const MAX_CHUNK_SIZE: usize = 32 * 1024 * 1024;

/// Default bounded worker count for sibling folder listings.
const DEFAULT_LIST_CONCURRENCY: usize = 4;
const MAX_LIST_CONCURRENCY: usize = 16;

/// Video mime types considered playable unless overridden.
const DEFAULT_VIDEO_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/webm",
    "video/quicktime",
    "video/x-matroska",
];

/// Configuration errors, fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {name}")]
    MissingEnv { name: &'static str },

    #[error("Invalid value for {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },
}

/// Validated runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the service-account JSON key file.
    pub service_account_file: PathBuf,
    /// The folder whose subtree is diagnosed and served.
    pub target_folder_id: String,
    /// HTTP surface bind address.
    pub bind_addr: SocketAddr,
    /// Maximum traversal depth below the target folder.
    pub max_depth: u32,
    /// Streaming chunk size in bytes.
    pub chunk_size_bytes: usize,
    /// Mime types treated as playable video.
    pub video_mime_types: Vec<String>,
    /// Bounded worker count for sibling folder listings.
    pub list_concurrency: usize,
    /// `EnvFilter` directive for logging.
    pub log_filter: String,
}

impl Config {
    /// Load configuration from `TANKVIEW_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Load configuration from an explicit variable map. Split out from
    /// [`Config::from_env`] so tests never mutate process environment.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let service_account_file = required(vars, "TANKVIEW_SERVICE_ACCOUNT_FILE")?;
        let target_folder_id = required(vars, "TANKVIEW_TARGET_FOLDER_ID")?;

        let config = Self {
            service_account_file: PathBuf::from(service_account_file),
            target_folder_id,
            bind_addr: parse_or(vars, "TANKVIEW_BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?,
            max_depth: parse_or(vars, "TANKVIEW_MAX_DEPTH", Some(DEFAULT_MAX_DEPTH))?,
            chunk_size_bytes: parse_or(
                vars,
                "TANKVIEW_CHUNK_SIZE_BYTES",
                Some(DEFAULT_CHUNK_SIZE),
            )?,
            video_mime_types: vars
                .get("TANKVIEW_VIDEO_MIME_TYPES")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_ascii_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| {
                    DEFAULT_VIDEO_MIME_TYPES
                        .iter()
                        .map(|s| s.to_string())
                        .collect()
                }),
            list_concurrency: parse_or(
                vars,
                "TANKVIEW_LIST_CONCURRENCY",
                Some(DEFAULT_LIST_CONCURRENCY),
            )?,
            log_filter: vars
                .get("TANKVIEW_LOG")
                .cloned()
                .unwrap_or_else(|| "info".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints and bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_folder_id.trim().is_empty() {
            return Err(ConfigError::InvalidEnv {
                name: "TANKVIEW_TARGET_FOLDER_ID",
                reason: "folder id must not be empty".to_string(),
            });
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidEnv {
                name: "TANKVIEW_MAX_DEPTH",
                reason: "depth must be at least 1".to_string(),
            });
        }
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&self.chunk_size_bytes) {
            return Err(ConfigError::InvalidEnv {
                name: "TANKVIEW_CHUNK_SIZE_BYTES",
                reason: format!(
                    "chunk size must be within [{}, {}] bytes",
                    MIN_CHUNK_SIZE, MAX_CHUNK_SIZE
                ),
            });
        }
        if !(1..=MAX_LIST_CONCURRENCY).contains(&self.list_concurrency) {
            return Err(ConfigError::InvalidEnv {
                name: "TANKVIEW_LIST_CONCURRENCY",
                reason: format!("concurrency must be within [1, {}]", MAX_LIST_CONCURRENCY),
            });
        }
        if self.video_mime_types.is_empty() {
            return Err(ConfigError::InvalidEnv {
                name: "TANKVIEW_VIDEO_MIME_TYPES",
                reason: "at least one mime type is required".to_string(),
            });
        }
        Ok(())
    }
}

fn required(vars: &HashMap<String, String>, name: &'static str) -> Result<String, ConfigError> {
    vars.get(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingEnv { name })
}

fn parse_or<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match vars.get(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
            name,
            reason: e.to_string(),
        }),
        None => default.ok_or(ConfigError::MissingEnv { name }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert(
            "TANKVIEW_SERVICE_ACCOUNT_FILE".to_string(),
            "/etc/tankview/service_account.json".to_string(),
        );
        vars.insert(
            "TANKVIEW_TARGET_FOLDER_ID".to_string(),
            "0AHKUF31V4DyLUk9PVA".to_string(),
        );
        vars
    }

    #[test]
    fn loads_with_defaults() {
        let config = Config::from_vars(&base_vars()).unwrap();

        assert_eq!(config.target_folder_id, "0AHKUF31V4DyLUk9PVA");
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.chunk_size_bytes, 4 * 1024 * 1024);
        assert_eq!(config.list_concurrency, 4);
        assert!(config
            .video_mime_types
            .contains(&"video/mp4".to_string()));
    }

    #[test]
    fn missing_key_file_fails() {
        let mut vars = base_vars();
        vars.remove("TANKVIEW_SERVICE_ACCOUNT_FILE");

        let err = Config::from_vars(&vars).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingEnv {
                name: "TANKVIEW_SERVICE_ACCOUNT_FILE"
            }
        ));
    }

    #[test]
    fn missing_target_folder_fails() {
        let mut vars = base_vars();
        vars.remove("TANKVIEW_TARGET_FOLDER_ID");

        assert!(Config::from_vars(&vars).is_err());
    }

    #[test]
    fn malformed_numeric_fails() {
        let mut vars = base_vars();
        vars.insert("TANKVIEW_MAX_DEPTH".to_string(), "four".to_string());

        let err = Config::from_vars(&vars).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                name: "TANKVIEW_MAX_DEPTH",
                ..
            }
        ));
    }

    #[test]
    fn chunk_size_bounds_enforced() {
        let mut vars = base_vars();
        vars.insert("TANKVIEW_CHUNK_SIZE_BYTES".to_string(), "1024".to_string());
        assert!(Config::from_vars(&vars).is_err());

        vars.insert(
            "TANKVIEW_CHUNK_SIZE_BYTES".to_string(),
            (64 * 1024 * 1024).to_string(),
        );
        assert!(Config::from_vars(&vars).is_err());
    }

    #[test]
    fn mime_override_is_normalized() {
        let mut vars = base_vars();
        vars.insert(
            "TANKVIEW_VIDEO_MIME_TYPES".to_string(),
            "Video/MP4, video/webm ,".to_string(),
        );

        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(
            config.video_mime_types,
            vec!["video/mp4".to_string(), "video/webm".to_string()]
        );
    }

    #[test]
    fn zero_depth_rejected() {
        let mut vars = base_vars();
        vars.insert("TANKVIEW_MAX_DEPTH".to_string(), "0".to_string());
        assert!(Config::from_vars(&vars).is_err());
    }
}
