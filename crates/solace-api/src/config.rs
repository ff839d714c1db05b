use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_BUCKET: &str = "solace";
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 3000);
const DEFAULT_READ_LIMIT: u32 = 60;
const DEFAULT_WRITE_LIMIT: u32 = 20;
const DEFAULT_RATE_WINDOW_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    S3 { bucket: String },
}

/// Runtime settings, read from `SOLACE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub storage: StorageBackend,
    pub bind_addr: SocketAddr,
    pub read_limit: u32,
    pub write_limit: u32,
    pub rate_window: Duration,
    /// Bedrock model for AI column mapping; heuristics only when unset.
    pub mapping_model: Option<String>,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let storage = match get("SOLACE_STORAGE").as_deref() {
            None | Some("memory") => StorageBackend::Memory,
            Some("s3") => StorageBackend::S3 {
                bucket: get("SOLACE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "SOLACE_STORAGE",
                    value: other.to_string(),
                });
            }
        };

        let bind_addr = parse(
            "SOLACE_BIND_ADDR",
            get("SOLACE_BIND_ADDR"),
            SocketAddr::from(DEFAULT_BIND_ADDR),
        )?;
        let read_limit = positive("SOLACE_READ_LIMIT", get("SOLACE_READ_LIMIT"), DEFAULT_READ_LIMIT)?;
        let write_limit =
            positive("SOLACE_WRITE_LIMIT", get("SOLACE_WRITE_LIMIT"), DEFAULT_WRITE_LIMIT)?;
        let window_secs = positive(
            "SOLACE_RATE_WINDOW_SECS",
            get("SOLACE_RATE_WINDOW_SECS"),
            DEFAULT_RATE_WINDOW_SECS,
        )?;

        let seed_demo = match get("SOLACE_SEED_DEMO").map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("0" | "false" | "no") => false,
            Some("1" | "true" | "yes") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "SOLACE_SEED_DEMO",
                    value: other.to_string(),
                });
            }
        };

        Ok(Config {
            storage,
            bind_addr,
            read_limit,
            write_limit,
            rate_window: Duration::from_secs(window_secs),
            mapping_model: get("SOLACE_MAPPING_MODEL"),
            seed_demo,
        })
    }

    /// Whether any AWS service is in use.
    pub fn needs_aws(&self) -> bool {
        matches!(self.storage, StorageBackend::S3 { .. }) || self.mapping_model.is_some()
    }
}

fn parse<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn positive<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let value = parse(var, raw.clone(), default)?;
    if value <= T::default() {
        return Err(ConfigError::Invalid {
            var,
            value: raw.unwrap_or_default(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_to_memory_storage_and_standard_limits() {
        let config = config(&[]).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!((config.read_limit, config.write_limit), (60, 20));
        assert_eq!(config.rate_window, Duration::from_secs(60));
        assert!(config.mapping_model.is_none());
        assert!(!config.seed_demo);
        assert!(!config.needs_aws());
    }

    #[test]
    fn s3_storage_uses_bucket() {
        let config = config(&[("SOLACE_STORAGE", "s3"), ("SOLACE_BUCKET", "practice-data")]).unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::S3 {
                bucket: "practice-data".to_string()
            }
        );
        assert!(config.needs_aws());
    }

    #[test]
    fn rejects_unknown_storage_and_zero_limits() {
        assert!(config(&[("SOLACE_STORAGE", "postgres")]).is_err());
        assert!(config(&[("SOLACE_WRITE_LIMIT", "0")]).is_err());
        assert!(config(&[("SOLACE_READ_LIMIT", "lots")]).is_err());
        assert!(config(&[("SOLACE_SEED_DEMO", "maybe")]).is_err());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("SOLACE_READ_LIMIT", "5"),
            ("SOLACE_RATE_WINDOW_SECS", "10"),
            ("SOLACE_MAPPING_MODEL", "us.anthropic.claude-sonnet-4-6"),
            ("SOLACE_SEED_DEMO", "true"),
        ])
        .unwrap();
        assert_eq!(config.read_limit, 5);
        assert_eq!(config.rate_window, Duration::from_secs(10));
        assert_eq!(
            config.mapping_model.as_deref(),
            Some("us.anthropic.claude-sonnet-4-6")
        );
        assert!(config.seed_demo);
    }
}
