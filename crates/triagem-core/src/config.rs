use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/triagem-completa";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_ENDPOINT: &str = "TRIAGEM_API_URL";
pub const ENV_SCHEMA: &str = "TRIAGEM_SCHEMA";
pub const ENV_TIMEOUT: &str = "TRIAGEM_TIMEOUT_SECS";

/// Response shape spoken by the configured endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// Direct triage agent: classification only
    V1,
    /// Gateway: classification plus recommendations
    #[default]
    V2,
}

impl SchemaVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "v1",
            SchemaVersion::V2 => "v2",
        }
    }
}

impl FromStr for SchemaVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" | "1" => Ok(SchemaVersion::V1),
            "v2" | "2" => Ok(SchemaVersion::V2),
            _ => Err(ConfigError::InvalidSchema(s.to_string())),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode config: {0}")]
    Encode(serde_json::Error),

    #[error("invalid endpoint {value:?}: {reason}")]
    InvalidEndpoint { value: String, reason: String },

    #[error("unknown response schema {0:?} (expected v1 or v2)")]
    InvalidSchema(String),

    #[error("invalid timeout {0:?} (expected a whole number of seconds greater than zero)")]
    InvalidTimeout(String),
}

/// On-disk settings. Every field is optional; absent fields fall through to the
/// environment and then to the built-in defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Load from `path`; a missing file is an empty config
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Encode)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Command-line overrides, the highest-precedence layer
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub schema: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Effective, validated settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Url,
    pub schema: SchemaVersion,
    pub timeout: Duration,
}

impl Config {
    /// Config for `endpoint` with the default schema and timeout
    pub fn from_endpoint(endpoint: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            schema: SchemaVersion::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Layer defaults, the config file, the process environment, and `overrides`.
    ///
    /// `path` defaults to [`Config::default_path`]; when no config directory exists the
    /// file layer is skipped.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => ConfigFile::load(path)?,
            None => match Self::default_path() {
                Ok(path) => ConfigFile::load(&path)?,
                Err(ConfigError::NoConfigDir) => ConfigFile::default(),
                Err(e) => return Err(e),
            },
        };

        Self::resolve(&file, |key| std::env::var(key).ok(), overrides)
    }

    /// Precedence, lowest first: defaults, `file`, `env`, `overrides`
    pub fn resolve<F>(file: &ConfigFile, env: F, overrides: &Overrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = match overrides.endpoint.clone().or_else(|| env(ENV_ENDPOINT)) {
            Some(value) => parse_endpoint(&value)?,
            None => parse_endpoint(file.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT))?,
        };

        let schema = match overrides.schema.clone().or_else(|| env(ENV_SCHEMA)) {
            Some(value) => value.parse()?,
            None => file.schema.unwrap_or_default(),
        };

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => secs,
            None => match env(ENV_TIMEOUT) {
                Some(value) => value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidTimeout(value.clone()))?,
                None => file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
        };
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(timeout_secs.to_string()));
        }

        Ok(Self {
            endpoint,
            schema,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// The file representation of these settings, for `save`
    pub fn to_file(&self) -> ConfigFile {
        ConfigFile {
            endpoint: Some(self.endpoint.to_string()),
            schema: Some(self.schema),
            timeout_secs: Some(self.timeout.as_secs()),
        }
    }

    /// Gateway health endpoint: the triage endpoint with its last path segment
    /// replaced by `health`, so a path prefix such as `/api` is kept
    pub fn health_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().pop().push("health");
        }
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("triagem").join("config.json"))
    }
}

fn parse_endpoint(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEndpoint {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(value.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::resolve(&ConfigFile::default(), env_from(&[]), &Overrides::default()).unwrap();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.schema, SchemaVersion::V2);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_layer_precedence() {
        let file = ConfigFile {
            endpoint: Some("http://file.example/triagem".to_string()),
            schema: Some(SchemaVersion::V1),
            timeout_secs: Some(5),
        };

        let from_file = Config::resolve(&file, env_from(&[]), &Overrides::default()).unwrap();
        assert_eq!(from_file.endpoint.as_str(), "http://file.example/triagem");
        assert_eq!(from_file.schema, SchemaVersion::V1);
        assert_eq!(from_file.timeout, Duration::from_secs(5));

        let env = env_from(&[
            (ENV_ENDPOINT, "http://env.example/triagem-completa"),
            (ENV_SCHEMA, "V2"),
            (ENV_TIMEOUT, "12"),
        ]);
        let from_env = Config::resolve(&file, &env, &Overrides::default()).unwrap();
        assert_eq!(from_env.endpoint.as_str(), "http://env.example/triagem-completa");
        assert_eq!(from_env.schema, SchemaVersion::V2);
        assert_eq!(from_env.timeout, Duration::from_secs(12));

        let overrides = Overrides {
            endpoint: Some("https://cli.example/api/triagem".to_string()),
            schema: Some("v1".to_string()),
            timeout_secs: Some(60),
        };
        let from_cli = Config::resolve(&file, &env, &overrides).unwrap();
        assert_eq!(from_cli.endpoint.as_str(), "https://cli.example/api/triagem");
        assert_eq!(from_cli.schema, SchemaVersion::V1);
        assert_eq!(from_cli.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_endpoints_rejected() {
        for value in ["/triagem-completa", "not a url", "ftp://host/triagem"] {
            let overrides = Overrides {
                endpoint: Some(value.to_string()),
                ..Overrides::default()
            };
            let result = Config::resolve(&ConfigFile::default(), env_from(&[]), &overrides);
            assert!(
                matches!(result, Err(ConfigError::InvalidEndpoint { .. })),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_schema_and_timeout_rejected() {
        let result = Config::resolve(
            &ConfigFile::default(),
            env_from(&[(ENV_SCHEMA, "v3")]),
            &Overrides::default(),
        );
        assert!(matches!(result, Err(ConfigError::InvalidSchema(_))));

        let result = Config::resolve(
            &ConfigFile::default(),
            env_from(&[(ENV_TIMEOUT, "soon")]),
            &Overrides::default(),
        );
        assert!(matches!(result, Err(ConfigError::InvalidTimeout(_))));

        let overrides = Overrides {
            timeout_secs: Some(0),
            ..Overrides::default()
        };
        let result = Config::resolve(&ConfigFile::default(), env_from(&[]), &overrides);
        assert!(matches!(result, Err(ConfigError::InvalidTimeout(_))));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let file = ConfigFile::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(file, ConfigFile::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config::from_endpoint("http://gateway:8080/triagem-completa").unwrap();
        config.to_file().save(&path).unwrap();

        let loaded = ConfigFile::load(&path).unwrap();
        let resolved = Config::resolve(&loaded, env_from(&[]), &Overrides::default()).unwrap();
        assert_eq!(resolved, config);
    }

    #[test]
    fn test_corrupt_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ endpoint: ").unwrap();

        let err = ConfigFile::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_health_url_shares_origin() {
        let config = Config::from_endpoint("http://localhost:8080/triagem-completa?x=1").unwrap();
        assert_eq!(config.health_url().as_str(), "http://localhost:8080/health");
    }

    #[test]
    fn test_health_url_keeps_path_prefix() {
        let config = Config::from_endpoint("https://gateway.example/api/triagem-completa").unwrap();
        assert_eq!(
            config.health_url().as_str(),
            "https://gateway.example/api/health"
        );
    }
}
