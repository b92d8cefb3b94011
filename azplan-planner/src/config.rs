/// Generation client configuration
///
/// | Variable | Default |
/// |----------|---------|
/// | `OLLAMA_BASE_URL` | `http://localhost:11434` |
/// | `OLLAMA_MODEL` | `llama3.2:latest` |
/// | `OLLAMA_TIMEOUT_SECS` | `120` |
/// | `OLLAMA_HEALTH_TIMEOUT_SECS` | `5` |

use serde::{Deserialize, Serialize};
use std::{env, time::Duration};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2:latest";

/// Budget for one generation call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Budget for the liveness check
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
#[error("{var} must be a whole number of seconds greater than zero, got {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Model server root, without trailing slash
    pub base_url: String,

    pub model: String,

    #[serde(with = "secs")]
    pub timeout: Duration,

    #[serde(with = "secs")]
    pub health_timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }
}

impl GeneratorConfig {
    /// Points the default configuration at another server
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let seconds = |var: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match lookup(var) {
                None => Ok(default),
                Some(value) => match value.trim().parse::<u64>() {
                    Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                    _ => Err(ConfigError { var, value }),
                },
            }
        };

        Ok(Self {
            base_url: lookup("OLLAMA_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: lookup("OLLAMA_MODEL").unwrap_or(defaults.model),
            timeout: seconds("OLLAMA_TIMEOUT_SECS", defaults.timeout)?,
            health_timeout: seconds("OLLAMA_HEALTH_TIMEOUT_SECS", defaults.health_timeout)?,
        })
    }

    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    pub fn version_url(&self) -> String {
        format!("{}/api/version", self.base_url)
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.generate_url(), "http://localhost:11434/api/generate");
        assert_eq!(config.version_url(), "http://localhost:11434/api/version");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.health_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let config = GeneratorConfig::from_lookup(lookup(&[
            ("OLLAMA_BASE_URL", "http://ollama:11434/"),
            ("OLLAMA_MODEL", "mistral:7b"),
            ("OLLAMA_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://ollama:11434");
        assert_eq!(config.model, "mistral:7b");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.health_timeout, DEFAULT_HEALTH_TIMEOUT);
    }

    #[test]
    fn test_invalid_timeout() {
        let err = GeneratorConfig::from_lookup(lookup(&[("OLLAMA_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(err.var, "OLLAMA_TIMEOUT_SECS");

        assert!(GeneratorConfig::from_lookup(lookup(&[("OLLAMA_HEALTH_TIMEOUT_SECS", "0")])).is_err());
    }
}
