use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::Deserialize;
use anyhow::{Context, Result};
use shared::protocol::{DEFAULT_CACHE_TTL_MS, DEFAULT_CHECK_TIMEOUT_MS};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// JSON file holding `{"destinations": [...]}`
    #[serde(default = "default_destinations_path")]
    pub destinations_path: PathBuf,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Checks allowed in flight at once during a pass; 1 probes sequentially
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
    /// Optional SQLite file keeping the latest snapshot across restarts
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_destinations_path() -> PathBuf {
    PathBuf::from("/etc/probe/config.json")
}

fn default_timeout_ms() -> u64 {
    DEFAULT_CHECK_TIMEOUT_MS
}

fn default_concurrency() -> usize {
    1
}

fn default_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

fn default_listen() -> String {
    "[::]:8080".to_string()
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            destinations_path: default_destinations_path(),
            timeout_ms: default_timeout_ms(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            db_path: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.probe.timeout(), Duration::from_millis(500));
        assert_eq!(config.probe.concurrency, 1);
        assert_eq!(config.cache.ttl(), Duration::from_secs(4));
        assert!(config.cache.db_path.is_none());
        assert_eq!(config.probe.destinations_path, PathBuf::from("/etc/probe/config.json"));
        assert_eq!(config.api.listen, "[::]:8080");
    }

    #[test]
    fn test_partial_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [probe]
            destinations_path = "/tmp/dest.json"
            concurrency = 4

            [cache]
            ttl_ms = 1500
            db_path = "/tmp/snapshot.db"
            "#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.probe.destinations_path, PathBuf::from("/tmp/dest.json"));
        assert_eq!(config.probe.timeout_ms, 500);
        assert_eq!(config.probe.concurrency, 4);
        assert_eq!(config.cache.ttl(), Duration::from_millis(1500));
        assert_eq!(config.cache.db_path, Some(PathBuf::from("/tmp/snapshot.db")));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
