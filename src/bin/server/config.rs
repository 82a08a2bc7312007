//! Server configuration
//!
//! Read from a TOML file named by `DASHBOARD_CONFIG`, falling back to
//! `./dashboard.toml`, then overridden by `DATABASE_URL`, `LISTEN_ADDR` and
//! `CACHE_TTL_SECONDS`. The database URL is mandatory.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use headcount_dashboard::{Error, PoolConfig, Result, DEFAULT_SESSION};
use serde::Deserialize;
use tracing::info;

/// Environment variable naming the config file
pub const CONFIG_PATH_VAR: &str = "DASHBOARD_CONFIG";

/// Config file used when `DASHBOARD_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

/// Server configuration loaded from TOML and environment
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP server address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// PostgreSQL connection string
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub db_min_connections: u32,

    #[serde(default = "default_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    #[serde(default = "default_statement_timeout_secs")]
    pub db_statement_timeout_secs: u64,

    /// Lifetime of cached chart responses
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,

    /// Session used by the donut endpoints when none is given
    #[serde(default = "default_session")]
    pub default_session: String,

    /// Staff positions drawn as lines on the staff trend chart
    #[serde(default = "default_highlighted_positions")]
    pub highlighted_positions: Vec<String>,

    /// Student types drawn as lines on the student trend chart (empty = all)
    #[serde(default)]
    pub highlighted_student_types: Vec<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn default_statement_timeout_secs() -> u64 {
    60
}

fn default_cache_ttl_seconds() -> u64 {
    300
}

fn default_session() -> String {
    DEFAULT_SESSION.to_string()
}

fn default_highlighted_positions() -> Vec<String> {
    [
        "Assistant lecturer",
        "Lecturer 2",
        "Lecturer 1",
        "Associate professor",
        "Professor",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            database_url: None,
            db_max_connections: default_max_connections(),
            db_min_connections: default_min_connections(),
            db_acquire_timeout_secs: default_acquire_timeout_secs(),
            db_statement_timeout_secs: default_statement_timeout_secs(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
            default_session: default_session(),
            highlighted_positions: default_highlighted_positions(),
            highlighted_student_types: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment and config file
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
        Self::load_from(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Load from an explicit file (or the default file, if present) and an environment lookup
    pub fn load_from<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contents = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    Error::Configuration(format!("cannot read {}: {e}", path.display()))
                })?;
                info!(path = %path.display(), "Loaded configuration from file");
                Some(contents)
            }
            None => std::fs::read_to_string(DEFAULT_CONFIG_FILE).ok().inspect(|_| {
                info!("Loaded configuration from {DEFAULT_CONFIG_FILE}");
            }),
        };

        Self::from_sources(contents.as_deref(), env)
    }

    /// Build from optional TOML text plus environment overrides, then validate
    pub fn from_sources<F>(toml_text: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match toml_text {
            Some(text) => toml::from_str::<ServerConfig>(text)
                .map_err(|e| Error::Configuration(format!("invalid config file: {e}")))?,
            None => ServerConfig::default(),
        };

        if let Some(url) = env("DATABASE_URL") {
            config.database_url = Some(url);
        }
        if let Some(addr) = env("LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(ttl) = env("CACHE_TTL_SECONDS") {
            config.cache_ttl_seconds = ttl.trim().parse().map_err(|e| {
                Error::Configuration(format!("invalid CACHE_TTL_SECONDS {ttl:?}: {e}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.database_url()?;
        self.socket_addr()?;

        if self.db_max_connections == 0 {
            return Err(Error::Configuration(
                "db_max_connections must be greater than 0".to_string(),
            ));
        }
        if self.db_min_connections > self.db_max_connections {
            return Err(Error::Configuration(format!(
                "db_min_connections ({}) exceeds db_max_connections ({})",
                self.db_min_connections, self.db_max_connections
            )));
        }
        Ok(())
    }

    /// The connection string, or `ConfigMissing`
    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                Error::ConfigMissing(
                    "DATABASE_URL is not set; set it or add database_url to the config file"
                        .to_string(),
                )
            })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr.parse().map_err(|e| {
            Error::Configuration(format!("invalid listen_addr {:?}: {e}", self.listen_addr))
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn pool_config(&self) -> Result<PoolConfig> {
        Ok(PoolConfig {
            url: self.database_url()?.to_string(),
            max_connections: self.db_max_connections,
            min_connections: self.db_min_connections,
            acquire_timeout: Duration::from_secs(self.db_acquire_timeout_secs),
            statement_timeout: Duration::from_secs(self.db_statement_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_missing_database_url_is_fatal() {
        let err = ServerConfig::from_sources(None, env_from(&[])).unwrap_err();
        assert!(matches!(err, Error::ConfigMissing(_)));

        let err = ServerConfig::from_sources(None, env_from(&[("DATABASE_URL", "  ")])).unwrap_err();
        assert!(matches!(err, Error::ConfigMissing(_)));
    }

    #[test]
    fn test_defaults_with_env_url() {
        let config =
            ServerConfig::from_sources(None, env_from(&[("DATABASE_URL", "postgres://db/oir")]))
                .unwrap();
        assert_eq!(config.database_url().unwrap(), "postgres://db/oir");
        assert_eq!(config.listen_addr, "0.0.0.0:8000");
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.default_session, "2023/2024");
        assert_eq!(config.highlighted_positions.len(), 5);
        assert!(config.highlighted_student_types.is_empty());

        let pool = config.pool_config().unwrap();
        assert_eq!(pool.max_connections, 10);
        assert_eq!(pool.min_connections, 2);
    }

    #[test]
    fn test_env_overrides_file() {
        let toml_text = r#"
            database_url = "postgres://file/oir"
            listen_addr = "127.0.0.1:9000"
            cache_ttl_seconds = 60
            highlighted_positions = ["Professor"]
        "#;
        let config = ServerConfig::from_sources(
            Some(toml_text),
            env_from(&[("DATABASE_URL", "postgres://env/oir"), ("CACHE_TTL_SECONDS", "15")]),
        )
        .unwrap();

        assert_eq!(config.database_url().unwrap(), "postgres://env/oir");
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.cache_ttl_seconds, 15);
        assert_eq!(config.highlighted_positions, vec!["Professor"]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let url = ("DATABASE_URL", "postgres://db/oir");

        let err = ServerConfig::from_sources(None, env_from(&[url, ("CACHE_TTL_SECONDS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = ServerConfig::from_sources(None, env_from(&[url, ("LISTEN_ADDR", "nowhere")]))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = ServerConfig::from_sources(
            Some("db_min_connections = 5\ndb_max_connections = 2"),
            env_from(&[url]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = ServerConfig::from_sources(Some("listen_addr = ["), env_from(&[url])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_url = \"postgres://file/oir\"").unwrap();
        writeln!(file, "default_session = \"2022/2023\"").unwrap();

        let config = ServerConfig::load_from(Some(file.path()), env_from(&[])).unwrap();
        assert_eq!(config.database_url().unwrap(), "postgres://file/oir");
        assert_eq!(config.default_session, "2022/2023");
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let err = ServerConfig::load_from(Some(&path), env_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
