//! Configuration surface: defaults, optional `config.toml`, env overrides.
//!
//! Sources in increasing precedence: built-in defaults, the first
//! `config.toml` found in [`CONFIG_DIRS`], then `CONFIG_*` environment
//! variables. A missing file is not an error; a malformed one is.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Adapter name for the PostgreSQL path.
pub const POSTGRES: &str = "postgres";
/// Adapter name for the MySQL path.
pub const MYSQL: &str = "mysql";

/// Directories searched for `config.toml`, in order.
pub const CONFIG_DIRS: &[&str] = &[".", "./config", "/etc/todo-api"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP listen port.
    pub port: u16,
    /// Database kind: "postgres" or "mysql".
    pub adapter: String,
    pub adapter_options: AdapterOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 5000,
            adapter: POSTGRES.to_string(),
            adapter_options: AdapterOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdapterOptions {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub use_tls: bool,
    pub auth: AuthOptions,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "demo".to_string(),
            use_tls: true,
            auth: AuthOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthOptions {
    pub username: String,
    pub password: String,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            username: "demo".to_string(),
            password: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional file, and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match CONFIG_DIRS
            .iter()
            .map(|dir| Path::new(dir).join("config.toml"))
            .find(|path| path.exists())
        {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::info!("no config file found, proceeding without one");
                Self::default()
            }
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Parse a specific TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply `CONFIG_*` environment overrides on top of the current values.
    ///
    /// Variable names carry over from the original deployment surface, so
    /// existing environments keep working.
    fn apply_env(&mut self) -> Result<(), ConfigError> {
        let settings = &mut self.settings;
        if let Some(port) = env_parsed("CONFIG_PORT")? {
            settings.port = port;
        }
        if let Ok(adapter) = std::env::var("CONFIG_ADAPTER") {
            settings.adapter = adapter;
        }
        let opts = &mut settings.adapter_options;
        if let Ok(host) = std::env::var("CONFIG_DATABASE_SERVER") {
            opts.host = host;
        }
        if let Some(port) = env_parsed("CONFIG_DATABASE_PORT")? {
            opts.port = port;
        }
        if let Ok(database) = std::env::var("CONFIG_DATABASE_DATABASE") {
            opts.database = database;
        }
        if let Some(use_tls) = env_parsed("CONFIG_DATABASE_USETLS")? {
            opts.use_tls = use_tls;
        }
        if let Ok(username) = std::env::var("CONFIG_DATABASE_AUTH_USERNAME") {
            opts.auth.username = username;
        }
        if let Ok(password) = std::env::var("CONFIG_DATABASE_AUTH_PASSWORD") {
            opts.auth.password = password;
        }
        Ok(())
    }
}

fn env_parsed<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => match raw.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => Err(ConfigError::Env { var, value: raw }),
        },
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_deployment_surface() {
        let config = Config::default();
        assert_eq!(config.settings.port, 5000);
        assert_eq!(config.settings.adapter, POSTGRES);
        let opts = &config.settings.adapter_options;
        assert_eq!(opts.host, "localhost");
        assert_eq!(opts.port, 5432);
        assert_eq!(opts.database, "demo");
        assert!(opts.use_tls);
        assert_eq!(opts.auth.username, "demo");
        assert_eq!(opts.auth.password, "");
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [settings]
            adapter = "mysql"

            [settings.adapter_options]
            port = 3306
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.settings.adapter, MYSQL);
        assert_eq!(config.settings.adapter_options.port, 3306);
        // untouched keys fall back to defaults
        assert_eq!(config.settings.port, 5000);
        assert_eq!(config.settings.adapter_options.host, "localhost");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "settings = 12").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn env_overrides_take_precedence() {
        // single test mutates process env to avoid races between tests
        std::env::set_var("CONFIG_PORT", "8080");
        std::env::set_var("CONFIG_DATABASE_USETLS", "false");
        std::env::set_var("CONFIG_DATABASE_AUTH_USERNAME", "svc");

        let mut config = Config::default();
        config.apply_env().unwrap();
        assert_eq!(config.settings.port, 8080);
        assert!(!config.settings.adapter_options.use_tls);
        assert_eq!(config.settings.adapter_options.auth.username, "svc");

        std::env::set_var("CONFIG_PORT", "not-a-port");
        let err = config.apply_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Env {
                var: "CONFIG_PORT",
                ..
            }
        ));

        std::env::remove_var("CONFIG_PORT");
        std::env::remove_var("CONFIG_DATABASE_USETLS");
        std::env::remove_var("CONFIG_DATABASE_AUTH_USERNAME");
    }
}
