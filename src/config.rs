//! User configuration management
//!
//! Handles persistent configuration for the dashboard and CLI, stored in the
//! user's home directory, with environment-variable overrides applied on top.
//! The provider access token is deliberately env-only and never written to
//! disk.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable holding the provider access token.
pub const ACCESS_TOKEN_ENV: &str = "PAID_ADMIN_ACCESS_TOKEN";

/// User configuration stored in ~/.config/paid-admin/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Dashboard server settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Identity/database provider settings
    #[serde(default)]
    pub provider: ProviderSettings,
    /// Dashboard basic-auth credentials
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host to bind the dashboard to
    pub host: String,
    /// Port to bind the dashboard to
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Base URL of the identity-toolkit REST API for the project
    pub identity_url: String,
    /// Base URL of the realtime database holding `paid_users`
    pub database_url: String,
    /// Accounts fetched per page when listing users
    pub page_size: u32,
    /// HTTP timeout for provider calls, in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSettings {
    /// Basic-auth username for every dashboard route
    pub username: String,
    /// Basic-auth password for every dashboard route
    pub password: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            identity_url: String::new(),
            database_url: String::new(),
            page_size: 100,
            timeout_secs: 30,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            username: "username".to_string(),
            password: "password".to_string(),
        }
    }
}

impl UserConfig {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("paid-admin").join("config.toml"))
    }

    /// Load configuration from disk (or defaults) and apply environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from disk without environment overrides. Used by
    /// the `config` subcommand so `set` round-trips what is actually stored.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", path))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Apply environment-variable overrides on top of the stored values.
    ///
    /// `BASIC_AUTH_USERNAME` / `BASIC_AUTH_PASSWORD` keep their historical
    /// names; everything else is prefixed `PAID_ADMIN_`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("PAID_ADMIN_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PAID_ADMIN_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid PAID_ADMIN_PORT value: {port}"))?;
        }
        if let Ok(url) = std::env::var("PAID_ADMIN_IDENTITY_URL") {
            self.provider.identity_url = url;
        }
        if let Ok(url) = std::env::var("PAID_ADMIN_DATABASE_URL") {
            self.provider.database_url = url;
        }
        if let Ok(username) = std::env::var("BASIC_AUTH_USERNAME") {
            self.dashboard.username = username;
        }
        if let Ok(password) = std::env::var("BASIC_AUTH_PASSWORD") {
            self.dashboard.password = password;
        }
        Ok(())
    }

    /// Read the provider access token from the environment.
    pub fn access_token() -> Result<String> {
        std::env::var(ACCESS_TOKEN_ENV).with_context(|| {
            format!(
                "{ACCESS_TOKEN_ENV} is not set. Export a provider access token \
                 before running commands that reach the provider."
            )
        })
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "host" => Ok(self.server.host.clone()),
            "port" => Ok(self.server.port.to_string()),
            "identity_url" => Ok(self.provider.identity_url.clone()),
            "database_url" => Ok(self.provider.database_url.clone()),
            "page_size" => Ok(self.provider.page_size.to_string()),
            "timeout_secs" => Ok(self.provider.timeout_secs.to_string()),
            "basic_auth_username" => Ok(self.dashboard.username.clone()),
            "basic_auth_password" => Ok(self.dashboard.password.clone()),
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "host" => {
                self.server.host = value.to_string();
            }
            "port" => {
                self.server.port = value
                    .parse()
                    .with_context(|| format!("Invalid port value: {}", value))?;
            }
            "identity_url" => {
                self.provider.identity_url = value.to_string();
            }
            "database_url" => {
                self.provider.database_url = value.to_string();
            }
            "page_size" => {
                self.provider.page_size = value
                    .parse()
                    .with_context(|| format!("Invalid page_size value: {}", value))?;
            }
            "timeout_secs" => {
                self.provider.timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
            }
            "basic_auth_username" => {
                self.dashboard.username = value.to_string();
            }
            "basic_auth_password" => {
                self.dashboard.password = value.to_string();
            }
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }

    /// Display all configuration values
    pub fn display(&self) -> String {
        format!(
            r#"Paid-Admin Configuration

Server Settings:
  host: {}
  port: {}

Provider Settings:
  identity_url: {}
  database_url: {}
  page_size: {}
  timeout_secs: {}s

Dashboard Settings:
  basic_auth_username: {}
  basic_auth_password: {}

Access token: read from ${} (never stored)
Config file: {}
"#,
            self.server.host,
            self.server.port,
            display_or_unset(&self.provider.identity_url),
            display_or_unset(&self.provider.database_url),
            self.provider.page_size,
            self.provider.timeout_secs,
            self.dashboard.username,
            mask(&self.dashboard.password),
            ACCESS_TOKEN_ENV,
            Self::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "unknown".to_string())
        )
    }

    /// Get available configuration keys
    pub fn available_keys() -> &'static [&'static str] {
        &[
            "host",
            "port",
            "identity_url",
            "database_url",
            "page_size",
            "timeout_secs",
            "basic_auth_username",
            "basic_auth_password",
        ]
    }
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "<unset>"
    } else {
        value
    }
}

fn mask(value: &str) -> String {
    "*".repeat(value.chars().count().min(8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_historical_values() {
        let config = UserConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.provider.page_size, 100);
        assert_eq!(config.dashboard.username, "username");
        assert_eq!(config.dashboard.password, "password");
    }

    #[test]
    fn get_and_set_round_trip() {
        let mut config = UserConfig::default();
        for key in UserConfig::available_keys() {
            assert!(config.get(key).is_ok(), "key '{key}' should be readable");
        }

        config.set("port", "9090").unwrap();
        assert_eq!(config.get("port").unwrap(), "9090");

        config
            .set("identity_url", "https://identity.example.com/v1/projects/demo")
            .unwrap();
        assert_eq!(
            config.get("identity_url").unwrap(),
            "https://identity.example.com/v1/projects/demo"
        );

        assert!(config.set("port", "not-a-port").is_err());
        assert!(config.set("unknown_key", "x").is_err());
        assert!(config.get("unknown_key").is_err());
    }

    #[test]
    fn toml_round_trip_preserves_sections() {
        let mut config = UserConfig::default();
        config.provider.database_url = "https://demo.example-db.app".to_string();
        config.server.port = 8888;

        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: UserConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.server.port, 8888);
        assert_eq!(parsed.provider.database_url, "https://demo.example-db.app");
    }

    #[test]
    fn save_and_load_round_trip_on_disk() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let original_home = std::env::var("HOME").ok();
        std::env::set_var("HOME", temp_dir.path());

        let mut config = UserConfig::default();
        config.server.port = 8181;
        config.provider.identity_url = "https://identity.example.com/v1/projects/demo".to_string();
        config.save().unwrap();

        let loaded = UserConfig::load_file().unwrap();
        assert_eq!(loaded.server.port, 8181);
        assert_eq!(
            loaded.provider.identity_url,
            "https://identity.example.com/v1/projects/demo"
        );

        if let Some(home) = original_home {
            std::env::set_var("HOME", home);
        }
    }

    #[test]
    fn env_overrides_replace_stored_values() {
        // Touches process-global env vars; keep every mutation in one test to
        // avoid racing with parallel test threads.
        std::env::set_var("PAID_ADMIN_PORT", "9999");
        std::env::set_var("BASIC_AUTH_USERNAME", "ops");

        let mut config = UserConfig::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.dashboard.username, "ops");

        std::env::set_var("PAID_ADMIN_PORT", "not-a-number");
        let mut config = UserConfig::default();
        assert!(config.apply_env_overrides().is_err());

        std::env::remove_var("PAID_ADMIN_PORT");
        std::env::remove_var("BASIC_AUTH_USERNAME");
    }
}
