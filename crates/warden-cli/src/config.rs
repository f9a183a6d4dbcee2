//! Configuration for the warden binary.
//!
//! Provides the [`WardenConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `WARDEN_CONFIG` environment variable
//! 3. XDG default: `~/.config/warden/config.toml`
//! 4. Built-in defaults
//!
//! `WARDEN_<SECTION>_<KEY>` environment variables override file values.

use std::path::PathBuf;
use std::time::Duration;

use confyg::{Confygery, env};
use serde::{Deserialize, Serialize};

use warden_auth::AuthConfig;

use crate::{Error, Result};

/// Name used for the config directory and env var prefix.
pub const PROJECT_NAME: &str = "warden";

/// Longest accepted token lifetime, in minutes (30 days).
pub const MAX_TOKEN_TTL_MINUTES: u64 = 30 * 24 * 60;

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the warden binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// HTTP server configuration.
    pub server: ServerConfig,

    /// Token and account configuration.
    pub auth: AuthSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,

    /// Port to listen on.
    pub port: u16,
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// When false, every request is anonymous.
    pub enabled: bool,

    /// HS256 signing secret. Required to serve.
    pub secret: String,

    /// Issuer written into and expected on tokens.
    pub issuer: String,

    /// Access token lifetime in minutes.
    pub token_ttl_minutes: u64,

    /// Refresh token lifetime in minutes.
    pub refresh_ttl_minutes: u64,

    /// Email of an admin account to create at startup.
    pub admin_email: String,

    /// Password of the startup admin account.
    pub admin_password: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence.
    pub level: String,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            secret: String::new(),
            issuer: PROJECT_NAME.to_string(),
            token_ttl_minutes: 30,
            refresh_ttl_minutes: 24 * 60,
            admin_email: String::new(),
            admin_password: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,warden=debug".to_string(),
        }
    }
}

impl AuthSettings {
    /// Access token lifetime as a duration.
    pub fn token_ttl(&self) -> Duration {
        minutes(self.token_ttl_minutes)
    }

    /// Refresh token lifetime as a duration.
    pub fn refresh_ttl(&self) -> Duration {
        minutes(self.refresh_ttl_minutes)
    }

    /// Middleware configuration derived from these settings.
    pub fn middleware_config(&self) -> AuthConfig {
        AuthConfig {
            enabled: self.enabled,
            issuer: self.issuer.clone(),
        }
    }

    /// Startup admin credentials, if both are configured.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        if self.admin_email.is_empty() || self.admin_password.is_empty() {
            None
        } else {
            Some((&self.admin_email, &self.admin_password))
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl WardenConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level("WARDEN");
        env_opts.add_section("server");
        env_opts.add_section("auth");
        env_opts.add_section("logging");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("WARDEN_CONFIG") {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(PROJECT_NAME).join("config.toml"))
    }

    /// Check the settings needed to serve.
    pub fn validate_for_serve(&self) -> Result<()> {
        if self.auth.enabled && self.auth.secret.is_empty() {
            return Err(Error::config(
                "auth.secret must be set (or WARDEN_AUTH_SECRET exported) to serve",
            ));
        }
        check_ttl("auth.token_ttl_minutes", self.auth.token_ttl_minutes)?;
        check_ttl("auth.refresh_ttl_minutes", self.auth.refresh_ttl_minutes)?;
        if self.auth.refresh_ttl_minutes < self.auth.token_ttl_minutes {
            return Err(Error::config(
                "auth.refresh_ttl_minutes must not be shorter than auth.token_ttl_minutes",
            ));
        }
        Ok(())
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `WARDEN_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, "WARDEN", &mut vars);
        Ok(vars)
    }
}

fn minutes(count: u64) -> Duration {
    Duration::from_secs(count.saturating_mul(60))
}

fn check_ttl(key: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(Error::config(format!("{key} must be positive")));
    }
    if value > MAX_TOKEN_TTL_MINUTES {
        return Err(Error::config(format!(
            "{key} must be at most {MAX_TOKEN_TTL_MINUTES}"
        )));
    }
    Ok(())
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Flatten the section tables into `WARDEN_<SECTION>_<KEY>` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================
