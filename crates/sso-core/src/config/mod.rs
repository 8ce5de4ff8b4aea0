//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files and environment variables. Each sub-module represents a
//! logical configuration section.

pub mod auth;
pub mod database;
pub mod logging;
pub mod server;

use serde::{Deserialize, Serialize};

use self::auth::{AuthConfig, MAX_TOKEN_TTL_HOURS, MIN_SECRET_LENGTH};
use self::database::DatabaseConfig;
use self::logging::LoggingConfig;
use self::server::ServerConfig;

use crate::error::AppError;

/// Environment variables understood for compatibility with existing
/// deployments, mapped onto their configuration keys.
const LEGACY_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DATABASE_URL", "database.url"),
    ("COOKIE_SECRET", "auth.token_secret"),
    ("SERVER_PORT", "server.port"),
];

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Sources, lowest precedence first: `config/default.toml`,
    /// `config/{env}.toml`, variables prefixed with `SSO__`, and finally
    /// `DATABASE_URL`, `COOKIE_SECRET` and `SERVER_PORT`. The result is
    /// validated before it is returned.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SSO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in LEGACY_ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        let config = builder
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        app.validate()?;
        Ok(app)
    }

    /// Reject configurations the service cannot run safely with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.token_secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::configuration(format!(
                "auth.token_secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }
        if self.auth.token_ttl_hours == 0 || self.auth.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(AppError::configuration(format!(
                "auth.token_ttl_hours must be between 1 and {MAX_TOKEN_TTL_HOURS}"
            )));
        }
        if self.auth.store_timeout_seconds == 0 {
            return Err(AppError::configuration(
                "auth.store_timeout_seconds must be greater than zero",
            ));
        }
        if self.auth.password_min_length == 0
            || self.auth.password_min_length > self.auth.password_max_length
        {
            return Err(AppError::configuration(
                "auth.password_min_length must be between 1 and auth.password_max_length",
            ));
        }
        if self.database.url.is_empty() {
            return Err(AppError::configuration("database.url must be set"));
        }
        if self
            .server
            .cors
            .allowed_origins
            .iter()
            .chain(&self.server.cors.allowed_headers)
            .any(|v| v == "*")
        {
            return Err(AppError::configuration(
                "CORS wildcards cannot be combined with credentialed requests",
            ));
        }
        Ok(())
    }
}
