//! Application configuration loaded eagerly from the environment.
//!
//! Every required variable is validated at startup; a missing value aborts
//! boot with a named error instead of failing the first request that needs it.

use std::{env, time::Duration};

use thiserror::Error;

/// Cookie carrying the short-lived REST access token.
pub const ACCESS_TOKEN_COOKIE: &str = "_access_token";
/// Cookie carrying the long-lived remember-me token.
pub const REMEMBER_ME_COOKIE: &str = "_remember_me_";
/// Cookie carrying the room-scoped play token used by the socket gateway.
pub const PLAY_TOKEN_COOKIE: &str = "_play_token";

/// Error raised when the environment is missing or malformed at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("missing required environment variable `{0}`")]
    Missing(&'static str),
    /// A variable is present but cannot be parsed.
    #[error("invalid value for environment variable `{var}`: {reason}")]
    Invalid {
        /// Name of the offending variable.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// MongoDB settings.
    pub mongo: MongoSettings,
    /// JWT signing settings.
    pub jwt: JwtSettings,
    /// Cookie signing secret.
    pub cookie_secret: String,
    /// AMQP settings for the logs/notifications queues.
    pub amqp: AmqpSettings,
    /// SMTP settings for outbound email.
    pub smtp: SmtpSettings,
    /// Object storage settings for uploads.
    pub s3: S3Settings,
    /// Shared secret expected in the `Authorization: Bearer` header.
    pub api_key: String,
    /// Base URL of the frontend, used in email links.
    pub frontend_url: String,
    /// Per-route throttle table.
    pub throttle: ThrottleSettings,
}

/// MongoDB connection settings.
#[derive(Debug, Clone)]
pub struct MongoSettings {
    /// Connection string.
    pub uri: String,
    /// Database name.
    pub database: String,
}

/// JWT signing settings and token lifetimes.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    /// HS256 signing secret.
    pub secret: String,
    /// Expected audience claim.
    pub audience: String,
    /// Expected issuer claim.
    pub issuer: String,
    /// Lifetime of REST access tokens.
    pub access_ttl: Duration,
    /// Lifetime of remember-me tokens.
    pub remember_ttl: Duration,
    /// Lifetime of room-scoped play tokens.
    pub room_ttl: Duration,
}

/// AMQP connection settings and queue names.
#[derive(Debug, Clone)]
pub struct AmqpSettings {
    /// AMQP connection URI.
    pub uri: String,
    /// Queue name for centralized logging.
    pub logs_queue: String,
    /// Queue name for email notifications.
    pub notifications_queue: String,
}

/// SMTP transport settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// SMTP relay hostname.
    pub host: String,
    /// SMTP relay port.
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password.
    pub password: String,
    /// Sender address.
    pub from: String,
}

/// Object storage settings for avatar and media uploads.
#[derive(Debug, Clone)]
pub struct S3Settings {
    /// Storage endpoint URL.
    pub endpoint: String,
    /// Bucket name.
    pub bucket: String,
    /// Region identifier.
    pub region: String,
    /// Access key id.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
}

/// Fixed-window throttle numbers handed to the throttle middleware.
#[derive(Debug, Clone)]
pub struct ThrottleSettings {
    /// Default requests allowed per window.
    pub default_limit: u32,
    /// Default window length.
    pub default_window: Duration,
    /// Tighter limit applied to authentication routes.
    pub auth_limit: u32,
    /// Window length for authentication routes.
    pub auth_window: Duration,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            default_limit: 60,
            default_window: Duration::from_secs(60),
            auth_limit: 10,
            auth_window: Duration::from_secs(60),
        }
    }
}

impl AppConfig {
    /// Load and validate the full configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: optional_parsed("PORT", 8080)?,
            mongo: MongoSettings {
                uri: required("MONGO_URI")?,
                database: required("MONGO_DB")?,
            },
            jwt: JwtSettings {
                secret: required("JWT_SECRET")?,
                audience: optional("JWT_AUDIENCE", "fahoot"),
                issuer: optional("JWT_ISSUER", "fahoot-back"),
                access_ttl: Duration::from_secs(optional_parsed("JWT_ACCESS_TTL_SECS", 900)?),
                remember_ttl: Duration::from_secs(optional_parsed(
                    "JWT_REMEMBER_TTL_SECS",
                    60 * 60 * 24 * 30,
                )?),
                room_ttl: Duration::from_secs(optional_parsed(
                    "JWT_ROOM_TTL_SECS",
                    60 * 60 * 4,
                )?),
            },
            cookie_secret: {
                let secret = required("COOKIE_SECRET")?;
                // Key derivation requires at least 32 bytes of material.
                if secret.len() < 32 {
                    return Err(ConfigError::Invalid {
                        var: "COOKIE_SECRET",
                        reason: "must be at least 32 bytes".to_string(),
                    });
                }
                secret
            },
            amqp: AmqpSettings {
                uri: required("AMQP_URI")?,
                logs_queue: optional("AMQP_LOGS_QUEUE", "logs"),
                notifications_queue: optional("AMQP_NOTIFICATIONS_QUEUE", "notifications"),
            },
            smtp: SmtpSettings {
                host: required("SMTP_HOST")?,
                port: optional_parsed("SMTP_PORT", 587)?,
                username: required("SMTP_USERNAME")?,
                password: required("SMTP_PASSWORD")?,
                from: required("SMTP_FROM")?,
            },
            s3: S3Settings {
                endpoint: required("S3_ENDPOINT")?,
                bucket: required("S3_BUCKET")?,
                region: optional("S3_REGION", "us-east-1"),
                access_key: required("S3_ACCESS_KEY")?,
                secret_key: required("S3_SECRET_KEY")?,
            },
            api_key: required("API_KEY")?,
            frontend_url: optional("FRONTEND_URL", "http://localhost:5173"),
            throttle: ThrottleSettings {
                default_limit: optional_parsed(
                    "THROTTLE_DEFAULT_LIMIT",
                    ThrottleSettings::default().default_limit,
                )?,
                default_window: Duration::from_secs(optional_parsed(
                    "THROTTLE_DEFAULT_WINDOW_SECS",
                    60,
                )?),
                auth_limit: optional_parsed(
                    "THROTTLE_AUTH_LIMIT",
                    ThrottleSettings::default().auth_limit,
                )?,
                auth_window: Duration::from_secs(optional_parsed(
                    "THROTTLE_AUTH_WINDOW_SECS",
                    60,
                )?),
            },
        })
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}

fn optional(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn optional_parsed<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => {
            value.parse::<T>().map_err(|err| ConfigError::Invalid {
                var,
                reason: err.to_string(),
            })
        }
        _ => Ok(default),
    }
}
