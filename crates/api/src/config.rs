//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `JWT_KEY` - HMAC-SHA256 signing key for session tokens (must be non-empty)
//!
//! ## Optional
//! - `JWT_ISSUER_NAME` - Token issuer (default: merchant-bank-api)
//! - `JWT_LIFE_TIME` - Token lifetime in hours (default: 24)
//! - `BANK_HOST` - Bind address (default: 127.0.0.1)
//! - `BANK_PORT` - Listen port (default: 8080)
//! - `BANK_DATA_DIR` - Directory holding the JSON collections (default: database)
//! - `BANK_UNIQUE_USERNAMES` - Reject duplicate usernames at registration (default: false)
//! - `BANK_PASSWORD_MEMORY_KIB` - Argon2 memory cost in KiB
//! - `BANK_PASSWORD_ITERATIONS` - Argon2 iteration count
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::services::password::PasswordCost;

/// Signing keys shorter than this are accepted but reported at startup.
const RECOMMENDED_SIGNING_KEY_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_ISSUER: &str = "merchant-bank-api";
const DEFAULT_TOKEN_LIFETIME_HOURS: u64 = 24;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Empty secret in {0}")]
    EmptySecret(String),
}

/// Merchant bank service configuration.
#[derive(Debug, Clone)]
pub struct BankConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory holding `customer.json`, `payment.json` and `history.json`
    pub data_dir: PathBuf,
    /// Session token configuration
    pub token: TokenConfig,
    /// Reject registrations whose username is already taken
    pub unique_usernames: bool,
    /// Argon2 cost parameters for password hashing
    pub password_cost: PasswordCost,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Session token configuration.
///
/// Implements `Debug` manually to redact the signing key.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC signing key
    pub signing_key: SecretString,
    /// Value of the `iss` claim on issued tokens, required on verified ones
    pub issuer: String,
    /// How long an issued token stays valid
    pub lifetime: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("signing_key", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl TokenConfig {
    /// Build a token configuration, rejecting an empty signing key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptySecret` if `signing_key` is empty.
    pub fn new(
        signing_key: SecretString,
        issuer: impl Into<String>,
        lifetime: Duration,
    ) -> Result<Self, ConfigError> {
        if signing_key.expose_secret().is_empty() {
            return Err(ConfigError::EmptySecret("JWT_KEY".to_string()));
        }
        Ok(Self {
            signing_key,
            issuer: issuer.into(),
            lifetime,
        })
    }
}

impl BankConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `JWT_KEY` is missing or empty, or if any
    /// optional variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("BANK_HOST", "127.0.0.1")?;
        let port = parse_env("BANK_PORT", "8080")?;
        let data_dir = PathBuf::from(get_env_or_default("BANK_DATA_DIR", "database"));

        let token = TokenConfig::from_env()?;
        warn_on_weak_signing_key(&token.signing_key, "JWT_KEY");

        let unique_usernames = parse_env("BANK_UNIQUE_USERNAMES", "false")?;
        let password_cost = PasswordCost::from_env()?;

        Ok(Self {
            host,
            port,
            data_dir,
            token,
            unique_usernames,
            password_cost,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl TokenConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let signing_key = get_required_secret("JWT_KEY")?;
        let issuer = get_env_or_default("JWT_ISSUER_NAME", DEFAULT_ISSUER);
        let hours: u64 = parse_env("JWT_LIFE_TIME", &DEFAULT_TOKEN_LIFETIME_HOURS.to_string())?;
        Self::new(signing_key, issuer, token_lifetime(hours)?)
    }
}

fn token_lifetime(hours: u64) -> Result<Duration, ConfigError> {
    hours
        .checked_mul(60 * 60)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "JWT_LIFE_TIME".to_string(),
                format!("{hours} hours is too long"),
            )
        })
}

impl PasswordCost {
    /// Load the hashing cost from `BANK_PASSWORD_MEMORY_KIB` and
    /// `BANK_PASSWORD_ITERATIONS`, keeping defaults for unset values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a value is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(get_optional_env)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let memory_kib = match lookup("BANK_PASSWORD_MEMORY_KIB") {
            Some(v) => parse_value("BANK_PASSWORD_MEMORY_KIB", &v)?,
            None => defaults.memory_kib,
        };
        let iterations = match lookup("BANK_PASSWORD_ITERATIONS") {
            Some(v) => parse_value("BANK_PASSWORD_ITERATIONS", &v)?,
            None => defaults.iterations,
        };
        Ok(Self {
            memory_kib,
            iterations,
            ..defaults
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Describe why a signing key looks weak, if it does.
fn signing_key_weakness(secret: &str) -> Option<String> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Some(format!("appears to be a placeholder (contains '{pattern}')"));
        }
    }

    if secret.len() < RECOMMENDED_SIGNING_KEY_LENGTH {
        return Some(format!(
            "shorter than {RECOMMENDED_SIGNING_KEY_LENGTH} characters (got {})",
            secret.len()
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Some(format!(
            "entropy too low ({entropy:.2} bits/char, want >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
        ));
    }

    None
}

/// Log a warning if the signing key is a placeholder or low-entropy value.
///
/// Any non-empty key is accepted so existing deployments keep working.
fn warn_on_weak_signing_key(secret: &SecretString, var_name: &str) {
    if let Some(reason) = signing_key_weakness(secret.expose_secret()) {
        tracing::warn!(var = var_name, %reason, "weak token signing key");
    }
}
