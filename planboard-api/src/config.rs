/// Configuration management for the API server
///
/// Loads configuration from environment variables (and a `.env` file when
/// present) into a type-safe struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 3001)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: http://localhost:3000)
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for access tokens, at least 32 characters (required)
/// - `PASSWORD_HASH_MEMORY_KIB` / `PASSWORD_HASH_ITERATIONS` / `PASSWORD_HASH_PARALLELISM`:
///   Argon2id cost (default: 65536 / 3 / 4)
/// - `MAIL_FROM`: Sender address (default: no-reply@planboard.local)
/// - `MAIL_RELAY_URL`: HTTP mail relay endpoint; emails are only logged when unset
/// - `MAIL_RELAY_TOKEN`: Bearer token for the relay
/// - `APP_BASE_URL`: Front-end origin used in emailed links (default: http://localhost:3000)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use planboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use planboard_shared::auth::password::HashCost;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Password hashing cost
    pub password: PasswordConfig,

    /// Outgoing email configuration
    pub mail: MailConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any origin
    pub cors_origins: Vec<String>,

    /// Production mode (adds HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for access-token signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Argon2id cost used for new password hashes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl PasswordConfig {
    pub fn cost(&self) -> HashCost {
        HashCost {
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let cost = HashCost::default();
        Self {
            memory_kib: cost.memory_kib,
            iterations: cost.iterations,
            parallelism: cost.parallelism,
        }
    }
}

/// Outgoing email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Sender address
    pub from: String,

    /// HTTP relay endpoint; `None` selects the logging mailer
    pub relay_url: Option<String>,

    /// Bearer token sent to the relay
    pub relay_token: Option<String>,

    /// Base URL of the front end, used to build password-reset links
    pub app_base_url: String,
}

fn env_or<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .with_context(|| format!("{} has an invalid value: {:?}", key, raw))
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Splits a comma-separated origin list, dropping blanks
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| o.trim_end_matches('/').to_string())
        .collect()
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a value doesn't
    /// parse, or `JWT_SECRET` is shorter than 32 characters.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let defaults = PasswordConfig::default();

        Ok(Self {
            api: ApiConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env_or("API_PORT", "3001")?,
                cors_origins: parse_origins(
                    &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
                ),
                production: env_or("PRODUCTION", "false")?,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", "10")?,
            },
            jwt: JwtConfig { secret: jwt_secret },
            password: PasswordConfig {
                memory_kib: env_or("PASSWORD_HASH_MEMORY_KIB", &defaults.memory_kib.to_string())?,
                iterations: env_or("PASSWORD_HASH_ITERATIONS", &defaults.iterations.to_string())?,
                parallelism: env_or("PASSWORD_HASH_PARALLELISM", &defaults.parallelism.to_string())?,
            },
            mail: MailConfig {
                from: env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@planboard.local".to_string()),
                relay_url: env_opt("MAIL_RELAY_URL"),
                relay_token: env_opt("MAIL_RELAY_TOKEN"),
                app_base_url: env::var("APP_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string())
                    .trim_end_matches('/')
                    .to_string(),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 3001,
                cors_origins: vec!["http://localhost:3000".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            password: PasswordConfig::default(),
            mail: MailConfig {
                from: "no-reply@planboard.local".to_string(),
                relay_url: None,
                relay_token: None,
                app_base_url: "http://localhost:3000".to_string(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(config().bind_address(), "127.0.0.1:3001");
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://localhost:3000/, https://planboard.app ,,"),
            vec!["http://localhost:3000", "https://planboard.app"]
        );
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_password_config_defaults_to_hash_cost() {
        assert_eq!(config().password.cost(), HashCost::default());
    }
}
