//! Application configuration, read once from the environment at startup.

use std::net::SocketAddr;

use crate::db::DbConfig;

/// Logging settings consumed by [`crate::logging::init`].
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub environment: String,
    pub level: String,
    pub dir: String,
}

impl LoggingConfig {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Top-level configuration for the API server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server without a store; public reads degrade to empty lists.
    pub database: Option<DbConfig>,
    /// `None` allows any origin.
    pub allowed_origins: Option<Vec<String>>,
    /// Bearer token required on `/admin/*` when set.
    pub admin_token: Option<String>,
    pub logging: LoggingConfig,
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_var(key)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Self {
        let environment = env_var("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let default_level = if environment == "production" {
            "info"
        } else {
            "debug"
        };

        let database = env_var("DATABASE_URL").map(|url| DbConfig {
            url,
            max_connections: env_parse("DB_POOL_MAX", 5),
            connect_timeout_secs: env_parse("DB_CONNECT_TIMEOUT", 10),
        });

        let allowed_origins = env_var("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty());

        Self {
            host: env_var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: env_parse("PORT", 8787),
            database,
            allowed_origins,
            admin_token: env_var("ADMIN_API_TOKEN"),
            logging: LoggingConfig {
                level: env_var("LOG_LEVEL").unwrap_or_else(|| default_level.to_string()),
                dir: env_var("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
                environment,
            },
        }
    }

    /// Socket address to bind, from `HOST` and `PORT`.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
