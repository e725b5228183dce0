//! Application configuration loaded from environment variables.
//!
//! Everything is collected once at startup into an explicit config object
//! that gets passed by reference into state construction - no ambient
//! globals beyond the process environment itself.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use pinboard_infra::auth::JwtConfig;
use pinboard_infra::database::DatabaseConfig;
use pinboard_infra::rate_limit::RateLimitConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base URL under which uploaded images are publicly reachable.
    pub public_base_url: String,
    /// Directory where uploaded images are written.
    pub uploads_dir: PathBuf,
    pub database: Option<DatabaseConfig>,
    /// Token signing settings (secret, expiry, issuer).
    pub jwt: JwtConfig,
    /// Quota applied to the auth endpoints.
    pub auth_rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"));

        let auth_rate_limit = RateLimitConfig {
            max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            window: Duration::from_secs(
                env::var("RATE_LIMIT_WINDOW_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        };

        Self {
            host,
            port,
            public_base_url,
            uploads_dir: env::var("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            database,
            jwt: JwtConfig::from_env(),
            auth_rate_limit,
        }
    }
}
