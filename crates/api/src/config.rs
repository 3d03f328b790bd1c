use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Maximum GraphQL query depth (default: `12`).
    pub graphql_depth_limit: usize,
    /// Maximum GraphQL query complexity (default: `500`).
    pub graphql_complexity_limit: usize,
    /// How long a loader batch window stays open, in milliseconds (default: `1`).
    pub loader_delay_ms: u64,
    /// JWT token and cookie configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `3000`                     |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                       |
    /// | `GRAPHQL_DEPTH_LIMIT`      | `12`                       |
    /// | `GRAPHQL_COMPLEXITY_LIMIT` | `500`                      |
    /// | `LOADER_DELAY_MS`          | `1`                        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let graphql_depth_limit: usize = std::env::var("GRAPHQL_DEPTH_LIMIT")
            .unwrap_or_else(|_| "12".into())
            .parse()
            .expect("GRAPHQL_DEPTH_LIMIT must be a valid usize");

        let graphql_complexity_limit: usize = std::env::var("GRAPHQL_COMPLEXITY_LIMIT")
            .unwrap_or_else(|_| "500".into())
            .parse()
            .expect("GRAPHQL_COMPLEXITY_LIMIT must be a valid usize");

        let loader_delay_ms: u64 = std::env::var("LOADER_DELAY_MS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("LOADER_DELAY_MS must be a valid u64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            graphql_depth_limit,
            graphql_complexity_limit,
            loader_delay_ms,
            jwt,
        }
    }
}
