use std::sync::Arc;

use crate::config::ServerConfig;
use crate::graphql::InkwellSchema;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: inkwell_db::DbPool,
    /// Server configuration (accessed by the identity extractor and handlers).
    pub config: Arc<ServerConfig>,
    /// The executable GraphQL schema.
    pub schema: InkwellSchema,
}

impl AppState {
    pub fn new(pool: inkwell_db::DbPool, config: ServerConfig) -> Self {
        let schema = crate::graphql::build_schema(pool.clone(), &config);
        Self {
            pool,
            config: Arc::new(config),
            schema,
        }
    }
}
