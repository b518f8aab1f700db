use std::sync::Arc;

use helpdesk_db::store::PgStore;

use crate::config::ServerConfig;
use crate::pipeline::MutationPipeline;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (read-only endpoints query it directly).
    pub pool: helpdesk_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// The shared mutation pipeline: every create/update/delete goes
    /// through it.
    pub pipeline: Arc<MutationPipeline<PgStore>>,
}
