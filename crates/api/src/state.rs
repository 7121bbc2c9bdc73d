use std::sync::Arc;

use gighub_events::EventBus;

use crate::config::ServerConfig;
use crate::engine::ProjectEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and the rest sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gighub_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Event bus the engine publishes committed changes to.
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    /// A project engine over this state's pool and bus.
    pub fn engine(&self) -> ProjectEngine {
        ProjectEngine::new(self.pool.clone(), Arc::clone(&self.event_bus))
    }
}
