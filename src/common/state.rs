use moka::future::Cache;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

use crate::analysis::MemorySession;
use crate::config::Config;

/// Session-scoped key-value stores keyed by session id. Entries expire
/// after the configured idle time, which ends the session.
pub type SessionCache = Cache<String, MemorySession>;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub sessions: SessionCache,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let sessions: SessionCache = Cache::builder()
            .max_capacity(config.session_max_entries)
            .time_to_idle(Duration::from_secs(config.session_idle_seconds))
            .build();

        Self {
            db,
            config: Arc::new(config),
            sessions,
        }
    }
}
