//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::lobby::registry::RoomRegistry;
use crate::ws::router::MessageRouter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<RoomRegistry>,
    pub router: Arc<MessageRouter>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        let registry = Arc::new(RoomRegistry::new());
        let router = Arc::new(MessageRouter::new(registry.clone()));

        Self {
            config,
            registry,
            router,
        }
    }
}
