//! Chat server configuration

use std::sync::Arc;
use std::time::Duration;

use crate::chat::messages::MessageManager;
use crate::chat::participants::ParticipantManager;
use crate::core::store::ChatStore;

/// Participants silent for longer than this are evicted.
pub const PRESENCE_TIMEOUT: Duration = Duration::from_secs(15);

/// Period of the presence sweep. Not configurable at runtime.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(15);

const DEFAULT_DATABASE_URL: &str = "sqlite://chat.sqlite";
const DEFAULT_PORT: u16 = 5000;

/// Configuration for the chat server
#[derive(Clone, Debug)]
pub struct ChatServerConfig {
    /// sqlx connection string for the participant and message store
    pub database_url: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ChatServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ChatServerConfig {
    /// Build config from the process environment (`DATABASE_URL`, `PORT`).
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ChatStore>,
    pub participants: Arc<ParticipantManager>,
    pub messages: Arc<MessageManager>,
}

impl AppState {
    pub fn new(store: Arc<ChatStore>) -> Self {
        Self {
            participants: Arc::new(ParticipantManager::new(store.clone())),
            messages: Arc::new(MessageManager::new(store.clone())),
            store,
        }
    }
}
