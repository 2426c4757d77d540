//! Participant registry
//!
//! Registration, heartbeats and listing of active participants.

use crate::core::error::{Error, Result};
use crate::core::models::{Message, Participant, JOINED_TEXT};
use crate::core::store::ChatStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

/// Participant manager handles all presence-related operations
pub struct ParticipantManager {
    store: Arc<ChatStore>,
}

impl ParticipantManager {
    pub fn new(store: Arc<ChatStore>) -> Self {
        Self { store }
    }

    /// Register `name` and announce it to the room.
    ///
    /// The announcement is a separate write: if it fails the participant stays
    /// registered and the store error is returned.
    pub async fn register(&self, name: &str) -> Result<Participant> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("name must be a non-empty string"));
        }

        if self.store.participant_exists(name).await? {
            return Err(Error::Conflict(name.to_string()));
        }

        let now = Utc::now();
        let participant = Participant::new(name, now);
        self.store.insert_participant(&participant).await?;

        let joined = Message::status(name, JOINED_TEXT, now);
        if let Err(e) = self.store.append_message(&joined).await {
            error!(
                "[Participants] {} registered but join announcement failed: {}",
                name, e
            );
            return Err(e);
        }

        info!("[Participants] {} joined", name);
        Ok(participant)
    }

    /// Refresh `last_seen` for `name`
    pub async fn heartbeat(&self, name: &str) -> Result<()> {
        if !self.store.touch_participant(name, Utc::now()).await? {
            return Err(Error::NotFound(name.to_string()));
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Participant>> {
        self.store.list_participants().await
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        self.store.participant_exists(name).await
    }
}
