//! Message log
//!
//! Sending and reading chat messages.

use crate::chat::visibility::visible_messages;
use crate::core::error::{Error, Result};
use crate::core::models::{Message, MessageKind};
use crate::core::store::ChatStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

pub struct MessageManager {
    store: Arc<ChatStore>,
}

impl MessageManager {
    pub fn new(store: Arc<ChatStore>) -> Self {
        Self { store }
    }

    /// Append a prebuilt record to the log
    pub async fn append(&self, message: &Message) -> Result<()> {
        if message.from.is_empty() || message.to.is_empty() {
            return Err(Error::validation("message needs both from and to"));
        }
        self.store.append_message(message).await
    }

    /// Post a participant's message.
    ///
    /// Only `broadcast` and `directed` may be sent; status messages are
    /// produced by the server. Nothing is appended on failure.
    pub async fn send(&self, from: &str, to: &str, text: &str, kind: &str) -> Result<Message> {
        let to = to.trim();
        let text = text.trim();
        if to.is_empty() || text.is_empty() {
            return Err(Error::validation("to and text must be non-empty strings"));
        }

        let kind = match kind.parse::<MessageKind>() {
            Ok(k @ (MessageKind::Broadcast | MessageKind::Directed)) => k,
            _ => {
                return Err(Error::validation(format!(
                    "kind must be broadcast or directed, got {:?}",
                    kind
                )))
            }
        };

        if !self.store.participant_exists(from).await? {
            warn!("[Messages] Rejected message from unknown sender {:?}", from);
            return Err(Error::validation(format!("unknown sender {:?}", from)));
        }

        let message = Message::new(from, to, text, kind, Utc::now());
        self.append(&message).await?;

        info!("[Messages] {} -> {} ({})", from, to, kind);
        Ok(message)
    }

    /// Messages `participant` may see, optionally only the last `limit`
    pub async fn list_for(&self, participant: &str, limit: Option<usize>) -> Result<Vec<Message>> {
        let log = self.store.list_messages().await?;
        Ok(visible_messages(&log, participant, limit))
    }
}
