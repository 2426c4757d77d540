//! Presence monitor
//!
//! Periodically evicts participants that stopped sending heartbeats and
//! announces each departure to the room.

use crate::core::config::{PRESENCE_TIMEOUT, SWEEP_INTERVAL};
use crate::core::error::Result;
use crate::core::models::{Message, LEFT_TEXT};
use crate::core::store::ChatStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// One sweep as of `now`: evict everyone last seen before `now - PRESENCE_TIMEOUT`.
///
/// Returns the evicted names. A failure on one participant is logged and the
/// sweep moves on to the next.
pub async fn sweep_at(store: &ChatStore, now: DateTime<Utc>) -> Result<Vec<String>> {
    let timeout = chrono::Duration::from_std(PRESENCE_TIMEOUT).unwrap_or_default();
    let cutoff = now - timeout;

    let stale = store.stale_participants(cutoff).await?;
    let mut evicted = Vec::with_capacity(stale.len());

    for participant in stale {
        let farewell = Message::status(&participant.name, LEFT_TEXT, now);
        match store
            .evict_participant(&participant.name, cutoff, &farewell)
            .await
        {
            Ok(true) => {
                info!("[Presence] {} timed out", participant.name);
                evicted.push(participant.name);
            }
            Ok(false) => {}
            Err(e) => error!("[Presence] Failed to evict {}: {}", participant.name, e),
        }
    }

    Ok(evicted)
}

/// Handle to the background sweep task
pub struct PresenceMonitor {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PresenceMonitor {
    /// Start sweeping every `SWEEP_INTERVAL`. The first sweep runs one full
    /// interval after start.
    pub fn start(store: Arc<ChatStore>) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + SWEEP_INTERVAL, SWEEP_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        debug!("[Presence] Sweep tick");
                        if let Err(e) = sweep_at(&store, Utc::now()).await {
                            error!("[Presence] Sweep failed: {}", e);
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("[Presence] Monitor stopped");
        });

        info!(
            "[Presence] Monitor started (timeout {:?}, interval {:?})",
            PRESENCE_TIMEOUT, SWEEP_INTERVAL
        );

        Self { shutdown, handle }
    }

    /// Stop the task and wait for an in-flight sweep to finish
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            error!("[Presence] Monitor task ended abnormally: {}", e);
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}
