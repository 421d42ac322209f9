use std::sync::Arc;

use log::{debug, info, warn};

use super::storage::SaveStorage;
use super::{GameState, SessionUpdate};
use crate::errors::StoreResult;

/// Storage key the session is saved under.
pub const SESSION_KEY: &str = "creature-waves-session";

/// Owns the authoritative session. Every update is applied in memory first
/// and then written to storage; a failed write is logged and the in-memory
/// session stays authoritative.
pub struct SessionStore {
    state: GameState,
    storage: Arc<dyn SaveStorage>,
}

impl SessionStore {
    /// Load the saved session, defaulting absent or unreadable fields and
    /// normalizing stale phases. A save that is not JSON starts fresh.
    pub async fn open(storage: Arc<dyn SaveStorage>) -> Self {
        let state = match storage.load(SESSION_KEY).await {
            Ok(Some(data)) => match serde_json::from_str(&data).map(GameState::from_saved) {
                Ok(Some(saved)) => {
                    debug!("Loaded saved session at wave {}", saved.wave);
                    saved.normalized()
                }
                Ok(None) => {
                    warn!("Saved session is not an object, starting fresh");
                    GameState::default()
                }
                Err(err) => {
                    warn!("Saved session is corrupt, starting fresh: {}", err);
                    GameState::default()
                }
            },
            Ok(None) => GameState::default(),
            Err(err) => {
                warn!("Failed to read saved session, starting fresh: {}", err);
                GameState::default()
            }
        };
        Self { state, storage }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Merge `update` into the session and persist it.
    pub async fn apply(&mut self, update: SessionUpdate) {
        if update.is_empty() {
            return;
        }
        let previous_phase = self.state.phase;
        update.apply_to(&mut self.state);
        if self.state.phase != previous_phase {
            info!("Phase {} -> {}", previous_phase, self.state.phase);
        }
        self.persist().await;
    }

    /// Drop the saved session and start over from the defaults.
    pub async fn reset(&mut self) {
        if let Err(err) = self.storage.remove(SESSION_KEY).await {
            warn!("Failed to clear saved session: {}", err);
        }
        self.state = GameState::default();
        info!("Session reset");
        self.persist().await;
    }

    async fn persist(&self) {
        if let Err(err) = self.write().await {
            warn!("Failed to save session: {}", err);
        }
    }

    async fn write(&self) -> StoreResult<()> {
        let data = serde_json::to_string(&self.state)?;
        self.storage.save(SESSION_KEY, &data).await
    }
}
