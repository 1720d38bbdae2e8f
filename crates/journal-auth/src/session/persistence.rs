//! Persisted copy of the currently held session.

use std::sync::Arc;

use tracing::warn;

use journal_cache::keys;
use journal_core::result::AppResult;
use journal_core::traits::KeyValueStore;
use journal_core::types::IdentityId;
use journal_entity::session::{Session, StoredSession};

/// Saves and loads the single current-session record.
///
/// The record lives under one key as
/// `{id, name, email, role, joinedAt, lastActivity, sessionToken, ...}`
/// with ISO-8601 dates. Loading only parses; deciding whether the loaded
/// session is still valid is the session manager's job.
#[derive(Debug, Clone)]
pub struct SessionPersistence {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl SessionPersistence {
    /// Creates a persistence adapter writing to `journal:{name}`.
    pub fn new(store: Arc<dyn KeyValueStore>, name: &str) -> Self {
        Self {
            store,
            key: keys::persisted_session(name),
        }
    }

    /// The store key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Overwrite the record with `session`.
    pub async fn save(&self, session: &Session) -> AppResult<()> {
        let json = serde_json::to_string(&StoredSession::from(session))?;
        self.store.set(&self.key, &json, None).await
    }

    /// Read the record. An unparsable or incomplete record is cleared and
    /// reported as absent.
    pub async fn load(&self) -> AppResult<Option<Session>> {
        let Some(json) = self.store.get(&self.key).await? else {
            return Ok(None);
        };

        let session = match serde_json::from_str::<StoredSession>(&json) {
            Ok(stored) => stored.into_session(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding unreadable persisted session");
                None
            }
        };

        if session.is_none() {
            self.clear().await?;
        }
        Ok(session)
    }

    /// Remove the record.
    pub async fn clear(&self) -> AppResult<()> {
        self.store.delete(&self.key).await
    }

    /// Remove the record if it belongs to `identity_id`.
    pub async fn clear_for(&self, identity_id: IdentityId) -> AppResult<()> {
        let Some(json) = self.store.get(&self.key).await? else {
            return Ok(());
        };
        let owned = serde_json::from_str::<StoredSession>(&json)
            .map(|stored| stored.id == identity_id)
            .unwrap_or(true);
        if owned {
            self.clear().await?;
        }
        Ok(())
    }
}
