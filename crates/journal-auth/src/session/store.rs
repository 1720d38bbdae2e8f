//! In-process session table: one active session per identity.

use dashmap::DashMap;

use journal_core::types::IdentityId;
use journal_entity::session::{Session, SessionToken};

use super::token::{constant_time_eq, hash_token};

/// Holds the single active session of each identity, indexed by the
/// SHA-256 of its token for bearer lookups.
#[derive(Debug, Default)]
pub struct SessionStore {
    /// Active session per identity.
    by_identity: DashMap<IdentityId, Session>,
    /// Token hash to identity.
    by_token: DashMap<String, IdentityId>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `session` as the identity's active session.
    ///
    /// Returns the session it replaced, if any.
    pub fn insert(&self, session: Session) -> Option<Session> {
        let identity_id = session.identity.id;
        self.by_token.insert(hash_token(&session.token), identity_id);
        let previous = self.by_identity.insert(identity_id, session);
        if let Some(previous) = &previous {
            self.by_token.remove(&hash_token(&previous.token));
        }
        previous
    }

    /// The identity's active session.
    pub fn get(&self, identity_id: IdentityId) -> Option<Session> {
        self.by_identity.get(&identity_id).map(|s| s.value().clone())
    }

    /// Resolve a bearer token to its session.
    pub fn find_by_token(&self, token: &SessionToken) -> Option<Session> {
        let hash = hash_token(token);
        let identity_id = *self.by_token.get(&hash)?;
        let session = self.get(identity_id)?;
        constant_time_eq(hash_token(&session.token).as_bytes(), hash.as_bytes()).then_some(session)
    }

    /// Apply `update` to the active session if its token still matches.
    pub fn update_if_current(
        &self,
        identity_id: IdentityId,
        token: &SessionToken,
        update: impl FnOnce(&mut Session),
    ) -> Option<Session> {
        let mut entry = self.by_identity.get_mut(&identity_id)?;
        if !constant_time_eq(
            hash_token(&entry.token).as_bytes(),
            hash_token(token).as_bytes(),
        ) {
            return None;
        }
        update(entry.value_mut());
        Some(entry.value().clone())
    }

    /// Remove the identity's active session.
    pub fn remove(&self, identity_id: IdentityId) -> Option<Session> {
        let (_, session) = self.by_identity.remove(&identity_id)?;
        self.by_token.remove(&hash_token(&session.token));
        Some(session)
    }

    /// Remove the identity's session only if it still holds `token`.
    pub fn remove_if_current(&self, identity_id: IdentityId, token: &SessionToken) -> Option<Session> {
        let expected = hash_token(token);
        let (_, session) = self.by_identity.remove_if(&identity_id, |_, s| {
            constant_time_eq(hash_token(&s.token).as_bytes(), expected.as_bytes())
        })?;
        self.by_token.remove(&expected);
        Some(session)
    }

    /// Snapshot of every active session.
    pub fn all(&self) -> Vec<Session> {
        self.by_identity.iter().map(|s| s.value().clone()).collect()
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    /// Whether no session is active.
    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }
}
