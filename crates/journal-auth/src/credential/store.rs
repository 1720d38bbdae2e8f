//! Credential trust stores.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use journal_cache::keys;
use journal_core::error::AppError;
use journal_core::result::AppResult;
use journal_core::traits::KeyValueStore;
use journal_entity::user::{CredentialRecord, normalize_email};

/// Read access to credential records, plus insertion for registration.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find the record registered under an email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<CredentialRecord>>;

    /// Insert a new record. Fails with a conflict if the email is taken.
    async fn insert(&self, record: CredentialRecord) -> AppResult<()>;
}

/// In-memory credential table keyed by normalized email.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    records: DashMap<String, CredentialRecord>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with records. Later duplicates replace earlier ones.
    pub fn with_records(records: impl IntoIterator<Item = CredentialRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.records.insert(record.identity_key(), record);
        }
        store
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<CredentialRecord>> {
        Ok(self
            .records
            .get(&normalize_email(email))
            .map(|r| r.value().clone()))
    }

    async fn insert(&self, record: CredentialRecord) -> AppResult<()> {
        match self.records.entry(record.identity_key()) {
            Entry::Occupied(_) => Err(AppError::conflict("Email is already registered")),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }
}

/// Credential records stored as JSON in a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct KvCredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl KvCredentialStore {
    /// Creates a store on top of a key-value backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialStore for KvCredentialStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<CredentialRecord>> {
        match self.store.get(&keys::credential_by_email(email)).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, record: CredentialRecord) -> AppResult<()> {
        let json = serde_json::to_string(&record)?;
        let inserted = self
            .store
            .compare_and_swap(
                &keys::credential_by_email(&record.email),
                None,
                Some(&json),
                None,
            )
            .await?;

        if inserted {
            Ok(())
        } else {
            Err(AppError::conflict("Email is already registered"))
        }
    }
}
