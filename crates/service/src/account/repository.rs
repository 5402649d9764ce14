use async_trait::async_trait;
use models::account::AccountDocument;
use mongodb::bson::oid::ObjectId;

use super::domain::Account;
use super::errors::AccountError;

/// Repository abstraction for account persistence.
///
/// Implementations classify every failure into [`AccountError`]; callers never
/// see driver errors or the store's identifier type.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account and return it with the store-assigned id.
    async fn create(&self, account: Account) -> Result<Account, AccountError>;
    /// All accounts in store order; empty when there are none.
    async fn list(&self) -> Result<Vec<Account>, AccountError>;
    async fn fetch(&self, id: &str) -> Result<Account, AccountError>;
    /// Merge the non-empty fields of `account` into the stored document.
    /// `account.id` must equal `id`. An update that modifies nothing is
    /// [`AccountError::UpdateFailed`].
    async fn update(&self, id: &str, account: Account) -> Result<(), AccountError>;
}

/// Parse a hex identifier into the store's native key.
pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId, AccountError> {
    ObjectId::parse_str(id).map_err(|_| AccountError::InvalidId(id.to_string()))
}

pub(crate) fn ensure_ids_match(id: &str, account: &Account) -> Result<(), AccountError> {
    if id != account.id {
        return Err(AccountError::Mismatch { path: id.to_string(), payload: account.id.clone() });
    }
    Ok(())
}

/// Domain -> stored form. The id is always left for the store to own.
pub(crate) fn to_document(account: &Account) -> AccountDocument {
    AccountDocument {
        id: None,
        account_number: account.account_number.clone(),
        city: account.city.clone(),
        name: account.name.clone(),
    }
}

pub(crate) fn from_document(doc: AccountDocument) -> Account {
    Account {
        id: doc.id.map(|oid| oid.to_hex()).unwrap_or_default(),
        account_number: doc.account_number,
        city: doc.city,
        name: doc.name,
    }
}

/// In-memory repository with the same contract as the MongoDB one.
/// Used by tests and for running the API without a store.
pub mod memory {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct InMemoryAccountRepository {
        docs: RwLock<Vec<AccountDocument>>,
        store_calls: AtomicUsize,
        offline: AtomicBool,
    }

    impl InMemoryAccountRepository {
        pub fn new() -> Self { Self::default() }

        /// Number of round trips made against the backing map.
        pub fn store_calls(&self) -> usize {
            self.store_calls.load(Ordering::SeqCst)
        }

        /// Simulate an unreachable store: every round trip fails.
        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        fn round_trip(&self) -> Result<(), AccountError> {
            self.store_calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(AccountError::Store("store unavailable".into()));
            }
            Ok(())
        }
    }

    /// Apply the non-empty fields of `changes`; true when any stored value changed.
    fn merge(stored: &mut AccountDocument, changes: AccountDocument) -> bool {
        let before = stored.clone();
        if !changes.account_number.is_empty() { stored.account_number = changes.account_number; }
        if !changes.city.is_empty() { stored.city = changes.city; }
        if !changes.name.is_empty() { stored.name = changes.name; }
        *stored != before
    }

    #[async_trait]
    impl AccountRepository for InMemoryAccountRepository {
        async fn create(&self, mut account: Account) -> Result<Account, AccountError> {
            self.round_trip()?;
            let mut doc = to_document(&account);
            let oid = ObjectId::new();
            doc.id = Some(oid);
            self.docs.write().await.push(doc);
            account.id = oid.to_hex();
            Ok(account)
        }

        async fn list(&self) -> Result<Vec<Account>, AccountError> {
            self.round_trip()?;
            let docs = self.docs.read().await;
            Ok(docs.iter().cloned().map(from_document).collect())
        }

        async fn fetch(&self, id: &str) -> Result<Account, AccountError> {
            let oid = parse_object_id(id)?;
            self.round_trip()?;
            let docs = self.docs.read().await;
            docs.iter()
                .find(|d| d.id == Some(oid))
                .cloned()
                .map(from_document)
                .ok_or_else(|| AccountError::NotFound(id.to_string()))
        }

        async fn update(&self, id: &str, mut account: Account) -> Result<(), AccountError> {
            ensure_ids_match(id, &account)?;
            let existing = self.fetch(id).await?;
            let oid = parse_object_id(&existing.id)?;
            account.id.clear();
            let changes = to_document(&account);
            if changes == AccountDocument::default() {
                return Err(AccountError::UpdateFailed(id.to_string()));
            }
            self.round_trip()?;
            let mut docs = self.docs.write().await;
            let stored = docs
                .iter_mut()
                .find(|d| d.id == Some(oid))
                .ok_or_else(|| AccountError::UpdateFailed(id.to_string()))?;
            if !merge(stored, changes) {
                return Err(AccountError::UpdateFailed(id.to_string()));
            }
            Ok(())
        }
    }
}
