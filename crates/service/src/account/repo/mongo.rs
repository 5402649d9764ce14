use std::future::Future;
use std::time::Duration;

use common::metrics::{record_store_error, STORE_DURATION};
use futures::TryStreamExt;
use models::account::{self, AccountDocument};
use models::db::MongoDb;
use mongodb::{bson::doc, Collection};
use tracing::debug;

use crate::account::domain::Account;
use crate::account::errors::AccountError;
use crate::account::repository::{
    ensure_ids_match, from_document, parse_object_id, to_document, AccountRepository,
};

/// MongoDB-backed repository over the `accounts` collection.
pub struct MongoAccountRepository {
    collection: Collection<AccountDocument>,
    operation_timeout: Duration,
}

impl MongoAccountRepository {
    pub fn new(db: &MongoDb, operation_timeout: Duration) -> Self {
        Self { collection: account::collection(&db.database), operation_timeout }
    }

    async fn round_trip<T, F>(&self, operation: &'static str, call: F) -> Result<T, AccountError>
    where
        F: Future<Output = Result<T, mongodb::error::Error>>,
    {
        bounded(operation, self.operation_timeout, call).await
    }
}

/// Run one store round trip under `limit` and classify driver failures and
/// timeouts as [`AccountError::Store`].
pub(crate) async fn bounded<T, F>(operation: &'static str, limit: Duration, call: F) -> Result<T, AccountError>
where
    F: Future<Output = Result<T, mongodb::error::Error>>,
{
    let timer = STORE_DURATION.with_label_values(&[operation]).start_timer();
    let res = tokio::time::timeout(limit, call).await;
    timer.observe_duration();
    match res {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(e)) => {
            record_store_error(operation);
            debug!(operation, error = %e, "store call failed");
            Err(AccountError::Store(e.to_string()))
        }
        Err(_) => {
            record_store_error(operation);
            debug!(operation, timeout = ?limit, "store call timed out");
            Err(AccountError::Store(format!("{operation} timed out after {limit:?}")))
        }
    }
}

#[async_trait::async_trait]
impl AccountRepository for MongoAccountRepository {
    async fn create(&self, mut account: Account) -> Result<Account, AccountError> {
        let new_doc = to_document(&account);
        let inserted = self
            .round_trip("create", async { self.collection.insert_one(&new_doc).await })
            .await?;
        let oid = inserted
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AccountError::Store("store assigned a non-ObjectId identifier".into()))?;
        account.id = oid.to_hex();
        debug!(id = %account.id, "account created");
        Ok(account)
    }

    async fn list(&self) -> Result<Vec<Account>, AccountError> {
        let docs: Vec<AccountDocument> = self
            .round_trip("list", async {
                let cursor = self.collection.find(doc! {}).await?;
                cursor.try_collect::<Vec<AccountDocument>>().await
            })
            .await?;
        debug!(count = docs.len(), "accounts listed");
        Ok(docs.into_iter().map(from_document).collect())
    }

    async fn fetch(&self, id: &str) -> Result<Account, AccountError> {
        let oid = parse_object_id(id)?;
        let found = self
            .round_trip("fetch", async { self.collection.find_one(doc! { "_id": oid }).await })
            .await?;
        match found {
            Some(doc) => {
                debug!(%id, "account retrieved");
                Ok(from_document(doc))
            }
            None => Err(AccountError::NotFound(id.to_string())),
        }
    }

    async fn update(&self, id: &str, mut account: Account) -> Result<(), AccountError> {
        if let Err(e) = ensure_ids_match(id, &account) {
            debug!(%id, payload = %account.id, "id and payload don't match");
            return Err(e);
        }
        let existing = self.fetch(id).await?;
        let oid = parse_object_id(&existing.id)?;

        account.id.clear();
        let changes = to_document(&account)
            .set_document()
            .map_err(|e| AccountError::Store(e.to_string()))?;
        if changes.is_empty() {
            debug!(%id, "update carries no fields");
            return Err(AccountError::UpdateFailed(id.to_string()));
        }

        let result = self
            .round_trip("update", async {
                self.collection
                    .update_one(doc! { "_id": oid }, doc! { "$set": changes })
                    .await
            })
            .await?;
        if result.modified_count == 0 {
            debug!(%id, matched = result.matched_count, "update modified nothing");
            return Err(AccountError::UpdateFailed(id.to_string()));
        }
        debug!(%id, "account updated");
        Ok(())
    }
}
