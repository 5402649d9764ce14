use std::sync::Arc;

use tracing::instrument;

use super::domain::Account;
use super::errors::AccountError;
use super::repository::AccountRepository;

/// Application service for accounts.
///
/// Forwards every call to the repository and returns its result unchanged.
/// Cross-cutting business rules (quotas, auditing) belong here.
pub struct AccountService<R: AccountRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: AccountRepository + ?Sized> AccountService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Create an account; the returned value carries the assigned id.
    ///
    /// # Examples
    /// ```
    /// use service::account::{domain::Account, repository::memory::InMemoryAccountRepository, AccountService};
    /// use std::sync::Arc;
    /// let svc = AccountService::new(Arc::new(InMemoryAccountRepository::new()));
    /// let input = Account { account_number: "A1".into(), city: "NYC".into(), name: "Alice".into(), ..Default::default() };
    /// let created = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert_eq!(created.id.len(), 24);
    /// ```
    #[instrument(skip(self, account))]
    pub async fn create(&self, account: Account) -> Result<Account, AccountError> {
        self.repo.create(account).await
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Account>, AccountError> {
        self.repo.list().await
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, id: &str) -> Result<Account, AccountError> {
        self.repo.fetch(id).await
    }

    #[instrument(skip(self, account))]
    pub async fn update(&self, id: &str, account: Account) -> Result<(), AccountError> {
        self.repo.update(id, account).await
    }
}
