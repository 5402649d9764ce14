//! Service layer for the account API.
//! - `account::repository` and `account::repo` are the data-access layer.
//! - `account::service` orchestrates on top of a repository.

pub mod account;
#[cfg(test)]
pub mod test_support;
