//! Account module: three-layer architecture (domain, repository, service).
//!
//! The repository owns identifier parsing, the mapping to stored documents and
//! error classification; the service is the seam above it.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AccountService;
