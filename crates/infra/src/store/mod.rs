//! Remote record stores: the package catalog (read) and registrations (write).
//!
//! The traits make no storage assumptions. In-memory implementations back tests
//! and local development; the Postgres implementations back production.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use summit_catalog::PackageRow;
use summit_registration::{RegistrationPayload, RegistrationRecord};

pub use in_memory::{InMemoryPackageStore, InMemoryRegistrationStore};
pub use postgres::{PostgresPackageStore, PostgresRegistrationStore};

/// Record store failure.
///
/// Messages are shown to users verbatim (behind a context prefix), so they carry
/// the store's own wording rather than a category label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The query or statement failed (connectivity, syntax, timeout).
    #[error("{0}")]
    Query(String),

    /// The store refused the data (constraint or type violation).
    #[error("{0}")]
    Rejected(String),

    /// The store failed without saying why (e.g. no row came back).
    #[error("unknown store failure")]
    Unknown,
}

/// Read access to the sponsorship package catalog.
#[async_trait]
pub trait PackageStore: Send + Sync {
    /// All active packages, most expensive first.
    async fn list_active(&self) -> Result<Vec<PackageRow>, StoreError>;
}

/// Write access to the registrations table.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Insert exactly one row and return it as stored.
    async fn insert(&self, payload: RegistrationPayload) -> Result<RegistrationRecord, StoreError>;
}

#[async_trait]
impl<S> PackageStore for Arc<S>
where
    S: PackageStore + ?Sized,
{
    async fn list_active(&self) -> Result<Vec<PackageRow>, StoreError> {
        (**self).list_active().await
    }
}

#[async_trait]
impl<S> RegistrationStore for Arc<S>
where
    S: RegistrationStore + ?Sized,
{
    async fn insert(&self, payload: RegistrationPayload) -> Result<RegistrationRecord, StoreError> {
        (**self).insert(payload).await
    }
}
