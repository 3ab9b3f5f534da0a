//! Infrastructure layer: record stores, logo storage, catalog loading,
//! submission, session state and configuration.

pub mod catalog_loader;
pub mod config;
pub mod session_store;
pub mod storage;
pub mod store;
pub mod submission;

pub use catalog_loader::{CatalogLoader, CatalogState};
pub use config::{AppConfig, ConfigError, Persistence};
pub use session_store::{InMemorySessionStore, SessionStore};
pub use storage::{FileStorage, InMemoryFileStorage, LocalFileStorage, StorageError, StoredObject};
pub use store::{
    InMemoryPackageStore, InMemoryRegistrationStore, PackageStore, PostgresPackageStore,
    PostgresRegistrationStore, RegistrationStore, StoreError,
};
pub use submission::{logo_object_key, SubmissionError, SubmissionPipeline, SubmissionResult};
