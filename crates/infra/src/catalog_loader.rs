//! Loads the sponsorship package catalog from the package store.

use std::sync::RwLock;

use serde::Serialize;
use tracing::instrument;

use summit_catalog::{Package, RowRejected};

use crate::store::PackageStore;

/// Observable catalog state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CatalogState {
    Loading,
    Loaded {
        packages: Vec<Package>,
        /// Rows dropped because they failed shape validation.
        rejected: Vec<RowRejected>,
    },
    Errored {
        message: String,
    },
}

impl CatalogState {
    pub fn packages(&self) -> &[Package] {
        match self {
            CatalogState::Loaded { packages, .. } => packages,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, CatalogState::Loading)
    }
}

/// Reads active packages once per `load()` and keeps the outcome.
///
/// There is no retry: a failed query leaves the loader in `Errored` until the
/// next `load()`.
#[derive(Debug)]
pub struct CatalogLoader<S> {
    store: S,
    state: RwLock<CatalogState>,
}

impl<S> CatalogLoader<S>
where
    S: PackageStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: RwLock::new(CatalogState::Loading),
        }
    }

    pub fn state(&self) -> CatalogState {
        self.state
            .read()
            .map(|s| s.clone())
            .unwrap_or_else(|_| CatalogState::Errored {
                message: "catalog state unavailable".to_string(),
            })
    }

    /// Query the store and project each row into a [`Package`].
    #[instrument(skip(self))]
    pub async fn load(&self) -> CatalogState {
        self.set_state(CatalogState::Loading);

        let next = match self.store.list_active().await {
            Ok(rows) => {
                let total = rows.len();
                let mut packages = Vec::with_capacity(total);
                let mut rejected = Vec::new();
                for row in rows {
                    match Package::try_from(row) {
                        Ok(pkg) => packages.push(pkg),
                        Err(err) => {
                            tracing::warn!(package_id = %err.id, reason = %err.reason, "rejected package row");
                            rejected.push(err);
                        }
                    }
                }
                tracing::info!(
                    loaded = packages.len(),
                    rejected = rejected.len(),
                    total,
                    "package catalog loaded"
                );
                CatalogState::Loaded { packages, rejected }
            }
            Err(err) => {
                tracing::error!(error = %err, "package catalog query failed");
                CatalogState::Errored {
                    message: err.to_string(),
                }
            }
        };

        self.set_state(next.clone());
        next
    }

    fn set_state(&self, next: CatalogState) {
        if let Ok(mut state) = self.state.write() {
            *state = next;
        }
    }
}
