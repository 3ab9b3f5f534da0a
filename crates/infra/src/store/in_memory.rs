use std::cmp::Ordering;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;

use summit_catalog::PackageRow;
use summit_core::RegistrationId;
use summit_registration::{RegistrationPayload, RegistrationRecord};

use super::{PackageStore, RegistrationStore, StoreError};

fn poisoned() -> StoreError {
    StoreError::Query("lock poisoned".to_string())
}

/// Sort key for a raw price; unparseable prices sort last.
fn price_key(price: &JsonValue) -> f64 {
    match price {
        JsonValue::Number(n) => n.as_f64().unwrap_or(f64::NEG_INFINITY),
        JsonValue::String(s) => s.trim().parse().unwrap_or(f64::NEG_INFINITY),
        _ => f64::NEG_INFINITY,
    }
}

/// In-memory package catalog.
///
/// Intended for tests/dev. Rows are kept as given; filtering and ordering happen
/// on read, like the database query does.
#[derive(Debug, Default)]
pub struct InMemoryPackageStore {
    rows: RwLock<Vec<PackageRow>>,
    failure: RwLock<Option<StoreError>>,
}

impl InMemoryPackageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<PackageRow>) -> Self {
        Self {
            rows: RwLock::new(rows),
            failure: RwLock::new(None),
        }
    }

    /// Load rows from a JSON array of package rows (same keys as the database table).
    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::Query(format!("failed to read {}: {e}", path.display())))?;
        let rows: Vec<PackageRow> = serde_json::from_slice(&raw)
            .map_err(|e| StoreError::Rejected(format!("invalid seed file {}: {e}", path.display())))?;
        tracing::info!(rows = rows.len(), path = %path.display(), "seeded in-memory package store");
        Ok(Self::with_rows(rows))
    }

    pub fn insert_row(&self, row: PackageRow) -> Result<(), StoreError> {
        self.rows.write().map_err(|_| poisoned())?.push(row);
        Ok(())
    }

    /// Make every subsequent read fail with `err` (`None` restores normal reads).
    pub fn set_failure(&self, err: Option<StoreError>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = err;
        }
    }
}

#[async_trait]
impl PackageStore for InMemoryPackageStore {
    async fn list_active(&self) -> Result<Vec<PackageRow>, StoreError> {
        if let Some(err) = self.failure.read().map_err(|_| poisoned())?.clone() {
            return Err(err);
        }

        let rows = self.rows.read().map_err(|_| poisoned())?;
        let mut active: Vec<PackageRow> = rows.iter().filter(|r| r.active).cloned().collect();
        // Stable sort: equal prices keep insertion order.
        active.sort_by(|a, b| {
            price_key(&b.price)
                .partial_cmp(&price_key(&a.price))
                .unwrap_or(Ordering::Equal)
        });
        Ok(active)
    }
}

/// In-memory registrations table.
///
/// Intended for tests/dev. Assigns ids and timestamps the way the database would.
#[derive(Debug, Default)]
pub struct InMemoryRegistrationStore {
    rows: RwLock<Vec<RegistrationRecord>>,
    failure: RwLock<Option<StoreError>>,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail with `err` (`None` restores normal inserts).
    pub fn set_failure(&self, err: Option<StoreError>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = err;
        }
    }

    pub fn list(&self) -> Vec<RegistrationRecord> {
        self.rows.read().map(|rows| rows.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn insert(&self, payload: RegistrationPayload) -> Result<RegistrationRecord, StoreError> {
        if let Some(err) = self.failure.read().map_err(|_| poisoned())?.clone() {
            return Err(err);
        }

        let record = RegistrationRecord {
            id: RegistrationId::new(),
            created_at: Utc::now(),
            payload,
        };
        self.rows.write().map_err(|_| poisoned())?.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use summit_registration::{RegistrationDraft, RegistrationType};

    fn row(id: &str, price: JsonValue, active: bool) -> PackageRow {
        PackageRow {
            id: id.to_string(),
            name: id.to_string(),
            price,
            currency: "KES".to_string(),
            description: None,
            benefits: None,
            slots: None,
            featured: None,
            reservation_fee: None,
            active,
        }
    }

    #[tokio::test]
    async fn lists_active_rows_by_price_descending() {
        let store = InMemoryPackageStore::with_rows(vec![
            row("bronze", json!(100000), true),
            row("retired", json!(9000000), false),
            row("platinum", json!("2500000"), true),
            row("gold", json!(1500000), true),
        ]);

        let ids: Vec<String> = store
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["platinum", "gold", "bronze"]);
    }

    #[tokio::test]
    async fn configured_failure_is_returned() {
        let store = InMemoryPackageStore::new();
        store.set_failure(Some(StoreError::Query("connection refused".into())));
        assert_eq!(
            store.list_active().await.unwrap_err(),
            StoreError::Query("connection refused".into())
        );
        store.set_failure(None);
        assert!(store.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn seeds_rows_from_json_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("packages.json");
        std::fs::write(
            &path,
            r#"[{"id":"gold","name":"Gold","price":"1500000","currency":"KES","benefits":["Booth"]}]"#,
        )
        .unwrap();

        let store = InMemoryPackageStore::from_seed_file(&path).await.unwrap();
        let rows = store.list_active().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "gold");

        std::fs::write(&path, "{not json").unwrap();
        assert!(InMemoryPackageStore::from_seed_file(&path).await.is_err());
    }

    #[tokio::test]
    async fn insert_assigns_id_and_keeps_payload() {
        let store = InMemoryRegistrationStore::new();
        let payload =
            RegistrationPayload::from_draft(&RegistrationDraft::new(RegistrationType::Delegate), None);

        let record = store.insert(payload.clone()).await.unwrap();
        assert_eq!(record.payload, payload);
        assert_eq!(store.list(), vec![record]);
    }
}
