//! Postgres-backed catalog and registration stores.
//!
//! ## Tables
//!
//! - `sponsorship_packages(id, name, price numeric, currency, description,
//!   benefits jsonb, slots int, featured bool, reservation_fee numeric, active bool)`
//! - `registrations(id uuid primary key, created_at timestamptz default now(), ...)`
//!   with one column per [`RegistrationPayload`] field (`delegate_names text[]`,
//!   `social_media jsonb`).
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique / check / not-null / FK violation) | `23xxx` | `Rejected` |
//! | Database (other) | any other | `Query` |
//! | RowNotFound | N/A | `Unknown` |
//! | Other (pool closed, io, tls, decode) | N/A | `Query` |

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Row};
use tracing::instrument;

use summit_catalog::PackageRow;
use summit_core::RegistrationId;
use summit_registration::{RegistrationPayload, RegistrationRecord};

use super::{PackageStore, RegistrationStore, StoreError};

/// Postgres-backed package catalog (read-only).
#[derive(Debug, Clone)]
pub struct PostgresPackageStore {
    pool: Arc<PgPool>,
}

impl PostgresPackageStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl PackageStore for PostgresPackageStore {
    #[instrument(skip(self), err)]
    async fn list_active(&self) -> Result<Vec<PackageRow>, StoreError> {
        // Numeric and jsonb columns come back as JSON so shape checks stay in one place.
        let rows = sqlx::query(
            r#"
            SELECT
                id::text AS id,
                name,
                to_jsonb(price) AS price,
                currency,
                description,
                to_jsonb(benefits) AS benefits,
                slots::bigint AS slots,
                featured,
                to_jsonb(reservation_fee) AS reservation_fee,
                active
            FROM sponsorship_packages
            WHERE active = true
            ORDER BY price DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_active_packages", e))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(PackageRow {
                id: row.try_get("id").map_err(|e| decode_error("id", e))?,
                name: row.try_get("name").map_err(|e| decode_error("name", e))?,
                price: row
                    .try_get::<Option<JsonValue>, _>("price")
                    .map_err(|e| decode_error("price", e))?
                    .unwrap_or(JsonValue::Null),
                currency: row.try_get("currency").map_err(|e| decode_error("currency", e))?,
                description: row
                    .try_get("description")
                    .map_err(|e| decode_error("description", e))?,
                benefits: row.try_get("benefits").map_err(|e| decode_error("benefits", e))?,
                slots: row.try_get("slots").map_err(|e| decode_error("slots", e))?,
                featured: row.try_get("featured").map_err(|e| decode_error("featured", e))?,
                reservation_fee: row
                    .try_get("reservation_fee")
                    .map_err(|e| decode_error("reservation_fee", e))?,
                active: row.try_get("active").map_err(|e| decode_error("active", e))?,
            });
        }

        tracing::debug!(count = out.len(), "loaded active package rows");
        Ok(out)
    }
}

/// Postgres-backed registrations table (insert-only).
#[derive(Debug, Clone)]
pub struct PostgresRegistrationStore {
    pool: Arc<PgPool>,
}

impl PostgresRegistrationStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl RegistrationStore for PostgresRegistrationStore {
    #[instrument(
        skip(self, payload),
        fields(registration_type = payload.registration_type.as_str()),
        err
    )]
    async fn insert(&self, payload: RegistrationPayload) -> Result<RegistrationRecord, StoreError> {
        let id = RegistrationId::new();
        let payment_method = payload.payment_method.map(|m| m.as_str());

        // The whole row comes back as JSON and is decoded with the same serde
        // mapping the payload was built with.
        let row = sqlx::query(
            r#"
            INSERT INTO registrations (
                id, registration_type, company_name, website, country, organization_type,
                logo_url, contact_name, contact_title, contact_email, contact_phone,
                package_id, delegate_count, delegate_names, fascia_name, social_media,
                payment_method, accept_terms, accept_privacy
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING to_jsonb(registrations.*) AS record
            "#,
        )
        .bind(id.as_uuid())
        .bind(payload.registration_type.as_str())
        .bind(&payload.company_name)
        .bind(&payload.website)
        .bind(&payload.country)
        .bind(&payload.organization_type)
        .bind(&payload.logo_url)
        .bind(&payload.contact_name)
        .bind(&payload.contact_title)
        .bind(&payload.contact_email)
        .bind(&payload.contact_phone)
        .bind(&payload.package_id)
        .bind(i32::try_from(payload.delegate_count).unwrap_or(i32::MAX))
        .bind(&payload.delegate_names)
        .bind(&payload.fascia_name)
        .bind(sqlx::types::Json(&payload.social_media))
        .bind(payment_method)
        .bind(payload.accept_terms)
        .bind(payload.accept_privacy)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_registration", e))?;

        let record: JsonValue = row.try_get("record").map_err(|e| decode_error("record", e))?;
        serde_json::from_value(record)
            .map_err(|e| StoreError::Query(format!("failed to decode inserted registration: {e}")))
    }
}

fn decode_error(column: &str, err: sqlx::Error) -> StoreError {
    StoreError::Query(format!("failed to decode column '{column}': {err}"))
}

/// Map a SQLx error to a `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = db_err.message().to_string();
            match db_err.code() {
                // Class 23: integrity constraint violation.
                Some(code) if code.starts_with("23") => StoreError::Rejected(msg),
                _ => StoreError::Query(msg),
            }
        }
        sqlx::Error::RowNotFound => StoreError::Unknown,
        sqlx::Error::PoolClosed => {
            StoreError::Query(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Query(format!("{operation}: {other}")),
    }
}
