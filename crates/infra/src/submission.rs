//! Registration submission: optional logo upload followed by one insert.
//!
//! The two writes are not atomic. When the insert fails after a successful
//! upload, the uploaded object stays in storage and is only logged.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::instrument;

use summit_registration::{LogoFile, RegistrationDraft, RegistrationPayload, RegistrationRecord};

use crate::storage::{FileStorage, StorageError};
use crate::store::{RegistrationStore, StoreError};

/// User-facing submission failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Error uploading logo: {0}")]
    Upload(String),

    #[error("Error submitting registration: {0}")]
    Insert(String),

    #[error("An unknown error occurred")]
    Unknown,
}

impl From<StorageError> for SubmissionError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unknown => SubmissionError::Unknown,
            other => SubmissionError::Upload(other.to_string()),
        }
    }
}

impl From<StoreError> for SubmissionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unknown => SubmissionError::Unknown,
            other => SubmissionError::Insert(other.to_string()),
        }
    }
}

/// Outcome of one submission.
///
/// Serializes as `{"success": bool, "error": string|null, "data": record|null}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Success(RegistrationRecord),
    Failure(SubmissionError),
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionResult::Success(_))
    }

    pub fn record(&self) -> Option<&RegistrationRecord> {
        match self {
            SubmissionResult::Success(record) => Some(record),
            SubmissionResult::Failure(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        match self {
            SubmissionResult::Success(_) => None,
            SubmissionResult::Failure(err) => Some(err.to_string()),
        }
    }
}

impl Serialize for SubmissionResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut out = serializer.serialize_struct("SubmissionResult", 3)?;
        out.serialize_field("success", &self.is_success())?;
        out.serialize_field("error", &self.error_message())?;
        out.serialize_field("data", &self.record())?;
        out.end()
    }
}

/// Object key for an uploaded logo: `"{unix_millis}.{ext}"`, or just the
/// millis when the file name has no extension.
pub fn logo_object_key(logo: &LogoFile, now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis();
    match logo.extension() {
        Some(ext) => format!("{millis}.{ext}"),
        None => millis.to_string(),
    }
}

/// Decrements the in-flight counter when a submission finishes, however it ends.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Runs the upload-then-insert sequence against the configured stores.
#[derive(Debug)]
pub struct SubmissionPipeline<F, R> {
    storage: F,
    registrations: R,
    bucket: String,
    in_flight: AtomicUsize,
}

impl<F, R> SubmissionPipeline<F, R>
where
    F: FileStorage,
    R: RegistrationStore,
{
    pub fn new(storage: F, registrations: R, bucket: impl Into<String>) -> Self {
        Self {
            storage,
            registrations,
            bucket: bucket.into(),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// True while at least one submission is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn submit(&self, draft: &RegistrationDraft) -> SubmissionResult {
        self.submit_at(draft, Utc::now()).await
    }

    /// Same as [`submit`](Self::submit) with an explicit clock for the logo key.
    #[instrument(
        skip(self, draft, now),
        fields(registration_type = draft.registration_type.as_str(), has_logo = draft.logo.is_some())
    )]
    pub async fn submit_at(&self, draft: &RegistrationDraft, now: DateTime<Utc>) -> SubmissionResult {
        let _guard = InFlight::enter(&self.in_flight);

        let logo_url = match &draft.logo {
            Some(logo) => {
                let key = logo_object_key(logo, now);
                match self
                    .storage
                    .upload(&self.bucket, &key, &logo.bytes, logo.content_type.as_deref())
                    .await
                {
                    Ok(stored) => {
                        tracing::info!(bucket = %stored.bucket, path = %stored.path, "logo uploaded");
                        Some(stored.path)
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "logo upload failed");
                        return SubmissionResult::Failure(err.into());
                    }
                }
            }
            None => None,
        };

        let payload = RegistrationPayload::from_draft(draft, logo_url.clone());
        match self.registrations.insert(payload).await {
            Ok(record) => {
                tracing::info!(registration_id = %record.id, "registration stored");
                SubmissionResult::Success(record)
            }
            Err(err) => {
                if let Some(path) = logo_url {
                    tracing::warn!(bucket = %self.bucket, %path, "insert failed after upload; logo left in storage");
                }
                tracing::error!(error = %err, "registration insert failed");
                SubmissionResult::Failure(err.into())
            }
        }
    }
}
