//! Storage-side registration row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use summit_core::RegistrationId;

use crate::draft::{PaymentMethod, RegistrationDraft, RegistrationType, SocialMedia};

/// Row inserted into the registrations store.
///
/// Same content as the draft, under the store's snake_case column names, with
/// the logo replaced by its storage path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    pub registration_type: RegistrationType,
    pub company_name: String,
    pub website: String,
    pub country: String,
    pub organization_type: String,
    pub logo_url: Option<String>,
    pub contact_name: String,
    pub contact_title: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub package_id: Option<String>,
    pub delegate_count: u32,
    pub delegate_names: Vec<String>,
    pub fascia_name: String,
    pub social_media: SocialMedia,
    pub payment_method: Option<PaymentMethod>,
    pub accept_terms: bool,
    pub accept_privacy: bool,
}

impl RegistrationPayload {
    pub fn from_draft(draft: &RegistrationDraft, logo_url: Option<String>) -> Self {
        Self {
            registration_type: draft.registration_type,
            company_name: draft.company_name.clone(),
            website: draft.website.clone(),
            country: draft.country.clone(),
            organization_type: draft.organization_type.clone(),
            logo_url,
            contact_name: draft.contact_name.clone(),
            contact_title: draft.contact_title.clone(),
            contact_email: draft.contact_email.clone(),
            contact_phone: draft.contact_phone.clone(),
            package_id: draft.package_id.as_ref().map(|id| id.as_str().to_string()),
            delegate_count: u32::try_from(draft.delegate_count()).unwrap_or(u32::MAX),
            delegate_names: draft.delegate_names().to_vec(),
            fascia_name: draft.fascia_name.clone(),
            social_media: draft.social_media.clone(),
            payment_method: draft.payment_method,
            accept_terms: draft.accept_terms,
            accept_privacy: draft.accept_privacy,
        }
    }
}

/// Registration row as echoed back by the store after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub id: RegistrationId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: RegistrationPayload,
}
