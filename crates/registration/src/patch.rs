//! Partial updates to a draft, one per field edit.

use serde::Deserialize;

use summit_catalog::PackageId;
use summit_core::{DomainError, DomainResult};

use crate::draft::{LogoFile, PaymentMethod, RegistrationDraft, SocialMedia, MAX_DELEGATES};

/// Subset of draft fields to overwrite. `None` leaves the field untouched.
///
/// The draft's optional fields (logo, package, payment method) are doubly
/// wrapped: `Some(None)` clears them, which is what an explicit JSON `null`
/// deserializes to. A missing key stays `None`.
///
/// Deserializes from the camelCase field names the wizard front-end sends. The
/// logo is binary and only ever set in-process, never from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DraftPatch {
    pub company_name: Option<String>,
    pub website: Option<String>,
    pub country: Option<String>,
    pub organization_type: Option<String>,
    #[serde(skip)]
    pub logo: Option<Option<LogoFile>>,

    pub contact_name: Option<String>,
    pub contact_title: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub package_id: Option<Option<PackageId>>,

    pub delegate_count: Option<usize>,
    pub delegate_names: Option<Vec<String>>,

    pub fascia_name: Option<String>,
    pub social_media: Option<SocialMedia>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub payment_method: Option<Option<PaymentMethod>>,

    pub accept_terms: Option<bool>,
    pub accept_privacy: Option<bool>,
}

macro_rules! merge_fields {
    ($draft:expr, $patch:ident, { $($field:ident),* $(,)? }) => {
        $(
            if let Some(value) = $patch.$field {
                $draft.$field = value;
            }
        )*
    };
}

impl DraftPatch {
    /// Reject values no draft may hold. Field-level completeness is checked per step instead.
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(count) = self.delegate_count {
            if count > MAX_DELEGATES {
                return Err(DomainError::validation(format!(
                    "delegateCount must be at most {MAX_DELEGATES}, got {count}"
                )));
            }
        }
        if let Some(names) = &self.delegate_names {
            if names.len() > MAX_DELEGATES {
                return Err(DomainError::validation(format!(
                    "delegateNames must list at most {MAX_DELEGATES} delegates, got {}",
                    names.len()
                )));
            }
        }
        Ok(())
    }
}

impl RegistrationDraft {
    /// Merge `patch` into the draft.
    ///
    /// Provided fields overwrite, nested objects (social media) are replaced as a
    /// whole, and everything else is left alone. No validation happens here.
    /// When both `delegate_count` and `delegate_names` are given, the names win.
    ///
    /// A patch that fails [`DraftPatch::validate`] is refused whole and the
    /// draft is left unchanged.
    pub fn update(&mut self, patch: DraftPatch) -> DomainResult<()> {
        patch.validate()?;

        merge_fields!(self, patch, {
            company_name,
            website,
            country,
            organization_type,
            contact_name,
            contact_title,
            contact_email,
            contact_phone,
            fascia_name,
            social_media,
            accept_terms,
            accept_privacy,
            logo,
            package_id,
            payment_method,
        });

        if let Some(count) = patch.delegate_count {
            self.resize_delegates(count);
        }
        if let Some(names) = patch.delegate_names {
            self.replace_delegates(names);
        }
        Ok(())
    }
}
