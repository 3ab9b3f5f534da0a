//! Required-field checks for each wizard step.

use serde::Serialize;

use summit_core::DomainError;

use crate::draft::{RegistrationDraft, FASCIA_NAME_MAX_CHARS};
use crate::wizard::WizardStep;

/// A single field that blocks leaving a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Collapse step errors into a single validation error (`None` when clean).
pub fn into_domain_error(errors: &[FieldError]) -> Option<DomainError> {
    if errors.is_empty() {
        return None;
    }
    let joined = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    Some(DomainError::validation(joined))
}

fn require(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "is required"));
    }
}

/// Fields of `draft` that are missing or malformed for `step`.
pub fn validate_step(step: WizardStep, draft: &RegistrationDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();
    match step {
        WizardStep::Company => {
            require(&mut errors, "companyName", &draft.company_name);
            require(&mut errors, "country", &draft.country);
            require(&mut errors, "organizationType", &draft.organization_type);
        }
        WizardStep::Contact => {
            require(&mut errors, "contactName", &draft.contact_name);
            require(&mut errors, "contactPhone", &draft.contact_phone);
            let email = draft.contact_email.trim();
            if email.is_empty() {
                errors.push(FieldError::new("contactEmail", "is required"));
            } else if !email.contains('@') {
                errors.push(FieldError::new("contactEmail", "must be an email address"));
            }
        }
        WizardStep::Package => {
            if draft.package_id.is_none() {
                errors.push(FieldError::new("packageId", "choose a package"));
            }
        }
        WizardStep::Delegates => {
            for (idx, name) in draft.delegate_names().iter().enumerate() {
                if name.trim().is_empty() {
                    errors.push(FieldError::new(
                        "delegateNames",
                        format!("delegate {} needs a name", idx + 1),
                    ));
                }
            }
        }
        WizardStep::Branding => {
            let len = draft.fascia_name.chars().count();
            if len > FASCIA_NAME_MAX_CHARS {
                errors.push(FieldError::new(
                    "fasciaName",
                    format!("at most {FASCIA_NAME_MAX_CHARS} characters (got {len})"),
                ));
            }
        }
        WizardStep::Payment => {
            if draft.payment_method.is_none() {
                errors.push(FieldError::new("paymentMethod", "choose a payment method"));
            }
        }
        WizardStep::Terms => {
            if !draft.accept_terms {
                errors.push(FieldError::new("acceptTerms", "terms must be accepted"));
            }
            if !draft.accept_privacy {
                errors.push(FieldError::new("acceptPrivacy", "privacy policy must be accepted"));
            }
        }
    }
    errors
}
