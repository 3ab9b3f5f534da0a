//! Registration wizard domain.
//!
//! The in-progress draft and its partial-update merge, delegate list rules,
//! step sequencing per registration type, per-step required fields, and the
//! storage-side payload built at submission. Deterministic logic only (no IO).

pub mod draft;
pub mod patch;
pub mod payload;
pub mod validation;
pub mod wizard;

pub use draft::{
    LogoFile, PaymentMethod, RegistrationDraft, RegistrationType, SocialMedia, FASCIA_NAME_MAX_CHARS,
    MAX_DELEGATES,
};
pub use patch::DraftPatch;
pub use payload::{RegistrationPayload, RegistrationRecord};
pub use validation::{validate_step, FieldError};
pub use wizard::{Wizard, WizardStep};
