use serde::{Deserialize, Serialize};

use summit_catalog::{PackageId, SelectionSet, Toggle};
use summit_core::DraftId;
use summit_registration::{RegistrationDraft, RegistrationType, WizardStep};

use crate::app::services::DraftSession;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDraftRequest {
    pub registration_type: RegistrationType,
}

#[derive(Debug, Deserialize)]
pub struct SetDelegateNameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoQuery {
    pub file_name: String,
}

// -------------------------
// Response DTOs
// -------------------------

/// A session as the front-end sees it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView<'a> {
    pub id: DraftId,
    pub draft: &'a RegistrationDraft,
    pub step: WizardStep,
    pub step_index: usize,
    pub steps: &'static [WizardStep],
    pub is_final_step: bool,
    pub selection: &'a SelectionSet,
}

pub fn draft_view(id: DraftId, session: &DraftSession) -> DraftView<'_> {
    DraftView {
        id,
        draft: session.wizard.draft(),
        step: session.wizard.current_step(),
        step_index: session.wizard.step_index(),
        steps: session.wizard.steps(),
        is_final_step: session.wizard.is_final_step(),
        selection: &session.selection,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse<'a> {
    pub package_id: &'a PackageId,
    pub outcome: Toggle,
    pub selection: &'a SelectionSet,
}
