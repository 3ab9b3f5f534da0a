//! Step sequencing for the registration wizard.

use serde::{Deserialize, Serialize};

use summit_core::{DomainError, DomainResult};

use crate::draft::{RegistrationDraft, RegistrationType};
use crate::patch::DraftPatch;
use crate::validation::{into_domain_error, validate_step};

/// One logical section of the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Company,
    Contact,
    Package,
    Delegates,
    Branding,
    Payment,
    Terms,
}

impl WizardStep {
    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::Company => "company",
            WizardStep::Contact => "contact",
            WizardStep::Package => "package",
            WizardStep::Delegates => "delegates",
            WizardStep::Branding => "branding",
            WizardStep::Payment => "payment",
            WizardStep::Terms => "terms",
        }
    }

    /// Steps shown for a registration type, in order.
    pub fn sequence(registration_type: RegistrationType) -> &'static [WizardStep] {
        use WizardStep::*;
        match registration_type {
            RegistrationType::Sponsor => {
                &[Company, Contact, Package, Delegates, Branding, Payment, Terms]
            }
            RegistrationType::Delegate => &[Company, Contact, Delegates, Payment, Terms],
            RegistrationType::MarathonRunner => &[Contact, Payment, Terms],
        }
    }
}

impl core::str::FromStr for WizardStep {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use WizardStep::*;
        [Company, Contact, Package, Delegates, Branding, Payment, Terms]
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown wizard step '{s}'")))
    }
}

/// Owns one draft and the current position in its step sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wizard {
    draft: RegistrationDraft,
    current: usize,
    furthest: usize,
}

impl Wizard {
    pub fn new(registration_type: RegistrationType) -> Self {
        Self {
            draft: RegistrationDraft::new(registration_type),
            current: 0,
            furthest: 0,
        }
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut RegistrationDraft {
        &mut self.draft
    }

    pub fn into_draft(self) -> RegistrationDraft {
        self.draft
    }

    pub fn update(&mut self, patch: DraftPatch) -> DomainResult<()> {
        self.draft.update(patch)
    }

    pub fn steps(&self) -> &'static [WizardStep] {
        WizardStep::sequence(self.draft.registration_type)
    }

    pub fn current_step(&self) -> WizardStep {
        self.steps()[self.current]
    }

    pub fn step_index(&self) -> usize {
        self.current
    }

    pub fn is_final_step(&self) -> bool {
        self.current + 1 == self.steps().len()
    }

    /// Validate the current step and move to the next one.
    pub fn advance(&mut self) -> DomainResult<WizardStep> {
        if self.is_final_step() {
            return Err(DomainError::conflict("already at the final step"));
        }
        self.check_current()?;
        self.current += 1;
        self.furthest = self.furthest.max(self.current);
        Ok(self.current_step())
    }

    /// Move one step back; stays put on the first step.
    pub fn back(&mut self) -> WizardStep {
        self.current = self.current.saturating_sub(1);
        self.current_step()
    }

    /// Jump to an already-visited step of this wizard's sequence.
    pub fn go_to(&mut self, step: WizardStep) -> DomainResult<WizardStep> {
        let idx = self
            .steps()
            .iter()
            .position(|s| *s == step)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "step '{}' does not apply to {} registrations",
                    step.as_str(),
                    self.draft.registration_type.as_str()
                ))
            })?;
        if idx > self.furthest {
            return Err(DomainError::conflict(format!(
                "step '{}' has not been reached yet",
                step.as_str()
            )));
        }
        self.current = idx;
        Ok(step)
    }

    /// The wizard can be submitted from its final step once that step is valid.
    pub fn ensure_submittable(&self) -> DomainResult<()> {
        if !self.is_final_step() {
            return Err(DomainError::conflict(format!(
                "submission is only allowed from the '{}' step",
                self.steps()[self.steps().len() - 1].as_str()
            )));
        }
        self.check_current()
    }

    fn check_current(&self) -> DomainResult<()> {
        match into_domain_error(&validate_step(self.current_step(), &self.draft)) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
