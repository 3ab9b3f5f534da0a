use serde::{Deserialize, Serialize};

use summit_catalog::PackageId;
use summit_core::{DomainError, DomainResult, ValueObject};

/// Longest fascia (booth signage) name accepted at the branding step.
pub const FASCIA_NAME_MAX_CHARS: usize = 25;

/// Most delegate slots a single registration may carry.
pub const MAX_DELEGATES: usize = 100;

/// What the registrant signs up as. Decides which wizard steps apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationType {
    Delegate,
    MarathonRunner,
    Sponsor,
}

impl RegistrationType {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationType::Delegate => "delegate",
            RegistrationType::MarathonRunner => "marathon_runner",
            RegistrationType::Sponsor => "sponsor",
        }
    }
}

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Mpesa,
    BankTransfer,
    Card,
    Invoice,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Card => "card",
            PaymentMethod::Invoice => "invoice",
        }
    }
}

/// Social media handles shown on sponsor branding.
///
/// Always replaced as a whole by a patch, never merged per handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialMedia {
    pub facebook: String,
    pub twitter: String,
    pub linkedin: String,
    pub instagram: String,
}

impl ValueObject for SocialMedia {}

/// Company logo attached to the draft, uploaded at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoFile {
    pub file_name: String,
    pub content_type: Option<String>,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl LogoFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    /// Text after the last `.` of the file name, if any.
    pub fn extension(&self) -> Option<&str> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

/// In-progress registration accumulated across wizard steps.
///
/// Created empty when the wizard starts and mutated only through
/// [`RegistrationDraft::update`] and the delegate operations below. The delegate
/// count always equals the number of delegate names and stays within
/// `1..=MAX_DELEGATES`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDraft {
    pub registration_type: RegistrationType,

    pub company_name: String,
    pub website: String,
    pub country: String,
    pub organization_type: String,
    pub logo: Option<LogoFile>,

    pub contact_name: String,
    pub contact_title: String,
    pub contact_email: String,
    pub contact_phone: String,

    pub package_id: Option<PackageId>,

    pub(crate) delegate_count: usize,
    pub(crate) delegate_names: Vec<String>,

    pub fascia_name: String,
    pub social_media: SocialMedia,

    pub payment_method: Option<PaymentMethod>,

    pub accept_terms: bool,
    pub accept_privacy: bool,
}

impl RegistrationDraft {
    pub fn new(registration_type: RegistrationType) -> Self {
        Self {
            registration_type,
            company_name: String::new(),
            website: String::new(),
            country: String::new(),
            organization_type: String::new(),
            logo: None,
            contact_name: String::new(),
            contact_title: String::new(),
            contact_email: String::new(),
            contact_phone: String::new(),
            package_id: None,
            delegate_count: 1,
            delegate_names: vec![String::new()],
            fascia_name: String::new(),
            social_media: SocialMedia::default(),
            payment_method: None,
            accept_terms: false,
            accept_privacy: false,
        }
    }

    pub fn delegate_count(&self) -> usize {
        self.delegate_count
    }

    pub fn delegate_names(&self) -> &[String] {
        &self.delegate_names
    }

    /// Add an empty delegate slot at the end. Refused at [`MAX_DELEGATES`].
    pub fn increment_delegates(&mut self) -> DomainResult<()> {
        if self.delegate_names.len() >= MAX_DELEGATES {
            return Err(DomainError::invariant(format!(
                "at most {MAX_DELEGATES} delegates are allowed"
            )));
        }
        self.delegate_names.push(String::new());
        self.sync_count();
        Ok(())
    }

    /// Drop the last delegate slot. Refused (returns `false`) at one delegate.
    pub fn decrement_delegates(&mut self) -> bool {
        if self.delegate_names.len() <= 1 {
            return false;
        }
        self.delegate_names.pop();
        self.sync_count();
        true
    }

    pub fn set_delegate_name(&mut self, index: usize, name: impl Into<String>) -> DomainResult<()> {
        let slot = self
            .delegate_names
            .get_mut(index)
            .ok_or_else(|| DomainError::not_found(format!("delegate {index}")))?;
        *slot = name.into();
        Ok(())
    }

    /// Remove the delegate at `index`; later entries shift down by one.
    pub fn remove_delegate(&mut self, index: usize) -> DomainResult<String> {
        if index >= self.delegate_names.len() {
            return Err(DomainError::not_found(format!("delegate {index}")));
        }
        if self.delegate_names.len() == 1 {
            return Err(DomainError::invariant("at least one delegate is required"));
        }
        let removed = self.delegate_names.remove(index);
        self.sync_count();
        Ok(removed)
    }

    /// Resize to `count` slots (1..=MAX_DELEGATES), truncating or padding with empty names.
    pub(crate) fn resize_delegates(&mut self, count: usize) {
        self.delegate_names
            .resize(count.clamp(1, MAX_DELEGATES), String::new());
        self.sync_count();
    }

    pub(crate) fn replace_delegates(&mut self, mut names: Vec<String>) {
        if names.is_empty() {
            names.push(String::new());
        }
        names.truncate(MAX_DELEGATES);
        self.delegate_names = names;
        self.sync_count();
    }

    fn sync_count(&mut self) {
        self.delegate_count = self.delegate_names.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with(names: &[&str]) -> RegistrationDraft {
        let mut d = RegistrationDraft::new(RegistrationType::Sponsor);
        d.replace_delegates(names.iter().map(|n| n.to_string()).collect());
        d
    }

    #[test]
    fn new_draft_has_one_empty_delegate() {
        let d = RegistrationDraft::new(RegistrationType::Delegate);
        assert_eq!(d.delegate_count(), 1);
        assert_eq!(d.delegate_names(), &[String::new()]);
        assert!(d.logo.is_none());
        assert!(!d.accept_terms);
    }

    #[test]
    fn decrement_below_one_is_rejected() {
        let mut d = RegistrationDraft::new(RegistrationType::Delegate);
        assert!(!d.decrement_delegates());
        assert_eq!(d.delegate_count(), 1);

        d.increment_delegates().unwrap();
        assert_eq!(d.delegate_count(), 2);
        assert!(d.decrement_delegates());
        assert_eq!(d.delegate_count(), 1);
    }

    #[test]
    fn remove_reindexes_remaining_delegates() {
        let mut d = draft_with(&["Amina", "Brian", "Chen", "Dora"]);
        let removed = d.remove_delegate(1).unwrap();
        assert_eq!(removed, "Brian");
        assert_eq!(d.delegate_names(), &["Amina", "Chen", "Dora"]);
        assert_eq!(d.delegate_count(), 3);
    }

    #[test]
    fn remove_last_remaining_delegate_is_rejected() {
        let mut d = draft_with(&["Amina"]);
        assert!(matches!(d.remove_delegate(0), Err(DomainError::InvariantViolation(_))));
        assert_eq!(d.delegate_count(), 1);
    }

    #[test]
    fn out_of_range_index_is_not_found() {
        let mut d = draft_with(&["Amina", "Brian"]);
        assert!(matches!(d.remove_delegate(2), Err(DomainError::NotFound(_))));
        assert!(matches!(d.set_delegate_name(5, "X"), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn set_delegate_name_updates_slot() {
        let mut d = RegistrationDraft::new(RegistrationType::Delegate);
        d.increment_delegates().unwrap();
        d.set_delegate_name(1, "Brian Otieno").unwrap();
        assert_eq!(d.delegate_names(), &["", "Brian Otieno"]);
    }

    #[test]
    fn delegate_slots_are_capped() {
        let mut d = RegistrationDraft::new(RegistrationType::Delegate);
        d.resize_delegates(usize::MAX);
        assert_eq!(d.delegate_count(), MAX_DELEGATES);

        assert!(matches!(d.increment_delegates(), Err(DomainError::InvariantViolation(_))));
        assert_eq!(d.delegate_count(), MAX_DELEGATES);

        d.replace_delegates(vec!["x".to_string(); MAX_DELEGATES + 5]);
        assert_eq!(d.delegate_names().len(), MAX_DELEGATES);
    }

    #[test]
    fn logo_extension_uses_last_dot() {
        let logo = LogoFile::new("acme.final.PNG", None, vec![1, 2]);
        assert_eq!(logo.extension(), Some("PNG"));
        assert_eq!(LogoFile::new("logo", None, vec![]).extension(), None);
        assert_eq!(LogoFile::new("logo.", None, vec![]).extension(), None);
    }

    #[test]
    fn serializes_camel_case_without_logo_bytes() {
        let mut d = RegistrationDraft::new(RegistrationType::MarathonRunner);
        d.logo = Some(LogoFile::new("acme.png", Some("image/png".into()), vec![0; 16]));
        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["registrationType"], "marathon_runner");
        assert_eq!(value["delegateCount"], 1);
        assert_eq!(value["logo"]["fileName"], "acme.png");
        assert!(value["logo"].get("bytes").is_none());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Increment,
            Decrement,
            Remove(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                Just(Op::Increment),
                Just(Op::Decrement),
                (0usize..8).prop_map(Op::Remove),
            ]
        }

        proptest! {
            /// Property: count equals list length and stays >= 1 under any op sequence.
            #[test]
            fn delegate_invariants_hold(ops in proptest::collection::vec(op(), 0..40)) {
                let mut d = RegistrationDraft::new(RegistrationType::Sponsor);
                for op in ops {
                    let before = d.delegate_count();
                    match op {
                        Op::Increment => { d.increment_delegates().unwrap(); }
                        Op::Decrement => { d.decrement_delegates(); }
                        Op::Remove(i) => {
                            if d.remove_delegate(i).is_ok() {
                                prop_assert_eq!(d.delegate_count(), before - 1);
                            }
                        }
                    }
                    prop_assert_eq!(d.delegate_count(), d.delegate_names().len());
                    prop_assert!(d.delegate_count() >= 1);
                }
            }
        }
    }
}
