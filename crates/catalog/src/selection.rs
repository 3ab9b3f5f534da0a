//! Bounded selection of packages to compare side by side.

use serde::{Deserialize, Serialize};

use summit_core::ValueObject;

use crate::package::PackageId;

/// Maximum number of packages compared at once.
pub const MAX_SELECTED: usize = 3;

/// Outcome of [`SelectionSet::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    Added,
    Removed,
    /// Selection was full; nothing changed.
    Rejected,
}

/// Ordered selection of at most [`MAX_SELECTED`] package ids.
///
/// When full, new ids are refused. The oldest selection is never evicted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    ids: Vec<PackageId>,
}

impl ValueObject for SelectionSet {}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacity-bounded insert. Returns `true` if `id` is selected afterwards
    /// and was not already.
    pub fn insert(&mut self, id: PackageId) -> bool {
        if self.contains(&id) || self.is_full() {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove `id`, preserving the order of the remaining selections.
    pub fn remove(&mut self, id: &PackageId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| selected != id);
        self.ids.len() != before
    }

    pub fn toggle(&mut self, id: PackageId) -> Toggle {
        if self.remove(&id) {
            Toggle::Removed
        } else if self.insert(id) {
            Toggle::Added
        } else {
            Toggle::Rejected
        }
    }

    pub fn contains(&self, id: &PackageId) -> bool {
        self.ids.contains(id)
    }

    pub fn is_full(&self) -> bool {
        self.ids.len() >= MAX_SELECTED
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageId> {
        self.ids.iter()
    }

    pub fn as_slice(&self) -> &[PackageId] {
        &self.ids
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(selection: &SelectionSet) -> Vec<&str> {
        selection.iter().map(PackageId::as_str).collect()
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut s = SelectionSet::new();
        assert_eq!(s.toggle("gold".into()), Toggle::Added);
        assert!(s.contains(&"gold".into()));
        assert_eq!(s.toggle("gold".into()), Toggle::Removed);
        assert!(s.is_empty());
    }

    #[test]
    fn removal_preserves_order_of_remaining() {
        let mut s = SelectionSet::new();
        s.toggle("gold".into());
        s.toggle("silver".into());
        s.toggle("bronze".into());
        s.toggle("silver".into());
        assert_eq!(ids(&s), vec!["gold", "bronze"]);
    }

    #[test]
    fn fourth_selection_is_rejected_without_eviction() {
        let mut s = SelectionSet::new();
        for id in ["platinum", "gold", "silver"] {
            assert_eq!(s.toggle(id.into()), Toggle::Added);
        }
        assert_eq!(s.toggle("bronze".into()), Toggle::Rejected);
        assert_eq!(ids(&s), vec!["platinum", "gold", "silver"]);
        assert!(!s.insert("bronze".into()));
    }

    #[test]
    fn removing_from_full_set_makes_room() {
        let mut s = SelectionSet::new();
        for id in ["platinum", "gold", "silver"] {
            s.toggle(id.into());
        }
        s.toggle("platinum".into());
        assert_eq!(s.toggle("bronze".into()), Toggle::Added);
        assert_eq!(ids(&s), vec!["gold", "silver", "bronze"]);
    }

    #[test]
    fn insert_is_not_a_toggle() {
        let mut s = SelectionSet::new();
        assert!(s.insert("gold".into()));
        assert!(!s.insert("gold".into()));
        assert_eq!(s.len(), 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn package_id() -> impl Strategy<Value = PackageId> {
            prop_oneof![
                Just("platinum"),
                Just("gold"),
                Just("silver"),
                Just("bronze"),
                Just("startup"),
            ]
            .prop_map(PackageId::from)
        }

        proptest! {
            /// Property: toggling the same id twice restores the prior selection.
            #[test]
            fn toggle_twice_is_identity(
                history in proptest::collection::vec(package_id(), 0..12),
                id in package_id(),
            ) {
                let mut s = SelectionSet::new();
                for h in history {
                    s.toggle(h);
                }
                let before = s.clone();
                let was_selected = before.contains(&id);
                s.toggle(id.clone());
                s.toggle(id);

                let mut members = s.as_slice().to_vec();
                let mut members_before = before.as_slice().to_vec();
                members.sort();
                members_before.sort();
                prop_assert_eq!(members, members_before);
                if !was_selected {
                    // Added then removed (or rejected twice): order is untouched too.
                    prop_assert_eq!(&s, &before);
                }
            }

            /// Property: the selection never exceeds capacity and never holds duplicates.
            #[test]
            fn capacity_and_uniqueness_hold(
                history in proptest::collection::vec(package_id(), 0..30),
            ) {
                let mut s = SelectionSet::new();
                for h in history {
                    let before = s.clone();
                    let outcome = s.toggle(h);
                    if outcome == Toggle::Rejected {
                        prop_assert_eq!(&s, &before);
                        prop_assert_eq!(s.len(), MAX_SELECTED);
                    }
                    prop_assert!(s.len() <= MAX_SELECTED);
                    let mut seen = s.as_slice().to_vec();
                    seen.sort();
                    seen.dedup();
                    prop_assert_eq!(seen.len(), s.len());
                }
            }
        }
    }
}
