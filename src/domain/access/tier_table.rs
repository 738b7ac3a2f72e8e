//! Operator-defined label → tier tables.
//!
//! Tier labels are free text chosen by the creator on each platform and can be
//! renamed at any time, so they are data loaded from configuration rather than
//! code constants.

use std::collections::HashMap;

use super::Tier;

/// Maps provider tier labels to internal tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierTable {
    entries: HashMap<String, Tier>,
}

impl TierTable {
    pub fn new(entries: HashMap<String, Tier>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(label, tier)| (normalize(&label), tier))
            .collect();
        Self { entries }
    }

    /// Looks up a label. Surrounding whitespace is ignored; case is not.
    pub fn lookup(&self, label: &str) -> Option<Tier> {
        self.entries.get(&normalize(label)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Tier)> for TierTable {
    fn from_iter<I: IntoIterator<Item = (S, Tier)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_exact_labels() {
        let table: TierTable = [("Стрим + чат", Tier::Basic)].into_iter().collect();
        assert_eq!(table.lookup("Стрим + чат"), Some(Tier::Basic));
    }

    #[test]
    fn ignores_surrounding_whitespace() {
        let table: TierTable = [(" Стрим + чат ", Tier::Basic)].into_iter().collect();
        assert_eq!(table.lookup("Стрим + чат\n"), Some(Tier::Basic));
    }

    #[test]
    fn labels_are_case_sensitive() {
        let table: TierTable = [("admin", Tier::Admin)].into_iter().collect();
        assert_eq!(table.lookup("Admin"), None);
    }

    #[test]
    fn unknown_label_is_none() {
        let table = TierTable::default();
        assert!(table.is_empty());
        assert_eq!(table.lookup("anything"), None);
    }
}
