//! Tier → CMS tag filter table.
//!
//! Content visibility is expressed as a set of CMS tags per tier. The table
//! must be monotone: a higher tier always sees a superset of the tags of every
//! lower tier.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use super::Tier;

/// CMS filter expression, e.g. `tags:[hash-basic,hash-advanced]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterExpression(String);

impl FilterExpression {
    /// Filter matching any of `tags`.
    pub fn for_tags(tags: &[String]) -> Self {
        Self(format!("tags:[{}]", tags.join(",")))
    }

    /// Narrows the filter to a single slug (`<filter>+slug:<slug>`).
    ///
    /// Callers must pass a validated slug; see [`crate::domain::content::is_valid_slug`].
    pub fn with_slug(&self, slug: &str) -> Self {
        Self(format!("{}+slug:{}", self.0, slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised while building a [`TagFilterTable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagFilterError {
    #[error("Tag filter table has no non-empty tag set")]
    NoEntryTags,

    #[error("Tag set for {higher} does not include tag '{tag}' visible to {lower}")]
    NotMonotone {
        lower: Tier,
        higher: Tier,
        tag: String,
    },
}

/// Static tier → tag set mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilterTable {
    /// Effective tag set for every tier, after inheritance.
    resolved: BTreeMap<Tier, Vec<String>>,
}

impl TagFilterTable {
    /// Builds the table from configured tag sets.
    ///
    /// A tier without its own entry inherits the set of the nearest mapped
    /// tier below it; tiers below every mapped tier get the lowest non-empty
    /// set. Access never falls open to "all content".
    ///
    /// # Errors
    ///
    /// - `NoEntryTags` if every configured set is empty
    /// - `NotMonotone` if a higher tier drops a tag a lower tier can see
    pub fn new(configured: BTreeMap<Tier, Vec<String>>) -> Result<Self, TagFilterError> {
        let configured: BTreeMap<Tier, Vec<String>> = configured
            .into_iter()
            .map(|(tier, tags)| (tier, dedupe(tags)))
            .filter(|(_, tags)| !tags.is_empty())
            .collect();

        let lowest = configured
            .values()
            .next()
            .cloned()
            .ok_or(TagFilterError::NoEntryTags)?;

        let mut resolved = BTreeMap::new();
        let mut inherited = lowest;
        for tier in Tier::ALL {
            if let Some(tags) = configured.get(&tier) {
                inherited = tags.clone();
            }
            resolved.insert(tier, inherited.clone());
        }

        let table = Self { resolved };
        table.check_monotone()?;
        Ok(table)
    }

    /// Returns the filter expression for a tier.
    pub fn filter_for_tier(&self, tier: Tier) -> FilterExpression {
        FilterExpression::for_tags(self.tags_for(tier))
    }

    /// Returns the tag set visible to a tier.
    pub fn tags_for(&self, tier: Tier) -> &[String] {
        self.resolved
            .get(&tier)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn check_monotone(&self) -> Result<(), TagFilterError> {
        for (i, lower) in Tier::ALL.iter().enumerate() {
            for higher in &Tier::ALL[i + 1..] {
                let higher_tags: BTreeSet<&String> = self.tags_for(*higher).iter().collect();
                if let Some(tag) = self
                    .tags_for(*lower)
                    .iter()
                    .find(|tag| !higher_tags.contains(tag))
                {
                    return Err(TagFilterError::NotMonotone {
                        lower: *lower,
                        higher: *higher,
                        tag: tag.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn dedupe(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn default_table() -> TagFilterTable {
        TagFilterTable::new(BTreeMap::from([
            (Tier::Entry, tags(&["hash-basic"])),
            (Tier::Basic, tags(&["hash-basic"])),
            (Tier::Advanced, tags(&["hash-basic", "hash-advanced"])),
            (Tier::Admin, tags(&["hash-basic", "hash-advanced"])),
        ]))
        .unwrap()
    }

    #[test]
    fn builds_filter_expressions() {
        let table = default_table();
        assert_eq!(table.filter_for_tier(Tier::Basic).as_str(), "tags:[hash-basic]");
        assert_eq!(
            table.filter_for_tier(Tier::Advanced).as_str(),
            "tags:[hash-basic,hash-advanced]"
        );
    }

    #[test]
    fn unmapped_bottom_tier_falls_back_to_entry_tags() {
        let table = default_table();
        assert_eq!(table.filter_for_tier(Tier::None).as_str(), "tags:[hash-basic]");
    }

    #[test]
    fn unmapped_middle_tier_inherits_from_below() {
        let table = TagFilterTable::new(BTreeMap::from([
            (Tier::Entry, tags(&["a"])),
            (Tier::Advanced, tags(&["a", "b"])),
        ]))
        .unwrap();

        assert_eq!(table.tags_for(Tier::Basic), tags(&["a"]).as_slice());
        assert_eq!(table.tags_for(Tier::Admin), tags(&["a", "b"]).as_slice());
    }

    #[test]
    fn rejects_tables_without_tags() {
        let result = TagFilterTable::new(BTreeMap::from([(Tier::Entry, tags(&[" "]))]));
        assert_eq!(result, Err(TagFilterError::NoEntryTags));
    }

    #[test]
    fn rejects_non_monotone_tables() {
        let result = TagFilterTable::new(BTreeMap::from([
            (Tier::Entry, tags(&["a"])),
            (Tier::Basic, tags(&["b"])),
        ]));
        assert!(matches!(result, Err(TagFilterError::NotMonotone { .. })));
    }

    #[test]
    fn slug_narrowing() {
        let filter = default_table().filter_for_tier(Tier::Basic);
        assert_eq!(
            filter.with_slug("hello-world").as_str(),
            "tags:[hash-basic]+slug:hello-world"
        );
    }

    fn tier_strategy() -> impl Strategy<Value = Tier> {
        prop::sample::select(Tier::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn higher_tiers_see_superset_of_tags(a in tier_strategy(), b in tier_strategy()) {
            let table = default_table();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let high_tags = table.tags_for(high);
            for tag in table.tags_for(low) {
                prop_assert!(high_tags.contains(tag));
            }
        }

        #[test]
        fn accepted_tables_are_monotone(
            sets in prop::collection::btree_map(
                tier_strategy(),
                prop::collection::vec("[a-c]", 0..3),
                0..5,
            )
        ) {
            if let Ok(table) = TagFilterTable::new(sets) {
                for (i, low) in Tier::ALL.iter().enumerate() {
                    for high in &Tier::ALL[i..] {
                        for tag in table.tags_for(*low) {
                            prop_assert!(table.tags_for(*high).contains(tag));
                        }
                    }
                }
                prop_assert!(!table.tags_for(Tier::None).is_empty());
            }
        }
    }
}
