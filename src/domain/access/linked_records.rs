//! JSON:API linked-record graph.
//!
//! The crowdfunding identity endpoint returns a JSON:API document: the primary
//! `data` record (the user) references membership records, which reference
//! tier records, all delivered flat in `included`. This module rebuilds the
//! graph so relationships can be walked in provider order.

use std::collections::HashMap;

use serde_json::Value;

/// Index over the records of one JSON:API document.
#[derive(Debug)]
pub struct LinkedRecords<'a> {
    primary: Vec<&'a Value>,
    index: HashMap<(&'a str, &'a str), &'a Value>,
}

impl<'a> LinkedRecords<'a> {
    /// Builds the index from a full document.
    ///
    /// Records without a string `type` and `id` are ignored. When the same
    /// record appears twice, the first occurrence wins.
    pub fn from_document(document: &'a Value) -> Self {
        let primary: Vec<&Value> = match document.get("data") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(record @ Value::Object(_)) => vec![record],
            _ => Vec::new(),
        };

        let included = document
            .get("included")
            .and_then(Value::as_array)
            .map(|items| items.iter().collect::<Vec<_>>())
            .unwrap_or_default();

        let mut index = HashMap::new();
        for record in primary.iter().chain(included.iter()).copied() {
            if let Some(key) = record_key(record) {
                index.entry(key).or_insert(record);
            }
        }

        Self { primary, index }
    }

    /// Primary records in document order.
    pub fn primary(&self) -> &[&'a Value] {
        &self.primary
    }

    /// Looks up a record by type and id.
    pub fn get(&self, kind: &str, id: &str) -> Option<&'a Value> {
        self.index.get(&(kind, id)).copied()
    }

    /// Resolves a relationship of `record` into the referenced records,
    /// preserving the order of the relationship's linkage data. References
    /// that are not present in the document are skipped.
    pub fn related(&self, record: &'a Value, relationship: &str) -> Vec<&'a Value> {
        let linkage = record
            .get("relationships")
            .and_then(|r| r.get(relationship))
            .and_then(|r| r.get("data"));

        let refs: Vec<&Value> = match linkage {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(item @ Value::Object(_)) => vec![item],
            _ => Vec::new(),
        };

        refs.into_iter()
            .filter_map(record_key)
            .filter_map(|(kind, id)| self.get(kind, id))
            .collect()
    }

    /// Returns a string attribute of a record.
    pub fn attribute(record: &'a Value, name: &str) -> Option<&'a str> {
        record
            .get("attributes")
            .and_then(|a| a.get(name))
            .and_then(Value::as_str)
    }

    /// Titles of the tiers the primary user is currently entitled to, in
    /// discovery order (user → memberships → currently entitled tiers).
    /// Duplicate titles keep their first position.
    pub fn entitled_tier_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = Vec::new();

        for user in self.primary.iter().copied() {
            for membership in self.related(user, "memberships") {
                for tier in self.related(membership, "currently_entitled_tiers") {
                    if let Some(title) = Self::attribute(tier, "title") {
                        if !titles.iter().any(|t| t == title) {
                            titles.push(title.to_string());
                        }
                    }
                }
            }
        }

        titles
    }
}

fn record_key(record: &Value) -> Option<(&str, &str)> {
    let kind = record.get("type")?.as_str()?;
    let id = record.get("id")?.as_str()?;
    Some((kind, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity_document() -> Value {
        json!({
            "data": {
                "type": "user",
                "id": "u1",
                "attributes": {
                    "full_name": "Ann Example",
                    "image_url": "https://c8.example.com/u1.png",
                    "url": "https://www.patreon.com/ann"
                },
                "relationships": {
                    "memberships": { "data": [ { "type": "member", "id": "m1" } ] }
                }
            },
            "included": [
                {
                    "type": "member",
                    "id": "m1",
                    "attributes": { "patron_status": "active_patron" },
                    "relationships": {
                        "currently_entitled_tiers": {
                            "data": [
                                { "type": "tier", "id": "t3" },
                                { "type": "tier", "id": "t2" }
                            ]
                        }
                    }
                },
                { "type": "tier", "id": "t2", "attributes": { "title": "Стрим + видео без рекламы" } },
                { "type": "tier", "id": "t3", "attributes": { "title": "Доступ в закулисье" } }
            ]
        })
    }

    #[test]
    fn indexes_primary_and_included_records() {
        let doc = identity_document();
        let records = LinkedRecords::from_document(&doc);

        assert_eq!(records.primary().len(), 1);
        assert!(records.get("member", "m1").is_some());
        assert!(records.get("tier", "t2").is_some());
        assert!(records.get("tier", "missing").is_none());
    }

    #[test]
    fn titles_follow_relationship_order_not_included_order() {
        let doc = identity_document();
        let records = LinkedRecords::from_document(&doc);

        assert_eq!(
            records.entitled_tier_titles(),
            vec!["Доступ в закулисье", "Стрим + видео без рекламы"]
        );
    }

    #[test]
    fn reads_user_attributes() {
        let doc = identity_document();
        let records = LinkedRecords::from_document(&doc);
        let user = records.primary()[0];

        assert_eq!(LinkedRecords::attribute(user, "full_name"), Some("Ann Example"));
        assert_eq!(LinkedRecords::attribute(user, "missing"), None);
    }

    #[test]
    fn user_without_memberships_has_no_titles() {
        let doc = json!({ "data": { "type": "user", "id": "u1", "attributes": {} } });
        let records = LinkedRecords::from_document(&doc);
        assert!(records.entitled_tier_titles().is_empty());
    }

    #[test]
    fn dangling_references_are_skipped() {
        let doc = json!({
            "data": {
                "type": "user", "id": "u1",
                "relationships": { "memberships": { "data": [ { "type": "member", "id": "gone" } ] } }
            },
            "included": []
        });
        let records = LinkedRecords::from_document(&doc);
        assert!(records.entitled_tier_titles().is_empty());
    }

    #[test]
    fn tiers_not_linked_to_the_user_are_ignored() {
        let doc = json!({
            "data": { "type": "user", "id": "u1", "relationships": { "memberships": { "data": [] } } },
            "included": [ { "type": "tier", "id": "t1", "attributes": { "title": "Orphan" } } ]
        });
        let records = LinkedRecords::from_document(&doc);
        assert!(records.entitled_tier_titles().is_empty());
    }

    #[test]
    fn document_without_data_is_empty() {
        let doc = json!({ "errors": [ { "status": "401" } ] });
        let records = LinkedRecords::from_document(&doc);
        assert!(records.primary().is_empty());
    }
}
