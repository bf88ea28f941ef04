//! Deduplicating grouper for register rows.
//!
//! A business can appear in the register once per notice; grouping merges
//! those rows into one crawl unit per `(name, locality)` identity, links
//! accumulating in register order. Group order is first-seen order — the
//! stable ordering every later stage carries through to the final dataset.

use std::collections::HashMap;

use serde::Serialize;

use penalty_map_models::{GroupKey, ListEntry};

/// One crawl unit: every detail link belonging to the same business name at
/// the same locality.
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    /// Identity of the unit.
    pub key: GroupKey,
    /// Detail links in register order. Linkless rows contribute no link.
    pub links: Vec<String>,
}

/// Partitions register rows into crawl units, first-seen key order.
///
/// No row is dropped: a row with an empty link still creates (or merges
/// into) its group.
#[must_use]
pub fn group_entries(entries: &[ListEntry]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for entry in entries {
        let key = GroupKey::for_entry(entry);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(Group {
                key,
                links: Vec::new(),
            });
            groups.len() - 1
        });

        if !entry.link.is_empty() {
            groups[slot].links.push(entry.link.clone());
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, locality: &str, link: &str) -> ListEntry {
        ListEntry {
            name: name.to_owned(),
            locality: locality.to_owned(),
            link: link.to_owned(),
        }
    }

    #[test]
    fn merges_rows_sharing_name_and_locality() {
        let entries = vec![
            entry("Foo", "Bar", "https://example.com/1"),
            entry("Foo", "Bar", "https://example.com/2"),
            entry("Baz", "Qux", "https://example.com/3"),
        ];
        let groups = group_entries(&entries);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.id(), "Foo::Bar");
        assert_eq!(
            groups[0].links,
            vec!["https://example.com/1", "https://example.com/2"]
        );
        assert_eq!(groups[1].key.id(), "Baz::Qux");
        assert_eq!(groups[1].links, vec!["https://example.com/3"]);
    }

    #[test]
    fn same_name_different_locality_stays_separate() {
        let entries = vec![
            entry("Foo", "Bar", "https://example.com/1"),
            entry("Foo", "Qux", "https://example.com/2"),
        ];
        let groups = group_entries(&entries);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn preserves_first_seen_order_across_interleaving() {
        let entries = vec![
            entry("A", "X", "https://example.com/1"),
            entry("B", "Y", "https://example.com/2"),
            entry("A", "X", "https://example.com/3"),
        ];
        let groups = group_entries(&entries);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.name, "A");
        assert_eq!(
            groups[0].links,
            vec!["https://example.com/1", "https://example.com/3"]
        );
        assert_eq!(groups[1].key.name, "B");
    }

    #[test]
    fn linkless_row_still_creates_its_group() {
        let entries = vec![entry("Foo", "Bar", "")];
        let groups = group_entries(&entries);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].links.is_empty());
    }

    #[test]
    fn every_link_lands_in_exactly_one_group() {
        let entries = vec![
            entry("A", "X", "https://example.com/1"),
            entry("B", "Y", "https://example.com/2"),
            entry("A", "X", "https://example.com/3"),
            entry("C", "Z", ""),
        ];
        let groups = group_entries(&entries);

        let total: usize = groups.iter().map(|g| g.links.len()).sum();
        assert_eq!(total, 3);
        let distinct: std::collections::HashSet<_> =
            groups.iter().flat_map(|g| g.links.iter()).collect();
        assert_eq!(distinct.len(), 3);
    }
}
