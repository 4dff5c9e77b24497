//! Client-side caches of server records
//!
//! Both caches are replaced wholesale on every reload and never merged.

use std::collections::BTreeMap;

use labeler_common::{LabelRecord, PairwiseComparisonRecord};

/// Label records keyed by image path
#[derive(Debug, Clone, Default)]
pub struct LabelStore {
    records: BTreeMap<String, LabelRecord>,
}

impl LabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cache with a fresh server listing
    pub fn replace_all(&mut self, records: Vec<LabelRecord>) {
        self.records = records
            .into_iter()
            .map(|record| (record.file_path.clone(), record))
            .collect();
    }

    pub fn get(&self, path: &str) -> Option<&LabelRecord> {
        self.records.get(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<LabelRecord> {
        self.records.remove(path)
    }

    /// Record exists and has at least one reconstruction tag
    pub fn is_labeled(&self, path: &str) -> bool {
        self.records.get(path).is_some_and(LabelRecord::is_labeled)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows for the results table, most recently updated first
    pub fn table_rows(&self) -> Vec<&LabelRecord> {
        let mut rows: Vec<&LabelRecord> = self.records.values().collect();
        rows.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.file_path.cmp(&b.file_path))
        });
        rows
    }
}

/// Pairwise comparison records
#[derive(Debug, Clone, Default)]
pub struct ComparisonList {
    records: Vec<PairwiseComparisonRecord>,
}

impl ComparisonList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cache, newest (highest id) first
    pub fn replace_all(&mut self, mut records: Vec<PairwiseComparisonRecord>) {
        records.sort_by(|a, b| b.id.cmp(&a.id));
        self.records = records;
    }

    pub fn remove(&mut self, id: i64) -> Option<PairwiseComparisonRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(index))
    }

    pub fn contains(&self, id: i64) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    pub fn rows(&self) -> &[PairwiseComparisonRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use labeler_common::Winner;
    use std::collections::BTreeSet;

    fn record(path: &str, tags: &[&str], hour: u32) -> LabelRecord {
        LabelRecord {
            file_path: path.to_string(),
            file_name: path.to_string(),
            reconstruction: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
            reconstruction_scores: tags.iter().map(|t| (t.to_string(), 5)).collect(),
            labeler_name: "alice".to_string(),
            notes: None,
            updated_at: Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap(),
        }
    }

    fn comparison(id: i64) -> PairwiseComparisonRecord {
        PairwiseComparisonRecord {
            id,
            image1_path: "a.png".to_string(),
            image1_name: "a.png".to_string(),
            image2_path: "b.png".to_string(),
            image2_name: "b.png".to_string(),
            reconstruction_type: "dense".to_string(),
            winner: Winner::Tie,
            labeler_name: "bob".to_string(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_reconstruction_is_not_labeled() {
        let mut store = LabelStore::new();
        store.replace_all(vec![record("a.png", &["dense"], 1), record("b.png", &[], 2)]);

        assert!(store.is_labeled("a.png"));
        assert!(!store.is_labeled("b.png"));
        assert!(!store.is_labeled("c.png"));
    }

    #[test]
    fn test_replace_all_drops_stale_entries() {
        let mut store = LabelStore::new();
        store.replace_all(vec![record("a.png", &["dense"], 1)]);
        store.replace_all(vec![record("b.png", &["sparse"], 1)]);

        assert_eq!(store.len(), 1);
        assert!(store.get("a.png").is_none());
    }

    #[test]
    fn test_table_rows_newest_first() {
        let mut store = LabelStore::new();
        store.replace_all(vec![
            record("a.png", &["dense"], 1),
            record("b.png", &["dense"], 3),
            record("c.png", &["dense"], 2),
        ]);

        let paths: Vec<&str> = store.table_rows().iter().map(|r| r.file_path.as_str()).collect();
        assert_eq!(paths, vec!["b.png", "c.png", "a.png"]);
    }

    #[test]
    fn test_comparison_list_remove() {
        let mut list = ComparisonList::new();
        list.replace_all(vec![comparison(1), comparison(3), comparison(2)]);

        assert_eq!(list.rows()[0].id, 3);
        assert!(list.remove(3).is_some());
        assert!(!list.contains(3));
        assert!(list.remove(42).is_none());
        assert_eq!(list.len(), 2);
    }
}
