//! Grave occupancy: blocks, partition and reveal paging

use crate::models::CemeteryRecord;
use std::collections::{BTreeSet, HashMap};

/// Label of the catch-all block filter
pub const ALL_BLOCKS: &str = "All";

/// Block key of a grave id: its first character, upper-cased
pub fn block_of(grave_id: &str) -> Option<String> {
    grave_id
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
}

/// "All" followed by every distinct block, ascending
pub fn blocks(grave_ids: &[String]) -> Vec<String> {
    let distinct: BTreeSet<String> = grave_ids.iter().filter_map(|g| block_of(g)).collect();
    std::iter::once(ALL_BLOCKS.to_string())
        .chain(distinct)
        .collect()
}

/// Block filter selected in the grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BlockFilter {
    #[default]
    All,
    Block(String),
}

impl BlockFilter {
    /// Parse a filter label; "All" (any case) or blank selects everything
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case(ALL_BLOCKS) {
            BlockFilter::All
        } else {
            BlockFilter::Block(block_of(label).unwrap_or_default())
        }
    }

    pub fn matches(&self, grave_id: &str) -> bool {
        match self {
            BlockFilter::All => true,
            BlockFilter::Block(block) => block_of(grave_id).as_deref() == Some(block.as_str()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            BlockFilter::All => ALL_BLOCKS,
            BlockFilter::Block(block) => block,
        }
    }
}

/// Grave id → occupying record
pub fn occupancy(records: &[CemeteryRecord]) -> HashMap<&str, &CemeteryRecord> {
    records
        .iter()
        .filter_map(|r| r.grave_number().map(|g| (g, r)))
        .collect()
}

/// Every grave id lands in exactly one of the two lists, order preserved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub occupied: Vec<String>,
    pub available: Vec<String>,
}

impl Partition {
    pub fn total(&self) -> usize {
        self.occupied.len() + self.available.len()
    }
}

pub fn partition(grave_ids: &[String], records: &[CemeteryRecord]) -> Partition {
    let used = occupancy(records);
    let (occupied, available): (Vec<String>, Vec<String>) = grave_ids
        .iter()
        .cloned()
        .partition(|g| used.contains_key(g.as_str()));
    Partition {
        occupied,
        available,
    }
}

/// Grave ids not yet used by any record. Advisory only.
pub fn available_numbers(grave_ids: &[String], records: &[CemeteryRecord]) -> Vec<String> {
    partition(grave_ids, records).available
}

/// Incremental "show more" counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealCounter {
    initial: usize,
    step: usize,
    shown: usize,
}

impl RevealCounter {
    pub fn new(initial: usize, step: usize) -> Self {
        Self {
            initial,
            step: step.max(1),
            shown: initial,
        }
    }

    pub fn shown(&self) -> usize {
        self.shown
    }

    pub fn show_more(&mut self) {
        self.shown = self.shown.saturating_add(self.step);
    }

    pub fn reset(&mut self) {
        self.shown = self.initial;
    }

    /// Reveal at least `count` items, rounded up to whole steps
    pub fn reveal_at_least(&mut self, count: usize) {
        if count <= self.shown {
            return;
        }
        let steps = (count - self.shown).div_ceil(self.step);
        self.shown = self
            .shown
            .saturating_add(steps.saturating_mul(self.step));
    }

    pub fn has_more(&self, total: usize) -> bool {
        total > self.shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn buried(grave: &str) -> CemeteryRecord {
        CemeteryRecord {
            id: format!("r-{grave}"),
            name: "x".to_string(),
            grave_number: Some(grave.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_blocks_sorted_with_all_first() {
        let graves = ids(&["b2", "A1", "C3", "B1", "a9"]);
        assert_eq!(blocks(&graves), vec!["All", "A", "B", "C"]);
        assert_eq!(blocks(&[]), vec!["All"]);
    }

    #[test]
    fn test_block_filter() {
        let filter = BlockFilter::parse("b");
        assert!(filter.matches("B12"));
        assert!(filter.matches("b3"));
        assert!(!filter.matches("A1"));
        assert_eq!(filter.label(), "B");
        assert_eq!(BlockFilter::parse("all"), BlockFilter::All);
        assert!(BlockFilter::All.matches("anything"));
    }

    #[test]
    fn test_partition_is_exhaustive_and_disjoint() {
        let graves = ids(&["A1", "A2", "B1", "B2"]);
        let records = vec![buried("A2"), buried("B1"), buried("Z9")];
        let p = partition(&graves, &records);

        assert_eq!(p.occupied, vec!["A2", "B1"]);
        assert_eq!(p.available, vec!["A1", "B2"]);
        assert_eq!(p.total(), graves.len());
        assert!(p.occupied.iter().all(|g| !p.available.contains(g)));
    }

    #[test]
    fn test_available_numbers() {
        let graves = ids(&["A1", "A2"]);
        assert_eq!(available_numbers(&graves, &[buried("A1")]), vec!["A2"]);
    }

    #[test]
    fn test_reveal_counter() {
        let mut counter = RevealCounter::new(10, 10);
        assert!(counter.has_more(11));
        counter.show_more();
        assert_eq!(counter.shown(), 20);
        assert!(!counter.has_more(20));
        counter.reset();
        assert_eq!(counter.shown(), 10);

        counter.reveal_at_least(25);
        assert_eq!(counter.shown(), 30);
        counter.reveal_at_least(30);
        assert_eq!(counter.shown(), 30);
        counter.reveal_at_least(5);
        assert_eq!(counter.shown(), 30);
    }

    #[test]
    fn test_reveal_counter_huge_request() {
        let mut counter = RevealCounter::new(10, 10);
        counter.reveal_at_least(usize::MAX);
        assert_eq!(counter.shown(), usize::MAX);
        counter.show_more();
        assert_eq!(counter.shown(), usize::MAX);
        assert!(!counter.has_more(usize::MAX));
    }
}
