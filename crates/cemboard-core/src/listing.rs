//! Search, sort and pagination over the print ledger
//!
//! Always recomputed from the full record array; nothing is cached between
//! queries.

use crate::models::PrintRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Records per dashboard page
pub const PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Date,
    ClientName,
    Profit,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Date => write!(f, "date"),
            SortKey::ClientName => write!(f, "clientName"),
            SortKey::Profit => write!(f, "profit"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "clientname" | "client" | "name" => Ok(SortKey::ClientName),
            "profit" => Ok(SortKey::Profit),
            other => Err(format!(
                "Invalid sort key: '{}'. Expected date, clientName or profit",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    pub fn toggled(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDir::Asc => write!(f, "asc"),
            SortDir::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDir {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            other => Err(format!("Invalid sort direction: '{}'. Expected asc or desc", other)),
        }
    }
}

/// Search text plus sort order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintQuery {
    pub search: String,
    pub sort: SortKey,
    pub dir: SortDir,
}

impl PrintQuery {
    /// Filter then sort the full record array
    pub fn apply<'a>(&self, records: &'a [PrintRecord]) -> Vec<&'a PrintRecord> {
        let mut rows = search(records, &self.search);
        sort(&mut rows, self.sort, self.dir);
        rows
    }
}

fn matches(record: &PrintRecord, needle: &str) -> bool {
    record.client_name.to_lowercase().contains(needle)
        || record.total_pages.to_string().contains(needle)
        || record.charge_per_page.to_string().contains(needle)
}

/// Case-insensitive substring match over client name, total pages and charge
/// per page. A blank query keeps everything.
pub fn search<'a>(records: &'a [PrintRecord], query: &str) -> Vec<&'a PrintRecord> {
    let needle = query.trim().to_lowercase();
    records
        .iter()
        .filter(|r| needle.is_empty() || matches(r, &needle))
        .collect()
}

fn compare(a: &PrintRecord, b: &PrintRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.date().cmp(&b.date()),
        SortKey::ClientName => a
            .client_name
            .to_lowercase()
            .cmp(&b.client_name.to_lowercase())
            .then_with(|| a.client_name.cmp(&b.client_name)),
        SortKey::Profit => a.profit.total_cmp(&b.profit),
    }
}

/// Stable sort; descending is the exact reverse of ascending
pub fn sort(rows: &mut [&PrintRecord], key: SortKey, dir: SortDir) {
    rows.sort_by(|a, b| compare(a, b, key));
    if dir == SortDir::Desc {
        rows.reverse();
    }
}

/// Fixed-size page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    /// 1-based current page
    page: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// max(1, ⌈total / page_size⌉)
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    pub fn set_page(&mut self, page: usize, total: usize) {
        self.page = page.clamp(1, self.page_count(total));
    }

    pub fn next(&mut self, total: usize) {
        self.set_page(self.page + 1, total);
    }

    pub fn prev(&mut self, total: usize) {
        self.set_page(self.page.saturating_sub(1), total);
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Rows on the current page, clamping a page that no longer exists
    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        let page = self.page.min(self.page_count(rows.len()));
        let start = (page - 1) * self.page_size;
        let end = (start + self.page_size).min(rows.len());
        &rows[start.min(rows.len())..end]
    }
}
