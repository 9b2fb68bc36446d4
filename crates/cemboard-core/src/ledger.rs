//! Print-shop ledger arithmetic
//!
//! Totals are always derived from pages and per-page rates; stored values on
//! the server are never trusted for display of a single record.

use crate::models::PrintRecord;
use serde::Serialize;

/// Derived totals of one print job
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_charge: f64,
    pub total_cost: f64,
    pub profit: f64,
}

impl Totals {
    pub fn compute(total_pages: f64, charge_per_page: f64, cost_per_page: f64) -> Self {
        let total_charge = total_pages * charge_per_page;
        let total_cost = total_pages * cost_per_page;
        Self {
            total_charge,
            total_cost,
            profit: total_charge - total_cost,
        }
    }
}

/// Aggregate over the whole ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub records: usize,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
}

impl LedgerSummary {
    pub fn from_records(records: &[PrintRecord]) -> Self {
        records.iter().fold(
            Self {
                records: records.len(),
                ..Self::default()
            },
            |mut acc, r| {
                acc.revenue += r.total_charge;
                acc.cost += r.total_cost;
                acc.profit += r.profit;
                acc
            },
        )
    }
}

/// Render an amount the way the dashboard shows it: integers without decimals
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}
