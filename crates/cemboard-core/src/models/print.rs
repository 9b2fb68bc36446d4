//! Print-shop billing records from `/api/prints`

use crate::calendar;
use crate::ledger::Totals;
use crate::models::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRecord {
    #[serde(rename = "_id", default)]
    pub id: String,

    #[serde(default)]
    pub client_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub total_pages: f64,

    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub charge_per_page: f64,

    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub cost_per_page: f64,

    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub total_charge: f64,

    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub total_cost: f64,

    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub profit: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl PrintRecord {
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(calendar::parse_date)
    }

    /// Totals recomputed from pages and per-page rates, ignoring stored values
    pub fn recomputed(&self) -> Totals {
        Totals::compute(self.total_pages, self.charge_per_page, self.cost_per_page)
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().filter(|i| !i.is_empty())
    }
}

/// Body of POST/PUT `/api/prints`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintPayload {
    pub client_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub total_pages: f64,
    pub charge_per_page: f64,
    pub cost_per_page: f64,
    pub total_charge: f64,
    pub total_cost: f64,
    pub profit: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl PrintPayload {
    /// Fill the derived totals from pages and rates
    pub fn with_computed_totals(mut self) -> Self {
        let totals = Totals::compute(self.total_pages, self.charge_per_page, self.cost_per_page);
        self.total_charge = totals.total_charge;
        self.total_cost = totals.total_cost;
        self.profit = totals.profit;
        self
    }
}
