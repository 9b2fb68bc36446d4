//! Burial records from `/api/cemetery`

use crate::calendar;
use crate::models::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One deceased individual keyed to a grave slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CemeteryRecord {
    #[serde(rename = "_id", default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_native: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grave_number: Option<String>,

    /// Free-form location label some records carry instead of a grave number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_died: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl CemeteryRecord {
    pub fn is_native(&self) -> bool {
        self.is_native.unwrap_or(false)
    }

    /// Case-insensitive gender match
    pub fn has_gender(&self, gender: &str) -> bool {
        self.gender
            .as_deref()
            .map(|g| g.trim().eq_ignore_ascii_case(gender))
            .unwrap_or(false)
    }

    pub fn grave_number(&self) -> Option<&str> {
        self.grave_number.as_deref().filter(|g| !g.is_empty())
    }

    /// Location label shown on finder cards
    pub fn grave_label(&self) -> &str {
        self.location
            .as_deref()
            .filter(|l| !l.is_empty())
            .or_else(|| self.grave_number())
            .unwrap_or("N/A")
    }

    pub fn death_date(&self) -> Option<DateTime<Utc>> {
        self.death_date.as_deref().and_then(calendar::parse_date)
    }

    pub fn birth_date(&self) -> Option<DateTime<Utc>> {
        self.birth_date.as_deref().and_then(calendar::parse_date)
    }

    /// Case-insensitive substring match on name and grave number
    pub fn matches_query(&self, query_lower: &str) -> bool {
        self.name.to_lowercase().contains(query_lower)
            || self
                .grave_number
                .as_deref()
                .map(|g| g.to_lowercase().contains(query_lower))
                .unwrap_or(false)
    }
}

/// Body of POST/PUT `/api/cemetery`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CemeteryPayload {
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    pub birth_date: String,
    pub death_date: String,
    pub is_native: bool,
    pub father_name: String,
    pub mother_name: String,
    pub guardian_name: String,
    pub image: String,
    pub grave_number: String,
    pub gender: String,
    pub where_died: String,
    pub description: String,
}
