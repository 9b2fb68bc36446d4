//! Single grave detail page

use crate::api::ApiClient;
use crate::calendar;
use crate::ledger::format_amount;
use crate::models::CemeteryRecord;
use crate::views::LoadState;
use serde::Serialize;
use tracing::error;

pub const PLACEHOLDER_IMAGE: &str = "https://cdn-icons-png.flaticon.com/512/4139/4139981.png";
pub const NOT_FOUND: &str = "Grave not found";

/// Display-ready profile of a burial record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraveProfile {
    pub name: String,
    pub image: String,
    pub grave: String,
    pub born: String,
    pub died: String,
    pub died_hijri: String,
    pub gender: String,
    pub age: String,
    pub address: String,
    pub native: String,
    pub where_died: String,
    pub father: String,
    pub mother: String,
    pub guardian: String,
    pub description: Option<String>,
    pub created: String,
    pub updated: String,
}

fn or_na(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("N/A")
        .to_string()
}

impl GraveProfile {
    pub fn from_record(record: &CemeteryRecord) -> Self {
        let uk = |d: &Option<String>| calendar::british_date(d.as_deref());
        Self {
            name: record.name.clone(),
            image: record
                .image
                .clone()
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            grave: record.grave_number().unwrap_or("N/A").to_string(),
            born: uk(&record.birth_date).unwrap_or_else(|| "Unknown".to_string()),
            died: uk(&record.death_date).unwrap_or_else(|| "Unknown".to_string()),
            died_hijri: calendar::to_hijri(record.death_date.as_deref()),
            gender: or_na(&record.gender),
            age: record
                .age
                .filter(|a| *a > 0.0)
                .map(|a| format!("{} years", format_amount(a)))
                .unwrap_or_else(|| "Unknown".to_string()),
            address: or_na(&record.address),
            native: if record.is_native() { "Yes" } else { "No" }.to_string(),
            where_died: or_na(&record.where_died),
            father: or_na(&record.father_name),
            mother: or_na(&record.mother_name),
            guardian: or_na(&record.guardian_name),
            description: record.description.clone().filter(|d| !d.trim().is_empty()),
            created: uk(&record.created_at).unwrap_or_else(|| calendar::NO_DATE.to_string()),
            updated: uk(&record.updated_at).unwrap_or_else(|| calendar::NO_DATE.to_string()),
        }
    }
}

pub struct GraveDetail {
    client: ApiClient,
    state: LoadState,
    record: Option<CemeteryRecord>,
}

impl GraveDetail {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: LoadState::Loading,
            record: None,
        }
    }

    pub async fn load(&mut self, id: &str) {
        match self.client.get_cemetery(id).await {
            Ok(record) => {
                self.record = record;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                error!(id, error = %e, "Failed to fetch grave details");
                self.state = LoadState::Failed;
            }
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn record(&self) -> Option<&CemeteryRecord> {
        self.record.as_ref()
    }

    pub fn profile(&self) -> Option<GraveProfile> {
        self.record.as_ref().map(GraveProfile::from_record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Method, ScriptedTransport};
    use crate::session::Session;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_profile_fallbacks() {
        let profile = GraveProfile::from_record(&CemeteryRecord {
            name: "Unknown soul".to_string(),
            ..Default::default()
        });
        assert_eq!(profile.image, PLACEHOLDER_IMAGE);
        assert_eq!(profile.grave, "N/A");
        assert_eq!(profile.born, "Unknown");
        assert_eq!(profile.age, "Unknown");
        assert_eq!(profile.native, "No");
        assert_eq!(profile.father, "N/A");
        assert!(profile.description.is_none());
    }

    #[tokio::test]
    async fn test_load_profile() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Get,
            "/api/cemetery/r9",
            200,
            json!({
                "_id": "r9",
                "name": "Abdul Karim",
                "age": 72,
                "isNative": true,
                "graveNumber": "B12",
                "deathDate": "2023-11-02T00:00:00.000Z",
                "fatherName": "Rahim"
            }),
        );
        let mut detail = GraveDetail::new(ApiClient::new(transport, "k", Session::anonymous()));
        detail.load("r9").await;

        let profile = detail.profile().unwrap();
        assert_eq!(profile.grave, "B12");
        assert_eq!(profile.age, "72 years");
        assert_eq!(profile.died, "2 November 2023");
        assert_eq!(profile.native, "Yes");
        assert_eq!(profile.father, "Rahim");

        detail.load("missing").await;
        assert_eq!(detail.state(), LoadState::Ready);
        assert!(detail.profile().is_none());
    }
}
