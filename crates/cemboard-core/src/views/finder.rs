//! "Find a loved one": live search over burial records

use crate::api::ApiClient;
use crate::calendar;
use crate::graves::RevealCounter;
use crate::models::CemeteryRecord;
use crate::views::LoadState;
use serde::Serialize;
use tracing::error;

pub const FINDER_STEP: usize = 6;
pub const NO_RESULTS: &str = "No records found for your search.";

/// One search result card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinderCard {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub grave: String,
    pub death_hijri: String,
    pub death_long: String,
    pub link: String,
}

impl FinderCard {
    pub fn from_record(record: &CemeteryRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            image: record.image.clone().filter(|i| !i.is_empty()),
            grave: record.grave_label().to_string(),
            death_hijri: calendar::to_hijri(record.death_date.as_deref()),
            death_long: calendar::long_date(record.death_date.as_deref())
                .unwrap_or_else(|| calendar::NO_DATE.to_string()),
            link: format!("/grave/{}", record.id),
        }
    }
}

pub struct GraveFinder {
    client: ApiClient,
    state: LoadState,
    records: Vec<CemeteryRecord>,
    query: String,
    counter: RevealCounter,
}

impl GraveFinder {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: LoadState::Loading,
            records: Vec::new(),
            query: String::new(),
            counter: RevealCounter::new(FINDER_STEP, FINDER_STEP),
        }
    }

    /// Load every record; a failure is logged and shows no results
    pub async fn load(&mut self) {
        match self.client.list_cemetery().await {
            Ok(records) => {
                self.records = records;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                error!(error = %e, "Error fetching cemetery records");
                self.state = LoadState::Failed;
            }
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Results follow the query as it is typed
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Submitting the search only resets the reveal count
    pub fn submit(&mut self) {
        self.counter.reset();
    }

    pub fn show_more(&mut self) {
        self.counter.show_more();
    }

    /// Capped at the current match count
    pub fn reveal_at_least(&mut self, count: usize) {
        let count = count.min(self.matches().len());
        self.counter.reveal_at_least(count);
    }

    pub fn revealed(&self) -> usize {
        self.counter.shown()
    }

    pub fn matches(&self) -> Vec<&CemeteryRecord> {
        let q = self.query.trim().to_lowercase();
        self.records.iter().filter(|r| r.matches_query(&q)).collect()
    }

    pub fn cards(&self) -> Vec<FinderCard> {
        self.matches()
            .into_iter()
            .take(self.counter.shown())
            .map(FinderCard::from_record)
            .collect()
    }

    pub fn has_more(&self) -> bool {
        self.counter.has_more(self.matches().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Method, ScriptedTransport};
    use crate::session::Session;
    use serde_json::json;
    use std::sync::Arc;

    async fn finder(count: usize) -> GraveFinder {
        let transport = Arc::new(ScriptedTransport::new());
        let records: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "_id": format!("r{i}"),
                    "name": if i % 2 == 0 { format!("Rahman {i}") } else { format!("Karim {i}") },
                    "graveNumber": format!("C{i}"),
                    "deathDate": "2020-07-15T00:00:00.000Z"
                })
            })
            .collect();
        transport.respond(Method::Get, "/api/cemetery", 200, json!(records));
        let mut finder =
            GraveFinder::new(ApiClient::new(transport, "k", Session::anonymous()));
        finder.load().await;
        finder
    }

    #[tokio::test]
    async fn test_reveal_in_sixes_and_submit_resets() {
        let mut finder = finder(20).await;
        assert_eq!(finder.cards().len(), 6);
        finder.show_more();
        assert_eq!(finder.cards().len(), 12);

        finder.set_query("rahman");
        assert_eq!(finder.matches().len(), 10);
        finder.submit();
        assert_eq!(finder.revealed(), 6);
        assert!(finder.has_more());
    }

    #[tokio::test]
    async fn test_grave_number_search_and_card() {
        let mut finder = finder(3).await;
        finder.set_query("c1");
        let cards = finder.cards();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].grave, "C1");
        assert_eq!(cards[0].death_hijri, "15 Rajab 1441 AH");
        assert_eq!(cards[0].death_long, "July 15, 2020");
        assert_eq!(cards[0].link, "/grave/r1");
        assert!(!finder.has_more());
    }

    #[tokio::test]
    async fn test_failed_load_has_no_results() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail(Method::Get, "/api/cemetery", "down");
        let mut finder =
            GraveFinder::new(ApiClient::new(transport, "k", Session::anonymous()));
        finder.load().await;
        assert_eq!(finder.state(), LoadState::Failed);
        assert!(finder.cards().is_empty());
    }
}
