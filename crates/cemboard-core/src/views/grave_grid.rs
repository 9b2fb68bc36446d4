//! Grave grid: occupancy map of every grave slot, filtered by block

use crate::api::ApiClient;
use crate::graves::{self, BlockFilter, RevealCounter};
use crate::models::CemeteryRecord;
use crate::views::LoadState;
use serde::Serialize;
use tracing::{debug, error};

pub const GRID_INITIAL: usize = 10;
pub const GRID_STEP: usize = 10;
pub const AVAILABLE_MESSAGE: &str = "This grave is available.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraveCell {
    pub grave: String,
    /// Id of the occupying record, `None` when available
    pub record_id: Option<String>,
}

impl GraveCell {
    pub fn is_occupied(&self) -> bool {
        self.record_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellClick {
    /// Occupied: go to `/grave/{recordId}`
    Navigate(String),
    /// Available: informational dialog, nothing mutated
    ShowAvailable(String),
}

pub struct GraveGrid {
    client: ApiClient,
    state: LoadState,
    graves: Vec<String>,
    records: Vec<CemeteryRecord>,
    filter: BlockFilter,
    counter: RevealCounter,
    dialog: Option<String>,
}

impl GraveGrid {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: LoadState::Loading,
            graves: Vec::new(),
            records: Vec::new(),
            filter: BlockFilter::All,
            counter: RevealCounter::new(GRID_INITIAL, GRID_STEP),
            dialog: None,
        }
    }

    /// Fetch grave slots and records together.
    ///
    /// A failure is logged and leaves the grid loading; there is no retry.
    pub async fn load(&mut self) {
        let (graves, records) =
            tokio::join!(self.client.list_graves(), self.client.list_cemetery());
        match (graves, records) {
            (Ok(graves), Ok(records)) => {
                debug!(graves = graves.len(), records = records.len(), "Grave grid loaded");
                self.graves = graves;
                self.records = records;
                self.state = LoadState::Ready;
            }
            (Err(e), _) | (_, Err(e)) => {
                error!(error = %e, "Failed to load grave grid");
            }
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn blocks(&self) -> Vec<String> {
        graves::blocks(&self.graves)
    }

    pub fn filter(&self) -> &BlockFilter {
        &self.filter
    }

    /// Change the block filter; always resets the reveal count
    pub fn select_block(&mut self, label: &str) {
        self.filter = BlockFilter::parse(label);
        self.counter.reset();
    }

    pub fn show_more(&mut self) {
        self.counter.show_more();
    }

    pub fn revealed(&self) -> usize {
        self.counter.shown()
    }

    /// Restore a reveal count, e.g. from a `show` query parameter.
    /// Capped at the graves in the current block.
    pub fn reveal_at_least(&mut self, count: usize) {
        let count = count.min(self.filtered_count());
        self.counter.reveal_at_least(count);
    }

    fn filtered(&self) -> impl Iterator<Item = &String> {
        self.graves.iter().filter(|g| self.filter.matches(g))
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered().count()
    }

    pub fn visible_cells(&self) -> Vec<GraveCell> {
        let used = graves::occupancy(&self.records);
        self.filtered()
            .take(self.counter.shown())
            .map(|g| GraveCell {
                grave: g.clone(),
                record_id: used.get(g.as_str()).map(|r| r.id.clone()),
            })
            .collect()
    }

    pub fn has_more(&self) -> bool {
        self.counter.has_more(self.filtered_count())
    }

    /// Occupied count over every grave, ignoring the block filter
    pub fn used_count(&self) -> usize {
        graves::partition(&self.graves, &self.records).occupied.len()
    }

    /// Available count over every grave, ignoring the block filter
    pub fn available_count(&self) -> usize {
        graves::partition(&self.graves, &self.records).available.len()
    }

    pub fn total(&self) -> usize {
        self.graves.len()
    }

    pub fn click(&mut self, grave: &str) -> Option<CellClick> {
        if !self.graves.iter().any(|g| g == grave) {
            return None;
        }
        let used = graves::occupancy(&self.records);
        match used.get(grave) {
            Some(record) => Some(CellClick::Navigate(format!("/grave/{}", record.id))),
            None => {
                self.dialog = Some(grave.to_string());
                Some(CellClick::ShowAvailable(grave.to_string()))
            }
        }
    }

    /// Grave shown in the "available" dialog
    pub fn dialog(&self) -> Option<&str> {
        self.dialog.as_deref()
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Method, ScriptedTransport};
    use crate::session::Session;
    use serde_json::json;
    use std::sync::Arc;

    fn grid(transport: &Arc<ScriptedTransport>) -> GraveGrid {
        GraveGrid::new(ApiClient::new(transport.clone(), "k", Session::anonymous()))
    }

    fn script(transport: &ScriptedTransport) {
        let graves: Vec<String> = (1..=15)
            .map(|i| format!("A{i}"))
            .chain((1..=25).map(|i| format!("B{i}")))
            .collect();
        transport
            .respond(Method::Get, "/api/graves", 200, json!(graves))
            .respond(
                Method::Get,
                "/api/cemetery",
                200,
                json!([
                    {"_id": "r1", "name": "One", "graveNumber": "A2"},
                    {"_id": "r2", "name": "Two", "graveNumber": "B7"}
                ]),
            );
    }

    #[tokio::test]
    async fn test_load_and_counts() {
        let transport = Arc::new(ScriptedTransport::new());
        script(&transport);
        let mut grid = grid(&transport);
        grid.load().await;

        assert_eq!(grid.state(), LoadState::Ready);
        assert_eq!(grid.blocks(), vec!["All", "A", "B"]);
        assert_eq!(grid.visible_cells().len(), 10);
        assert_eq!(grid.used_count(), 2);
        assert_eq!(grid.available_count(), 38);

        grid.select_block("A");
        assert_eq!(grid.filtered_count(), 15);
        assert_eq!(grid.used_count(), 2);
        assert!(grid.visible_cells()[1].is_occupied());
    }

    #[tokio::test]
    async fn test_block_change_resets_reveal() {
        let transport = Arc::new(ScriptedTransport::new());
        script(&transport);
        let mut grid = grid(&transport);
        grid.load().await;

        grid.show_more();
        assert_eq!(grid.revealed(), 20);
        grid.select_block("B");
        assert_eq!(grid.revealed(), 10);
        assert!(grid.has_more());
    }

    #[tokio::test]
    async fn test_reveal_capped_at_block_size() {
        let transport = Arc::new(ScriptedTransport::new());
        script(&transport);
        let mut grid = grid(&transport);
        grid.load().await;

        grid.select_block("A");
        grid.reveal_at_least(usize::MAX);
        assert_eq!(grid.revealed(), 20);
        assert_eq!(grid.visible_cells().len(), 15);
        assert!(!grid.has_more());
    }

    #[tokio::test]
    async fn test_clicks() {
        let transport = Arc::new(ScriptedTransport::new());
        script(&transport);
        let mut grid = grid(&transport);
        grid.load().await;

        assert_eq!(
            grid.click("B7"),
            Some(CellClick::Navigate("/grave/r2".to_string()))
        );
        assert!(grid.dialog().is_none());

        assert_eq!(
            grid.click("A1"),
            Some(CellClick::ShowAvailable("A1".to_string()))
        );
        assert_eq!(grid.dialog(), Some("A1"));
        assert_eq!(grid.available_count(), 38);
        grid.close_dialog();
        assert!(grid.dialog().is_none());

        assert!(grid.click("Z1").is_none());
    }

    #[tokio::test]
    async fn test_failure_stays_loading() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail(Method::Get, "/api/graves", "offline");
        let mut grid = grid(&transport);
        grid.load().await;
        assert_eq!(grid.state(), LoadState::Loading);
        assert!(grid.visible_cells().is_empty());
    }
}
