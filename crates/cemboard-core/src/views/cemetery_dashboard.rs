//! Cemetery admin dashboard: burial records, notices and statistics

use crate::api::{ApiClient, ImageFile};
use crate::error::Result;
use crate::graves;
use crate::models::{CemeteryRecord, Notice};
use crate::stats::CemeteryStats;
use crate::views::forms::{NoticeForm, RecordForm};
use crate::views::notices::sort_newest_first;
use crate::views::{auth_redirect, LoadState, Outcome};
use tracing::{error, info, warn};

pub const ADD_FAILED: &str = "Failed to add record";
pub const UPDATE_FAILED: &str = "Failed to update record";
pub const DELETE_RECORD_CONFIRM: &str = "Delete this record?";
pub const DELETE_NOTICE_CONFIRM: &str = "Delete this notice?";
pub const DELETE_FAILED: &str = "Delete failed";
pub const NOTICE_CREATED: &str = "Notice/Event created successfully!";
pub const NOTICE_UPDATED: &str = "Notice/Event updated successfully!";
pub const NOTICE_FAILED: &str = "Something went wrong!";

pub struct CemeteryDashboard {
    client: ApiClient,
    state: LoadState,
    records: Vec<CemeteryRecord>,
    notices: Vec<Notice>,
    graves: Vec<String>,
}

impl CemeteryDashboard {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: LoadState::Loading,
            records: Vec::new(),
            notices: Vec::new(),
            graves: Vec::new(),
        }
    }

    pub async fn mount(&mut self) -> Outcome {
        if !self.client.session().is_authenticated() {
            return Outcome::login();
        }
        self.refresh().await
    }

    /// Fetch records, notices and grave slots.
    ///
    /// Only the record list decides the outcome; notice or grave failures
    /// are logged and keep the previous lists.
    pub async fn refresh(&mut self) -> Outcome {
        let previous = self.state;
        self.state = LoadState::Loading;

        let (records, notices, graves) = tokio::join!(
            self.client.list_cemetery(),
            self.client.list_notices(),
            self.client.list_graves()
        );

        // A 401 leaves every list as it was
        if let Err(e) = &records {
            if let Some(outcome) = auth_redirect(self.client.session(), e) {
                self.state = previous;
                return outcome;
            }
        }

        match notices {
            Ok(mut notices) => {
                sort_newest_first(&mut notices);
                self.notices = notices;
            }
            Err(e) => warn!(error = %e, "Failed to fetch notices"),
        }
        match graves {
            Ok(graves) => self.graves = graves,
            Err(e) => warn!(error = %e, "Failed to fetch grave numbers"),
        }

        match records {
            Ok(records) => {
                info!(count = records.len(), "Loaded cemetery records");
                self.records = records;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch cemetery records");
                self.state = LoadState::Failed;
            }
        }
        Outcome::Done
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn records(&self) -> &[CemeteryRecord] {
        &self.records
    }

    pub fn record(&self, id: &str) -> Option<&CemeteryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn notice(&self, id: &str) -> Option<&Notice> {
        self.notices.iter().find(|n| n.id == id)
    }

    pub fn stats(&self) -> CemeteryStats {
        CemeteryStats::compute(&self.records)
    }

    /// Grave slots without a record. A hint only; the API enforces uniqueness.
    pub fn available_graves(&self) -> Vec<String> {
        graves::available_numbers(&self.graves, &self.records)
    }

    pub fn search(&self, query: &str) -> Vec<&CemeteryRecord> {
        let q = query.trim().to_lowercase();
        self.records.iter().filter(|r| r.matches_query(&q)).collect()
    }

    // ===== Burial records =====

    pub fn new_record_form(&self) -> RecordForm {
        RecordForm {
            grave_options: self.available_graves(),
            ..Default::default()
        }
    }

    /// Edit form; the record's own grave stays selectable
    pub fn edit_record_form(&self, id: &str) -> Option<RecordForm> {
        let record = self.record(id)?;
        let mut form = RecordForm::from_record(record);
        form.grave_options = self.available_graves();
        if let Some(own) = record.grave_number() {
            if !form.grave_options.iter().any(|g| g == own) {
                form.grave_options.insert(0, own.to_string());
            }
        }
        Some(form)
    }

    async fn upload(&self, image: Option<&ImageFile>) -> Result<Option<String>> {
        match image {
            Some(image) => self.client.upload(image).await.map(Some),
            None => Ok(None),
        }
    }

    /// Create (`editing == None`) or update a burial record
    pub async fn submit_record(&mut self, form: &RecordForm, editing: Option<&str>) -> Outcome {
        if let Err(e) = form.validate() {
            return Outcome::alert(e.alert_message());
        }
        let failed = if editing.is_some() {
            UPDATE_FAILED
        } else {
            ADD_FAILED
        };

        let result = async {
            let uploaded = self.upload(form.image.as_ref()).await?;
            let payload = form.to_payload(uploaded);
            match editing {
                Some(id) => self.client.update_cemetery(id, &payload).await,
                None => self.client.create_cemetery(&payload).await,
            }
        }
        .await;

        if let Err(e) = result {
            if let Some(outcome) = auth_redirect(self.client.session(), &e) {
                return outcome;
            }
            error!(error = %e, "{}", failed);
            return Outcome::alert(failed);
        }

        info!(name = %form.name, grave = %form.grave_number, "Cemetery record saved");
        self.refresh().await
    }

    pub async fn delete_record<F>(&mut self, id: &str, confirm: F) -> Outcome
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(DELETE_RECORD_CONFIRM) {
            return Outcome::Cancelled;
        }
        if let Err(e) = self.client.delete_cemetery(id).await {
            if let Some(outcome) = auth_redirect(self.client.session(), &e) {
                return outcome;
            }
            error!(id, error = %e, "Delete failed");
            return Outcome::alert(DELETE_FAILED);
        }
        self.refresh().await
    }

    // ===== Notices =====

    /// Create or update a notice. Success is reported as a message.
    pub async fn submit_notice(&mut self, form: &NoticeForm, editing: Option<&str>) -> Outcome {
        if let Err(e) = form.validate() {
            return Outcome::alert(e.alert_message());
        }

        let result = async {
            let uploaded = self.upload(form.image.as_ref()).await?;
            let payload = form.to_payload(uploaded);
            match editing {
                Some(id) => self.client.update_notice(id, &payload).await,
                None => self.client.create_notice(&payload).await,
            }
        }
        .await;

        if let Err(e) = result {
            if let Some(outcome) = auth_redirect(self.client.session(), &e) {
                return outcome;
            }
            error!(error = %e, "Notice save failed");
            return Outcome::alert(NOTICE_FAILED);
        }

        match self.refresh().await {
            Outcome::Done if editing.is_some() => Outcome::Message(NOTICE_UPDATED.to_string()),
            Outcome::Done => Outcome::Message(NOTICE_CREATED.to_string()),
            other => other,
        }
    }

    pub async fn delete_notice<F>(&mut self, id: &str, confirm: F) -> Outcome
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(DELETE_NOTICE_CONFIRM) {
            return Outcome::Cancelled;
        }
        if let Err(e) = self.client.delete_notice(id).await {
            if let Some(outcome) = auth_redirect(self.client.session(), &e) {
                return outcome;
            }
            error!(id, error = %e, "Notice delete failed");
            return Outcome::alert(DELETE_FAILED);
        }
        self.refresh().await
    }

    pub fn logout(&self) -> Outcome {
        self.client.session().logout();
        Outcome::login()
    }
}
