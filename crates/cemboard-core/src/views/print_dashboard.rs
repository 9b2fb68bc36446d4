//! Print-shop dashboard: ledger CRUD, search/sort/paging, Excel and invoices

use crate::api::ApiClient;
use crate::config::InvoiceConfig;
use crate::error::{CoreError, Result};
use crate::invoice::{self, InvoiceAssets};
use crate::ledger::LedgerSummary;
use crate::listing::{Pager, PrintQuery, SortDir, SortKey};
use crate::models::{PrintPayload, PrintRecord};
use crate::spreadsheet;
use crate::views::forms::PrintForm;
use crate::views::{auth_redirect, LoadState, Outcome};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const FETCH_FAILED: &str = "Failed to fetch records. Check server or login.";
pub const UPLOAD_FAILED: &str = "Image upload failed";
pub const DELETE_CONFIRM: &str = "Delete this record?";
pub const DELETE_FAILED: &str = "Delete failed";
pub const IMPORT_FINISHED: &str = "Import finished (rows posted). Refreshing list.";
pub const IMPORT_FAILED: &str = "Import failed";

/// Form being edited and the record it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct PrintEditor {
    /// `None` when adding
    pub editing: Option<String>,
    pub form: PrintForm,
}

/// Result of a sequential import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub total: usize,
    pub posted: usize,
    /// 0-based data row that stopped the import
    pub failed_row: Option<usize>,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        self.failed_row.is_none() && self.posted == self.total
    }
}

pub struct PrintDashboard {
    client: ApiClient,
    state: LoadState,
    records: Vec<PrintRecord>,
    query: PrintQuery,
    pager: Pager,
    editor: Option<PrintEditor>,
}

impl PrintDashboard {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: LoadState::Loading,
            records: Vec::new(),
            query: PrintQuery::default(),
            pager: Pager::default(),
            editor: None,
        }
    }

    /// Require a token, then load the ledger
    pub async fn mount(&mut self) -> Outcome {
        if !self.client.session().is_authenticated() {
            return Outcome::login();
        }
        self.refresh().await
    }

    /// Re-fetch the full ledger. Prior records survive a failed fetch.
    pub async fn refresh(&mut self) -> Outcome {
        let previous = self.state;
        self.state = LoadState::Loading;

        match self.client.list_prints().await {
            Ok(records) => {
                info!(count = records.len(), "Loaded print records");
                self.records = records;
                self.state = LoadState::Ready;
                let total = self.visible().len();
                self.pager.set_page(self.pager.page(), total);
                Outcome::Done
            }
            Err(e) => {
                if let Some(outcome) = auth_redirect(self.client.session(), &e) {
                    self.state = previous;
                    return outcome;
                }
                error!(error = %e, "Failed to fetch print records");
                self.state = LoadState::Failed;
                Outcome::alert(FETCH_FAILED)
            }
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn records(&self) -> &[PrintRecord] {
        &self.records
    }

    pub fn record(&self, id: &str) -> Option<&PrintRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary::from_records(&self.records)
    }

    // ===== Search / sort / paging =====

    pub fn query(&self) -> &PrintQuery {
        &self.query
    }

    pub fn set_search(&mut self, search: &str) {
        self.query.search = search.to_string();
        self.pager.reset();
    }

    pub fn set_sort(&mut self, key: SortKey, dir: SortDir) {
        self.query.sort = key;
        self.query.dir = dir;
        self.pager.reset();
    }

    /// Filtered and sorted rows across all pages
    pub fn visible(&self) -> Vec<&PrintRecord> {
        self.query.apply(&self.records)
    }

    pub fn page_rows(&self) -> Vec<&PrintRecord> {
        let rows = self.visible();
        self.pager.slice(&rows).to_vec()
    }

    pub fn page(&self) -> usize {
        self.pager.page()
    }

    pub fn page_count(&self) -> usize {
        self.pager.page_count(self.visible().len())
    }

    pub fn set_page(&mut self, page: usize) {
        let total = self.visible().len();
        self.pager.set_page(page, total);
    }

    pub fn next_page(&mut self) {
        let total = self.visible().len();
        self.pager.next(total);
    }

    pub fn prev_page(&mut self) {
        let total = self.visible().len();
        self.pager.prev(total);
    }

    // ===== Add / edit =====

    pub fn open_add(&mut self) {
        self.editor = Some(PrintEditor {
            editing: None,
            form: PrintForm::default(),
        });
    }

    /// Open the form prefilled from a record; `false` if the id is unknown
    pub fn open_edit(&mut self, id: &str) -> bool {
        match self.record(id) {
            Some(record) => {
                self.editor = Some(PrintEditor {
                    editing: Some(record.id.clone()),
                    form: PrintForm::from_record(record),
                });
                true
            }
            None => false,
        }
    }

    pub fn editor(&self) -> Option<&PrintEditor> {
        self.editor.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut PrintForm> {
        self.editor.as_mut().map(|e| &mut e.form)
    }

    pub fn close_form(&mut self) {
        self.editor = None;
    }

    /// Validate, upload the optional image, then POST or PUT.
    ///
    /// On any failure the form stays open with its values.
    pub async fn submit(&mut self) -> Outcome {
        let Some(editor) = self.editor.clone() else {
            return Outcome::Done;
        };
        if let Err(e) = editor.form.validate() {
            return Outcome::alert(e.alert_message());
        }

        let uploaded = match &editor.form.image {
            Some(image) => match self.client.upload(image).await {
                Ok(url) => Some(url),
                Err(e) => {
                    if let Some(outcome) = auth_redirect(self.client.session(), &e) {
                        return outcome;
                    }
                    warn!(error = %e, "Upload error");
                    return Outcome::alert(UPLOAD_FAILED);
                }
            },
            None => None,
        };

        let payload = editor.form.to_payload(uploaded);
        let saved = match &editor.editing {
            Some(id) => self.client.update_print(id, &payload).await,
            None => self.client.create_print(&payload).await,
        };

        if let Err(e) = saved {
            if let Some(outcome) = auth_redirect(self.client.session(), &e) {
                return outcome;
            }
            error!(error = %e, "Save failed");
            return Outcome::alert(format!("Save failed: {}", e.alert_message()));
        }

        info!(client = %payload.client_name, editing = editor.editing.is_some(), "Print record saved");
        self.editor = None;
        self.refresh().await
    }

    // ===== Delete =====

    /// Ask `confirm`, then DELETE and refetch
    pub async fn delete<F>(&mut self, id: &str, confirm: F) -> Outcome
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(DELETE_CONFIRM) {
            return Outcome::Cancelled;
        }
        if let Err(e) = self.client.delete_print(id).await {
            if let Some(outcome) = auth_redirect(self.client.session(), &e) {
                return outcome;
            }
            error!(id, error = %e, "Delete failed");
            return Outcome::alert(DELETE_FAILED);
        }
        info!(id, "Print record deleted");
        self.refresh().await
    }

    // ===== Import / export =====

    /// POST payloads one by one in order; the first failure stops the batch.
    /// Rows already posted stay posted.
    pub async fn import_payloads<P>(
        &mut self,
        payloads: &[PrintPayload],
        mut progress: P,
    ) -> (ImportReport, Outcome)
    where
        P: FnMut(usize, usize),
    {
        let mut report = ImportReport {
            total: payloads.len(),
            ..Default::default()
        };

        for (i, payload) in payloads.iter().enumerate() {
            if let Err(e) = self.client.create_print(payload).await {
                report.failed_row = Some(i);
                if let Some(outcome) = auth_redirect(self.client.session(), &e) {
                    return (report, outcome);
                }
                error!(row = i, error = %e, "Import stopped");
                return (report, Outcome::alert(IMPORT_FAILED));
            }
            report.posted += 1;
            progress(report.posted, report.total);
        }

        info!(rows = report.posted, "Import finished");
        match self.refresh().await {
            Outcome::Done => (report, Outcome::Message(IMPORT_FINISHED.to_string())),
            other => (report, other),
        }
    }

    /// Parse a workbook file and import its rows
    pub async fn import_file<P>(&mut self, path: &Path, progress: P) -> (ImportReport, Outcome)
    where
        P: FnMut(usize, usize),
    {
        let parsed = match tokio::fs::read(path).await {
            Ok(bytes) => spreadsheet::parse_import(bytes),
            Err(source) => Err(CoreError::FileRead {
                path: path.to_path_buf(),
                source,
            }),
        };

        match parsed {
            Ok(payloads) => self.import_payloads(&payloads, progress).await,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Import failed");
                (ImportReport::default(), Outcome::alert(IMPORT_FAILED))
            }
        }
    }

    /// Write the full ledger to `prints_YYYY-MM-DD.xlsx` in `dir`
    pub fn export(&self, dir: &Path, today: NaiveDate) -> Result<PathBuf> {
        let path = dir.join(spreadsheet::export_file_name(today));
        spreadsheet::export_prints(&self.records, &path)?;
        Ok(path)
    }

    /// Render `invoice_{id}.pdf` into `dir`
    pub async fn invoice(&self, id: &str, config: &InvoiceConfig, dir: &Path) -> Result<PathBuf> {
        let record = self.record(id).ok_or_else(|| CoreError::RecordNotFound {
            id: id.to_string(),
        })?;
        let assets = InvoiceAssets::load(config).await;
        invoice::write_invoice(record, config, &assets, dir)
    }

    pub fn logout(&self) -> Outcome {
        self.client.session().logout();
        Outcome::login()
    }
}
