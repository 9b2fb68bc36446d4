//! Public notice list and notice detail

use crate::api::ApiClient;
use crate::models::Notice;
use crate::views::{LoadState, Outcome, NOTICES_ROUTE};
use tracing::error;

/// Notices shown in the "latest" section
pub const LATEST_COUNT: usize = 4;
pub const NOTICE_NOT_FOUND: &str = "Notice not found";

/// Newest first; undated notices sink to the end
pub fn sort_newest_first(notices: &mut [Notice]) {
    notices.sort_by(|a, b| b.date().cmp(&a.date()));
}

pub struct NoticeBoard {
    client: ApiClient,
    state: LoadState,
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: LoadState::Loading,
            notices: Vec::new(),
        }
    }

    pub async fn load(&mut self) {
        match self.client.list_notices().await {
            Ok(mut notices) => {
                sort_newest_first(&mut notices);
                self.notices = notices;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch notices");
                self.state = LoadState::Failed;
            }
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn all(&self) -> &[Notice] {
        &self.notices
    }

    pub fn latest(&self) -> &[Notice] {
        &self.notices[..self.notices.len().min(LATEST_COUNT)]
    }

    /// More notices exist than the latest section shows
    pub fn has_more(&self) -> bool {
        self.notices.len() > LATEST_COUNT
    }
}

pub struct NoticeDetail {
    client: ApiClient,
    state: LoadState,
    notice: Option<Notice>,
    others: Vec<Notice>,
}

impl NoticeDetail {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: LoadState::Loading,
            notice: None,
            others: Vec::new(),
        }
    }

    /// Load the sorted list and the selected notice.
    ///
    /// Any failure sends the visitor back to the notice list.
    pub async fn load(&mut self, id: &str) -> Outcome {
        let result = async {
            let mut all = self.client.list_notices().await?;
            sort_newest_first(&mut all);
            let notice = self.client.get_notice(id).await?;
            Ok::<_, crate::error::CoreError>((all, notice))
        }
        .await;

        match result {
            Ok((all, notice)) => {
                self.others = all.into_iter().filter(|n| n.id != id).collect();
                self.notice = notice;
                self.state = LoadState::Ready;
                Outcome::Done
            }
            Err(e) => {
                error!(id, error = %e, "Failed to load notice");
                self.state = LoadState::Failed;
                Outcome::Redirect(NOTICES_ROUTE.to_string())
            }
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Other notices, newest first, for the sidebar
    pub fn others(&self) -> &[Notice] {
        &self.others
    }
}
