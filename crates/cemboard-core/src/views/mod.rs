//! View controllers
//!
//! Each view owns its loader and state and fetches its own data; nothing is
//! shared between views. Browser side effects (navigation, alerts, confirm
//! prompts) come back as [`Outcome`] values for the front end to render.

pub mod cemetery_dashboard;
pub mod detail;
pub mod finder;
pub mod forms;
pub mod grave_grid;
pub mod notices;
pub mod print_dashboard;

use crate::error::CoreError;
use crate::session::Session;
use tracing::warn;

pub use cemetery_dashboard::CemeteryDashboard;
pub use detail::{GraveDetail, GraveProfile};
pub use finder::{FinderCard, GraveFinder};
pub use forms::{NoticeForm, PrintForm, RecordForm};
pub use grave_grid::{CellClick, GraveCell, GraveGrid};
pub use notices::{NoticeBoard, NoticeDetail};
pub use print_dashboard::{ImportReport, PrintDashboard};

pub const LOGIN_ROUTE: &str = "/login";
pub const NOTICES_ROUTE: &str = "/notices";

/// What the front end should do after a view action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing further to show
    Done,
    /// Navigate to a route
    Redirect(String),
    /// Blocking error alert
    Alert(String),
    /// Non-blocking status message
    Message(String),
    /// The operator declined a confirmation prompt
    Cancelled,
}

impl Outcome {
    pub fn login() -> Self {
        Outcome::Redirect(LOGIN_ROUTE.to_string())
    }

    pub fn alert(message: impl Into<String>) -> Self {
        Outcome::Alert(message.into())
    }

    pub fn is_redirect_to(&self, route: &str) -> bool {
        matches!(self, Outcome::Redirect(r) if r == route)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed,
}

/// Clears the session and redirects when the error means the token is gone
/// or rejected.
pub(crate) fn auth_redirect(session: &Session, err: &CoreError) -> Option<Outcome> {
    match err {
        CoreError::Unauthorized | CoreError::MissingToken => {
            warn!(error = %err, "Session rejected, redirecting to login");
            session.logout();
            Some(Outcome::login())
        }
        _ => None,
    }
}
