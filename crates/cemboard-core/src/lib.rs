//! cemboard-core - Core library for cemboard
//!
//! Provides the API client, models, session store, view controllers, ledger
//! arithmetic, statistics and document generation for the cemetery records
//! application.

pub mod api;
pub mod calendar;
pub mod config;
pub mod error;
pub mod graves;
pub mod invoice;
pub mod ledger;
pub mod listing;
pub mod models;
pub mod session;
pub mod spreadsheet;
pub mod stats;
pub mod views;

pub use api::{ApiClient, ImageFile, ScriptedTransport, Transport};
pub use config::AppConfig;
pub use error::{CoreError, Result};
pub use ledger::{LedgerSummary, Totals};
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
pub use stats::CemeteryStats;
pub use views::{LoadState, Outcome};
