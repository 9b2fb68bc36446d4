//! cemboard-web - Public cemetery site served by Axum
//!
//! Pages are rendered on the server. Each request runs its own view loader
//! against the API; nothing is cached between requests.

pub mod html;
pub mod pages;
pub mod router;

pub use router::create_router;

use anyhow::Result;
use cemboard_core::config::SiteConfig;
use cemboard_core::ApiClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Shared handler state
#[derive(Clone, Debug)]
pub struct AppState {
    pub client: ApiClient,
    pub site: Arc<SiteConfig>,
}

impl AppState {
    pub fn new(client: ApiClient, site: SiteConfig) -> Self {
        Self {
            client,
            site: Arc::new(site),
        }
    }
}

/// Run the web server
pub async fn run(state: AppState, port: u16) -> Result<()> {
    let router = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;

    info!("Web server listening on http://{}", addr);
    println!("Web server listening on http://{}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
