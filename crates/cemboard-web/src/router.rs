//! Web router using Axum

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use cemboard_core::views::{
    CellClick, GraveDetail, GraveFinder, GraveGrid, NoticeBoard, NoticeDetail,
};
use cemboard_core::{CemeteryStats, LoadState, Outcome};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::pages;
use crate::AppState;

/// Create the web router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/graves", get(graves_handler))
        .route("/grave/{id}", get(grave_handler))
        .route("/find", get(find_handler))
        .route("/notices", get(notices_handler))
        .route("/notice/{id}", get(notice_handler))
        .route("/stats", get(stats_handler))
        .route("/contact", get(contact_handler))
        .route("/location", get(location_handler))
        .route("/login", get(login_handler))
        .route("/api/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GridParams {
    block: Option<String>,
    show: Option<usize>,
    grave: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FindParams {
    q: Option<String>,
    show: Option<usize>,
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let mut board = NoticeBoard::new(state.client.clone());
    board.load().await;
    Html(pages::home(&state.site, &board))
}

async fn graves_handler(
    State(state): State<AppState>,
    Query(params): Query<GridParams>,
) -> Response {
    let mut grid = GraveGrid::new(state.client.clone());
    grid.load().await;

    if let Some(block) = params.block.as_deref() {
        grid.select_block(block);
    }
    if let Some(show) = params.show {
        grid.reveal_at_least(show);
    }
    if let Some(grave) = params.grave.as_deref() {
        if let Some(CellClick::Navigate(route)) = grid.click(grave) {
            return Redirect::to(&route).into_response();
        }
    }

    Html(pages::graves(&state.site, &grid)).into_response()
}

async fn grave_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut detail = GraveDetail::new(state.client.clone());
    detail.load(&id).await;

    let status = match (detail.state(), detail.record()) {
        (LoadState::Ready, Some(_)) => StatusCode::OK,
        (LoadState::Ready, None) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, Html(pages::grave_detail(&state.site, &detail))).into_response()
}

async fn find_handler(
    State(state): State<AppState>,
    Query(params): Query<FindParams>,
) -> Html<String> {
    let mut finder = GraveFinder::new(state.client.clone());
    finder.load().await;

    if let Some(q) = params.q.as_deref() {
        finder.set_query(q);
        finder.submit();
    }
    if let Some(show) = params.show {
        finder.reveal_at_least(show);
    }
    Html(pages::finder(&state.site, &finder))
}

async fn notices_handler(State(state): State<AppState>) -> Html<String> {
    let mut board = NoticeBoard::new(state.client.clone());
    board.load().await;
    Html(pages::notices(&state.site, &board))
}

async fn notice_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut detail = NoticeDetail::new(state.client.clone());
    if let Outcome::Redirect(route) = detail.load(&id).await {
        return Redirect::to(&route).into_response();
    }

    let status = if detail.notice().is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (status, Html(pages::notice_detail(&state.site, &detail))).into_response()
}

async fn stats_handler(State(state): State<AppState>) -> Html<String> {
    let stats = match state.client.list_cemetery().await {
        Ok(records) => Some(CemeteryStats::compute(&records)),
        Err(e) => {
            warn!(error = %e, "Failed to load records for statistics");
            None
        }
    };
    Html(pages::stats(&state.site, stats.as_ref()))
}

async fn contact_handler(State(state): State<AppState>) -> Html<String> {
    Html(pages::contact(&state.site))
}

async fn location_handler(State(state): State<AppState>) -> Html<String> {
    Html(pages::location(&state.site))
}

async fn login_handler(State(state): State<AppState>) -> Html<String> {
    Html(pages::login(&state.site))
}

async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let api = state.client.list_graves().await;
    if let Err(e) = &api {
        warn!(error = %e, "Health check could not reach the API");
    }
    Json(serde_json::json!({
        "status": if api.is_ok() { "healthy" } else { "degraded" },
        "api_reachable": api.is_ok(),
        "graves": api.map(|g| g.len()).unwrap_or(0),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
