//! REST surface over the indexed event store.
//!
//! Three read-only routes: a health/stats probe, the full event log, and the
//! per-cause event log. Everything the API serves comes from SQLite; it never
//! talks to the RPC itself.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db;
use crate::errors::IndexerError;
use crate::events::EventRecord;

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

/// Assemble the application router with CORS and request tracing attached.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(all_events))
        .route("/causes/:id/events", get(cause_events))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    events_indexed: i64,
    last_ledger: i64,
}

#[derive(Serialize)]
struct CauseEventsResponse {
    cause_id: String,
    count: usize,
    events: Vec<EventRecord>,
}

#[derive(Serialize)]
struct AllEventsResponse {
    count: usize,
    events: Vec<EventRecord>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn internal_error(err: IndexerError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
///
/// Liveness plus a snapshot of indexing progress.
async fn health(State(state): State<Arc<ApiState>>) -> Response {
    let events_indexed = match db::count_events(&state.pool).await {
        Ok(n) => n,
        Err(e) => return internal_error(e),
    };
    let (last_ledger, _) = match db::load_cursor(&state.pool).await {
        Ok(cursor) => cursor,
        Err(e) => return internal_error(e),
    };

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        events_indexed,
        last_ledger,
    })
    .into_response()
}

/// `GET /events`
///
/// The full indexed log, oldest first.
async fn all_events(State(state): State<Arc<ApiState>>) -> Response {
    match db::get_all_events(&state.pool).await {
        Ok(events) => Json(AllEventsResponse {
            count: events.len(),
            events,
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

/// `GET /causes/:id/events`
///
/// The indexed log for one cause, oldest first. An id with no events yields
/// an empty list, not a 404; the indexer cannot distinguish a cause that
/// never emitted from one that does not exist.
async fn cause_events(
    State(state): State<Arc<ApiState>>,
    Path(cause_id): Path<String>,
) -> Response {
    match db::get_events_for_cause(&state.pool, &cause_id).await {
        Ok(events) => Json(CauseEventsResponse {
            cause_id,
            count: events.len(),
            events,
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}
