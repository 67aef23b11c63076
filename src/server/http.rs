//! HTTP extract endpoint
//!
//! - `GET /timespan/{room}/{from}/{to}/extract.txt` - one room (`#` is implied)
//! - `GET /timespan-all/{from}/{to}/extract.txt` - every room
//!
//! `from` and `to` are Unix epoch milliseconds, both exclusive.

use crate::error::{ExtractError, Result};
use crate::query::{QueryEngine, RoomFilter};

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub engine: QueryEngine,
}

impl HttpState {
    pub fn new(engine: QueryEngine) -> Self {
        Self { engine }
    }
}

/// Create the HTTP router
pub fn create_router(state: HttpState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/timespan/{room}/{from}/{to}/extract.txt", get(room_extract))
        .route("/timespan-all/{from}/{to}/extract.txt", get(all_rooms_extract))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let millis = raw
        .parse::<i64>()
        .map_err(|e| ExtractError::invalid_timestamp(raw, e))?;
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| ExtractError::invalid_timestamp(raw, "out of range"))
}

fn extract(state: &HttpState, filter: RoomFilter, from: &str, to: &str) -> Result<String> {
    let start = parse_timestamp(from)?;
    let stop = parse_timestamp(to)?;
    debug!(room = %filter, %start, %stop, "Serving extract");
    Ok(state.engine.between(start, stop, &filter))
}

async fn room_extract(
    Path((room, from, to)): Path<(String, String, String)>,
    State(state): State<HttpState>,
) -> Result<String> {
    extract(&state, RoomFilter::Room(format!("#{}", room)), &from, &to)
}

async fn all_rooms_extract(
    Path((from, to)): Path<(String, String)>,
    State(state): State<HttpState>,
) -> Result<String> {
    extract(&state, RoomFilter::All, &from, &to)
}

/// Run the HTTP server
pub async fn run_http_server(
    bind_addr: SocketAddr,
    state: HttpState,
    request_timeout: Duration,
) -> anyhow::Result<()> {
    let app = create_router(state, request_timeout);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = %bind_addr, "HTTP server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
