//! HTTP Server for the chainexport API.
//!
//! Provides read-only endpoints that fetch an address's records and return
//! them as a JSON preview or a CSV download.
//!
//! # API Endpoints
//!
//! | Method | Path                                | Description                   |
//! |--------|-------------------------------------|-------------------------------|
//! | GET    | `/health`                           | Health check                  |
//! | GET    | `/api/transactions/{address}`       | Transactions as JSON rows     |
//! | GET    | `/api/transactions/{address}/csv`   | Transactions CSV download     |
//! | GET    | `/api/attestations/{address}`       | Attestations as JSON rows     |
//! | GET    | `/api/attestations/{address}/csv`   | Attestations CSV download     |
//! | GET    | `/api/prices`                       | USD price ticker              |
//! | GET    | `/api/logs`                         | SSE stream for real-time logs |
//!
//! Query parameters: `limit`, `quote`, `sort` (see [`ExportQuery`]).

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{error_response, ExportQuery, PricesResponse, ProjectionResponse};
use crate::config::Config;
use crate::error::{PipelineError, ServerError, ServerResult, SourceError};
use crate::export::content_disposition;
use crate::models::RecordShape;
use crate::source::{Sources, DEFAULT_TICKER};
use crate::transform::pipeline::{export_attestations, export_transactions, ExportOptions, ExportResult};

/// Shared server state, built once at startup
#[derive(Debug, Clone)]
pub struct AppState {
    pub sources: Sources,
    /// Defaults the query parameters override
    pub defaults: ExportOptions,
}

impl AppState {
    pub fn new(sources: Sources, defaults: ExportOptions) -> Self {
        Self { sources, defaults }
    }

    pub fn from_config(config: &Config) -> ServerResult<Self> {
        let sources = Sources::from_config(config).map_err(PipelineError::from)?;
        Ok(Self::new(sources, ExportOptions::from_config(config)))
    }
}

/// Build the router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/transactions/{address}", get(transactions_json))
        .route("/api/transactions/{address}/csv", get(transactions_csv))
        .route("/api/attestations/{address}", get(attestations_json))
        .route("/api/attestations/{address}/csv", get(attestations_csv))
        .route("/api/prices", get(prices))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> ServerResult<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    log::info!("chainexport server running on http://localhost:{}", config.port);
    log::info!("  GET /api/transactions/{{address}}[/csv]");
    log::info!("  GET /api/attestations/{{address}}[/csv]");
    log::info!("  GET /api/prices - Price ticker");
    log::info!("  GET /api/logs   - SSE log stream");
    log::info!("  GET /health     - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "chainexport",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "transactions": "GET /api/transactions/{address}[/csv]",
            "attestations": "GET /api/attestations/{address}[/csv]",
            "prices": "GET /api/prices",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers drop the missed entries
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn transactions_json(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Query(query): Query<ExportQuery>,
) -> ServerResult<Json<ProjectionResponse>> {
    let export = run_export(&state, RecordShape::Transactions, &address, &query).await?;
    Ok(Json(export.into()))
}

async fn transactions_csv(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Query(query): Query<ExportQuery>,
) -> ServerResult<Response> {
    let export = run_export(&state, RecordShape::Transactions, &address, &query).await?;
    csv_response(export)
}

async fn attestations_json(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Query(query): Query<ExportQuery>,
) -> ServerResult<Json<ProjectionResponse>> {
    let export = run_export(&state, RecordShape::Attestations, &address, &query).await?;
    Ok(Json(export.into()))
}

async fn attestations_csv(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Query(query): Query<ExportQuery>,
) -> ServerResult<Response> {
    let export = run_export(&state, RecordShape::Attestations, &address, &query).await?;
    csv_response(export)
}

/// Current prices of the ticker assets
async fn prices(State(state): State<Arc<AppState>>) -> ServerResult<Json<PricesResponse>> {
    let quotes = state
        .sources
        .prices
        .fetch_prices(DEFAULT_TICKER)
        .await
        .map_err(PipelineError::from)?;
    Ok(Json(PricesResponse::new(quotes)))
}

async fn run_export(
    state: &AppState,
    shape: RecordShape,
    address: &str,
    query: &ExportQuery,
) -> ServerResult<ExportResult> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ServerError::BadRequest("Address is required".to_string()));
    }

    let options = query.options(&state.defaults);
    let export = match shape {
        RecordShape::Transactions => {
            let sort = query.sort_order().map_err(ServerError::BadRequest)?;
            export_transactions(&state.sources.explorer, address, sort, &options).await?
        }
        RecordShape::Attestations => {
            export_attestations(&state.sources.attestations, address, &options).await?
        }
    };
    Ok(export)
}

fn csv_response(export: ExportResult) -> ServerResult<Response> {
    let disposition = HeaderValue::from_str(&content_disposition(&export.filename))
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.csv,
    )
        .into_response())
}

/// HTTP status for a failed export
pub fn status_for(error: &PipelineError) -> StatusCode {
    match error {
        PipelineError::NoRecords { .. } => StatusCode::NOT_FOUND,
        // Our own configuration, not the upstream service
        PipelineError::Source(SourceError::MissingApiKey(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        PipelineError::Source(_) => StatusCode::BAD_GATEWAY,
        PipelineError::Transform(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Pipeline(e) => status_for(e),
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Io(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Pipeline errors already carry a user-facing message
        let message = match &self {
            ServerError::Pipeline(e) => e.to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            log_error(format!("Request failed: {}", message));
        }

        (status, Json(error_response(&message))).into_response()
    }
}
