//! HTTP API
//!
//! - `POST /convert`: question → SQL and rows
//! - `GET /examples`: curated questions
//! - `GET /history`, `DELETE /history`: recent successful conversions
//! - `GET /health`, `GET /metrics`

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use nlsql_ir::Row;
use nlsql_registry::{examples, ExampleQuery};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info_span, Level};
use uuid::Uuid;

use crate::history::{HistoryEntry, QueryHistory};
use crate::log_event;
use crate::metrics::Metrics;
use crate::pipeline::{ConvertError, Converter};

#[derive(Debug, Clone)]
pub struct AppState {
    pub converter: Converter,
    pub history: Arc<Mutex<QueryHistory>>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(converter: Converter, history: QueryHistory, metrics: Metrics) -> Self {
        Self {
            converter,
            history: Arc::new(Mutex::new(history)),
            metrics: Arc::new(metrics),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub sql: String,
    pub rule: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub row_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: impl Into<String>, kind: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            kind: kind.to_string(),
        }),
    )
}

fn status_for(err: &ConvertError) -> StatusCode {
    match err {
        ConvertError::TableNotFound(_) => StatusCode::NOT_FOUND,
        ConvertError::NoMatch(_) | ConvertError::Parse(_) | ConvertError::UnsafeStatement { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/convert", post(convert))
        .route("/examples", get(list_examples))
        .route("/history", get(get_history).delete(clear_history))
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        .with_state(state)
}

pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("nlsql server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub async fn convert(
    State(state): State<AppState>,
    Json(req): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let question = req.query.trim();
    if question.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Please enter a natural language query.",
            "empty_query",
        ));
    }

    let request_id = Uuid::new_v4();
    let span = info_span!("convert", %request_id);
    let timer = state.metrics.timer();
    let outcome = span.in_scope(|| state.converter.convert(question));

    match outcome {
        Ok(conversion) => {
            timer.finish("success");
            span.in_scope(|| {
                log_event!(
                    level: Level::INFO,
                    event: "conversion",
                    rule: conversion.rule,
                    rows: conversion.rows().len()
                );
            });

            state
                .history
                .lock()
                .await
                .record(question, conversion.sql());

            let columns = conversion.result.columns();
            let row_count = conversion.result.row_count();
            Ok(Json(ConvertResponse {
                sql: conversion.result.sql,
                rule: conversion.rule,
                columns,
                rows: conversion.result.rows,
                row_count,
            }))
        }
        Err(err) => {
            timer.finish(err.kind());
            span.in_scope(|| {
                log_event!(
                    level: Level::WARN,
                    event: "conversion_failed",
                    kind: err.kind(),
                    error: err.to_string()
                );
            });
            Err(error_response(status_for(&err), err.to_string(), err.kind()))
        }
    }
}

pub async fn list_examples() -> Json<&'static [ExampleQuery]> {
    Json(examples())
}

pub async fn get_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    let history = state.history.lock().await;
    Json(history.entries().cloned().collect())
}

pub async fn clear_history(State(state): State<AppState>) -> StatusCode {
    state.history.lock().await.clear();
    StatusCode::NO_CONTENT
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn render_metrics(State(state): State<AppState>) -> Result<String, (StatusCode, String)> {
    state
        .metrics
        .render()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}
