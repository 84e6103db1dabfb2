//! HTTP front end built on axum.
//!
//! One route, `POST /check`, taking `{"code": "..."}` and answering with
//! the ranked report. Scoring is CPU-bound and runs on the blocking pool.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::core::{
    compare::{Comparator, ScoreError},
    report::{CheckRequest, CheckResponse, ErrorBody, RequestError},
};

/// Comparator shared by every request.
pub type SharedComparator = Arc<Comparator>;

/// Build the router with its single `/check` route.
pub fn router(comparator: SharedComparator) -> Router {
    Router::new()
        .route("/check", post(check_handler))
        .with_state(comparator)
}

/// Bind `addr` and serve until ctrl-c.
pub async fn run(addr: &str, comparator: SharedComparator) -> Result<()> {
    let documents = comparator.corpus_len();
    let app = router(comparator);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, documents, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

// The body is taken raw so that malformed JSON gets the same 400 as a
// missing `code` field instead of axum's default rejection.
#[instrument(skip_all, fields(bytes = body.len()))]
async fn check_handler(State(comparator): State<SharedComparator>, body: Bytes) -> Response {
    let code = match parse_request(&body) {
        Ok(code) => code,
        Err(err) => {
            debug!(%err, "rejected request");
            return error_response(StatusCode::BAD_REQUEST, err.to_string());
        }
    };

    let scored = tokio::task::spawn_blocking(move || comparator.score(&code)).await;

    match scored {
        Ok(Ok(report)) => (StatusCode::OK, Json(CheckResponse::from(&report))).into_response(),
        Ok(Err(err @ ScoreError::EmptyCorpus)) => {
            error!(%err, "cannot score without a corpus");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        Ok(Err(err)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        Err(join) => {
            error!(%join, "scoring task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "scoring task failed")
        }
    }
}

fn parse_request(body: &[u8]) -> Result<String, RequestError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| RequestError::NoCode)?;
    if !value.is_object() {
        return Err(RequestError::NoCode);
    }
    serde_json::from_value::<CheckRequest>(value)
        .map_err(|_| RequestError::NoCode)?
        .into_code()
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}
