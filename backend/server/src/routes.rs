use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::{error::AppError, page, state::AppState};

#[derive(Serialize)]
pub struct Ack {
    ok: bool,
}

pub async fn health_handler() -> &'static str {
    "OK"
}

pub async fn page_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Response {
    if !state.tokens.contains(&token) {
        warn!("Share page requested with unknown token");
        return (StatusCode::NOT_FOUND, "Link inválido.").into_response();
    }

    Html(page::render(&token, &state.config.fix)).into_response()
}

pub async fn location_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Ack>, AppError> {
    let raw = parse_body(&body).inspect_err(log_failure)?;

    state
        .gateway
        .handle_submission(&raw)
        .await
        .inspect_err(log_failure)?;

    Ok(Json(Ack { ok: true }))
}

/// An empty body reads as `{}`, so it fails on the token like a body with no
/// token field.
fn parse_body(body: &[u8]) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_slice(body).map_err(|e| AppError::MalformedPayload(e.to_string()))
}

fn log_failure(err: &AppError) {
    match err {
        AppError::Delivery(e) => error!(error = %e, "email_failed"),
        other => warn!(error = %other, code = other.code(), "Submission rejected"),
    }
}
