//! Greeting counter handler.

use super::AppState;
use crate::error::ApiError;
use axum::extract::{Query, State};
use serde::Deserialize;

/// Query parameters for `POST /v1/hello`.
#[derive(Debug, Deserialize)]
pub struct HelloParams {
    pub name: String,
}

/// Handler for `POST /v1/hello?name=...`.
///
/// First visit for a name gets `"Hello, {name}!\n"`; every later visit gets
/// `"Hi again, {name}!\n"`. The count is persisted before responding.
pub async fn greet(
    State(state): State<AppState>,
    Query(params): Query<HelloParams>,
) -> Result<String, ApiError> {
    let count = state.db.greetings().record_visit(&params.name).await?;
    crate::metrics::record_greeting();

    tracing::debug!(name = %params.name, count, "greeting recorded");

    let body = if count == 1 {
        format!("Hello, {}!\n", params.name)
    } else {
        format!("Hi again, {}!\n", params.name)
    };
    Ok(body)
}
