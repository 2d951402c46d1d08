//! User registry handlers.

use super::AppState;
use crate::db::{NewUser, User};
use crate::error::ApiError;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Query parameters for `POST /v1/user`.
#[derive(Debug, Deserialize)]
pub struct RegisterParams {
    pub email: String,
    pub password: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Public view of a user. The password hash never leaves the storage layer.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }
}

/// Response envelope for user endpoints.
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: UserInfo,
}

/// Handler for `POST /v1/user` - register a new user.
///
/// Duplicate emails are rejected with `409 Conflict`.
pub async fn create(
    State(state): State<AppState>,
    Query(params): Query<RegisterParams>,
) -> Result<(StatusCode, Json<UserEnvelope>), ApiError> {
    let user = state
        .db
        .users()
        .create(&NewUser {
            email: &params.email,
            password: &params.password,
            username: &params.username,
            first_name: &params.first_name,
            last_name: &params.last_name,
        })
        .await?;

    state.events.notify_created(user.id);
    crate::metrics::record_user_registered();
    tracing::info!(user_id = user.id, email = %user.email, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope { user: user.into() }),
    ))
}

/// Handler for `GET /v1/user/:id` - look up a user.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let user = state.db.users().get(id).await?;
    Ok(Json(UserEnvelope { user: user.into() }))
}

/// Handler for `DELETE /v1/user/:id` - remove a user.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.users().delete(id).await?;

    state.events.notify_removed(id);
    crate::metrics::record_user_removed();
    tracing::info!(user_id = id, "user removed");

    Ok(StatusCode::NO_CONTENT)
}
