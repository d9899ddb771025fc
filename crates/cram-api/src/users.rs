//! Handlers for the user registry.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users` | Registration order |
//! | `PUT`  | `/users/:id` | Body: `{"name":"..."}`; name optional |
//! | `GET`  | `/users/:id/name` | Placeholder name for unknown ids |

use axum::{
  Json,
  extract::{Path, State},
};
use cram_core::{
  store::TrackerStore,
  user::{User, UserId},
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<User>>, ApiError>
where
  S: TrackerStore,
{
  let users = state.tracker.list_users().await.map_err(ApiError::store)?;
  Ok(Json(users))
}

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RegisterBody {
  pub name: Option<String>,
}

/// `PUT /users/:id` — body: `{"name":"Aigerim"}`
pub async fn register<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<UserId>,
  Json(body): Json<RegisterBody>,
) -> Result<Json<User>, ApiError>
where
  S: TrackerStore,
{
  let user = state
    .tracker
    .register_user(id, body.name.as_deref(), state.clock.now_utc())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(user))
}

// ─── Name ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct NameResponse {
  pub user_id: UserId,
  pub name:    String,
}

/// `GET /users/:id/name`
pub async fn name<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<UserId>,
) -> Result<Json<NameResponse>, ApiError>
where
  S: TrackerStore,
{
  let name = state.tracker.display_name(id).await.map_err(ApiError::store)?;
  Ok(Json(NameResponse { user_id: id, name }))
}
