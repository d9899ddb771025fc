//! Handlers for completions, streaks and statistics.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/:id/status` | `?date`; only tasks acted on appear |
//! | `PUT`  | `/users/:id/tasks/:task` | `?date`; body `{"completed":true}` |
//! | `POST` | `/users/:id/tasks/:task/toggle` | `?date` |
//! | `GET`  | `/users/:id/streak` | `{"current":n,"best":n}` |
//! | `GET`  | `/users/:id/today` | `?date`; [`DaySummary`] |
//! | `GET`  | `/users/:id/weekly` | `?date`; trailing seven days |
//! | `GET`  | `/board` | `?date`; every user, registration order |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use cram_core::{
  completion::DayStatus,
  store::TrackerStore,
  summary::{CompletionOutcome, DaySummary, Streak, WeeklySummary},
  user::UserId,
};
use serde::Deserialize;

use crate::{ApiState, DateParam, error::ApiError};

// ─── Status ───────────────────────────────────────────────────────────────────

/// `GET /users/:id/status[?date=YYYY-MM-DD]`
pub async fn status<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<UserId>,
  Query(params): Query<DateParam>,
) -> Result<Json<DayStatus>, ApiError>
where
  S: TrackerStore,
{
  let date = params.resolve(&state.clock);
  let status = state.tracker.get_status(id, date).await.map_err(ApiError::store)?;
  Ok(Json(status))
}

// ─── Set / toggle ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SetBody {
  pub completed: bool,
}

fn validate_task(task: &str) -> Result<(), ApiError> {
  if task.trim().is_empty() {
    return Err(ApiError::BadRequest("task id must not be empty".into()));
  }
  Ok(())
}

/// `PUT /users/:id/tasks/:task[?date=YYYY-MM-DD]` — body: `{"completed":true}`
pub async fn set<S>(
  State(state): State<ApiState<S>>,
  Path((id, task)): Path<(UserId, String)>,
  Query(params): Query<DateParam>,
  Json(body): Json<SetBody>,
) -> Result<Json<CompletionOutcome>, ApiError>
where
  S: TrackerStore,
{
  validate_task(&task)?;
  let date = params.resolve(&state.clock);
  let outcome = state
    .tracker
    .set_completion(id, date, &task, body.completed, state.clock.now_utc())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(outcome))
}

/// `POST /users/:id/tasks/:task/toggle[?date=YYYY-MM-DD]`
pub async fn toggle<S>(
  State(state): State<ApiState<S>>,
  Path((id, task)): Path<(UserId, String)>,
  Query(params): Query<DateParam>,
) -> Result<Json<CompletionOutcome>, ApiError>
where
  S: TrackerStore,
{
  validate_task(&task)?;
  let date = params.resolve(&state.clock);
  let outcome = state
    .tracker
    .toggle_task(id, date, &task, state.clock.now_utc())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(outcome))
}

// ─── Statistics ───────────────────────────────────────────────────────────────

/// `GET /users/:id/streak`
pub async fn streak<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<UserId>,
) -> Result<Json<Streak>, ApiError>
where
  S: TrackerStore,
{
  let streak = state.tracker.get_streak(id).await.map_err(ApiError::store)?;
  Ok(Json(streak))
}

/// `GET /users/:id/today[?date=YYYY-MM-DD]`
pub async fn today<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<UserId>,
  Query(params): Query<DateParam>,
) -> Result<Json<DaySummary>, ApiError>
where
  S: TrackerStore,
{
  let date = params.resolve(&state.clock);
  let summary = state.tracker.today_summary(id, date).await.map_err(ApiError::store)?;
  Ok(Json(summary))
}

/// `GET /users/:id/weekly[?date=YYYY-MM-DD]`
pub async fn weekly<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<UserId>,
  Query(params): Query<DateParam>,
) -> Result<Json<WeeklySummary>, ApiError>
where
  S: TrackerStore,
{
  let date = params.resolve(&state.clock);
  let summary = state
    .tracker
    .weekly_summary_by_task(id, date)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(summary))
}

/// `GET /board[?date=YYYY-MM-DD]`
pub async fn board<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<DateParam>,
) -> Result<Json<Vec<DaySummary>>, ApiError>
where
  S: TrackerStore,
{
  let date = params.resolve(&state.clock);
  let board = state.tracker.progress_board(date).await.map_err(ApiError::store)?;
  Ok(Json(board))
}
