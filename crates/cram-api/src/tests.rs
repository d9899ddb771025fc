//! Router tests against an in-memory SQLite store.

use std::sync::{
  Arc,
  atomic::{AtomicUsize, Ordering},
};

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::{DateTime, NaiveDate, Utc};
use cram_core::{
  Tracker,
  catalog::TaskCatalog,
  clock::LocalClock,
  completion::{CompletionRecord, DayStatus, WeeklyCounts},
  store::TrackerStore,
  streak::{StreakState, StreakTransition},
  user::{User, UserId},
};
use cram_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{ApiState, api_router};

const MONDAY: &str = "2024-03-04";
const TASKS: [&str; 7] = [
  "reading",
  "listening",
  "writing",
  "speaking",
  "error_review",
  "vocabulary",
  "articles",
];

async fn make_state() -> ApiState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  ApiState {
    tracker: Arc::new(Tracker::new(store, Arc::new(TaskCatalog::default()))),
    clock:   LocalClock::parse("+05:00").unwrap(),
  }
}

async fn send<S: TrackerStore + 'static>(
  state: ApiState<S>,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = api_router(state).oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, json)
}

// ── Users ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_then_list_in_order() {
  let state = make_state().await;
  let (status, user) =
    send(state.clone(), "PUT", "/users/20", Some(json!({ "name": "Sultan" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(user["name"], "Sultan");

  send(state.clone(), "PUT", "/users/10", Some(json!({}))).await;

  let (status, users) = send(state, "GET", "/users", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(users[0]["user_id"], 20);
  assert_eq!(users[1]["user_id"], 10);
  assert_eq!(users[1]["name"], "User 10");
}

#[tokio::test]
async fn unknown_user_name_is_placeholder() {
  let state = make_state().await;
  let (status, body) = send(state, "GET", "/users/77/name", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "user_id": 77, "name": "User 77" }));
}

// ── Completions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn set_then_status() {
  let state = make_state().await;
  let uri = format!("/users/1/tasks/reading?date={MONDAY}");
  let (status, outcome) =
    send(state.clone(), "PUT", &uri, Some(json!({ "completed": true }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(outcome["record"]["completed"], true);
  assert_eq!(outcome["transition"], Value::Null);

  let (_, day) = send(state, "GET", &format!("/users/1/status?date={MONDAY}"), None).await;
  assert_eq!(day, json!({ "reading": true }));
}

#[tokio::test]
async fn toggle_twice_unmarks() {
  let state = make_state().await;
  let uri = format!("/users/1/tasks/speaking/toggle?date={MONDAY}");
  let (_, first) = send(state.clone(), "POST", &uri, None).await;
  let (_, second) = send(state, "POST", &uri, None).await;
  assert_eq!(first["record"]["completed"], true);
  assert_eq!(second["record"]["completed"], false);
  assert_eq!(second["record"]["completed_at"], Value::Null);
}

#[tokio::test]
async fn completing_every_task_starts_streak() {
  let state = make_state().await;
  send(state.clone(), "PUT", "/users/1", Some(json!({ "name": "Dana" }))).await;

  let mut last = Value::Null;
  for task in TASKS {
    let uri = format!("/users/1/tasks/{task}?date={MONDAY}");
    last = send(state.clone(), "PUT", &uri, Some(json!({ "completed": true }))).await.1;
  }
  assert_eq!(last["transition"], "started");
  assert_eq!(last["streak"], json!({ "current": 1, "best": 1 }));

  let (_, streak) = send(state.clone(), "GET", "/users/1/streak", None).await;
  assert_eq!(streak, json!({ "current": 1, "best": 1 }));

  let (_, today) = send(state.clone(), "GET", &format!("/users/1/today?date={MONDAY}"), None).await;
  assert_eq!(today["completed"], 7);
  assert_eq!(today["total_expected"], 7);
  assert_eq!(today["name"], "Dana");

  let (_, weekly) = send(state.clone(), "GET", &format!("/users/1/weekly?date={MONDAY}"), None).await;
  assert_eq!(weekly["from"], "2024-02-27");
  assert_eq!(weekly["counts"]["reading"], 1);

  let (_, board) = send(state, "GET", &format!("/board?date={MONDAY}"), None).await;
  assert_eq!(board.as_array().unwrap().len(), 1);
  assert_eq!(board[0]["current_streak"], 1);
}

#[tokio::test]
async fn bad_date_is_rejected() {
  let state = make_state().await;
  let (status, _) = send(state, "GET", "/users/1/status?date=04.03.2024", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Catalog ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn catalog_resolves_weekday_labels() {
  let state = make_state().await;
  let (_, monday) = send(state.clone(), "GET", &format!("/catalog?date={MONDAY}"), None).await;
  assert_eq!(monday["tasks"][2]["label"], "Writing (Task 2)");
  assert_eq!(monday["rest_day"], false);

  let (_, sunday) = send(state, "GET", "/catalog?date=2024-03-10", None).await;
  assert_eq!(sunday["tasks"][2]["label"], "Writing (rest)");
  assert_eq!(sunday["rest_day"], true);
  assert_eq!(sunday["tasks"].as_array().unwrap().len(), 7);
}

// ── Storage failures ──────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("disk unavailable")]
struct Unavailable;

/// Rejects every completion write and counts streak recomputes.
#[derive(Default)]
struct ReadOnlyStore {
  recomputes: Arc<AtomicUsize>,
}

impl TrackerStore for ReadOnlyStore {
  type Error = Unavailable;

  async fn upsert_user(&self, user_id: UserId, name: String, now: DateTime<Utc>) -> Result<User, Unavailable> {
    Ok(User { user_id, name, created_at: now })
  }

  async fn get_user(&self, _: UserId) -> Result<Option<User>, Unavailable> { Ok(None) }

  async fn list_users(&self) -> Result<Vec<User>, Unavailable> { Ok(Vec::new()) }

  async fn set_completion(&self, _: CompletionRecord) -> Result<CompletionRecord, Unavailable> {
    Err(Unavailable)
  }

  async fn get_status(&self, _: UserId, _: NaiveDate) -> Result<DayStatus, Unavailable> {
    Ok(DayStatus::new())
  }

  async fn count_completed(&self, _: UserId, _: NaiveDate) -> Result<usize, Unavailable> { Ok(0) }

  async fn weekly_counts(&self, _: UserId, _: NaiveDate) -> Result<WeeklyCounts, Unavailable> {
    Ok(WeeklyCounts::new())
  }

  async fn prune_completions(&self, _: NaiveDate) -> Result<usize, Unavailable> { Ok(0) }

  async fn get_streak(&self, _: UserId) -> Result<Option<StreakState>, Unavailable> { Ok(None) }

  async fn recompute_streak(
    &self,
    user_id: UserId,
    _: NaiveDate,
    _: usize,
  ) -> Result<(Option<StreakTransition>, StreakState), Unavailable> {
    self.recomputes.fetch_add(1, Ordering::SeqCst);
    Ok((None, StreakState::new(user_id)))
  }
}

#[tokio::test]
async fn failed_write_is_internal_error_without_recompute() {
  let store = ReadOnlyStore::default();
  let recomputes = store.recomputes.clone();
  let state = ApiState {
    tracker: Arc::new(Tracker::new(store, Arc::new(TaskCatalog::default()))),
    clock:   LocalClock::default(),
  };

  let uri = format!("/users/1/tasks/reading?date={MONDAY}");
  let (status, body) = send(state.clone(), "PUT", &uri, Some(json!({ "completed": true }))).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body, json!({ "error": "internal error" }));

  let (status, _) = send(state, "POST", &format!("{uri}/toggle"), None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(recomputes.load(Ordering::SeqCst), 0);
}
