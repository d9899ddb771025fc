//! Handler for `GET /catalog` — the day's task list with resolved labels.

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use cram_core::{catalog::Phase, store::TrackerStore};
use serde::Serialize;

use crate::{ApiState, DateParam, error::ApiError};

#[derive(Debug, Serialize)]
pub struct CatalogEntry {
  pub id:    String,
  pub label: String,
  pub phase: Phase,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
  pub date:          NaiveDate,
  pub rest_day:      bool,
  pub mock_test_day: bool,
  pub tasks:         Vec<CatalogEntry>,
}

/// `GET /catalog[?date=YYYY-MM-DD]`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<DateParam>,
) -> Result<Json<CatalogResponse>, ApiError>
where
  S: TrackerStore,
{
  let date = params.resolve(&state.clock);
  let catalog = state.tracker.catalog();

  let tasks = catalog
    .tasks()
    .iter()
    .map(|t| CatalogEntry {
      id:    t.id.clone(),
      label: catalog.label_for(&t.id, date),
      phase: t.phase,
    })
    .collect();

  Ok(Json(CatalogResponse {
    date,
    rest_day: catalog.is_rest_day(date),
    mock_test_day: catalog.is_mock_test_day(date),
    tasks,
  }))
}
