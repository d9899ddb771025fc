//! JSON API for Cram.
//!
//! Exposes an axum [`Router`] backed by a [`Tracker`] over any
//! [`TrackerStore`]. This is the boundary where "today" is read from the
//! wall clock; everything underneath takes dates explicitly.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cram_api::api_router(state))
//! ```

pub mod catalog;
pub mod error;
pub mod progress;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use chrono::NaiveDate;
use cram_core::{Tracker, clock::LocalClock, store::TrackerStore};
use serde::Deserialize;

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub tracker: Arc<Tracker<S>>,
  pub clock:   LocalClock,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self { Self { tracker: Arc::clone(&self.tracker), clock: self.clock } }
}

/// Optional `?date=YYYY-MM-DD`; absent means today in the local timezone.
#[derive(Debug, Default, Deserialize)]
pub struct DateParam {
  pub date: Option<NaiveDate>,
}

impl DateParam {
  pub fn resolve(&self, clock: &LocalClock) -> NaiveDate {
    self.date.unwrap_or_else(|| clock.today())
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: TrackerStore + 'static,
{
  Router::new()
    // Users
    .route("/users", get(users::list::<S>))
    .route("/users/{id}", put(users::register::<S>))
    .route("/users/{id}/name", get(users::name::<S>))
    // Completions
    .route("/users/{id}/status", get(progress::status::<S>))
    .route("/users/{id}/tasks/{task}", put(progress::set::<S>))
    .route("/users/{id}/tasks/{task}/toggle", post(progress::toggle::<S>))
    // Statistics
    .route("/users/{id}/streak", get(progress::streak::<S>))
    .route("/users/{id}/today", get(progress::today::<S>))
    .route("/users/{id}/weekly", get(progress::weekly::<S>))
    .route("/board", get(progress::board::<S>))
    // Catalog
    .route("/catalog", get(catalog::handler::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
