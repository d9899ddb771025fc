//! Cram server: configuration, wiring and background jobs around the
//! tracker.
//!
//! The binary in `main.rs` loads a [`ServerConfig`], opens the SQLite store,
//! seeds the configured study buddies and serves the JSON API under `/api`.

pub mod error;
pub mod notify;
pub mod reminders;
pub mod retention;

pub use error::{Error, Result};

use std::path::PathBuf;

use axum::{Router, routing::get};
use cram_api::{ApiState, api_router};
use cram_core::{catalog::CatalogConfig, store::TrackerStore, user::UserId};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CRAM_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// IANA zone (or fixed offset) that decides what "today" is.
  #[serde(default = "default_timezone")]
  pub timezone:       String,
  /// Users registered at startup.
  #[serde(default)]
  pub buddies:        Vec<BuddyConfig>,
  /// Env-friendly form of `buddies`: `"id1:name1,id2:name2"`.
  #[serde(default)]
  pub study_buddies:  Option<String>,
  #[serde(default)]
  pub reminders:      ReminderConfig,
  /// Completion rows older than this many days are pruned. Unset keeps
  /// everything.
  #[serde(default)]
  pub retention_days: Option<u32>,
  /// Replaces the built-in task catalog.
  #[serde(default)]
  pub catalog:        Option<CatalogConfig>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BuddyConfig {
  pub id:   UserId,
  pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReminderConfig {
  #[serde(default = "default_true")]
  pub enabled:     bool,
  /// Local `HH:MM`.
  #[serde(default = "default_morning")]
  pub morning:     String,
  /// Local `HH:MM`.
  #[serde(default = "default_afternoon")]
  pub afternoon:   String,
  /// JSON webhook receiving `{"text": ...}`. Reminders are only logged when
  /// unset.
  #[serde(default)]
  pub webhook_url: Option<String>,
}

impl Default for ReminderConfig {
  fn default() -> Self {
    Self {
      enabled:     true,
      morning:     default_morning(),
      afternoon:   default_afternoon(),
      webhook_url: None,
    }
  }
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("cram.db") }
fn default_timezone() -> String { "Asia/Almaty".to_owned() }
fn default_true() -> bool { true }
fn default_morning() -> String { "09:00".to_owned() }
fn default_afternoon() -> String { "14:30".to_owned() }

impl ServerConfig {
  /// `buddies` followed by the entries of `study_buddies`.
  pub fn all_buddies(&self) -> Vec<BuddyConfig> {
    let mut all = self.buddies.clone();
    if let Some(list) = &self.study_buddies {
      all.extend(parse_buddies(list));
    }
    all
  }
}

/// Parse `"id1:name1,id2:name2"`. Entries without a colon or with a
/// non-numeric id are skipped.
pub fn parse_buddies(list: &str) -> Vec<BuddyConfig> {
  list
    .split(',')
    .filter_map(|entry| {
      let (id, name) = entry.split_once(':')?;
      match id.trim().parse() {
        Ok(id) => Some(BuddyConfig { id, name: name.trim().to_owned() }),
        Err(_) => {
          tracing::warn!(entry, "skipping malformed buddy entry");
          None
        }
      }
    })
    .collect()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full HTTP surface: `/health` plus the JSON API under `/api`.
pub fn router<S>(state: ApiState<S>) -> Router
where
  S: TrackerStore + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{body::Body, http::Request};
  use cram_core::{Tracker, catalog::TaskCatalog, clock::LocalClock};
  use cram_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  fn from_toml(src: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(src, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = from_toml("");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.timezone, "Asia/Almaty");
    assert!(cfg.reminders.enabled);
    assert_eq!(cfg.reminders.morning, "09:00");
    assert_eq!(cfg.reminders.afternoon, "14:30");
    assert!(cfg.retention_days.is_none());
    assert!(cfg.catalog.is_none());
  }

  #[test]
  fn buddies_merge_table_and_string_forms() {
    let cfg = from_toml(
      r#"
      study_buddies = "3:Sultan, 4:Shakhnaz"

      [[buddies]]
      id = 1
      name = "Dana"
      "#,
    );
    let names: Vec<_> = cfg.all_buddies().into_iter().map(|b| (b.id, b.name)).collect();
    assert_eq!(names, [
      (1, "Dana".to_owned()),
      (3, "Sultan".to_owned()),
      (4, "Shakhnaz".to_owned())
    ]);
  }

  #[test]
  fn malformed_buddy_entries_are_skipped() {
    let parsed = parse_buddies("12:Aru,nocolon,abc:Bad, 7 : Timur ");
    assert_eq!(parsed, [
      BuddyConfig { id: 12, name: "Aru".into() },
      BuddyConfig { id: 7, name: "Timur".into() },
    ]);
  }

  #[tokio::test]
  async fn api_is_nested_under_prefix() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let state = ApiState {
      tracker: Arc::new(Tracker::new(store, Arc::new(TaskCatalog::default()))),
      clock:   LocalClock::default(),
    };
    let app = router(state);

    let health = app
      .clone()
      .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert!(health.status().is_success());

    let users = app
      .oneshot(Request::builder().uri("/api/users").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert!(users.status().is_success());
  }
}
