//! cram-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered with
//! `CRAM_*` environment variables, opens the SQLite store, seeds the
//! configured study buddies and serves the JSON API over HTTP.
//!
//! ```toml
//! port       = 8080
//! store_path = "~/.local/share/cram/cram.db"
//! timezone   = "Asia/Almaty"
//!
//! [[buddies]]
//! id   = 123456
//! name = "Shakhnaz"
//!
//! [reminders]
//! morning     = "09:00"
//! afternoon   = "14:30"
//! webhook_url = "https://chat.example.com/hooks/abc"
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use cram_api::ApiState;
use cram_core::{Tracker, catalog::TaskCatalog, clock::LocalClock};
use cram_server::{
  ServerConfig,
  notify::ConfiguredNotifier,
  reminders::{self, ReminderSchedule},
  retention,
};
use cram_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cram study tracker server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("CRAM")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let clock = LocalClock::parse(&server_cfg.timezone).context("invalid timezone")?;

  let catalog = Arc::new(match server_cfg.catalog.clone() {
    Some(cfg) => TaskCatalog::try_from(cfg).context("invalid task catalog")?,
    None => TaskCatalog::default(),
  });
  tracing::info!(tasks = catalog.len(), "task catalog loaded");

  // Open SQLite store.
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let tracker = Arc::new(Tracker::new(store, Arc::clone(&catalog)));

  // Seed configured study buddies.
  for buddy in server_cfg.all_buddies() {
    tracker
      .register_user(buddy.id, Some(&buddy.name), clock.now_utc())
      .await
      .with_context(|| format!("failed to register buddy {}", buddy.id))?;
  }

  // Background jobs.
  if server_cfg.reminders.enabled {
    let schedule = ReminderSchedule::from_config(&server_cfg.reminders)?;
    let notifier = ConfiguredNotifier::from_url(server_cfg.reminders.webhook_url.as_deref())?;
    if matches!(notifier, ConfiguredNotifier::Log(_)) {
      tracing::info!("no webhook_url configured; reminders will only be logged");
    }
    tokio::spawn(reminders::run(schedule, Arc::clone(&catalog), clock, notifier));
  }

  if let Some(days) = server_cfg.retention_days {
    tokio::spawn(retention::run(Arc::clone(&tracker), clock, days));
  }

  let app = cram_server::router(ApiState { tracker, clock });
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
