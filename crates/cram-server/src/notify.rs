//! Outbound delivery of reminder texts.
//!
//! Delivery is best-effort: callers log failures and move on. Nothing here
//! touches the tracker store.

use std::{future::Future, time::Duration};

use serde_json::json;

use crate::Result;

pub trait Notifier: Send + Sync {
  fn deliver(&self, text: &str) -> impl Future<Output = Result<()>> + Send;
}

// ─── Log sink ─────────────────────────────────────────────────────────────────

/// Writes reminders to the log. Used when no webhook is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
  async fn deliver(&self, text: &str) -> Result<()> {
    tracing::info!(target: "cram::reminder", "{text}");
    Ok(())
  }
}

// ─── Webhook ──────────────────────────────────────────────────────────────────

/// POSTs `{"text": ...}` to a chat webhook.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
  client: reqwest::Client,
  url:    String,
}

impl WebhookNotifier {
  pub fn new(url: impl Into<String>) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, url: url.into() })
  }
}

impl Notifier for WebhookNotifier {
  async fn deliver(&self, text: &str) -> Result<()> {
    self
      .client
      .post(&self.url)
      .json(&json!({ "text": text }))
      .send()
      .await?
      .error_for_status()?;
    Ok(())
  }
}

// ─── Runtime choice ───────────────────────────────────────────────────────────

/// The notifier selected by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredNotifier {
  Log(LogNotifier),
  Webhook(WebhookNotifier),
}

impl ConfiguredNotifier {
  pub fn from_url(url: Option<&str>) -> Result<Self> {
    Ok(match url {
      Some(url) => Self::Webhook(WebhookNotifier::new(url)?),
      None => Self::Log(LogNotifier),
    })
  }
}

impl Notifier for ConfiguredNotifier {
  async fn deliver(&self, text: &str) -> Result<()> {
    match self {
      Self::Log(n) => n.deliver(text).await,
      Self::Webhook(n) => n.deliver(text).await,
    }
  }
}
