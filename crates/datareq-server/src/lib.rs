//! Process wiring for the datareq server: configuration and the top-level
//! router.

use std::path::{Path, PathBuf};

use axum::Router;
use datareq_core::{
  lifecycle::{LifecycleManager, TransitionPolicy, WorkflowConfig},
  notify::Notifier,
  store::RequestStore,
};
use datareq_mail::SmtpConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, read from `config.toml` and `DATAREQ_*`
/// environment variables (the latter win).
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  /// Prefix for the approve/reject links sent to approvers.
  pub base_url:          String,
  /// Operations-team recipient of submission and rejection notices.
  pub ops_address:       String,
  pub store_path:        PathBuf,
  pub transition_policy: TransitionPolicy,
  /// No relay means notifications are only logged.
  pub smtp_host:         Option<String>,
  pub smtp_port:         u16,
  pub smtp_username:     Option<String>,
  pub smtp_password:     Option<String>,
  pub mail_from_name:    String,
  /// Defaults to `smtp_username`.
  pub mail_from_address: Option<String>,
}

impl ServerConfig {
  /// Load from `path` (optional) layered under the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 3000_i64)?
      .set_default("base_url", "http://localhost:3000")?
      .set_default("ops_address", "it@mmcwellness.ca")?
      .set_default("store_path", "data/database.sqlite")?
      .set_default("transition_policy", "always_apply")?
      .set_default("smtp_port", 587_i64)?
      .set_default("mail_from_name", "MMC Wellness IT")?
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("DATAREQ"))
      .build()?
      .try_deserialize()
  }

  pub fn workflow(&self) -> WorkflowConfig {
    WorkflowConfig {
      base_url:          self.base_url.clone(),
      ops_address:       self.ops_address.clone(),
      transition_policy: self.transition_policy,
    }
  }

  /// Relay settings, or `None` when no (non-blank) `smtp_host` is set.
  pub fn smtp(&self) -> Option<SmtpConfig> {
    let host = self.smtp_host.as_deref().map(str::trim).filter(|h| !h.is_empty())?;
    let from_address = self
      .mail_from_address
      .clone()
      .or_else(|| self.smtp_username.clone())
      .unwrap_or_else(|| self.ops_address.clone());
    Some(SmtpConfig {
      host: host.to_owned(),
      port: self.smtp_port,
      username: self.smtp_username.clone(),
      password: self.smtp_password.clone(),
      from_name: self.mail_from_name.clone(),
      from_address,
    })
  }

  /// `store_path` with a leading `~` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn bind_address(&self) -> String { format!("{}:{}", self.host, self.port) }
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

// ─── Router ───────────────────────────────────────────────────────────────────

/// The complete application: the API under `/api`, with request tracing.
pub fn router<S, N>(manager: LifecycleManager<S, N>) -> Router
where
  S: RequestStore + 'static,
  N: Notifier + 'static,
{
  Router::new()
    .nest("/api", datareq_api::api_router(manager))
    .layer(TraceLayer::new_for_http())
}
