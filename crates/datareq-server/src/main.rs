//! datareq server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) and
//! `DATAREQ_*` environment variables, opens the SQLite request store, and
//! serves the request API over HTTP.
//!
//! # Checking configuration
//!
//! ```
//! cargo run -p datareq-server -- --check-config
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use datareq_core::lifecycle::LifecycleManager;
use datareq_mail::Mailer;
use datareq_server::ServerConfig;
use datareq_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Data request approval server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the effective configuration (without secrets) and exit.
  #[arg(long)]
  check_config: bool,
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

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  if cli.check_config {
    print_config(&server_cfg);
    return Ok(());
  }

  let store_path = server_cfg.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let mailer = Mailer::from_config(server_cfg.smtp())
    .context("failed to configure mail transport")?;

  let manager = LifecycleManager::new(
    Arc::new(store),
    Arc::new(mailer),
    server_cfg.workflow(),
  );

  let app = datareq_server::router(manager);
  let address = server_cfg.bind_address();

  tracing::info!(
    base_url = %server_cfg.base_url,
    policy = ?server_cfg.transition_policy,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

fn print_config(cfg: &ServerConfig) {
  println!("bind address:      {}", cfg.bind_address());
  println!("base url:          {}", cfg.base_url);
  println!("ops address:       {}", cfg.ops_address);
  println!("store path:        {}", cfg.resolved_store_path().display());
  println!("transition policy: {:?}", cfg.transition_policy);
  match cfg.smtp() {
    Some(smtp) => {
      println!("smtp relay:        {}:{}", smtp.host, smtp.port);
      println!("mail from:         {} <{}>", smtp.from_name, smtp.from_address);
      println!(
        "smtp auth:         {}",
        if smtp.username.is_some() { "configured" } else { "none" }
      );
    }
    None => println!("smtp relay:        none (notifications are logged only)"),
  }
}
