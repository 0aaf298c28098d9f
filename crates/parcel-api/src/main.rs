//! Parcel tracking API server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) overlaid with
//! `PARCEL_*` environment variables, loads the tracking fixture, and serves
//! the JSON API over HTTP.
//!
//! # Checking a deployment
//!
//! ```
//! cargo run -p parcel-api --bin server -- --check
//! ```
//!
//! validates the configuration and fixture and exits without binding.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use parcel_api::{AppState, ServerConfig, UPLOADS_MOUNT};
use parcel_core::table::TrackingTable;
use parcel_evidence::DiskEvidenceStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Mock parcel tracking API")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Validate the configuration and tracking fixture, then exit.
  #[arg(long)]
  check: bool,
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
      config::Environment::with_prefix("PARCEL")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("allowed_types"),
    )
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  server_cfg.storage_root = expand_tilde(&server_cfg.storage_root);

  // Load tracking data.
  let tracking = match &server_cfg.fixture_path {
    Some(path) => {
      let path = expand_tilde(path);
      TrackingTable::load(&path)
        .with_context(|| format!("failed to load tracking fixture {path:?}"))?
    }
    None => TrackingTable::builtin().context("built-in tracking fixture is invalid")?,
  };
  tracing::info!(records = tracking.len(), "loaded tracking fixture");

  if cli.check {
    tracing::info!(
      storage_root = ?server_cfg.storage_root,
      max_upload_bytes = server_cfg.max_upload_bytes,
      allowed_types = ?server_cfg.allowed_types,
      "configuration ok",
    );
    return Ok(());
  }

  // Prepare the storage root so static serving works before the first upload.
  let evidence_root = server_cfg.storage_root.join("evidence");
  tokio::fs::create_dir_all(&evidence_root)
    .await
    .with_context(|| format!("failed to create {evidence_root:?}"))?;

  let store = DiskEvidenceStore::new(server_cfg.storage_root.clone(), UPLOADS_MOUNT);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState::new(server_cfg, tracking, store);
  let app = parcel_api::router(state);

  tracing::info!("Listening on http://{address}");
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
    tracing::error!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
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
