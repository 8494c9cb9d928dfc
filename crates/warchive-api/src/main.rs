//! warchive server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store and the attachment directory, and serves the record API over
//! HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use warchive_api::{AppState, ServerConfig};
use warchive_files::AttachmentStore;
use warchive_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Warchive record server")]
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

  // Load configuration. Every key has a default so the server runs without
  // a config file; the file and WARCHIVE_* environment variables override.
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080_i64)?
    .set_default("store_path", "warchive.db")?
    .set_default("upload_dir", "public/images")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("WARCHIVE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open the SQLite store and the attachment directory.
  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.store_path)
    })?;
  let files = AttachmentStore::open(&server_cfg.upload_dir)
    .await
    .with_context(|| {
      format!("failed to open upload dir {:?}", server_cfg.upload_dir)
    })?;

  let state = AppState {
    store: Arc::new(store),
    files: Arc::new(files),
  };

  let app = warchive_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
