//! Rollcall server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), layers
//! `ROLLCALL_*` environment variables on top, opens the SQLite store, and
//! serves the JSON API over HTTP.
//!
//! ```text
//! ROLLCALL_TOKEN_SECRET=change-me cargo run -p rollcall-server
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use rollcall_api::{AppState, clock::Clock, token::TokenSigner};
use rollcall_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Rollcall attendance server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;
  if server_cfg.token_secret.is_empty() {
    anyhow::bail!("token_secret must be set (config file or ROLLCALL_TOKEN_SECRET)");
  }

  let token_ttl = server_cfg.token_ttl()?;

  let tokens = TokenSigner::new(server_cfg.token_secret.as_bytes(), token_ttl)
    .context("invalid token configuration")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create store directory {parent:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let state = AppState {
    store:  Arc::new(store),
    tokens: Arc::new(tokens),
    clock:  Clock::System,
  };

  let mut app = rollcall_api::router(state);
  if server_cfg.cors_allow_any {
    app = app.layer(CorsLayer::permissive());
  }

  let address = server_cfg.address();
  tracing::info!(store = ?store_path, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
