//! Runtime server configuration.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Deserialised from `config.toml` layered under `ROLLCALL_*` variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  /// HMAC key for bearer tokens. Required.
  #[serde(default)]
  pub token_secret:    String,
  #[serde(default = "default_token_ttl_hours")]
  pub token_ttl_hours: i64,
  /// Answer any origin with permissive CORS headers.
  #[serde(default)]
  pub cors_allow_any:  bool,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5000 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/rollcall/rollcall.db") }
fn default_token_ttl_hours() -> i64 { 24 * 7 }

impl ServerConfig {
  /// Layer the optional TOML file at `path` under the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::from_sources(
      config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("ROLLCALL")),
    )
  }

  fn from_sources(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
  ) -> Result<Self, config::ConfigError> {
    builder.build()?.try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `token_ttl_hours` as a duration; must be positive and representable.
  pub fn token_ttl(&self) -> anyhow::Result<chrono::Duration> {
    if self.token_ttl_hours <= 0 {
      anyhow::bail!("token_ttl_hours must be positive, got {}", self.token_ttl_hours);
    }
    chrono::Duration::try_hours(self.token_ttl_hours)
      .with_context(|| format!("token_ttl_hours {} is out of range", self.token_ttl_hours))
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
