//! tassel-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store and a filesystem blob store, seeds the operator
//! account, and serves the registry API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `auth_password_hash` in config.toml:
//!
//! ```
//! cargo run -p tassel-http --bin tassel-server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use tassel_blob::{FsBlobStore, UrlSigner};
use tassel_core::{
  credential::{Credential, Operator},
  registrar::{Registrar, UploadLimits},
  store::ArtifactStore as _,
};
use tassel_http::{AppState, ServerConfig, auth::hash_password};
use tassel_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Tassel document registry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
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

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    let hash = hash_password(&password)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TASSEL"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in filesystem paths.
  let store_path = expand_tilde(&server_cfg.store_path);
  let blob_root = expand_tilde(&server_cfg.blob_root);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  // Seed the operator account. An existing row is left untouched, so a
  // credential already migrated to a hash is never downgraded.
  let credential = match (&server_cfg.auth_password_hash, &server_cfg.auth_password)
  {
    (Some(hash), _) => Credential::Hashed(hash.clone()),
    (None, Some(plain)) => {
      tracing::warn!(
        "auth_password is plaintext; it will be migrated to a hash on first login"
      );
      Credential::Legacy(plain.clone())
    }
    (None, None) => {
      anyhow::bail!("config needs auth_password_hash or auth_password")
    }
  };
  store
    .put_operator(Operator {
      username: server_cfg.auth_username.clone(),
      credential,
    })
    .await
    .context("failed to seed operator account")?;

  // Blob store and registrar.
  let blobs = Arc::new(FsBlobStore::new(
    &blob_root,
    server_cfg.blob_base_url.clone(),
    UrlSigner::new(&server_cfg.signing_secret),
  ));
  let limits = UploadLimits {
    max_binary_bytes:    server_cfg.max_binary_bytes,
    max_multipart_bytes: server_cfg.max_multipart_bytes,
  };
  let registrar = Registrar::new(
    Arc::clone(&store),
    Arc::clone(&blobs),
    limits,
    server_cfg.signed_url_ttl,
  );

  // Leave transport-level headroom above the largest upload ceiling so the
  // validation layer gets to answer with a proper error envelope.
  let body_limit =
    server_cfg.max_binary_bytes.max(server_cfg.max_multipart_bytes) as usize
      + 64 * 1024;

  let state = AppState { store, registrar, body_limit };
  let app = tassel_http::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
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
