//! # ipms
//!
//! IPMS server binary. Loads layered settings, opens and migrates the
//! `SQLite` database, and serves the REST API until Ctrl-C or `SIGTERM`.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ipms_core::logging::init_subscriber;
use ipms_server::{AppState, ShutdownCoordinator, serve};
use ipms_settings::IpmsSettings;
use ipms_store::repositories::RefreshTokenRepo;
use ipms_store::{ConnectionConfig, Database};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// IPMS REST API server.
#[derive(Parser, Debug)]
#[command(name = "ipms", version, about = "IPMS productivity API server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Settings file to load instead of `~/.ipms/settings.json`.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Load settings from `--config` or the default location.
    fn load_settings(&self) -> Result<IpmsSettings> {
        match &self.config {
            Some(path) => ipms_settings::load_settings_from_path(path)
                .with_context(|| format!("Failed to load settings from {}", path.display())),
            None => ipms_settings::load_settings().context("Failed to load settings"),
        }
    }

    /// Apply command-line overrides on top of loaded settings.
    fn apply(&self, settings: &mut IpmsSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(path) = &self.db_path {
            settings.database.path = path.to_string_lossy().into_owned();
        }
    }
}

/// Drop refresh tokens that can no longer be used.
async fn purge_expired_tokens(db: &Database) {
    match db
        .call(|conn| RefreshTokenRepo::purge(conn, chrono::Utc::now()))
        .await
    {
        Ok(0) => {}
        Ok(purged) => info!(purged, "removed expired refresh tokens"),
        Err(e) => warn!(error = %e, "failed to purge expired refresh tokens"),
    }
}

/// Spawn the server future. A failure cancels `token`.
fn supervise<F>(server: F, token: CancellationToken) -> JoinHandle<()>
where
    F: Future<Output = std::io::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = server.await {
            error!(error = %e, "server exited with error");
            token.cancel();
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = cli.load_settings()?;
    cli.apply(&mut settings);

    init_subscriber(&settings.logging.level, settings.logging.json);
    if settings.auth.uses_default_secret() {
        warn!("auth.secretKey is the built-in default; set IPMS_SECRET_KEY in production");
    }

    let db_path = settings.database.resolved_path();
    let config = ConnectionConfig {
        pool_size: settings.database.pool_size,
        busy_timeout_ms: settings.database.busy_timeout_ms,
    };
    let db = Database::open(&db_path, &config)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    purge_expired_tokens(&db).await;

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let coordinator = ShutdownCoordinator::new();
    let signals = coordinator.listen_for_signals();
    let token = coordinator.token();
    let state = AppState::new(settings, db);
    let server = supervise(serve(listener, state, token.clone()), token);

    coordinator.token().cancelled().await;
    coordinator.graceful_shutdown(vec![server, signals], None).await;
    info!("shutdown complete");
    Ok(())
}
