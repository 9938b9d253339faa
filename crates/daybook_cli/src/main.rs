//! `daybook` server entry point.
//!
//! # Responsibility
//! - Resolve configuration from flags and `DAYBOOK_*` environment variables.
//! - Initialize logging, open the database and serve the HTTP API.

use anyhow::Context;
use clap::Parser;
use daybook_api::config::{DEFAULT_CORS_ORIGIN, DEFAULT_DB_PATH, DEFAULT_LISTEN};
use daybook_api::{parse_listen, router, serve, shutdown_signal, AppState, ServerConfig};
use daybook_core::{default_log_level, init_logging, open_db};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "daybook", version, about = "Tasks, diary and calendar API server")]
struct Args {
    /// Listen address: ip:port, ip (port 8000) or localhost:port.
    #[arg(long, env = "DAYBOOK_LISTEN", default_value = DEFAULT_LISTEN)]
    listen: String,

    /// SQLite database path; parent directories are created.
    #[arg(long, env = "DAYBOOK_DB", default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, env = "DAYBOOK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rotating log files. Logs go to stderr when unset.
    #[arg(long, env = "DAYBOOK_LOG_DIR")]
    log_dir: Option<String>,

    /// Browser origin allowed by CORS.
    #[arg(long, env = "DAYBOOK_CORS_ORIGIN", default_value = DEFAULT_CORS_ORIGIN)]
    cors_origin: String,

    /// Require a bearer token on every /api request.
    #[arg(long, env = "DAYBOOK_NO_ANONYMOUS")]
    no_anonymous: bool,
}

impl Args {
    fn server_config(&self) -> anyhow::Result<ServerConfig> {
        Ok(ServerConfig {
            listen: parse_listen(&self.listen)?,
            db_path: self.db.clone(),
            cors_origin: self.cors_origin.clone(),
            allow_anonymous: !self.no_anonymous,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&level, args.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    let config = args.server_config()?;
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let conn = open_db(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path.display()))?;
    info!(
        "event=server_config module=cli status=ok listen={} allow_anonymous={}",
        config.listen, config.allow_anonymous
    );

    let app = router(
        AppState::new(conn, config.allow_anonymous),
        &config.cors_origin,
    )?;
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    serve(listener, app, shutdown_signal()).await?;
    Ok(())
}
