//! HTTP/JSON surface for Daybook.
//!
//! # Responsibility
//! - Route REST requests to `daybook_core` services.
//! - Map core errors to the `{"detail": ...}` error contract.
//! - Provide a typed client for the same routes.
//!
//! # Invariants
//! - One SQLite connection is shared behind an async mutex; no handler
//!   awaits while holding it.
//! - Every `/api` handler resolves the caller before touching user data.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::Router;
use log::info;
use rusqlite::Connection;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, MutexGuard};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
mod handlers;
pub mod wire;

pub use client::{ApiClient, ClientError};
pub use config::{parse_listen, ConfigError, ServerConfig};
pub use error::{ApiError, ErrorBody};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
    allow_anonymous: bool,
}

impl AppState {
    pub fn new(conn: Connection, allow_anonymous: bool) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            allow_anonymous,
        }
    }

    pub fn allow_anonymous(&self) -> bool {
        self.allow_anonymous
    }

    pub(crate) async fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}

/// Builds the application router with CORS for `cors_origin`.
pub fn router(state: AppState, cors_origin: &str) -> Result<Router, ConfigError> {
    let origin = HeaderValue::from_str(cors_origin.trim())
        .map_err(|_| ConfigError::InvalidCorsOrigin(cors_origin.to_string()))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let api = Router::new()
        .route(
            "/tasks",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::tasks::get_task)
                .put(handlers::tasks::update_task)
                .delete(handlers::tasks::delete_task),
        )
        .route("/tasks/{id}/substeps", post(handlers::tasks::add_substep))
        .route(
            "/tasks/{id}/substeps/{substep_id}",
            put(handlers::tasks::update_substep).delete(handlers::tasks::delete_substep),
        )
        .route("/tasks/{id}/notes", post(handlers::tasks::add_note))
        .route(
            "/diary",
            get(handlers::diary::list_entries).post(handlers::diary::save_entry),
        )
        .route(
            "/diary/{id}",
            get(handlers::diary::get_entry).delete(handlers::diary::delete_entry),
        )
        .route(
            "/folders",
            get(handlers::folders::list_folders).post(handlers::folders::create_folder),
        )
        .route(
            "/folders/{id}",
            put(handlers::folders::update_folder).delete(handlers::folders::delete_folder),
        )
        .route("/calendar", get(handlers::calendar::month));

    Ok(Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        .route("/test-db", get(handlers::health::test_db))
        .route("/test/create-user", post(handlers::health::create_dev_user))
        .nest("/api", api)
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
        .layer(cors))
}

/// Serves `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("event=server_listen module=api status=ok addr={addr}");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("event=server_shutdown module=api status=ok");
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let http_status = response.status();
    info!(
        "event=http_request module=api status={} method={} path={} http_status={} elapsed_ms={}",
        if http_status.is_server_error() { "error" } else { "ok" },
        method,
        path,
        http_status.as_u16(),
        started.elapsed().as_millis()
    );
    response
}
