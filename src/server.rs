//! ==============================================================================
//! server.rs - http surface
//! ==============================================================================
//!
//! purpose:
//!     maps the http api onto handlers.rs and owns the per-process state.
//!
//! routes:
//!     GET  /                          dashboard (dashboard.rs)
//!     POST /api/rfid                  ingest one tag read
//!     GET  /api/registros             history, newest first
//!     GET  /api/registros_completos   history, oldest first
//!     POST /api/clear                 wipe history
//!     GET  /api/health                liveness + record count
//!
//! middleware (outermost first):
//!     - allow-methods / allow-headers on every response, not only on
//!       preflight, so plain replies carry the full cors set
//!     - cors: any origin, GET/POST/OPTIONS, Content-Type. the esp32 and
//!       browsers on other hosts must not be blocked.
//!     - trace: one debug span per request
//!     - catch-panic: a panicking handler becomes a 500 `{error}` reply
//!       instead of a dropped connection
//!
//! ==============================================================================

use crate::dashboard::dashboard_handler;
use crate::error::{ApiError, ApiResult};
use crate::event_log::BoundedEventLog;
use crate::handlers::{self, ClearAck, Health, IngestAck, RecordList};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

// ==============================================================================
// shared state
// ==============================================================================
// cloned into every request. the history itself is an Arc inside
// BoundedEventLog, so every clone sees the same reads.

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub log: BoundedEventLog,
    /// log each accepted read at info level
    pub show_readings: bool,
}

impl AppState {
    pub fn new(log: BoundedEventLog, show_readings: bool) -> Self {
        Self { log, show_readings }
    }
}

// ==============================================================================
// router
// ==============================================================================

/// the full application: routes, state and middleware
pub fn app(state: AppState) -> Router {
    with_middleware(api_routes().with_state(state))
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/api/rfid", post(ingest_handler))
        .route("/api/registros", get(recent_handler))
        .route("/api/registros_completos", get(all_handler))
        .route("/api/clear", post(clear_handler))
        .route("/api/health", get(health_handler))
}

/// wrap a router in the cors / trace / panic layers
pub fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::InternalFault(detail).into_response()
}

/// serve until `shutdown` resolves
pub async fn run_server<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// resolves on ctrl-c, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("[SHUTDOWN] signal received, stopping server");
}

// ==============================================================================
// handlers
// ==============================================================================

/// POST /api/rfid
/// the body is taken raw so an empty or broken body gets our 400, not axum's
async fn ingest_handler(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<IngestAck>> {
    handlers::ingest(&state.log, &body, state.show_readings)
        .await
        .map(Json)
}

async fn recent_handler(State(state): State<AppState>) -> Json<RecordList> {
    Json(handlers::list_recent(&state.log).await)
}

async fn all_handler(State(state): State<AppState>) -> Json<RecordList> {
    Json(handlers::list_all(&state.log).await)
}

async fn clear_handler(State(state): State<AppState>) -> Json<ClearAck> {
    Json(handlers::clear_all(&state.log).await)
}

async fn health_handler(State(state): State<AppState>) -> Json<Health> {
    Json(handlers::health(&state.log).await)
}
