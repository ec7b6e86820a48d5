//! HTTP gateway serving named RPC procedures.
//!
//! Exposes the procedure table over `GET`/`POST /{path}` with a permissive
//! CORS policy, structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod procedures;
pub mod routes;
pub mod server;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ServerError;
pub use server::Server;

/// Creates the Axum application router serving `procedures`.
///
/// `/metrics` is matched before `/{path}`, so a procedure named `metrics`
/// is unreachable. Every other reply, including rejected methods and
/// unmatched paths, is a JSON envelope.
pub fn create_app(procedures: rpc::Router, metrics_handle: PrometheusHandle) -> Router {
    Router::new()
        .route(
            "/metrics",
            get(routes::metrics::render).with_state(metrics_handle),
        )
        .route(
            "/{path}",
            get(routes::rpc::query).post(routes::rpc::mutation),
        )
        .method_not_allowed_fallback(routes::rpc::method_not_allowed)
        .fallback(routes::rpc::fallback)
        .with_state(Arc::new(procedures))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
