//! Server error types and HTTP response mapping for RPC outcomes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use metrics_exporter_prometheus::BuildError;
use rpc::{Body, Envelope, Outcome, RpcError};
use thiserror::Error;

use crate::config::ConfigError;

/// Fatal errors that stop the process before or while serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(#[from] BuildError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// An RPC outcome rendered as an HTTP response.
#[derive(Debug)]
pub struct RpcResponse(pub Outcome);

impl RpcResponse {
    /// A single error envelope raised before any procedure was invoked.
    pub fn error(err: RpcError, path: Option<&str>) -> Self {
        RpcResponse(Outcome {
            status: err.code.http_status(),
            body: Body::Single(Envelope::error(err, path)),
        })
    }
}

impl IntoResponse for RpcResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.body)).into_response()
    }
}

impl From<Outcome> for RpcResponse {
    fn from(outcome: Outcome) -> Self {
        RpcResponse(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_status_becomes_http_status() {
        let outcome = Outcome {
            status: 404,
            body: Body::Single(Envelope::error(RpcError::not_found("missing"), Some("x"))),
        };
        let response = RpcResponse(outcome).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[test]
    fn error_response_uses_code_status() {
        let response = RpcResponse::error(RpcError::bad_request("bad query"), Some("health"))
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn config_error_converts_into_server_error() {
        let err: ServerError = ConfigError::InvalidLogFormat("xml".to_string()).into();
        assert!(matches!(err, ServerError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error: Invalid LOG_FORMAT"));
    }

    #[test]
    fn bind_error_names_address() {
        let err = ServerError::Bind {
            addr: "0.0.0.0:3001".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(err.to_string().starts_with("Failed to bind 0.0.0.0:3001"));
    }
}
