//! RPC endpoints: `GET /{path}` runs queries, `POST /{path}` runs mutations.

use std::sync::Arc;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{Method, Uri};
use rpc::dispatch::BATCH_SEPARATOR;
use rpc::{Call, ProcedureKind, RpcError, dispatch};
use serde::Deserialize;

use crate::error::RpcResponse;

/// Shared, read-only procedure table.
pub type Procedures = Arc<rpc::Router>;

/// Query string accepted by both endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct RpcParams {
    /// URL-encoded JSON input (queries only).
    pub input: Option<String>,
    /// `1` when the path lists several comma-separated procedures.
    pub batch: Option<String>,
}

impl RpcParams {
    pub fn is_batch(&self) -> bool {
        matches!(self.batch.as_deref(), Some("1" | "true"))
    }
}

/// Decodes the path and query string, turning extractor rejections into
/// error envelopes.
fn decode(
    path: Result<Path<String>, PathRejection>,
    params: Result<Query<RpcParams>, QueryRejection>,
) -> Result<(String, RpcParams), RpcResponse> {
    let Path(path) = path.map_err(|rejection| {
        RpcResponse::error(
            RpcError::bad_request(format!("Invalid procedure path: {}", rejection.body_text())),
            None,
        )
    })?;

    let Query(params) = params.map_err(|rejection| {
        RpcResponse::error(
            RpcError::bad_request(format!("Invalid query string: {}", rejection.body_text())),
            Some(path.as_str()),
        )
    })?;

    Ok((path, params))
}

/// GET /{path} — invoke one or more query procedures.
#[tracing::instrument(skip_all)]
pub async fn query(
    State(procedures): State<Procedures>,
    path: Result<Path<String>, PathRejection>,
    params: Result<Query<RpcParams>, QueryRejection>,
) -> RpcResponse {
    let (path, params) = match decode(path, params) {
        Ok(decoded) => decoded,
        Err(response) => return response,
    };

    let call = Call {
        path: &path,
        kind: ProcedureKind::Query,
        input: params.input.as_deref(),
        batch: params.is_batch(),
    };
    dispatch(&procedures, call).await.into()
}

/// POST /{path} — invoke one or more mutation procedures with a JSON body.
#[tracing::instrument(skip_all)]
pub async fn mutation(
    State(procedures): State<Procedures>,
    path: Result<Path<String>, PathRejection>,
    params: Result<Query<RpcParams>, QueryRejection>,
    body: String,
) -> RpcResponse {
    let (path, params) = match decode(path, params) {
        Ok(decoded) => decoded,
        Err(response) => return response,
    };

    let call = Call {
        path: &path,
        kind: ProcedureKind::Mutation,
        input: Some(body.as_str()),
        batch: params.is_batch(),
    };
    dispatch(&procedures, call).await.into()
}

/// Any method other than GET or POST on `/{path}`.
///
/// Unknown names still answer NOT_FOUND; registered ones answer
/// METHOD_NOT_SUPPORTED.
pub async fn method_not_allowed(
    State(procedures): State<Procedures>,
    method: Method,
    uri: Uri,
) -> RpcResponse {
    let path = uri.path().trim_start_matches('/');
    let known = path
        .split(BATCH_SEPARATOR)
        .any(|name| procedures.contains(name));

    let err = if known {
        RpcError::method_not_supported(format!("Unsupported {method} request on path \"{path}\""))
    } else {
        RpcError::not_found(format!("No procedure on path \"{path}\""))
    };
    tracing::debug!(%method, path, code = %err.code, "request rejected before dispatch");

    RpcResponse::error(err, Some(path))
}

/// Any path that cannot name a procedure, e.g. `/` or `/a/b`.
pub async fn fallback(uri: Uri) -> RpcResponse {
    let path = uri.path().trim_start_matches('/');
    tracing::debug!(path, "request did not match any procedure route");

    RpcResponse::error(
        RpcError::not_found(format!("No procedure on path \"{path}\"")),
        Some(path),
    )
}
