//! Request dispatch, including batched calls.

use std::time::Instant;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::envelope::Envelope;
use crate::error::RpcError;
use crate::procedure::ProcedureKind;
use crate::router::Router;

/// Separator between procedure names in a batched path.
pub const BATCH_SEPARATOR: char = ',';

/// HTTP status for a batch whose calls ended with different statuses.
pub const MULTI_STATUS: u16 = 207;

/// An incoming request, decoded from the transport but not yet resolved.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    /// Procedure name, or comma-separated names when `batch` is set.
    pub path: &'a str,
    pub kind: ProcedureKind,
    /// Raw JSON input; `None` or empty means no input.
    pub input: Option<&'a str>,
    pub batch: bool,
}

/// Response payload: one envelope, or one per batched call in request order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Body {
    Single(Envelope),
    Batch(Vec<Envelope>),
}

/// The result of dispatching a [`Call`].
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: u16,
    pub body: Body,
}

/// Resolves and invokes every procedure named by `call`.
///
/// Errors never escape: each failure becomes an error envelope.
pub async fn dispatch(router: &Router, call: Call<'_>) -> Outcome {
    if call.batch {
        dispatch_batch(router, call).await
    } else {
        dispatch_single(router, call).await
    }
}

async fn dispatch_single(router: &Router, call: Call<'_>) -> Outcome {
    let envelope = match parse_input(call.input) {
        Ok(input) => invoke(router, call.path, call.kind, input).await,
        Err(err) => Envelope::error(err, Some(call.path)),
    };

    Outcome {
        status: envelope.http_status(),
        body: Body::Single(envelope),
    }
}

async fn dispatch_batch(router: &Router, call: Call<'_>) -> Outcome {
    let paths: Vec<&str> = call.path.split(BATCH_SEPARATOR).collect();

    let envelopes = match parse_input(call.input).and_then(batch_inputs) {
        Ok(mut inputs) => {
            let mut envelopes = Vec::with_capacity(paths.len());
            for (index, &path) in paths.iter().enumerate() {
                let input = inputs.remove(&index.to_string());
                envelopes.push(invoke(router, path, call.kind, input).await);
            }
            envelopes
        }
        Err(err) => paths
            .iter()
            .map(|&path| Envelope::error(err.clone(), Some(path)))
            .collect(),
    };

    Outcome {
        status: batch_status(&envelopes),
        body: Body::Batch(envelopes),
    }
}

async fn invoke(router: &Router, path: &str, kind: ProcedureKind, input: Option<Value>) -> Envelope {
    let started = Instant::now();
    let result = router.call(path, kind, input).await;
    let elapsed = started.elapsed().as_secs_f64();

    let code = match &result {
        Ok(_) => "OK",
        Err(err) => err.code.as_str(),
    };
    // Unregistered names are folded into one label value.
    let label = if router.contains(path) {
        path.to_string()
    } else {
        "unknown".to_string()
    };
    metrics::counter!("rpc_calls_total", "procedure" => label.clone(), "code" => code)
        .increment(1);
    metrics::histogram!("rpc_call_duration_seconds", "procedure" => label).record(elapsed);

    match &result {
        Ok(_) => tracing::debug!(procedure = path, %kind, elapsed, "procedure call succeeded"),
        Err(err) if err.code.is_client_error() => {
            tracing::debug!(procedure = path, %kind, code, error = %err.message, "procedure call rejected");
        }
        Err(err) => {
            tracing::error!(procedure = path, %kind, code, error = %err.message, "procedure call failed");
        }
    }

    Envelope::from_result(result, path)
}

fn parse_input(raw: Option<&str>) -> Result<Option<Value>, RpcError> {
    match raw {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| RpcError::parse_error(format!("Unable to parse input: {e}"))),
    }
}

/// Batched input is an object keyed by call index: `{"0": ..., "1": ...}`.
fn batch_inputs(input: Option<Value>) -> Result<Map<String, Value>, RpcError> {
    match input {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(RpcError::bad_request(
            "Batched input must be an object keyed by call index",
        )),
    }
}

fn batch_status(envelopes: &[Envelope]) -> u16 {
    let mut statuses = envelopes.iter().map(Envelope::http_status);
    let Some(first) = statuses.next() else {
        return 200;
    };
    if statuses.all(|status| status == first) {
        first
    } else {
        MULTI_STATUS
    }
}
