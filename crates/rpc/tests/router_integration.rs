//! Integration tests for building a procedure table and dispatching against it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rpc::{Body, Call, Procedure, ProcedureKind, Router, RpcError, dispatch};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize)]
struct Status {
    status: &'static str,
}

struct Health;

#[async_trait]
impl Procedure for Health {
    type Input = ();
    type Output = Status;
    const KIND: ProcedureKind = ProcedureKind::Query;

    async fn call(&self, _input: ()) -> Result<Status, RpcError> {
        Ok(Status { status: "ok" })
    }
}

#[derive(Deserialize)]
struct IncrementInput {
    by: usize,
}

struct Increment {
    counter: Arc<AtomicUsize>,
}

#[async_trait]
impl Procedure for Increment {
    type Input = IncrementInput;
    type Output = usize;
    const KIND: ProcedureKind = ProcedureKind::Mutation;

    async fn call(&self, input: IncrementInput) -> Result<usize, RpcError> {
        Ok(self.counter.fetch_add(input.by, Ordering::SeqCst) + input.by)
    }
}

struct Broken;

#[async_trait]
impl Procedure for Broken {
    type Input = ();
    type Output = ();
    const KIND: ProcedureKind = ProcedureKind::Query;

    async fn call(&self, _input: ()) -> Result<(), RpcError> {
        Err(RpcError::internal("backend unavailable"))
    }
}

fn json_body(body: &Body) -> serde_json::Value {
    serde_json::to_value(body).unwrap()
}

#[tokio::test]
async fn test_health_query_round_trip() {
    let router = Router::new().procedure("health", Health);

    let outcome = dispatch(
        &router,
        Call {
            path: "health",
            kind: ProcedureKind::Query,
            input: None,
            batch: false,
        },
    )
    .await;

    assert_eq!(outcome.status, 200);
    assert_eq!(
        json_body(&outcome.body),
        json!({ "result": { "data": { "status": "ok" } } })
    );
}

#[tokio::test]
async fn test_unknown_procedure_does_not_poison_router() {
    let router = Router::new().procedure("health", Health);

    let missing = dispatch(
        &router,
        Call {
            path: "doesNotExist",
            kind: ProcedureKind::Query,
            input: None,
            batch: false,
        },
    )
    .await;
    assert_eq!(missing.status, 404);

    let health = dispatch(
        &router,
        Call {
            path: "health",
            kind: ProcedureKind::Query,
            input: None,
            batch: false,
        },
    )
    .await;
    assert_eq!(health.status, 200);
}

#[tokio::test]
async fn test_mutation_over_query_method_is_rejected() {
    let counter = Arc::new(AtomicUsize::new(0));
    let router = Router::new().procedure(
        "increment",
        Increment {
            counter: counter.clone(),
        },
    );

    let outcome = dispatch(
        &router,
        Call {
            path: "increment",
            kind: ProcedureKind::Query,
            input: Some(r#"{"by":1}"#),
            batch: false,
        },
    )
    .await;

    assert_eq!(outcome.status, 405);
    assert_eq!(
        json_body(&outcome.body)["error"]["data"]["code"],
        "METHOD_NOT_SUPPORTED"
    );
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_mutation_with_input() {
    let counter = Arc::new(AtomicUsize::new(0));
    let router = Router::new().procedure(
        "increment",
        Increment {
            counter: counter.clone(),
        },
    );

    let outcome = dispatch(
        &router,
        Call {
            path: "increment",
            kind: ProcedureKind::Mutation,
            input: Some(r#"{"by":3}"#),
            batch: false,
        },
    )
    .await;

    assert_eq!(outcome.status, 200);
    assert_eq!(json_body(&outcome.body)["result"]["data"], 3);
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_handler_error_maps_to_internal_server_error() {
    let router = Router::new().procedure("broken", Broken);

    let outcome = dispatch(
        &router,
        Call {
            path: "broken",
            kind: ProcedureKind::Query,
            input: None,
            batch: false,
        },
    )
    .await;

    assert_eq!(outcome.status, 500);
    let body = json_body(&outcome.body);
    assert_eq!(body["error"]["message"], "backend unavailable");
    assert_eq!(body["error"]["code"], -32603);
}

#[tokio::test]
async fn test_nested_router_is_addressed_by_dotted_path() {
    let router = Router::new().nest("system", Router::new().procedure("health", Health));

    let outcome = dispatch(
        &router,
        Call {
            path: "system.health,health",
            kind: ProcedureKind::Query,
            input: None,
            batch: true,
        },
    )
    .await;

    assert_eq!(outcome.status, 207);
    let body = json_body(&outcome.body);
    assert_eq!(body[0]["result"]["data"]["status"], "ok");
    assert_eq!(body[1]["error"]["data"]["code"], "NOT_FOUND");
}
