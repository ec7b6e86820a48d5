//! Typed procedures and their type-erased form stored in the table.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::RpcError;

/// Whether a procedure reads (`Query`, served over GET) or writes
/// (`Mutation`, served over POST).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcedureKind {
    Query,
    Mutation,
}

impl ProcedureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcedureKind::Query => "query",
            ProcedureKind::Mutation => "mutation",
        }
    }
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named unit of server-side logic exposed over the wire.
///
/// Implementors declare their input and output shapes explicitly. A
/// procedure that takes no arguments uses `Input = ()`, which accepts a
/// missing or `null` input.
#[async_trait]
pub trait Procedure: Send + Sync + 'static {
    type Input: DeserializeOwned + Send + 'static;
    type Output: Serialize + Send + 'static;

    /// The kind this procedure is registered as.
    const KIND: ProcedureKind;

    /// Invokes the procedure with already-decoded input.
    async fn call(&self, input: Self::Input) -> Result<Self::Output, RpcError>;
}

/// Object-safe view of a [`Procedure`] working on raw JSON values.
#[async_trait]
pub(crate) trait Handler: Send + Sync {
    fn kind(&self) -> ProcedureKind;

    async fn invoke(&self, input: Option<Value>) -> Result<Value, RpcError>;
}

pub(crate) struct Erased<P>(pub(crate) P);

#[async_trait]
impl<P: Procedure> Handler for Erased<P> {
    fn kind(&self) -> ProcedureKind {
        P::KIND
    }

    async fn invoke(&self, input: Option<Value>) -> Result<Value, RpcError> {
        let input: P::Input = serde_json::from_value(input.unwrap_or(Value::Null))
            .map_err(|e| RpcError::bad_request(format!("Invalid input: {e}")))?;

        let output = self.0.call(input).await?;

        serde_json::to_value(output)
            .map_err(|e| RpcError::internal(format!("Failed to serialize output: {e}")))
    }
}
