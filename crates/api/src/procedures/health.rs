//! Liveness procedure.

use async_trait::async_trait;
use rpc::{Procedure, ProcedureKind, RpcError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// The `health` query. Reports that the process is up and answering.
#[derive(Debug, Clone, Copy, Default)]
pub struct Health;

#[async_trait]
impl Procedure for Health {
    type Input = ();
    type Output = HealthStatus;
    const KIND: ProcedureKind = ProcedureKind::Query;

    async fn call(&self, _input: ()) -> Result<HealthStatus, RpcError> {
        Ok(HealthStatus::ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_reports_ok() {
        let status = Health.call(()).await.unwrap();
        assert_eq!(status, HealthStatus::ok());
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            serde_json::json!({ "status": "ok" })
        );
    }
}
