//! JSON response envelope.
//!
//! Success: `{"result":{"data":...}}`
//!
//! Error: `{"error":{"message":"...","code":-32004,"data":{"code":"NOT_FOUND","httpStatus":404,"path":"..."}}}`

use serde::Serialize;
use serde_json::Value;

use crate::error::RpcError;

/// The envelope for a single procedure call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Result { result: ResultBody },
    Error { error: ErrorBody },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultBody {
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: i32,
    pub data: ErrorData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    pub code: &'static str,
    pub http_status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Envelope {
    pub fn data(data: Value) -> Self {
        Envelope::Result {
            result: ResultBody { data },
        }
    }

    /// Wraps `err`, recording the procedure path it occurred on when known.
    pub fn error(err: RpcError, path: Option<&str>) -> Self {
        Envelope::Error {
            error: ErrorBody {
                data: ErrorData {
                    code: err.code.as_str(),
                    http_status: err.code.http_status(),
                    path: path.map(str::to_string),
                },
                code: err.code.json_code(),
                message: err.message,
            },
        }
    }

    pub fn from_result(result: Result<Value, RpcError>, path: &str) -> Self {
        match result {
            Ok(data) => Envelope::data(data),
            Err(err) => Envelope::error(err, Some(path)),
        }
    }

    /// HTTP status for a response carrying only this envelope.
    pub fn http_status(&self) -> u16 {
        match self {
            Envelope::Result { .. } => 200,
            Envelope::Error { error } => error.data.http_status,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Envelope::Result { .. })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_shape() {
        let env = Envelope::data(json!({ "status": "ok" }));
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({ "result": { "data": { "status": "ok" } } })
        );
        assert_eq!(env.http_status(), 200);
        assert!(env.is_ok());
    }

    #[test]
    fn error_shape() {
        let env = Envelope::error(
            RpcError::not_found("No \"query\"-procedure on path \"doesNotExist\""),
            Some("doesNotExist"),
        );
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({
                "error": {
                    "message": "No \"query\"-procedure on path \"doesNotExist\"",
                    "code": -32004,
                    "data": {
                        "code": "NOT_FOUND",
                        "httpStatus": 404,
                        "path": "doesNotExist"
                    }
                }
            })
        );
        assert_eq!(env.http_status(), 404);
    }

    #[test]
    fn error_without_path_omits_field() {
        let env = Envelope::error(RpcError::parse_error("bad json"), None);
        let value = serde_json::to_value(&env).unwrap();
        assert!(value["error"]["data"].get("path").is_none());
    }
}
