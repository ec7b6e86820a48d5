//! RPC error types and wire error codes.

use std::fmt;

use thiserror::Error;

/// Error codes carried in the error envelope.
///
/// Each code has a JSON-RPC style numeric value, a stable string name and
/// the HTTP status the gateway answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The raw input was not valid JSON.
    ParseError,
    /// The input did not match the procedure's declared shape.
    BadRequest,
    /// No procedure is registered under the requested path.
    NotFound,
    /// The procedure exists but not for the HTTP method used.
    MethodNotSupported,
    /// The procedure failed in a way the caller cannot fix.
    InternalServerError,
}

impl ErrorCode {
    /// Numeric code placed in `error.code`.
    pub fn json_code(&self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::BadRequest => -32600,
            ErrorCode::NotFound => -32004,
            ErrorCode::MethodNotSupported => -32005,
            ErrorCode::InternalServerError => -32603,
        }
    }

    /// String name placed in `error.data.code`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::MethodNotSupported => "METHOD_NOT_SUPPORTED",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    /// HTTP status code for a response carrying this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::ParseError | ErrorCode::BadRequest => 400,
            ErrorCode::NotFound => 404,
            ErrorCode::MethodNotSupported => 405,
            ErrorCode::InternalServerError => 500,
        }
    }

    /// Returns true for errors caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error produced while resolving or invoking a procedure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct RpcError {
    pub code: ErrorCode,
    pub message: String,
}

impl RpcError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn method_not_supported(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MethodNotSupported, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalServerError, message)
    }
}

/// Errors raised while building a procedure table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// A procedure with this name is already registered.
    #[error("Duplicate procedure name: {0}")]
    DuplicateProcedure(String),

    /// The name is empty or contains a reserved separator.
    #[error("Invalid procedure name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },
}
