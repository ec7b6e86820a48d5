//! Named remote procedures with a JSON request/response envelope.
//!
//! This crate provides:
//! - `Procedure` trait for handlers with explicit input and output shapes
//! - `Router`, the procedure table keyed by unique name
//! - `dispatch` for resolving single and batched calls into envelopes
//! - `ErrorCode`/`RpcError` describing per-request failures

pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod procedure;
pub mod router;

pub use dispatch::{Body, Call, Outcome, dispatch};
pub use envelope::Envelope;
pub use error::{ErrorCode, RouterError, RpcError};
pub use procedure::{Procedure, ProcedureKind};
pub use router::Router;
