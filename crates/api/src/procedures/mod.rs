//! Procedures served by the gateway.

pub mod health;

pub use health::{Health, HealthStatus};

/// Builds the application's procedure table.
pub fn router() -> rpc::Router {
    rpc::Router::new().procedure("health", Health)
}
