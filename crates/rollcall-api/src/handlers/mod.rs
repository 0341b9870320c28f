//! JSON handlers, one module per resource.

pub mod accounts;
pub mod attendance;
pub mod routine;

/// `GET /`: liveness check.
pub async fn root() -> &'static str { "rollcall server" }
