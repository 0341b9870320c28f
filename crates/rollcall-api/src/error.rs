//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// A required field is missing, empty, or malformed.
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("invalid email or password")]
  InvalidCredentials,

  /// No usable `Authorization: Bearer …` header.
  #[error("no token provided")]
  Unauthorized,

  /// A bearer token was present but did not verify.
  #[error("not authorized, invalid token")]
  InvalidToken,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  /// Wrap a backend failure, logging it first.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    tracing::error!(error = %e, "store operation failed");
    Self::Store(Box::new(e))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Validation(_) | Self::InvalidCredentials => StatusCode::BAD_REQUEST,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Unauthorized | Self::InvalidToken => StatusCode::UNAUTHORIZED,
      Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::Validation(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let challenge = match &self {
      Self::Unauthorized => Some("Bearer realm=\"rollcall\""),
      Self::InvalidToken => Some("Bearer realm=\"rollcall\", error=\"invalid_token\""),
      _ => None,
    };

    let mut res = (self.status(), Json(json!({ "error": self.to_string() }))).into_response();
    if let Some(challenge) = challenge {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
    }
    res
  }
}
