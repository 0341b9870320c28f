//! Bearer-token extractor: the gate in front of every per-user route.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::Utc;
use rollcall_core::{account::Account, store::TrackerStore};

use crate::{AppState, error::ApiError};

/// The account a request was authenticated as. Taking this as a handler
/// argument makes the route require a valid bearer token.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let (scheme, token) = value.split_once(' ').ok_or(ApiError::Unauthorized)?;
  if !scheme.eq_ignore_ascii_case("bearer") {
    return Err(ApiError::Unauthorized);
  }

  let token = token.trim();
  if token.is_empty() {
    return Err(ApiError::Unauthorized);
  }
  Ok(token)
}

impl<S> FromRequestParts<AppState<S>> for CurrentAccount
where
  S: TrackerStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)?;

    let account_id = state.tokens.verify(token, Utc::now()).map_err(|e| {
      tracing::warn!(error = %e, "rejected bearer token");
      ApiError::InvalidToken
    })?;

    let account = state
      .store
      .get_account(account_id)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| {
        tracing::warn!(%account_id, "token for unknown account");
        ApiError::InvalidToken
      })?;

    Ok(Self(account))
  }
}
