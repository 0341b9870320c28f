//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | Body: `{"name","email","password"}`; 201, 409 if the email is taken |
//! | `POST` | `/auth/login` | Body: `{"email","password"}`; 400 on bad credentials |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use rollcall_core::{
  account::{Account, NewAccount, normalize_email},
  store::TrackerStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  error::ApiError,
  password::{hash_password, verify_password},
};

/// Returned by both register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
  pub token: String,
  pub user:  Account,
}

fn issue<S: TrackerStore>(state: &AppState<S>, account: Account) -> Result<AuthResponse, ApiError> {
  let token = state
    .tokens
    .issue(account.account_id, Utc::now())
    .map_err(|e| ApiError::Internal(e.to_string()))?;
  Ok(AuthResponse { token, user: account })
}

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub name:     String,
  pub email:    String,
  pub password: String,
}

/// `POST /auth/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<RegisterBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TrackerStore + Clone + Send + Sync + 'static,
{
  let Json(body) = body?;

  let name = body.name.trim();
  let email = normalize_email(&body.email);
  if name.is_empty() || body.password.is_empty() {
    return Err(ApiError::Validation("name, email and password are required".into()));
  }
  if !email.contains('@') {
    return Err(ApiError::Validation(format!("invalid email address: {:?}", body.email)));
  }

  let input = NewAccount {
    name:          name.to_owned(),
    email:         email.clone(),
    password_hash: hash_password(&body.password)?,
  };

  let account = state
    .store
    .create_account(input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::Conflict("email already exists".into()))?;

  tracing::info!(account_id = %account.account_id, %email, "registered account");
  Ok((StatusCode::CREATED, Json(issue(&state, account)?)))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError>
where
  S: TrackerStore + Clone + Send + Sync + 'static,
{
  let Json(body) = body?;
  let email = normalize_email(&body.email);

  let account = state
    .store
    .find_account_by_email(&email)
    .await
    .map_err(ApiError::store)?
    .filter(|a| verify_password(&body.password, &a.password_hash))
    .ok_or_else(|| {
      tracing::warn!(%email, "failed login");
      ApiError::InvalidCredentials
    })?;

  tracing::info!(account_id = %account.account_id, "logged in");
  Ok(Json(issue(&state, account)?))
}
