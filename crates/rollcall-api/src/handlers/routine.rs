//! Handlers for `/routine` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/routine/add` | Body: `{"day":"Monday","subjects":[{"name","time"}]}`; 201 created, 200 merged |
//! | `GET`    | `/routine/get` | Entries Monday..Sunday, subjects by start time |
//! | `DELETE` | `/routine/delete` | Body: `{"day","subjectName"}`; 404 if absent |
//! | `POST`   | `/routine/extra` | Body: `{"name","time"}`; appends to today's extra session |
//! | `GET`    | `/routine/today-subjects` | Today's routine + extras with attendance |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use rollcall_core::{
  routine::{self, ExtraSession, NewSubject, Weekday, WeeklyRoutineEntry},
  schedule::{self, AnnotatedSubject, Today},
  store::TrackerStore,
};
use serde::Deserialize;

use crate::{AppState, auth::CurrentAccount, error::ApiError};

fn validate_subjects(subjects: &[NewSubject]) -> Result<(), ApiError> {
  if subjects.is_empty() {
    return Err(ApiError::Validation("day and subjects are required".into()));
  }
  if let Some(bad) = subjects.iter().find(|s| !s.is_complete()) {
    return Err(ApiError::Validation(format!(
      "every subject needs a name and a time, got {bad:?}"
    )));
  }
  Ok(())
}

// ─── Add ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddBody {
  pub day:      Weekday,
  pub subjects: Vec<NewSubject>,
}

/// `POST /routine/add`
pub async fn add<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(account): CurrentAccount,
  body: Result<Json<AddBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TrackerStore + Clone + Send + Sync + 'static,
{
  let Json(body) = body?;
  validate_subjects(&body.subjects)?;

  let outcome = state
    .store
    .merge_routine(account.account_id, body.day, body.subjects)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(
    account_id = %account.account_id,
    day = %body.day,
    subjects = outcome.entry.subjects.len(),
    created = outcome.created,
    "routine updated"
  );

  let status = if outcome.created { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(outcome.entry)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /routine/get`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(account): CurrentAccount,
) -> Result<Json<Vec<WeeklyRoutineEntry>>, ApiError>
where
  S: TrackerStore + Clone + Send + Sync + 'static,
{
  let entries = state
    .store
    .list_routine_entries(account.account_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(routine::ordered(entries)))
}

// ─── Delete subject ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBody {
  pub day:          Weekday,
  pub subject_name: String,
}

/// `DELETE /routine/delete`
pub async fn delete_subject<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(account): CurrentAccount,
  body: Result<Json<DeleteBody>, JsonRejection>,
) -> Result<Json<WeeklyRoutineEntry>, ApiError>
where
  S: TrackerStore + Clone + Send + Sync + 'static,
{
  let Json(DeleteBody { day, subject_name }) = body?;
  if subject_name.trim().is_empty() {
    return Err(ApiError::Validation("subjectName is required".into()));
  }

  let entry = state
    .store
    .remove_routine_subject(account.account_id, day, subject_name.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("subject {subject_name:?} not found in {day} routine"))
    })?;

  tracing::info!(account_id = %account.account_id, %day, subject = %subject_name, "subject removed");
  Ok(Json(entry))
}

// ─── Extra session ────────────────────────────────────────────────────────────

/// `POST /routine/extra`
pub async fn add_extra<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(account): CurrentAccount,
  body: Result<Json<NewSubject>, JsonRejection>,
) -> Result<(StatusCode, Json<ExtraSession>), ApiError>
where
  S: TrackerStore + Clone + Send + Sync + 'static,
{
  let Json(subject) = body?;
  if !subject.is_complete() {
    return Err(ApiError::Validation("name and time are required".into()));
  }

  let date = state.clock.today();
  let session = state
    .store
    .append_extra_subjects(account.account_id, date, vec![subject])
    .await
    .map_err(ApiError::store)?;

  tracing::info!(account_id = %account.account_id, %date, "extra class added");
  Ok((StatusCode::CREATED, Json(session)))
}

// ─── Today ────────────────────────────────────────────────────────────────────

/// `GET /routine/today-subjects`
pub async fn today<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(account): CurrentAccount,
) -> Result<Json<Vec<AnnotatedSubject>>, ApiError>
where
  S: TrackerStore + Clone + Send + Sync + 'static,
{
  let today = Today::new(state.clock.today());
  let subjects = schedule::resolve_today(state.store.as_ref(), account.account_id, today)
    .await
    .map_err(ApiError::store)?;

  tracing::debug!(
    account_id = %account.account_id,
    day = %today.weekday,
    count = subjects.len(),
    "resolved today's subjects"
  );
  Ok(Json(subjects))
}
