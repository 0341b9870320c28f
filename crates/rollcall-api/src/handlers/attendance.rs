//! Handlers for `/attendance` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/attendance/mark` | Body: `{"subjectId"\|"subjectName", "status", "date"?}`; 404 for unknown subjects |
//! | `GET`  | `/attendance/get` | Per-subject totals and percentage |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use chrono::NaiveDate;
use rollcall_core::{
  attendance::{self, AttendanceRecord, SubjectRef, SubjectSummary},
  store::TrackerStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::CurrentAccount, error::ApiError};

// ─── Mark ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkBody {
  pub subject_id:   Option<Uuid>,
  #[serde(alias = "subjectname")]
  pub subject_name: Option<String>,
  /// `true` = present.
  pub status:       bool,
  /// Defaults to the server's current date.
  pub date:         Option<NaiveDate>,
}

impl MarkBody {
  fn reference(&self) -> Result<SubjectRef, ApiError> {
    match (self.subject_id, &self.subject_name) {
      (Some(id), None) => Ok(SubjectRef::Id(id)),
      (None, Some(name)) if !name.trim().is_empty() => Ok(SubjectRef::Name(name.clone())),
      (Some(_), Some(_)) => Err(ApiError::Validation(
        "give either subjectId or subjectName, not both".into(),
      )),
      _ => Err(ApiError::Validation("subjectId or subjectName is required".into())),
    }
  }
}

/// `POST /attendance/mark`
pub async fn mark<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(account): CurrentAccount,
  body: Result<Json<MarkBody>, JsonRejection>,
) -> Result<Json<AttendanceRecord>, ApiError>
where
  S: TrackerStore + Clone + Send + Sync + 'static,
{
  let Json(body) = body?;
  let reference = body.reference()?;
  let date = body.date.unwrap_or_else(|| state.clock.today());

  let record = attendance::mark(
    state.store.as_ref(),
    account.account_id,
    reference.clone(),
    body.status,
    date,
  )
  .await
  .map_err(ApiError::store)?
  .ok_or_else(|| ApiError::NotFound(format!("{reference} not found in your routine")))?;

  tracing::info!(
    account_id = %account.account_id,
    subject = %record.subject_name,
    %date,
    present = record.status,
    "attendance marked"
  );
  Ok(Json(record))
}

// ─── Summary ──────────────────────────────────────────────────────────────────

/// `GET /attendance/get`
pub async fn summary<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(account): CurrentAccount,
) -> Result<Json<Vec<SubjectSummary>>, ApiError>
where
  S: TrackerStore + Clone + Send + Sync + 'static,
{
  let summary = attendance::summarize(state.store.as_ref(), account.account_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(summary))
}
