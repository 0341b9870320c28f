//! Today's schedule: the weekday's routine merged with the date's extra
//! session, annotated with attendance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  attendance::{AttendanceRecord, SubjectRef},
  routine::{ExtraSession, Subject, WeeklyRoutineEntry, Weekday, sort_by_start_time},
  store::TrackerStore,
};

/// The day a schedule is resolved for. Supplied by the caller so resolution
/// never reads the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Today {
  pub weekday: Weekday,
  pub date:    NaiveDate,
}

impl Today {
  pub fn new(date: NaiveDate) -> Self { Self { weekday: Weekday::of(date), date } }
}

/// Where a scheduled subject came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectSource {
  Routine,
  Extra,
}

/// A subject scheduled for today with its attendance, if marked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedSubject {
  pub subject_id: Uuid,
  pub name:       String,
  pub time:       String,
  pub source:     SubjectSource,
  /// `None` when no attendance has been marked today.
  pub attendance: Option<bool>,
}

/// Build today's list from already-fetched data.
///
/// Routine subjects come first, sorted by start time; extra subjects follow
/// in insertion order whatever their time. Each subject picks up the status
/// of a record addressed to its identity, falling back to one addressed to
/// its name.
pub fn annotate(
  routine: Option<&WeeklyRoutineEntry>,
  extra: Option<&ExtraSession>,
  records: &[AttendanceRecord],
) -> Vec<AnnotatedSubject> {
  let mut recurring: Vec<Subject> =
    routine.map(|e| e.subjects.clone()).unwrap_or_default();
  sort_by_start_time(&mut recurring);

  let extras = extra.map(|s| s.subjects.as_slice()).unwrap_or_default();

  let status_for = |subject: &Subject| -> Option<bool> {
    let by_id = SubjectRef::Id(subject.subject_id);
    let by_name = SubjectRef::Name(subject.name.clone());
    records
      .iter()
      .find(|r| r.subject == by_id)
      .or_else(|| records.iter().find(|r| r.subject == by_name))
      .map(|r| r.status)
  };

  let tagged = recurring
    .iter()
    .map(|s| (s, SubjectSource::Routine))
    .chain(extras.iter().map(|s| (s, SubjectSource::Extra)));

  tagged
    .map(|(subject, source)| AnnotatedSubject {
      subject_id: subject.subject_id,
      name: subject.name.clone(),
      time: subject.time.clone(),
      source,
      attendance: status_for(subject),
    })
    .collect()
}

/// Resolve the subjects `user_id` has on `today`.
///
/// A missing routine entry or extra session is not an error; with neither the
/// result is simply empty.
pub async fn resolve_today<S: TrackerStore>(
  store: &S,
  user_id: Uuid,
  today: Today,
) -> Result<Vec<AnnotatedSubject>, S::Error> {
  let routine = store.get_routine_entry(user_id, today.weekday).await?;
  let extra = store.get_extra_session(user_id, today.date).await?;

  if routine.is_none() && extra.is_none() {
    return Ok(Vec::new());
  }

  let records = store.list_attendance(user_id, Some(today.date)).await?;
  Ok(annotate(routine.as_ref(), extra.as_ref(), &records))
}
