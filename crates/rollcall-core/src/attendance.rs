//! Attendance records and the per-subject aggregator.

use std::{collections::HashMap, fmt};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error,
  routine::{ExtraSession, Subject, WeeklyRoutineEntry},
  store::TrackerStore,
};

// ─── Subject references ──────────────────────────────────────────────────────

/// How an attendance record points at its subject.
///
/// Serialises externally tagged, i.e. `{"subjectId": "…"}` or
/// `{"subjectName": "…"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectRef {
  #[serde(rename = "subjectId")]
  Id(Uuid),
  #[serde(rename = "subjectName")]
  Name(String),
}

impl SubjectRef {
  /// The canonical key stored in the uniqueness column.
  pub fn key(&self) -> String {
    match self {
      Self::Id(id) => format!("id:{}", id.hyphenated()),
      Self::Name(name) => format!("name:{name}"),
    }
  }

  /// Inverse of [`SubjectRef::key`].
  pub fn from_key(key: &str) -> crate::Result<Self> {
    if let Some(id) = key.strip_prefix("id:") {
      return Uuid::parse_str(id)
        .map(Self::Id)
        .map_err(|_| Error::MalformedSubjectRef(key.to_owned()));
    }
    if let Some(name) = key.strip_prefix("name:") {
      return Ok(Self::Name(name.to_owned()));
    }
    Err(Error::MalformedSubjectRef(key.to_owned()))
  }

  /// Whether this reference addresses `subject`.
  pub fn matches(&self, subject: &Subject) -> bool {
    match self {
      Self::Id(id) => subject.subject_id == *id,
      Self::Name(name) => subject.name == *name,
    }
  }
}

impl fmt::Display for SubjectRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Id(id) => write!(f, "subject {id}"),
      Self::Name(name) => write!(f, "subject {name:?}"),
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// The present/absent status of one subject on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
  pub record_id:    Uuid,
  pub user_id:      Uuid,
  /// The reference the record was marked with; part of the unique key.
  pub subject:      SubjectRef,
  /// Name of the subject the reference resolved to when marked.
  pub subject_name: String,
  pub date:         NaiveDate,
  /// `true` = present.
  pub status:       bool,
  /// Server-assigned; bumped on every re-mark.
  pub updated_at:   DateTime<Utc>,
}

/// Input to [`TrackerStore::upsert_attendance`].
#[derive(Debug, Clone)]
pub struct NewAttendance {
  pub user_id:      Uuid,
  pub subject:      SubjectRef,
  pub subject_name: String,
  pub date:         NaiveDate,
  pub status:       bool,
}

/// Find the subject `reference` points at anywhere in a user's routine or
/// extra sessions. Routine subjects are searched first.
pub fn locate_subject<'a>(
  reference: &SubjectRef,
  routine: &'a [WeeklyRoutineEntry],
  extras: &'a [ExtraSession],
) -> Option<&'a Subject> {
  routine
    .iter()
    .flat_map(|e| e.subjects.iter())
    .chain(extras.iter().flat_map(|s| s.subjects.iter()))
    .find(|s| reference.matches(s))
}

/// Mark `reference` present or absent on `date`, replacing any earlier mark
/// for the same key.
///
/// Returns `None` when the reference does not resolve to a subject in the
/// user's routine or extra sessions; nothing is written in that case.
pub async fn mark<S: TrackerStore>(
  store: &S,
  user_id: Uuid,
  reference: SubjectRef,
  status: bool,
  date: NaiveDate,
) -> Result<Option<AttendanceRecord>, S::Error> {
  let routine = store.list_routine_entries(user_id).await?;
  let extras = store.list_extra_sessions(user_id).await?;

  let Some(subject) = locate_subject(&reference, &routine, &extras) else {
    return Ok(None);
  };

  let input = NewAttendance {
    user_id,
    subject_name: subject.name.clone(),
    subject: reference,
    date,
    status,
  };
  store.upsert_attendance(input).await.map(Some)
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Attendance totals for one subject name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummary {
  pub subject_name:          String,
  pub total_classes:         u32,
  pub attended_classes:      u32,
  /// Two decimal places, e.g. `"66.67"`; `"0.00"` when there are no classes.
  pub attendance_percentage: String,
}

/// `attended / total × 100` to two decimal places, halves rounded up.
pub fn percentage(attended: u32, total: u32) -> String {
  if total == 0 {
    return "0.00".to_owned();
  }
  // Integer hundredths of a percent, so `1/32` is exactly 3.125 -> "3.13".
  let (attended, total) = (u64::from(attended), u64::from(total));
  let hundredths = (attended * 20_000 + total) / (2 * total);
  format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

/// Summarise attendance for every distinct subject name in `routine`.
///
/// Names appear in first-seen order. Records are grouped by the resolved
/// subject name, regardless of which weekday or identity they were marked
/// against; records for names outside the routine are ignored.
pub fn aggregate(
  routine: &[WeeklyRoutineEntry],
  records: &[AttendanceRecord],
) -> Vec<SubjectSummary> {
  let mut index: HashMap<&str, usize> = HashMap::new();
  let mut tallies: Vec<(&str, u32, u32)> = Vec::new();

  for subject in routine.iter().flat_map(|e| e.subjects.iter()) {
    index.entry(subject.name.as_str()).or_insert_with(|| {
      tallies.push((subject.name.as_str(), 0, 0));
      tallies.len() - 1
    });
  }

  for record in records {
    if let Some(&i) = index.get(record.subject_name.as_str()) {
      let tally = &mut tallies[i];
      tally.1 += 1;
      if record.status {
        tally.2 += 1;
      }
    }
  }

  tallies
    .into_iter()
    .map(|(name, total, attended)| SubjectSummary {
      subject_name:          name.to_owned(),
      total_classes:         total,
      attended_classes:      attended,
      attendance_percentage: percentage(attended, total),
    })
    .collect()
}

/// Load a user's routine and attendance and [`aggregate`] them.
pub async fn summarize<S: TrackerStore>(
  store: &S,
  user_id: Uuid,
) -> Result<Vec<SubjectSummary>, S::Error> {
  let mut routine = store.list_routine_entries(user_id).await?;
  if routine.iter().all(|e| e.subjects.is_empty()) {
    return Ok(Vec::new());
  }
  routine.sort_by_key(|e| e.weekday);

  let records = store.list_attendance(user_id, None).await?;
  Ok(aggregate(&routine, &records))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::routine::{NewSubject, Weekday};

  fn entry(weekday: Weekday, subjects: &[(&str, &str)]) -> WeeklyRoutineEntry {
    WeeklyRoutineEntry {
      entry_id: Uuid::new_v4(),
      user_id: Uuid::nil(),
      weekday,
      subjects: subjects
        .iter()
        .map(|(n, t)| NewSubject::new(*n, *t).into_subject())
        .collect(),
    }
  }

  fn record(name: &str, day: u32, status: bool) -> AttendanceRecord {
    AttendanceRecord {
      record_id: Uuid::new_v4(),
      user_id: Uuid::nil(),
      subject: SubjectRef::Name(name.to_owned()),
      subject_name: name.to_owned(),
      date: NaiveDate::from_ymd_opt(2024, 9, day).unwrap(),
      status,
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn percentage_formatting() {
    assert_eq!(percentage(0, 0), "0.00");
    assert_eq!(percentage(2, 3), "66.67");
    assert_eq!(percentage(1, 3), "33.33");
    assert_eq!(percentage(3, 3), "100.00");
    assert_eq!(percentage(0, 4), "0.00");
  }

  #[test]
  fn percentage_rounds_halves_up() {
    assert_eq!(percentage(1, 32), "3.13");
    assert_eq!(percentage(3, 32), "9.38");
    assert_eq!(percentage(5, 32), "15.63");
    assert_eq!(percentage(1, 160), "0.63");
    assert_eq!(percentage(1, 8), "12.50");
    assert_eq!(percentage(1, 6), "16.67");
  }

  #[test]
  fn subject_without_records_reports_zero() {
    let routine = [entry(Weekday::Monday, &[("History", "9:00")])];
    let summary = aggregate(&routine, &[]);
    assert_eq!(summary, vec![SubjectSummary {
      subject_name:          "History".into(),
      total_classes:         0,
      attended_classes:      0,
      attendance_percentage: "0.00".into(),
    }]);
  }

  #[test]
  fn counts_present_and_absent() {
    let routine = [entry(Weekday::Tuesday, &[("Physics", "10:00")])];
    let records = [
      record("Physics", 3, true),
      record("Physics", 10, false),
      record("Physics", 17, true),
    ];
    let summary = aggregate(&routine, &records);
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].total_classes, 3);
    assert_eq!(summary[0].attended_classes, 2);
    assert_eq!(summary[0].attendance_percentage, "66.67");
  }

  #[test]
  fn same_name_on_several_days_is_one_row() {
    let routine = [
      entry(Weekday::Monday, &[("Math", "9:00"), ("Art", "11:00")]),
      entry(Weekday::Wednesday, &[("Math", "13:00")]),
    ];
    let records = [record("Math", 2, true), record("Math", 4, true)];
    let summary = aggregate(&routine, &records);
    let names: Vec<_> = summary.iter().map(|s| s.subject_name.as_str()).collect();
    assert_eq!(names, ["Math", "Art"]);
    assert_eq!(summary[0].total_classes, 2);
  }

  #[test]
  fn records_outside_routine_are_ignored() {
    let routine = [entry(Weekday::Monday, &[("Math", "9:00")])];
    let summary = aggregate(&routine, &[record("Chemistry", 2, true)]);
    assert_eq!(summary[0].total_classes, 0);
  }

  #[test]
  fn empty_routine_yields_nothing() {
    assert!(aggregate(&[], &[record("Math", 2, true)]).is_empty());
  }

  #[test]
  fn subject_ref_key_roundtrip() {
    let id = Uuid::new_v4();
    for r in [SubjectRef::Id(id), SubjectRef::Name("id:odd name".into())] {
      assert_eq!(SubjectRef::from_key(&r.key()).unwrap(), r);
    }
    assert!(SubjectRef::from_key("subject:Math").is_err());
    assert!(SubjectRef::from_key("id:not-a-uuid").is_err());
  }

  #[test]
  fn subject_ref_wire_format() {
    let json = serde_json::to_value(SubjectRef::Name("Math".into())).unwrap();
    assert_eq!(json, serde_json::json!({ "subjectName": "Math" }));
  }

  #[test]
  fn locate_prefers_routine_then_extras() {
    let routine = [entry(Weekday::Monday, &[("Math", "9:00")])];
    let extra = ExtraSession {
      session_id: Uuid::new_v4(),
      user_id:    Uuid::nil(),
      date:       NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
      weekday:    Weekday::Monday,
      subjects:   vec![NewSubject::new("Lab", "15:00").into_subject()],
    };
    let extras = [extra];

    let by_name = SubjectRef::Name("Lab".into());
    assert_eq!(locate_subject(&by_name, &routine, &extras).unwrap().name, "Lab");

    let math_id = routine[0].subjects[0].subject_id;
    let by_id = SubjectRef::Id(math_id);
    assert_eq!(locate_subject(&by_id, &routine, &extras).unwrap().name, "Math");

    let missing = SubjectRef::Id(Uuid::new_v4());
    assert!(locate_subject(&missing, &routine, &extras).is_none());
  }
}
