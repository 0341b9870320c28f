//! Weekly routines and extra sessions.
//!
//! A routine is stored as one [`WeeklyRoutineEntry`] per user per weekday,
//! each owning its subjects. Extra sessions are the date-scoped counterpart
//! for one-off classes. Neither has a global subject registry: a subject's
//! identity is only guaranteed unique within its parent.

use std::{collections::HashSet, fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, time::compare_tokens};

// ─── Weekday ─────────────────────────────────────────────────────────────────

/// A day of the week, serialised by its full English name. Ordered Monday
/// first.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Weekday {
  Monday,
  Tuesday,
  Wednesday,
  Thursday,
  Friday,
  Saturday,
  Sunday,
}

impl Weekday {
  pub const ALL: [Weekday; 7] = [
    Self::Monday,
    Self::Tuesday,
    Self::Wednesday,
    Self::Thursday,
    Self::Friday,
    Self::Saturday,
    Self::Sunday,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Monday => "Monday",
      Self::Tuesday => "Tuesday",
      Self::Wednesday => "Wednesday",
      Self::Thursday => "Thursday",
      Self::Friday => "Friday",
      Self::Saturday => "Saturday",
      Self::Sunday => "Sunday",
    }
  }

  /// The weekday a calendar date falls on.
  pub fn of(date: NaiveDate) -> Self {
    use chrono::Datelike as _;
    Self::from(date.weekday())
  }
}

impl From<chrono::Weekday> for Weekday {
  fn from(day: chrono::Weekday) -> Self {
    match day {
      chrono::Weekday::Mon => Self::Monday,
      chrono::Weekday::Tue => Self::Tuesday,
      chrono::Weekday::Wed => Self::Wednesday,
      chrono::Weekday::Thu => Self::Thursday,
      chrono::Weekday::Fri => Self::Friday,
      chrono::Weekday::Sat => Self::Saturday,
      chrono::Weekday::Sun => Self::Sunday,
    }
  }
}

impl fmt::Display for Weekday {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Weekday {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| Error::UnknownWeekday(s.to_owned()))
  }
}

// ─── Subjects ────────────────────────────────────────────────────────────────

/// One class slot: a name and a free-text time such as `"09:00-10:00"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
  /// Generated when the subject is first stored; never changes.
  pub subject_id: Uuid,
  pub name:       String,
  pub time:       String,
}

/// A subject as submitted by a client, before an identity is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubject {
  pub name: String,
  pub time: String,
}

impl NewSubject {
  pub fn new(name: impl Into<String>, time: impl Into<String>) -> Self {
    Self { name: name.into(), time: time.into() }
  }

  /// Assign a fresh identity.
  pub fn into_subject(self) -> Subject {
    Subject { subject_id: Uuid::new_v4(), name: self.name, time: self.time }
  }

  /// Whether both fields carry non-blank text.
  pub fn is_complete(&self) -> bool {
    !self.name.trim().is_empty() && !self.time.trim().is_empty()
  }
}

// ─── Parents ─────────────────────────────────────────────────────────────────

/// The recurring subjects for one user on one weekday.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRoutineEntry {
  pub entry_id: Uuid,
  pub user_id:  Uuid,
  pub weekday:  Weekday,
  pub subjects: Vec<Subject>,
}

/// One-off subjects for one user on one calendar date, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraSession {
  pub session_id: Uuid,
  pub user_id:    Uuid,
  pub date:       NaiveDate,
  pub weekday:    Weekday,
  pub subjects:   Vec<Subject>,
}

/// Result of [`crate::store::TrackerStore::merge_routine`].
#[derive(Debug, Clone)]
pub struct MergeOutcome {
  pub entry:   WeeklyRoutineEntry,
  /// `true` if the weekday had no entry before this merge.
  pub created: bool,
}

// ─── Merge / removal ─────────────────────────────────────────────────────────

/// Merge `incoming` into `existing`, keeping the first occurrence of every
/// exact `(name, time)` pair.
///
/// Existing subjects keep their identities; only genuinely new pairs receive
/// a fresh one, so merging the same input twice changes nothing.
pub fn merge_subjects(existing: Vec<Subject>, incoming: Vec<NewSubject>) -> Vec<Subject> {
  let mut seen: HashSet<(String, String)> = HashSet::new();
  let mut merged = Vec::with_capacity(existing.len() + incoming.len());

  for subject in existing {
    if seen.insert((subject.name.clone(), subject.time.clone())) {
      merged.push(subject);
    }
  }
  for new in incoming {
    if seen.insert((new.name.clone(), new.time.clone())) {
      merged.push(new.into_subject());
    }
  }

  merged
}

/// Remove every subject called `name`. Returns `true` if anything was removed.
pub fn remove_subject(subjects: &mut Vec<Subject>, name: &str) -> bool {
  let before = subjects.len();
  subjects.retain(|s| s.name != name);
  subjects.len() != before
}

/// Stable sort by parsed start time; unparseable times go last.
pub fn sort_by_start_time(subjects: &mut [Subject]) {
  subjects.sort_by(|a, b| compare_tokens(&a.time, &b.time));
}

/// Order a user's routine for display: weekdays Monday..Sunday, subjects by
/// start time within each day.
pub fn ordered(mut entries: Vec<WeeklyRoutineEntry>) -> Vec<WeeklyRoutineEntry> {
  entries.sort_by_key(|e| e.weekday);
  for entry in &mut entries {
    sort_by_start_time(&mut entry.subjects);
  }
  entries
}
