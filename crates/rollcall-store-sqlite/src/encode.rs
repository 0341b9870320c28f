//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`. Embedded subject lists are stored as compact JSON. UUIDs are
//! stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use rollcall_core::{
  account::Account,
  attendance::{AttendanceRecord, SubjectRef},
  routine::{ExtraSession, Subject, Weekday, WeeklyRoutineEntry},
};
use rusqlite::types::Type;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> / NaiveDate ────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Weekday ─────────────────────────────────────────────────────────────────

pub fn encode_weekday(w: Weekday) -> &'static str { w.as_str() }

pub fn decode_weekday(s: &str) -> Result<Weekday> { Ok(s.parse()?) }

// ─── Subjects (JSON column) ──────────────────────────────────────────────────
//
// These run inside `Connection::call` closures, so they report failures as
// `rusqlite::Error` rather than the crate error type.

pub fn subjects_to_sql(subjects: &[Subject]) -> rusqlite::Result<String> {
  serde_json::to_string(subjects)
    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub fn subjects_from_sql(json: &str) -> rusqlite::Result<Vec<Subject>> {
  serde_json::from_str(json)
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id:    String,
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawAccount {
  pub const COLUMNS: &'static str = "account_id, name, email, password_hash, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:    row.get(0)?,
      name:          row.get(1)?,
      email:         row.get(2)?,
      password_hash: row.get(3)?,
      created_at:    row.get(4)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id:    decode_uuid(&self.account_id)?,
      name:          self.name,
      email:         self.email,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `routine_entries` row.
pub struct RawRoutineEntry {
  pub entry_id:      String,
  pub user_id:       String,
  pub weekday:       String,
  pub subjects_json: String,
}

impl RawRoutineEntry {
  pub const COLUMNS: &'static str = "entry_id, user_id, weekday, subjects_json";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:      row.get(0)?,
      user_id:       row.get(1)?,
      weekday:       row.get(2)?,
      subjects_json: row.get(3)?,
    })
  }

  pub fn into_entry(self) -> Result<WeeklyRoutineEntry> {
    Ok(WeeklyRoutineEntry {
      entry_id: decode_uuid(&self.entry_id)?,
      user_id:  decode_uuid(&self.user_id)?,
      weekday:  decode_weekday(&self.weekday)?,
      subjects: serde_json::from_str(&self.subjects_json)?,
    })
  }
}

/// Raw strings read directly from an `extra_sessions` row.
pub struct RawExtraSession {
  pub session_id:    String,
  pub user_id:       String,
  pub date:          String,
  pub weekday:       String,
  pub subjects_json: String,
}

impl RawExtraSession {
  pub const COLUMNS: &'static str = "session_id, user_id, date, weekday, subjects_json";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_id:    row.get(0)?,
      user_id:       row.get(1)?,
      date:          row.get(2)?,
      weekday:       row.get(3)?,
      subjects_json: row.get(4)?,
    })
  }

  pub fn into_session(self) -> Result<ExtraSession> {
    Ok(ExtraSession {
      session_id: decode_uuid(&self.session_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      date:       decode_date(&self.date)?,
      weekday:    decode_weekday(&self.weekday)?,
      subjects:   serde_json::from_str(&self.subjects_json)?,
    })
  }
}

/// Raw values read directly from an `attendance` row.
pub struct RawAttendance {
  pub record_id:    String,
  pub user_id:      String,
  pub subject_key:  String,
  pub subject_name: String,
  pub date:         String,
  pub status:       bool,
  pub updated_at:   String,
}

impl RawAttendance {
  pub const COLUMNS: &'static str =
    "record_id, user_id, subject_key, subject_name, date, status, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:    row.get(0)?,
      user_id:      row.get(1)?,
      subject_key:  row.get(2)?,
      subject_name: row.get(3)?,
      date:         row.get(4)?,
      status:       row.get(5)?,
      updated_at:   row.get(6)?,
    })
  }

  pub fn into_record(self) -> Result<AttendanceRecord> {
    Ok(AttendanceRecord {
      record_id:    decode_uuid(&self.record_id)?,
      user_id:      decode_uuid(&self.user_id)?,
      subject:      SubjectRef::from_key(&self.subject_key)?,
      subject_name: self.subject_name,
      date:         decode_date(&self.date)?,
      status:       self.status,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}
