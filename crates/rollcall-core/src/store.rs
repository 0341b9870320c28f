//! The `TrackerStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `rollcall-store-sqlite`). The HTTP layer and the resolver/aggregator
//! functions in this crate depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  account::{Account, NewAccount},
  attendance::{AttendanceRecord, NewAttendance},
  routine::{ExtraSession, MergeOutcome, NewSubject, Weekday, WeeklyRoutineEntry},
};

/// Abstraction over a Rollcall storage backend.
///
/// Every method is scoped to a single user except the account lookups.
/// No referential integrity between attendance and subjects is expected of
/// the backend; callers check subject existence before writing.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TrackerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Persist a new account. Returns `None` if the email is already taken;
  /// the check and the insert are a single statement.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Retrieve an account by UUID. Returns `None` if not found.
  fn get_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Retrieve an account by its normalised email.
  fn find_account_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  // ── Weekly routine ────────────────────────────────────────────────────

  fn get_routine_entry(
    &self,
    user_id: Uuid,
    weekday: Weekday,
  ) -> impl Future<Output = Result<Option<WeeklyRoutineEntry>, Self::Error>> + Send + '_;

  /// All of a user's routine entries, in no particular order.
  fn list_routine_entries(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<WeeklyRoutineEntry>, Self::Error>> + Send + '_;

  /// Create the entry for `weekday` or merge `subjects` into it with
  /// [`crate::routine::merge_subjects`], atomically.
  fn merge_routine(
    &self,
    user_id: Uuid,
    weekday: Weekday,
    subjects: Vec<NewSubject>,
  ) -> impl Future<Output = Result<MergeOutcome, Self::Error>> + Send + '_;

  /// Remove every subject named `name` from the weekday's entry, atomically.
  ///
  /// Returns the updated entry, or `None` if there was no entry or no subject
  /// with that name. The entry itself is kept even when it becomes empty.
  fn remove_routine_subject(
    &self,
    user_id: Uuid,
    weekday: Weekday,
    name: String,
  ) -> impl Future<Output = Result<Option<WeeklyRoutineEntry>, Self::Error>> + Send + '_;

  // ── Extra sessions ────────────────────────────────────────────────────

  fn get_extra_session(
    &self,
    user_id: Uuid,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<ExtraSession>, Self::Error>> + Send + '_;

  fn list_extra_sessions(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ExtraSession>, Self::Error>> + Send + '_;

  /// Append `subjects` to the session for `date`, creating it if needed.
  fn append_extra_subjects(
    &self,
    user_id: Uuid,
    date: NaiveDate,
    subjects: Vec<NewSubject>,
  ) -> impl Future<Output = Result<ExtraSession, Self::Error>> + Send + '_;

  // ── Attendance ────────────────────────────────────────────────────────

  /// Insert or replace the record keyed by `(user, subject reference, date)`
  /// in a single conditional write. `updated_at` is set by the store.
  fn upsert_attendance(
    &self,
    input: NewAttendance,
  ) -> impl Future<Output = Result<AttendanceRecord, Self::Error>> + Send + '_;

  /// A user's attendance records, optionally restricted to one date.
  fn list_attendance(
    &self,
    user_id: Uuid,
    date: Option<NaiveDate>,
  ) -> impl Future<Output = Result<Vec<AttendanceRecord>, Self::Error>> + Send + '_;
}
