//! Integration tests for `SqliteStore` against an in-memory database,
//! including the resolver and aggregator driven through the store.

use chrono::NaiveDate;
use rollcall_core::{
  account::NewAccount,
  attendance::{self, NewAttendance, SubjectRef},
  routine::{NewSubject, Weekday},
  schedule::{self, SubjectSource, Today},
  store::TrackerStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// 2024-09-02 is a Monday.
fn monday() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 9, 2).unwrap() }

fn new_account(email: &str) -> NewAccount {
  NewAccount {
    name:          "Ada".into(),
    email:         email.into(),
    password_hash: "$argon2id$v=19$placeholder".into(),
  }
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_account() {
  let s = store().await;

  let account = s
    .create_account(new_account("ada@example.com"))
    .await
    .unwrap()
    .expect("fresh email");

  let by_id = s.get_account(account.account_id).await.unwrap().unwrap();
  assert_eq!(by_id.email, "ada@example.com");
  assert_eq!(by_id.password_hash, account.password_hash);

  let by_email = s.find_account_by_email("ada@example.com").await.unwrap().unwrap();
  assert_eq!(by_email.account_id, account.account_id);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  s.create_account(new_account("ada@example.com")).await.unwrap();
  let second = s.create_account(new_account("ada@example.com")).await.unwrap();
  assert!(second.is_none());
}

#[tokio::test]
async fn missing_account_returns_none() {
  let s = store().await;
  assert!(s.get_account(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.find_account_by_email("nobody@example.com").await.unwrap().is_none());
}

// ─── Routine ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_merge_creates_entry() {
  let s = store().await;
  let user = Uuid::new_v4();

  let outcome = s
    .merge_routine(user, Weekday::Monday, vec![NewSubject::new("Math", "9:00")])
    .await
    .unwrap();
  assert!(outcome.created);
  assert_eq!(outcome.entry.subjects.len(), 1);

  let fetched = s.get_routine_entry(user, Weekday::Monday).await.unwrap().unwrap();
  assert_eq!(fetched.entry_id, outcome.entry.entry_id);
  assert_eq!(fetched.subjects, outcome.entry.subjects);
}

#[tokio::test]
async fn repeated_merge_is_deduplicated() {
  let s = store().await;
  let user = Uuid::new_v4();
  let math = || vec![NewSubject::new("Math", "9:00")];

  let first = s.merge_routine(user, Weekday::Monday, math()).await.unwrap();
  let second = s.merge_routine(user, Weekday::Monday, math()).await.unwrap();

  assert!(!second.created);
  assert_eq!(second.entry.entry_id, first.entry.entry_id);
  assert_eq!(second.entry.subjects.len(), 1);
  assert_eq!(second.entry.subjects[0].subject_id, first.entry.subjects[0].subject_id);
}

#[tokio::test]
async fn merge_appends_new_subjects() {
  let s = store().await;
  let user = Uuid::new_v4();

  s.merge_routine(user, Weekday::Tuesday, vec![NewSubject::new("Math", "9:00")])
    .await
    .unwrap();
  let outcome = s
    .merge_routine(user, Weekday::Tuesday, vec![
      NewSubject::new("Math", "9:00"),
      NewSubject::new("Physics", "10:00"),
    ])
    .await
    .unwrap();

  let names: Vec<_> = outcome.entry.subjects.iter().map(|s| s.name.as_str()).collect();
  assert_eq!(names, ["Math", "Physics"]);
}

#[tokio::test]
async fn routines_are_scoped_per_user() {
  let s = store().await;
  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();

  s.merge_routine(alice, Weekday::Monday, vec![NewSubject::new("Math", "9:00")])
    .await
    .unwrap();

  assert!(s.get_routine_entry(bob, Weekday::Monday).await.unwrap().is_none());
  assert!(s.list_routine_entries(bob).await.unwrap().is_empty());
  assert_eq!(s.list_routine_entries(alice).await.unwrap().len(), 1);
}

#[tokio::test]
async fn remove_subject_keeps_entry() {
  let s = store().await;
  let user = Uuid::new_v4();
  s.merge_routine(user, Weekday::Friday, vec![NewSubject::new("Art", "14:00")])
    .await
    .unwrap();

  let updated = s
    .remove_routine_subject(user, Weekday::Friday, "Art".into())
    .await
    .unwrap()
    .expect("subject existed");
  assert!(updated.subjects.is_empty());

  let fetched = s.get_routine_entry(user, Weekday::Friday).await.unwrap();
  assert!(fetched.is_some_and(|e| e.subjects.is_empty()));
}

#[tokio::test]
async fn remove_missing_subject_returns_none() {
  let s = store().await;
  let user = Uuid::new_v4();

  let no_entry = s
    .remove_routine_subject(user, Weekday::Friday, "Art".into())
    .await
    .unwrap();
  assert!(no_entry.is_none());

  s.merge_routine(user, Weekday::Friday, vec![NewSubject::new("Art", "14:00")])
    .await
    .unwrap();
  let no_subject = s
    .remove_routine_subject(user, Weekday::Friday, "Music".into())
    .await
    .unwrap();
  assert!(no_subject.is_none());
}

// ─── Extra sessions ──────────────────────────────────────────────────────────

#[tokio::test]
async fn extra_subjects_append_in_order() {
  let s = store().await;
  let user = Uuid::new_v4();

  let first = s
    .append_extra_subjects(user, monday(), vec![NewSubject::new("Seminar", "16:00")])
    .await
    .unwrap();
  assert_eq!(first.weekday, Weekday::Monday);

  let second = s
    .append_extra_subjects(user, monday(), vec![NewSubject::new("Lab", "08:00")])
    .await
    .unwrap();
  assert_eq!(second.session_id, first.session_id);

  let fetched = s.get_extra_session(user, monday()).await.unwrap().unwrap();
  let names: Vec<_> = fetched.subjects.iter().map(|s| s.name.as_str()).collect();
  assert_eq!(names, ["Seminar", "Lab"]);

  let other_day = monday().succ_opt().unwrap();
  assert!(s.get_extra_session(user, other_day).await.unwrap().is_none());
  assert_eq!(s.list_extra_sessions(user).await.unwrap().len(), 1);
}

// ─── Attendance ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_replaces_status_without_duplicating() {
  let s = store().await;
  let user = Uuid::new_v4();
  let mark = |status| NewAttendance {
    user_id: user,
    subject: SubjectRef::Name("Math".into()),
    subject_name: "Math".into(),
    date: monday(),
    status,
  };

  let first = s.upsert_attendance(mark(true)).await.unwrap();
  let second = s.upsert_attendance(mark(false)).await.unwrap();
  assert_eq!(second.record_id, first.record_id);
  assert!(!second.status);

  let records = s.list_attendance(user, None).await.unwrap();
  assert_eq!(records.len(), 1);
  assert!(!records[0].status);
}

#[tokio::test]
async fn concurrent_upserts_on_one_key_leave_one_record() {
  let s = store().await;
  let user = Uuid::new_v4();
  let mark = |status| NewAttendance {
    user_id: user,
    subject: SubjectRef::Name("Math".into()),
    subject_name: "Math".into(),
    date: monday(),
    status,
  };

  let (a, b) = tokio::join!(
    s.upsert_attendance(mark(true)),
    s.upsert_attendance(mark(false))
  );
  let (a, b) = (a.unwrap(), b.unwrap());
  assert_eq!(a.record_id, b.record_id);

  let records = s.list_attendance(user, None).await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].record_id, a.record_id);
}

#[tokio::test]
async fn list_attendance_filters_by_date() {
  let s = store().await;
  let user = Uuid::new_v4();
  for date in [monday(), monday().succ_opt().unwrap()] {
    s.upsert_attendance(NewAttendance {
      user_id: user,
      subject: SubjectRef::Name("Math".into()),
      subject_name: "Math".into(),
      date,
      status: true,
    })
    .await
    .unwrap();
  }

  assert_eq!(s.list_attendance(user, None).await.unwrap().len(), 2);
  let today = s.list_attendance(user, Some(monday())).await.unwrap();
  assert_eq!(today.len(), 1);
  assert_eq!(today[0].date, monday());
}

#[tokio::test]
async fn marking_same_key_repeatedly_keeps_one_record() {
  let s = store().await;
  let user = Uuid::new_v4();
  s.merge_routine(user, Weekday::Monday, vec![NewSubject::new("Math", "9:00")])
    .await
    .unwrap();

  for _ in 0..5 {
    attendance::mark(&s, user, SubjectRef::Name("Math".into()), true, monday())
      .await
      .unwrap()
      .expect("subject exists");
  }

  let records = s.list_attendance(user, None).await.unwrap();
  assert_eq!(records.len(), 1);
  assert!(records[0].status);
}

#[tokio::test]
async fn marking_unknown_subject_writes_nothing() {
  let s = store().await;
  let user = Uuid::new_v4();
  s.merge_routine(user, Weekday::Monday, vec![NewSubject::new("Math", "9:00")])
    .await
    .unwrap();

  let by_id = attendance::mark(&s, user, SubjectRef::Id(Uuid::new_v4()), true, monday())
    .await
    .unwrap();
  assert!(by_id.is_none());

  let by_name = attendance::mark(&s, user, SubjectRef::Name("Chemistry".into()), true, monday())
    .await
    .unwrap();
  assert!(by_name.is_none());

  assert!(s.list_attendance(user, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn extra_subjects_can_be_marked_by_id() {
  let s = store().await;
  let user = Uuid::new_v4();
  let session = s
    .append_extra_subjects(user, monday(), vec![NewSubject::new("Seminar", "16:00")])
    .await
    .unwrap();
  let id = session.subjects[0].subject_id;

  let record = attendance::mark(&s, user, SubjectRef::Id(id), true, monday())
    .await
    .unwrap()
    .expect("extra subject exists");
  assert_eq!(record.subject_name, "Seminar");
  assert_eq!(record.subject, SubjectRef::Id(id));
}

// ─── Schedule resolution ─────────────────────────────────────────────────────

#[tokio::test]
async fn empty_day_resolves_to_empty_list() {
  let s = store().await;
  let list = schedule::resolve_today(&s, Uuid::new_v4(), Today::new(monday()))
    .await
    .unwrap();
  assert!(list.is_empty());
}

#[tokio::test]
async fn today_orders_routine_then_extras_with_attendance() {
  let s = store().await;
  let user = Uuid::new_v4();

  let entry = s
    .merge_routine(user, Weekday::Monday, vec![
      NewSubject::new("Chemistry", "10:00"),
      NewSubject::new("Biology", "09:00"),
    ])
    .await
    .unwrap()
    .entry;
  s.append_extra_subjects(user, monday(), vec![NewSubject::new("Seminar", "08:00")])
    .await
    .unwrap();
  // A different weekday must not leak into Monday's schedule.
  s.merge_routine(user, Weekday::Tuesday, vec![NewSubject::new("Art", "07:00")])
    .await
    .unwrap();

  let chemistry = entry.subjects.iter().find(|s| s.name == "Chemistry").unwrap();
  attendance::mark(&s, user, SubjectRef::Id(chemistry.subject_id), false, monday())
    .await
    .unwrap()
    .unwrap();
  attendance::mark(&s, user, SubjectRef::Name("Seminar".into()), true, monday())
    .await
    .unwrap()
    .unwrap();

  let list = schedule::resolve_today(&s, user, Today::new(monday())).await.unwrap();
  let summary: Vec<_> = list
    .iter()
    .map(|a| (a.name.as_str(), a.time.as_str(), a.source, a.attendance))
    .collect();
  assert_eq!(summary, [
    ("Biology", "09:00", SubjectSource::Routine, None),
    ("Chemistry", "10:00", SubjectSource::Routine, Some(false)),
    ("Seminar", "08:00", SubjectSource::Extra, Some(true)),
  ]);
}

#[tokio::test]
async fn attendance_on_other_dates_is_not_joined() {
  let s = store().await;
  let user = Uuid::new_v4();
  s.merge_routine(user, Weekday::Monday, vec![NewSubject::new("Math", "9:00")])
    .await
    .unwrap();

  let last_week = monday().pred_opt().unwrap().pred_opt().unwrap();
  attendance::mark(&s, user, SubjectRef::Name("Math".into()), true, last_week)
    .await
    .unwrap()
    .unwrap();

  let list = schedule::resolve_today(&s, user, Today::new(monday())).await.unwrap();
  assert_eq!(list.len(), 1);
  assert_eq!(list[0].attendance, None);
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn summary_counts_by_name() {
  let s = store().await;
  let user = Uuid::new_v4();
  s.merge_routine(user, Weekday::Wednesday, vec![
    NewSubject::new("Physics", "10:00"),
    NewSubject::new("History", "12:00"),
  ])
  .await
  .unwrap();

  let wednesday = NaiveDate::from_ymd_opt(2024, 9, 4).unwrap();
  for (week, status) in [(0, true), (1, false), (2, true)] {
    let date = wednesday + chrono::Days::new(7 * week);
    attendance::mark(&s, user, SubjectRef::Name("Physics".into()), status, date)
      .await
      .unwrap()
      .unwrap();
  }

  let summary = attendance::summarize(&s, user).await.unwrap();
  assert_eq!(summary.len(), 2);

  let physics = &summary[0];
  assert_eq!(physics.subject_name, "Physics");
  assert_eq!(physics.total_classes, 3);
  assert_eq!(physics.attended_classes, 2);
  assert_eq!(physics.attendance_percentage, "66.67");

  let history = &summary[1];
  assert_eq!(history.total_classes, 0);
  assert_eq!(history.attendance_percentage, "0.00");
}

#[tokio::test]
async fn summary_groups_identity_marks_by_name() {
  let s = store().await;
  let user = Uuid::new_v4();
  let monday_entry = s
    .merge_routine(user, Weekday::Monday, vec![NewSubject::new("Math", "9:00")])
    .await
    .unwrap()
    .entry;
  let thursday_entry = s
    .merge_routine(user, Weekday::Thursday, vec![NewSubject::new("Math", "13:00")])
    .await
    .unwrap()
    .entry;

  let thursday = NaiveDate::from_ymd_opt(2024, 9, 5).unwrap();
  attendance::mark(&s, user, SubjectRef::Id(monday_entry.subjects[0].subject_id), true, monday())
    .await
    .unwrap()
    .unwrap();
  attendance::mark(&s, user, SubjectRef::Id(thursday_entry.subjects[0].subject_id), false, thursday)
    .await
    .unwrap()
    .unwrap();

  let summary = attendance::summarize(&s, user).await.unwrap();
  assert_eq!(summary.len(), 1);
  assert_eq!(summary[0].total_classes, 2);
  assert_eq!(summary[0].attended_classes, 1);
  assert_eq!(summary[0].attendance_percentage, "50.00");
}

#[tokio::test]
async fn summary_without_routine_is_empty() {
  let s = store().await;
  let user = Uuid::new_v4();
  s.append_extra_subjects(user, monday(), vec![NewSubject::new("Seminar", "16:00")])
    .await
    .unwrap();
  attendance::mark(&s, user, SubjectRef::Name("Seminar".into()), true, monday())
    .await
    .unwrap()
    .unwrap();

  assert!(attendance::summarize(&s, user).await.unwrap().is_empty());
}
