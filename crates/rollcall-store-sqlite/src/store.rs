//! [`SqliteStore`], the SQLite implementation of [`TrackerStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use rollcall_core::{
  account::{Account, NewAccount},
  attendance::{AttendanceRecord, NewAttendance},
  routine::{
    ExtraSession, MergeOutcome, NewSubject, Weekday, WeeklyRoutineEntry,
    merge_subjects, remove_subject,
  },
  store::TrackerStore,
};

use crate::{
  Result,
  encode::{
    RawAccount, RawAttendance, RawExtraSession, RawRoutineEntry, decode_uuid,
    encode_date, encode_dt, encode_uuid, encode_weekday, subjects_from_sql,
    subjects_to_sql,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rollcall store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_account(&self, column: &'static str, value: String) -> Result<Option<Account>> {
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM accounts WHERE {column} = ?1", RawAccount::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], RawAccount::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }
}

// ─── TrackerStore impl ───────────────────────────────────────────────────────

impl TrackerStore for SqliteStore {
  type Error = crate::Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_account(&self, input: NewAccount) -> Result<Option<Account>> {
    let account = Account {
      account_id:    Uuid::new_v4(),
      name:          input.name,
      email:         input.email,
      password_hash: input.password_hash,
      created_at:    Utc::now(),
    };

    let id_str   = encode_uuid(account.account_id);
    let name     = account.name.clone();
    let email    = account.email.clone();
    let hash     = account.password_hash.clone();
    let at_str   = encode_dt(account.created_at);

    let inserted: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "INSERT INTO accounts (account_id, name, email, password_hash, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)
               ON CONFLICT (email) DO NOTHING
               RETURNING account_id",
              rusqlite::params![id_str, name, email, hash, at_str],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(inserted.map(|_| account))
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
    self.query_account("account_id", encode_uuid(id)).await
  }

  async fn find_account_by_email<'a>(&'a self, email: &'a str) -> Result<Option<Account>> {
    self.query_account("email", email.to_owned()).await
  }

  // ── Weekly routine ────────────────────────────────────────────────────────

  async fn get_routine_entry(
    &self,
    user_id: Uuid,
    weekday: Weekday,
  ) -> Result<Option<WeeklyRoutineEntry>> {
    let user_str = encode_uuid(user_id);
    let day_str  = encode_weekday(weekday);

    let raw: Option<RawRoutineEntry> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM routine_entries WHERE user_id = ?1 AND weekday = ?2",
          RawRoutineEntry::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![user_str, day_str], RawRoutineEntry::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRoutineEntry::into_entry).transpose()
  }

  async fn list_routine_entries(&self, user_id: Uuid) -> Result<Vec<WeeklyRoutineEntry>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawRoutineEntry> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM routine_entries WHERE user_id = ?1",
          RawRoutineEntry::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawRoutineEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRoutineEntry::into_entry).collect()
  }

  async fn merge_routine(
    &self,
    user_id: Uuid,
    weekday: Weekday,
    subjects: Vec<NewSubject>,
  ) -> Result<MergeOutcome> {
    let user_str = encode_uuid(user_id);
    let day_str  = encode_weekday(weekday);

    let (entry_id, merged, created) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<(String, String)> = tx
          .query_row(
            "SELECT entry_id, subjects_json FROM routine_entries
             WHERE user_id = ?1 AND weekday = ?2",
            rusqlite::params![user_str, day_str],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;

        let created = existing.is_none();
        let (entry_id, current) = match existing {
          Some((id, json)) => (id, subjects_from_sql(&json)?),
          None => (encode_uuid(Uuid::new_v4()), Vec::new()),
        };

        let merged = merge_subjects(current, subjects);
        let json   = subjects_to_sql(&merged)?;

        tx.execute(
          "INSERT INTO routine_entries (entry_id, user_id, weekday, subjects_json)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (user_id, weekday) DO UPDATE SET subjects_json = excluded.subjects_json",
          rusqlite::params![entry_id, user_str, day_str, json],
        )?;
        tx.commit()?;

        Ok((entry_id, merged, created))
      })
      .await?;

    Ok(MergeOutcome {
      entry: WeeklyRoutineEntry {
        entry_id: decode_uuid(&entry_id)?,
        user_id,
        weekday,
        subjects: merged,
      },
      created,
    })
  }

  async fn remove_routine_subject(
    &self,
    user_id: Uuid,
    weekday: Weekday,
    name: String,
  ) -> Result<Option<WeeklyRoutineEntry>> {
    let user_str = encode_uuid(user_id);
    let day_str  = encode_weekday(weekday);

    let updated: Option<(String, Vec<_>)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<(String, String)> = tx
          .query_row(
            "SELECT entry_id, subjects_json FROM routine_entries
             WHERE user_id = ?1 AND weekday = ?2",
            rusqlite::params![user_str, day_str],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;

        let Some((entry_id, json)) = existing else {
          return Ok(None);
        };

        let mut subjects = subjects_from_sql(&json)?;
        if !remove_subject(&mut subjects, &name) {
          return Ok(None);
        }

        tx.execute(
          "UPDATE routine_entries SET subjects_json = ?1 WHERE entry_id = ?2",
          rusqlite::params![subjects_to_sql(&subjects)?, entry_id],
        )?;
        tx.commit()?;

        Ok(Some((entry_id, subjects)))
      })
      .await?;

    updated
      .map(|(entry_id, subjects)| {
        Ok(WeeklyRoutineEntry {
          entry_id: decode_uuid(&entry_id)?,
          user_id,
          weekday,
          subjects,
        })
      })
      .transpose()
  }

  // ── Extra sessions ────────────────────────────────────────────────────────

  async fn get_extra_session(
    &self,
    user_id: Uuid,
    date: NaiveDate,
  ) -> Result<Option<ExtraSession>> {
    let user_str = encode_uuid(user_id);
    let date_str = encode_date(date);

    let raw: Option<RawExtraSession> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM extra_sessions WHERE user_id = ?1 AND date = ?2",
          RawExtraSession::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![user_str, date_str], RawExtraSession::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawExtraSession::into_session).transpose()
  }

  async fn list_extra_sessions(&self, user_id: Uuid) -> Result<Vec<ExtraSession>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawExtraSession> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM extra_sessions WHERE user_id = ?1 ORDER BY date",
          RawExtraSession::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawExtraSession::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawExtraSession::into_session).collect()
  }

  async fn append_extra_subjects(
    &self,
    user_id: Uuid,
    date: NaiveDate,
    subjects: Vec<NewSubject>,
  ) -> Result<ExtraSession> {
    let user_str = encode_uuid(user_id);
    let date_str = encode_date(date);
    let weekday  = Weekday::of(date);
    let day_str  = encode_weekday(weekday);

    let (session_id, all) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<(String, String)> = tx
          .query_row(
            "SELECT session_id, subjects_json FROM extra_sessions
             WHERE user_id = ?1 AND date = ?2",
            rusqlite::params![user_str, date_str],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;

        let (session_id, mut all) = match existing {
          Some((id, json)) => (id, subjects_from_sql(&json)?),
          None => (encode_uuid(Uuid::new_v4()), Vec::new()),
        };
        all.extend(subjects.into_iter().map(NewSubject::into_subject));

        tx.execute(
          "INSERT INTO extra_sessions (session_id, user_id, date, weekday, subjects_json)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (user_id, date) DO UPDATE SET subjects_json = excluded.subjects_json",
          rusqlite::params![session_id, user_str, date_str, day_str, subjects_to_sql(&all)?],
        )?;
        tx.commit()?;

        Ok((session_id, all))
      })
      .await?;

    Ok(ExtraSession {
      session_id: decode_uuid(&session_id)?,
      user_id,
      date,
      weekday,
      subjects: all,
    })
  }

  // ── Attendance ────────────────────────────────────────────────────────────

  async fn upsert_attendance(&self, input: NewAttendance) -> Result<AttendanceRecord> {
    let record_id_str = encode_uuid(Uuid::new_v4());
    let user_str      = encode_uuid(input.user_id);
    let subject_key   = input.subject.key();
    let subject_name  = input.subject_name;
    let date_str      = encode_date(input.date);
    let status        = input.status;
    let at_str        = encode_dt(Utc::now());

    let raw: RawAttendance = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "INSERT INTO attendance
             (record_id, user_id, subject_key, subject_name, date, status, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT (user_id, subject_key, date) DO UPDATE SET
             status       = excluded.status,
             subject_name = excluded.subject_name,
             updated_at   = excluded.updated_at
           RETURNING {}",
          RawAttendance::COLUMNS
        );
        Ok(conn.query_row(
          &sql,
          rusqlite::params![
            record_id_str,
            user_str,
            subject_key,
            subject_name,
            date_str,
            status,
            at_str,
          ],
          RawAttendance::from_row,
        )?)
      })
      .await?;

    raw.into_record()
  }

  async fn list_attendance(
    &self,
    user_id: Uuid,
    date: Option<NaiveDate>,
  ) -> Result<Vec<AttendanceRecord>> {
    let user_str = encode_uuid(user_id);
    let date_str = date.map(encode_date);

    let raws: Vec<RawAttendance> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM attendance
           WHERE user_id = ?1 AND (?2 IS NULL OR date = ?2)
           ORDER BY date, updated_at",
          RawAttendance::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, date_str], RawAttendance::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAttendance::into_record).collect()
  }
}
