//! Accounts: the identities that own routines and attendance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// The credential hash never leaves the server: it is skipped on
/// serialisation, so an `Account` can be returned to clients as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
  pub account_id:    Uuid,
  pub name:          String,
  /// Unique across all accounts; stored trimmed and lowercased.
  pub email:         String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::TrackerStore::create_account`].
/// `account_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
}

/// Canonical form of an email address used for uniqueness and lookup.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }
