//! Where "today" comes from at the HTTP boundary.

use chrono::{Local, NaiveDate};

#[derive(Debug, Clone, Copy)]
pub enum Clock {
  /// The server's local calendar date.
  System,
  /// Always the given date.
  Fixed(NaiveDate),
}

impl Clock {
  pub fn today(&self) -> NaiveDate {
    match self {
      Self::System => Local::now().date_naive(),
      Self::Fixed(date) => *date,
    }
  }
}
