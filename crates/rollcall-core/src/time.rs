//! Parsing of free-text class time tokens.
//!
//! Routine times are whatever the user typed: `"9:00"`, `"09:00-10:30"`,
//! `"2:15 PM - 3:00 PM"`, `"14.00"`. Only the start of the token matters for
//! ordering, so everything after the range separator is ignored.

use std::cmp::Ordering;

/// Minutes since midnight of the start time in `token`, or `None` if the
/// token has no recognisable leading `H[:MM]`.
///
/// An `AM`/`PM` suffix on the start time is normalised to 24-hour time.
pub fn start_minutes(token: &str) -> Option<u32> {
  let start = token
    .split(['-', '–'])
    .next()
    .unwrap_or_default()
    .trim();

  let hour_len = start.bytes().take_while(u8::is_ascii_digit).count();
  if hour_len == 0 || hour_len > 2 {
    return None;
  }
  let hour: u32 = start[..hour_len].parse().ok()?;
  let mut rest = &start[hour_len..];

  let mut minute = 0;
  if let Some(after_sep) = rest.strip_prefix([':', '.']) {
    let digits = after_sep.bytes().take_while(u8::is_ascii_digit).count();
    if digits != 2 {
      return None;
    }
    minute = after_sep[..2].parse().ok()?;
    rest = &after_sep[2..];
  }
  if minute > 59 {
    return None;
  }

  let suffix = rest.trim_start().to_ascii_lowercase();
  let hour = if suffix.starts_with("am") || suffix.starts_with("a.m") {
    match hour {
      12 => 0,
      1..=11 => hour,
      _ => return None,
    }
  } else if suffix.starts_with("pm") || suffix.starts_with("p.m") {
    match hour {
      12 => 12,
      1..=11 => hour + 12,
      _ => return None,
    }
  } else if hour <= 23 {
    hour
  } else {
    return None;
  };

  Some(hour * 60 + minute)
}

/// Orders two time tokens by start time; unparseable tokens sort last.
pub fn compare_tokens(a: &str, b: &str) -> Ordering {
  match (start_minutes(a), start_minutes(b)) {
    (Some(a), Some(b)) => a.cmp(&b),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}
