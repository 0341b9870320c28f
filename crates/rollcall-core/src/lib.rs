//! Core types and logic for the Rollcall attendance tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the data model, the [`store::TrackerStore`] abstraction, and the
//! pure logic that turns a weekly routine plus attendance records into
//! today's schedule and per-subject summaries.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod attendance;
pub mod error;
pub mod routine;
pub mod schedule;
pub mod store;
pub mod time;

pub use error::{Error, Result};
