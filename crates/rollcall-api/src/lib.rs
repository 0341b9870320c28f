//! JSON REST API for Rollcall.
//!
//! Exposes an axum [`Router`] backed by any
//! [`rollcall_core::store::TrackerStore`]. Every route except registration,
//! login and the liveness check sits behind the bearer-token gate in
//! [`auth`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = rollcall_api::router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod clock;
pub mod error;
pub mod handlers;
pub mod password;
pub mod token;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use rollcall_core::store::TrackerStore;
use tower_http::trace::TraceLayer;

use clock::Clock;
use handlers::{accounts, attendance, routine};
use token::TokenSigner;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: TrackerStore> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenSigner>,
  pub clock:  Clock,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: `/` plus everything under `/api`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: TrackerStore + Clone + Send + Sync + 'static,
{
  let api = Router::new()
    // Accounts
    .route("/auth/register", post(accounts::register::<S>))
    .route("/auth/login", post(accounts::login::<S>))
    // Routine
    .route("/routine/add", post(routine::add::<S>))
    .route("/routine/get", get(routine::list::<S>))
    .route("/routine/delete", delete(routine::delete_subject::<S>))
    .route("/routine/extra", post(routine::add_extra::<S>))
    .route("/routine/today-subjects", get(routine::today::<S>))
    // Attendance
    .route("/attendance/mark", post(attendance::mark::<S>))
    .route("/attendance/get", get(attendance::summary::<S>));

  Router::new()
    .route("/", get(handlers::root))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
