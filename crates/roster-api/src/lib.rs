//! JSON REST API for the roster service.
//!
//! Exposes an axum [`Router`] backed by any [`roster_core::store::StudentStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(store.clone()))
//! ```

pub mod barangays;
pub mod bulk;
pub mod error;
pub mod etag;
pub mod export;
pub mod students;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use roster_core::store::StudentStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: StudentStore + 'static,
{
  Router::new()
    // Students
    .route("/students", get(students::list::<S>).post(students::create::<S>))
    .route("/students/export", get(export::handler::<S>))
    .route(
      "/students/{id}",
      get(students::get_one::<S>)
        .put(students::update::<S>)
        .delete(students::delete::<S>),
    )
    .route("/students/{id}/archive", post(students::archive::<S>))
    .route("/students/{id}/graduate", post(students::graduate::<S>))
    .route("/students/{id}/retrieve", post(students::retrieve::<S>))
    // Bulk
    .route("/students/bulk", post(bulk::handler::<S>))
    .route("/students/bulk/graduate", post(bulk::graduate::<S>))
    // Barangays
    .route("/barangays", get(barangays::list::<S>).post(barangays::create::<S>))
    .route("/barangays/stats", get(barangays::stats::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
