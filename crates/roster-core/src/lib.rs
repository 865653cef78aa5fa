//! Core types and rules for the roster student-records service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::StudentStore`]; the HTTP layer and the
//! terminal panel drive records through [`manager::LifecycleManager`] and
//! [`confirm::ConfirmFlow`].

// Native `async fn` in traits; the store trait spells out its `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod barangay;
pub mod confirm;
pub mod error;
pub mod ids;
pub mod lifecycle;
pub mod manager;
pub mod name;
pub mod store;
pub mod student;
pub mod validate;

pub use error::{Error, Result};
pub use ids::{BarangayId, StudentId};
