//! Core types and the tracking engine for the Cram study tracker.
//!
//! Users, per-day task completions and streaks live here together with the
//! [`TrackerStore`](store::TrackerStore) abstraction. This crate is free of
//! HTTP and database dependencies; storage backends and the API depend on it.

pub mod catalog;
pub mod clock;
pub mod completion;
pub mod error;
pub mod store;
pub mod streak;
pub mod summary;
pub mod tracker;
pub mod user;

pub use error::{Error, Result};
pub use tracker::Tracker;
