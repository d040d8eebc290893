//! ridgeline: a JSON REST backend for tour listings and their user
//! reviews, with authentication and role-based access.
//!
//! The interesting machinery is in two places. [`query`] turns arbitrary
//! HTTP query parameters into a [`ReadPlan`] (filter, sort, projection,
//! page window) and executes plans against a named collection through the
//! [`store::DocumentStore`] seam, so every listing endpoint shares one
//! translation layer. [`domain::ratings`] keeps each tour's denormalized
//! rating statistics consistent as its reviews are created, updated, or
//! deleted, using a pre-fetch/recompute protocol that survives deletion
//! and reassignment of the review mid-mutation.
//!
//! Everything else (routing, JWT issuance, password hashing, validation,
//! seeding) is thin glue around those two cores.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod query;
pub mod seed;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use error::{Error, ErrorCode, Resource};
pub use query::{FilterExpr, FindResult, Order, Projection, ReadExecutor, ReadPlan};
pub use state::AppState;
pub use store::{DocumentStore, MemoryStore};
