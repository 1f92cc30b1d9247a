//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way, e.g.:
//!
//! - IDs and datetimes are serialised in MongoDB's own format.
//! - Field names are camelCase, matching the documents the dashboard
//!   has always written.

pub mod candidate;
pub mod election;
pub mod user;
pub mod vote;
