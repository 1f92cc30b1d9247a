//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - IDs are serialised as hex strings.
//! - Datetimes are serialised as RFC 3339 strings.
//! - Field names match what the dashboard front end reads.

pub mod auth;
pub mod candidate;
pub mod election;
pub mod id;
pub mod report;
