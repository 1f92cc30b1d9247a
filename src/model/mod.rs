//! Data types, split by where they live:
//!
//! - [`api`]: request and response bodies.
//! - [`common`]: types and pure logic shared by the other two layers.
//! - [`db`]: documents as stored in MongoDB.
//! - [`mongodb`]: collection and ID plumbing.

pub mod api;
pub mod common;
pub mod db;
pub mod mongodb;
