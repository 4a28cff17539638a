//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.
//! datetimes as RFC 3339 strings rather than MongoDB's own format.

pub mod admin;
pub mod ballot;
pub mod candidate;
pub mod results;
pub mod student;
