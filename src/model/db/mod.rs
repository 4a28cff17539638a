//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way, e.g. IDs and
//! datetimes are stored in MongoDB's own format.

pub mod admin;
pub mod candidate;
pub mod student;
pub mod vote;

pub use admin::{Admin, NewAdmin};
pub use candidate::{Candidate, NewCandidate};
pub use student::{NewStudent, Student};
pub use vote::{NewVote, Vote};
