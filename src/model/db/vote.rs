use std::ops::{Deref, DerefMut};

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::model::{common::Office, mongodb::Id};

/// Core vote data, as stored in the database. Append-only; a unique index on
/// `(student_id, office)` guarantees at most one per student per office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCore {
    pub student_id: Id,
    pub office: Office,
    pub candidate_id: Id,
    pub cast_at: DateTime,
}

/// A vote without an ID.
pub type NewVote = VoteCore;

/// A vote from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub vote: VoteCore,
}

impl Deref for Vote {
    type Target = VoteCore;

    fn deref(&self) -> &Self::Target {
        &self.vote
    }
}

impl DerefMut for Vote {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.vote
    }
}
