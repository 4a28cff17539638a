use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::{common::Office, mongodb::Id};

/// Core candidate data, as stored in the database.
/// Immutable after creation apart from deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    pub full_name: String,
    pub grade: String,
    /// The office this candidate is standing for.
    pub office: Office,
    pub proposal: String,
    /// Where the collaborator UI hosts the candidate's photo, if any.
    pub photo_url: Option<String>,
}

/// A candidate without an ID.
pub type NewCandidate = CandidateCore;

/// A candidate from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl CandidateCore {
        pub fn example_personero() -> Self {
            Self {
                full_name: "Carla Mejia".to_string(),
                grade: "11".to_string(),
                office: Office::Personero,
                proposal: "Longer library hours".to_string(),
                photo_url: None,
            }
        }

        pub fn example_personero2() -> Self {
            Self {
                full_name: "Diego Rueda".to_string(),
                grade: "10".to_string(),
                office: Office::Personero,
                proposal: "More sports tournaments".to_string(),
                photo_url: None,
            }
        }

        pub fn example_contralor() -> Self {
            Self {
                full_name: "Elena Vidal".to_string(),
                grade: "11".to_string(),
                office: Office::Contralor,
                proposal: "Transparent cafeteria budget".to_string(),
                photo_url: None,
            }
        }
    }
}
