use serde::{Deserialize, Serialize};

use crate::model::{
    common::Office,
    db::candidate::{Candidate, NewCandidate},
    mongodb::Id,
};

/// A candidate registration, received from an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub full_name: String,
    #[serde(default)]
    pub grade: String,
    pub office: Office,
    #[serde(default)]
    pub proposal: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl From<CandidateSpec> for NewCandidate {
    fn from(spec: CandidateSpec) -> Self {
        Self {
            full_name: spec.full_name,
            grade: spec.grade,
            office: spec.office,
            proposal: spec.proposal,
            photo_url: spec.photo_url,
        }
    }
}

/// Candidate details as rendered on ballots and admin listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDescription {
    pub id: Id,
    pub full_name: String,
    pub grade: String,
    pub office: Office,
    pub proposal: String,
    pub photo_url: Option<String>,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            full_name: candidate.candidate.full_name,
            grade: candidate.candidate.grade,
            office: candidate.candidate.office,
            proposal: candidate.candidate.proposal,
            photo_url: candidate.candidate.photo_url,
        }
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl CandidateSpec {
        pub fn example_personero() -> Self {
            Self {
                full_name: "Carla Mejia".to_string(),
                grade: "11".to_string(),
                office: Office::Personero,
                proposal: "Longer library hours".to_string(),
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
