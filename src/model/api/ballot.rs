use serde::{Deserialize, Serialize};

use crate::model::{
    api::candidate::CandidateDescription, common::Office, db::candidate::Candidate, mongodb::Id,
};

/// A completed ballot as submitted by a student: one candidate per office.
/// Fields default to `None` so a missing selection is reported as an
/// incomplete ballot rather than a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BallotPaper {
    #[serde(default)]
    pub personero: Option<Id>,
    #[serde(default)]
    pub contralor: Option<Id>,
}

impl BallotPaper {
    /// The selection made for the given office, if any.
    pub fn selection(&self, office: Office) -> Option<Id> {
        match office {
            Office::Personero => self.personero,
            Office::Contralor => self.contralor,
        }
    }
}

/// The blank ballot shown to an authenticated student: the candidates for
/// every office, in reporting order, names ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallotForm {
    pub offices: Vec<OfficeCandidates>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficeCandidates {
    pub office: Office,
    pub candidates: Vec<CandidateDescription>,
}

impl BallotForm {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        let offices = Office::ALL
            .into_iter()
            .map(|office| {
                let mut standing: Vec<CandidateDescription> = candidates
                    .iter()
                    .filter(|candidate| candidate.office == office)
                    .cloned()
                    .map(Into::into)
                    .collect();
                standing.sort_by(|a, b| a.full_name.cmp(&b.full_name));
                OfficeCandidates {
                    office,
                    candidates: standing,
                }
            })
            .collect();
        Self { offices }
    }
}
