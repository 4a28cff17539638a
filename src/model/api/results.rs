use serde::{Deserialize, Serialize};

use crate::model::common::Office;
use crate::report::TallyRow;

/// Full election results for the admin results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionResults {
    /// One row per (office, candidate) pair with at least one vote, ordered
    /// by office, then votes descending.
    pub tally: Vec<TallyRow>,
    pub total_students: u64,
    pub total_voted: u64,
    /// Percentage of students who have voted, rounded to 2 decimal places.
    pub turnout: f64,
    pub winners: Vec<OfficeWinner>,
}

/// The winning tally row for an office, or `None` if it received no votes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficeWinner {
    pub office: Office,
    pub winner: Option<TallyRow>,
}

/// Dashboard counts for the admin home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSummary {
    pub candidates: u64,
    pub students: u64,
    pub voted: u64,
}
