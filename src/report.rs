//! Vote aggregation: per-candidate tallies, turnout, and winners.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    common::Office,
    db::{candidate::Candidate, vote::VoteCore},
    mongodb::Id,
};

/// The vote count for one (office, candidate) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyRow {
    pub office: Office,
    pub candidate_id: Id,
    pub candidate_name: String,
    pub votes: u64,
}

/// Count votes per (office, candidate) pair, returning one row per pair with
/// at least one vote.
///
/// Rows are ordered by office, then votes descending. Storage iteration order
/// is not stable, so ties are broken explicitly: candidate name ascending,
/// then ID.
pub fn tally<'a>(
    votes: impl IntoIterator<Item = &'a VoteCore>,
    candidates: &[Candidate],
) -> Vec<TallyRow> {
    let mut counts: HashMap<(Office, Id), u64> = HashMap::new();
    for vote in votes {
        *counts.entry((vote.office, vote.candidate_id)).or_default() += 1;
    }

    let mut rows: Vec<TallyRow> = counts
        .into_iter()
        .filter_map(|((office, candidate_id), votes)| {
            // A vote referencing a deleted candidate has nothing to report against.
            let candidate = candidates.iter().find(|c| c.id == candidate_id)?;
            Some(TallyRow {
                office,
                candidate_id,
                candidate_name: candidate.full_name.clone(),
                votes,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        a.office
            .cmp(&b.office)
            .then(b.votes.cmp(&a.votes))
            .then(a.candidate_name.cmp(&b.candidate_name))
            .then(a.candidate_id.cmp(&b.candidate_id))
    });
    rows
}

/// Percentage of students who have voted, rounded to 2 decimal places.
/// Zero when there are no students at all.
pub fn turnout(voted: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percentage = voted as f64 / total as f64 * 100.0;
    (percentage * 100.0).round() / 100.0
}

/// The winning row for the given office, or `None` if it received no votes.
/// Relies on the ordering [`tally`] guarantees.
pub fn winner(tally: &[TallyRow], office: Office) -> Option<&TallyRow> {
    tally.iter().find(|row| row.office == office)
}

#[cfg(test)]
mod tests {
    use mongodb::bson::DateTime;

    use crate::model::db::candidate::CandidateCore;

    use super::*;

    fn candidate(core: CandidateCore) -> Candidate {
        Candidate {
            id: Id::new(),
            candidate: core,
        }
    }

    fn vote(student_id: Id, office: Office, candidate_id: Id) -> VoteCore {
        VoteCore {
            student_id,
            office,
            candidate_id,
            cast_at: DateTime::now(),
        }
    }

    fn votes_for(office: Office, candidate_id: Id, count: usize) -> Vec<VoteCore> {
        (0..count)
            .map(|_| vote(Id::new(), office, candidate_id))
            .collect()
    }

    #[test]
    fn orders_by_office_then_votes_descending() {
        let personero1 = candidate(CandidateCore::example_personero());
        let personero2 = candidate(CandidateCore::example_personero2());
        let contralor = candidate(CandidateCore::example_contralor());
        let candidates = vec![personero1.clone(), personero2.clone(), contralor.clone()];

        let mut votes = votes_for(Office::Personero, personero1.id, 2);
        votes.extend(votes_for(Office::Personero, personero2.id, 5));
        votes.extend(votes_for(Office::Contralor, contralor.id, 1));

        let rows = tally(&votes, &candidates);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            (rows[0].office, rows[0].votes),
            (Office::Personero, 5)
        );
        assert_eq!(rows[0].candidate_name, personero2.full_name);
        assert_eq!(
            (rows[1].office, rows[1].votes),
            (Office::Personero, 2)
        );
        assert_eq!(
            (rows[2].office, rows[2].votes),
            (Office::Contralor, 1)
        );
    }

    #[test]
    fn breaks_ties_by_name_ascending() {
        // "Carla Mejia" < "Diego Rueda"
        let carla = candidate(CandidateCore::example_personero());
        let diego = candidate(CandidateCore::example_personero2());
        let candidates = vec![diego.clone(), carla.clone()];

        let mut votes = votes_for(Office::Personero, diego.id, 3);
        votes.extend(votes_for(Office::Personero, carla.id, 3));

        let rows = tally(&votes, &candidates);
        assert_eq!(rows[0].candidate_name, "Carla Mejia");
        assert_eq!(rows[1].candidate_name, "Diego Rueda");
    }

    #[test]
    fn omits_candidates_without_votes() {
        let personero = candidate(CandidateCore::example_personero());
        let contralor = candidate(CandidateCore::example_contralor());
        let candidates = vec![personero.clone(), contralor];

        let votes = votes_for(Office::Personero, personero.id, 1);
        let rows = tally(&votes, &candidates);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].office, Office::Personero);
    }

    #[test]
    fn turnout_is_zero_without_students() {
        assert_eq!(turnout(0, 0), 0.0);
    }

    #[test]
    fn turnout_rounds_to_two_decimals() {
        assert_eq!(turnout(5, 10), 50.0);
        assert_eq!(turnout(1, 3), 33.33);
        assert_eq!(turnout(2, 3), 66.67);
        assert_eq!(turnout(10, 10), 100.0);
    }

    #[test]
    fn winner_per_office() {
        let personero1 = candidate(CandidateCore::example_personero());
        let personero2 = candidate(CandidateCore::example_personero2());
        let candidates = vec![personero1.clone(), personero2.clone()];

        let mut votes = votes_for(Office::Personero, personero1.id, 1);
        votes.extend(votes_for(Office::Personero, personero2.id, 4));

        let rows = tally(&votes, &candidates);
        let won = winner(&rows, Office::Personero).unwrap();
        assert_eq!(won.candidate_id, personero2.id);
        assert_eq!(won.votes, 4);
        // Contralor received no votes at all.
        assert!(winner(&rows, Office::Contralor).is_none());
    }
}
