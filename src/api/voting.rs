use mongodb::{
    bson::{doc, DateTime},
    error::{Error as DbError, ErrorKind, WriteFailure, TRANSIENT_TRANSACTION_ERROR},
    Client,
};
use rocket::{
    futures::TryStreamExt,
    http::{Cookie, CookieJar},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::{Error, Result},
    model::{
        api::ballot::{BallotForm, BallotPaper},
        auth::{AuthToken, AUTH_TOKEN_COOKIE},
        common::Office,
        db::{
            candidate::Candidate,
            student::Student,
            vote::NewVote,
        },
        mongodb::{Coll, Id},
    },
};

pub fn routes() -> Vec<Route> {
    routes![get_ballot, cast_ballot]
}

/// The blank ballot for the authenticated student: all candidates, grouped by
/// office.
#[get("/ballot")]
pub async fn get_ballot(
    token: AuthToken<Student>,
    cookies: &CookieJar<'_>,
    students: Coll<Student>,
    candidates: Coll<Candidate>,
) -> Result<Json<BallotForm>> {
    let student = students
        .find_one(token.id().as_doc(), None)
        .await?
        .ok_or(Error::InvalidCredential)?;

    // The cookie may outlive the vote (e.g. a re-scanned QR code in a stale
    // tab); end the session rather than showing a ballot that cannot be cast.
    if student.voted {
        cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
        return Err(Error::AlreadyVoted);
    }

    let standing: Vec<Candidate> = candidates.find(None, None).await?.try_collect().await?;
    Ok(Json(BallotForm::new(standing)))
}

/// Cast the student's one ballot: one candidate per office, finalized
/// atomically.
#[post("/ballot", data = "<paper>", format = "json")]
pub async fn cast_ballot(
    token: AuthToken<Student>,
    paper: Json<BallotPaper>,
    cookies: &CookieJar<'_>,
    students: Coll<Student>,
    candidates: Coll<Candidate>,
    votes: Coll<NewVote>,
    db_client: &State<Client>,
) -> Result<()> {
    // Ensure there is a selection for every office. Nothing is persisted for
    // an incomplete ballot; the session stays open so the student can retry.
    let mut selections: Vec<(Office, Id)> = Vec::with_capacity(Office::ALL.len());
    for office in Office::ALL {
        let candidate_id = paper
            .selection(office)
            .ok_or(Error::IncompleteBallot(office))?;
        selections.push((office, candidate_id));
    }

    // Ensure every selection is a real candidate standing for that office.
    for (office, candidate_id) in &selections {
        let candidate = candidates
            .find_one(candidate_id.as_doc(), None)
            .await?
            .ok_or_else(|| Error::not_found(format!("Candidate {candidate_id}")))?;
        if candidate.office != *office {
            return Err(Error::not_found(format!(
                "Candidate '{}' standing for {office}",
                candidate.full_name
            )));
        }
    }

    // Atomically claim the voted flag and insert the vote rows. The
    // compare-and-swap on `voted: false` rejects a second writer; the unique
    // index on (student_id, office) backstops it at the storage layer.
    let finalized =
        match finalize_ballot(&students, &votes, db_client, token.id(), selections).await {
            // A write conflict or duplicate vote key means a concurrent cast
            // won the race; treat it like losing the compare-and-swap.
            Err(Error::Db(err)) if lost_ballot_race(&err) => false,
            other => other?,
        };

    if !finalized {
        // Either someone got here first, or the student was deleted
        // mid-session. Either way this session is over.
        cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
        if students.find_one(token.id().as_doc(), None).await?.is_none() {
            return Err(Error::InvalidCredential);
        }
        return Err(Error::AlreadyVoted);
    }

    // Ballot-Cast is terminal: the student can never authenticate again.
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Ok(())
}

/// Run the finalization transaction: compare-and-swap the voted flag, then
/// insert one vote row per office. `Ok(false)` means the flag could not be
/// claimed; nothing was persisted.
async fn finalize_ballot(
    students: &Coll<Student>,
    votes: &Coll<NewVote>,
    db_client: &Client,
    student_id: Id,
    selections: Vec<(Office, Id)>,
) -> Result<bool> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let unvoted = doc! {
        "_id": student_id,
        "voted": false,
    };
    let mark_voted = doc! {
        "$set": {
            "voted": true,
            "voted_at": DateTime::now(),
        }
    };
    let claimed = students
        .find_one_and_update_with_session(unvoted, mark_voted, None, &mut session)
        .await?;
    if claimed.is_none() {
        session.abort_transaction().await?;
        return Ok(false);
    }

    let cast_at = DateTime::now();
    let new_votes: Vec<NewVote> = selections
        .into_iter()
        .map(|(office, candidate_id)| NewVote {
            student_id,
            office,
            candidate_id,
            cast_at,
        })
        .collect();
    votes
        .insert_many_with_session(&new_votes, None, &mut session)
        .await?;

    session.commit_transaction().await?;
    Ok(true)
}

/// Did a concurrent cast for the same student win the race? Inside the
/// transaction that surfaces as a write conflict (labelled transient) or as a
/// duplicate key on the (student_id, office) index, not as a failed
/// compare-and-swap.
fn lost_ballot_race(err: &DbError) -> bool {
    const DUPLICATE_KEY: i32 = 11000;

    if err.contains_label(TRANSIENT_TRANSACTION_ERROR) {
        return true;
    }
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY,
        ErrorKind::BulkWrite(failure) => failure
            .write_errors
            .iter()
            .flatten()
            .any(|write| write.code == DUPLICATE_KEY),
        _ => false,
    }
}
