use mongodb::{bson::doc, Client};
use rocket::{futures::TryStreamExt, http::Status, serde::json::Json, Route, State};

use crate::{
    credentials::{self, CredentialIssuer},
    error::{Error, Result},
    import::{self, ImportSummary},
    model::{
        api::{
            candidate::{CandidateDescription, CandidateSpec},
            results::{ElectionResults, ElectionSummary, OfficeWinner},
            student::StudentDescription,
        },
        auth::AuthToken,
        common::Office,
        db::{
            admin::Admin,
            candidate::{Candidate, NewCandidate},
            student::{NewStudent, Student},
            vote::Vote,
        },
        mongodb::{Coll, Id},
    },
    report, Config,
};

pub fn routes() -> Vec<Route> {
    routes![
        get_candidates,
        create_candidate,
        delete_candidate,
        get_students,
        delete_student,
        import_students,
        get_results,
        get_summary,
    ]
}

#[get("/candidates")]
async fn get_candidates(
    _token: AuthToken<Admin>,
    candidates: Coll<Candidate>,
) -> Result<Json<Vec<CandidateDescription>>> {
    let all: Vec<Candidate> = candidates.find(None, None).await?.try_collect().await?;
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

#[post("/candidates", data = "<spec>", format = "json")]
async fn create_candidate(
    _token: AuthToken<Admin>,
    spec: Json<CandidateSpec>,
    candidates: Coll<NewCandidate>,
) -> Result<Json<CandidateDescription>> {
    if spec.full_name.is_empty() {
        return Err(Error::Status(
            Status::BadRequest,
            "Candidate name must not be empty".to_string(),
        ));
    }

    let candidate: NewCandidate = spec.0.into();
    let new_id: Id = candidates
        .insert_one(&candidate, None)
        .await?
        .inserted_id
        .as_object_id()
        .unwrap() // Valid because the ID comes directly from the DB
        .into();

    Ok(Json(
        Candidate {
            id: new_id,
            candidate,
        }
        .into(),
    ))
}

#[delete("/candidates/<candidate_id>")]
async fn delete_candidate(
    _token: AuthToken<Admin>,
    candidate_id: Id,
    candidates: Coll<Candidate>,
) -> Result<()> {
    let result = candidates.delete_one(candidate_id.as_doc(), None).await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Candidate {candidate_id}")));
    }
    Ok(())
}

/// List all students, including each one's credential and access token so the
/// collaborator UI can print certificates and QR codes.
#[get("/students")]
async fn get_students(
    _token: AuthToken<Admin>,
    students: Coll<Student>,
) -> Result<Json<Vec<StudentDescription>>> {
    let all: Vec<Student> = students.find(None, None).await?.try_collect().await?;
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

/// Delete a student along with any votes they cast, so no orphan vote rows
/// remain.
#[delete("/students/<student_id>")]
async fn delete_student(
    _token: AuthToken<Admin>,
    student_id: Id,
    students: Coll<Student>,
    votes: Coll<Vote>,
    db_client: &State<Client>,
) -> Result<()> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let result = students
        .delete_one_with_session(student_id.as_doc(), None, &mut session)
        .await?;
    if result.deleted_count == 0 {
        session.abort_transaction().await?;
        return Err(Error::not_found(format!("Student {student_id}")));
    }

    let their_votes = doc! {
        "student_id": student_id,
    };
    votes
        .delete_many_with_session(their_votes, None, &mut session)
        .await?;

    session.commit_transaction().await?;
    Ok(())
}

/// Bulk-import a student roster, issuing a credential and an access token for
/// every accepted row.
///
/// Rows with an empty name, or a non-empty `doc_id` already present (in the
/// database or earlier in the batch), are skipped, never fatal.
#[post("/students/import?<filename>", data = "<roster>")]
async fn import_students(
    _token: AuthToken<Admin>,
    filename: String,
    roster: String,
    students: Coll<Student>,
    new_students: Coll<NewStudent>,
    config: &State<Config>,
) -> Result<Json<ImportSummary>> {
    if !import::supported_format(&filename) {
        return Err(Error::UnsupportedImportFormat(filename));
    }
    let rows = import::parse_roster(&roster)?;

    let issuer = CredentialIssuer::new(
        config.credential_strategy(),
        config.credential_attempts(),
        &students,
    );
    let mut summary = ImportSummary::default();
    // 1-based roster position, continuing across imports.
    let mut sequence = students.count_documents(None, None).await?;

    for row in rows {
        if row.full_name.is_empty() {
            summary.skipped += 1;
            continue;
        }
        // Non-empty document IDs deduplicate; empty ones never collide.
        if !row.doc_id.is_empty() {
            let with_doc_id = doc! {
                "doc_id": &row.doc_id,
            };
            if students.find_one(with_doc_id, None).await?.is_some() {
                summary.skipped += 1;
                continue;
            }
        }

        sequence += 1;
        let credential = issuer.issue(sequence).await?;
        let student = NewStudent::new(row, credential, credentials::access_token());
        new_students.insert_one(student, None).await?;
        summary.inserted += 1;
    }

    Ok(Json(summary))
}

#[get("/results")]
async fn get_results(
    _token: AuthToken<Admin>,
    students: Coll<Student>,
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
) -> Result<Json<ElectionResults>> {
    let all_candidates: Vec<Candidate> = candidates.find(None, None).await?.try_collect().await?;
    let all_votes: Vec<Vote> = votes.find(None, None).await?.try_collect().await?;
    let total_students = students.count_documents(None, None).await?;
    let total_voted = students
        .count_documents(doc! { "voted": true }, None)
        .await?;

    let tally = report::tally(all_votes.iter().map(|vote| &vote.vote), &all_candidates);
    let winners = Office::ALL
        .into_iter()
        .map(|office| OfficeWinner {
            office,
            winner: report::winner(&tally, office).cloned(),
        })
        .collect();

    Ok(Json(ElectionResults {
        tally,
        total_students,
        total_voted,
        turnout: report::turnout(total_voted, total_students),
        winners,
    }))
}

/// Dashboard counts for the admin home page.
#[get("/summary")]
async fn get_summary(
    _token: AuthToken<Admin>,
    students: Coll<Student>,
    candidates: Coll<Candidate>,
) -> Result<Json<ElectionSummary>> {
    Ok(Json(ElectionSummary {
        candidates: candidates.count_documents(None, None).await?,
        students: students.count_documents(None, None).await?,
        voted: students
            .count_documents(doc! { "voted": true }, None)
            .await?,
    }))
}
