use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{db::student::Student, mongodb::Id};

/// A credential submitted through the student login form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialClaim {
    pub credential: String,
}

/// Student details for the admin listing, including the login values the
/// collaborator UI prints on certificates and QR codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDescription {
    pub id: Id,
    pub doc_id: String,
    pub full_name: String,
    pub grade: String,
    pub group_name: String,
    pub credential: String,
    pub access_token: String,
    pub voted: bool,
    pub voted_at: Option<DateTime<Utc>>,
}

impl From<Student> for StudentDescription {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            doc_id: student.student.doc_id,
            full_name: student.student.full_name,
            grade: student.student.grade,
            group_name: student.student.group_name,
            credential: student.student.credential,
            access_token: student.student.access_token,
            voted: student.student.voted,
            voted_at: student.student.voted_at.map(|at| at.to_chrono()),
        }
    }
}
