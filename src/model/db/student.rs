use std::ops::{Deref, DerefMut};

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::import::RosterRow;
use crate::model::mongodb::Id;

/// Core student data, as stored in the database.
///
/// Both `credential` and `access_token` are globally unique (enforced by
/// indexes); either one authenticates the student until their ballot is cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentCore {
    /// Identity document number; may be empty, non-empty values are the
    /// deduplication key for roster imports.
    pub doc_id: String,
    pub full_name: String,
    pub grade: String,
    pub group_name: String,
    /// Short login code the student types in.
    pub credential: String,
    /// Opaque token embedded in the student's QR code.
    pub access_token: String,
    /// Set exactly once, when the ballot is cast.
    pub voted: bool,
    pub voted_at: Option<DateTime>,
}

impl StudentCore {
    /// Create a student from an imported roster row and freshly issued login values.
    pub fn new(row: RosterRow, credential: String, access_token: String) -> Self {
        Self {
            doc_id: row.doc_id,
            full_name: row.full_name,
            grade: row.grade,
            group_name: row.group_name,
            credential,
            access_token,
            voted: false,
            voted_at: None,
        }
    }
}

/// A student without an ID.
pub type NewStudent = StudentCore;

/// A student from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub student: StudentCore,
}

impl Deref for Student {
    type Target = StudentCore;

    fn deref(&self) -> &Self::Target {
        &self.student
    }
}

impl DerefMut for Student {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.student
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl StudentCore {
        pub fn example() -> Self {
            Self {
                doc_id: "1001".to_string(),
                full_name: "Ana Torres".to_string(),
                grade: "10".to_string(),
                group_name: "A".to_string(),
                credential: "QM3K7Z".to_string(),
                access_token: "hoIhVRnTrx_Zj4havuoU9A".to_string(),
                voted: false,
                voted_at: None,
            }
        }

        pub fn example2() -> Self {
            Self {
                doc_id: "1002".to_string(),
                full_name: "Bruno Pardo".to_string(),
                grade: "11".to_string(),
                group_name: "B".to_string(),
                credential: "X0F4QN".to_string(),
                access_token: "cPuQodnYRYxCBYdbzQmKFg".to_string(),
                voted: false,
                voted_at: None,
            }
        }
    }
}
