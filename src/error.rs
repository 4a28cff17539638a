use std::fmt::Display;

use log::{error, warn};
use rocket::{
    http::{Status, StatusClass},
    response::Responder,
};
use thiserror::Error;

use crate::model::common::Office;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] mongodb::error::Error),
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// No student matches the supplied credential or access token.
    #[error("No student matches the supplied credential")]
    InvalidCredential,
    /// The student has already cast their ballot; they can never authenticate again.
    #[error("This student has already cast their ballot")]
    AlreadyVoted,
    /// The submitted ballot is missing a selection for an office.
    #[error("Ballot is missing a selection for office '{0}'")]
    IncompleteBallot(Office),
    /// The roster upload is not in a format we can read.
    #[error("Unsupported import format: '{0}' (expected .csv or .txt)")]
    UnsupportedImportFormat(String),
    /// The roster upload lacks one or more required columns.
    #[error("Import is missing required columns: {0}")]
    MissingImportColumns(String),
    /// Ran out of attempts to generate a non-colliding credential.
    #[error("Failed to issue a unique credential after {0} attempts")]
    IssuanceExhausted(u32),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    /// Shorthand for a 404 about the given subject.
    pub fn not_found(what: impl Display) -> Self {
        Self::Status(Status::NotFound, format!("{what} not found"))
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = match &self {
            Self::Db(_) | Self::IssuanceExhausted(_) => Status::InternalServerError,
            Self::Jwt(_) | Self::InvalidCredential => Status::Unauthorized,
            Self::AlreadyVoted => Status::Conflict,
            Self::IncompleteBallot(_) => Status::UnprocessableEntity,
            Self::Csv(_) | Self::UnsupportedImportFormat(_) | Self::MissingImportColumns(_) => {
                Status::BadRequest
            }
            Self::Status(status, _) => *status,
        };
        if status.class() == StatusClass::ServerError {
            error!("{self}");
        } else {
            warn!("{self}");
        }
        Err(status)
    }
}
