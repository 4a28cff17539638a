//! Issuing of student login values: the short credential a student types in,
//! and the opaque access token embedded in their QR code.

use data_encoding::BASE64URL_NOPAD;
use mongodb::bson::doc;
use rand::Rng;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{db::student::Student, mongodb::Coll};

/// Length of every issued credential.
pub const CREDENTIAL_LENGTH: usize = 6;

/// Credentials avoid lowercase so they survive being read out loud or typed
/// from a printed certificate.
const CREDENTIAL_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random bytes behind each access token.
const ACCESS_TOKEN_BYTES: usize = 16;

const SEQUENTIAL_SUFFIX_LENGTH: usize = 2;

/// How a candidate credential is generated. Selected by the
/// `credential_strategy` config value; uniqueness is always validated against
/// the student collection afterwards, whatever the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialStrategy {
    /// Uppercase letters and digits, e.g. `QM3K7Z`.
    Alphanumeric,
    /// Fixed-width digits, e.g. `048291`.
    Numeric,
    /// Human-readable: the roster sequence number plus a short random
    /// suffix, e.g. `0042-XQ`.
    Sequential,
}

impl CredentialStrategy {
    /// Generate a candidate credential. `sequence` is the 1-based roster
    /// position, only used by [`CredentialStrategy::Sequential`].
    pub fn generate(self, rng: &mut impl Rng, sequence: u64) -> String {
        match self {
            Self::Alphanumeric => random_chars(rng, CREDENTIAL_LENGTH),
            Self::Numeric => format!("{:0width$}", rng.gen_range(0..1_000_000), width = CREDENTIAL_LENGTH),
            Self::Sequential => format!(
                "{:04}-{}",
                sequence,
                random_chars(rng, SEQUENTIAL_SUFFIX_LENGTH)
            ),
        }
    }
}

fn random_chars(rng: &mut impl Rng, count: usize) -> String {
    (0..count)
        .map(|_| CREDENTIAL_CHARSET[rng.gen_range(0..CREDENTIAL_CHARSET.len())] as char)
        .collect()
}

/// Generate an unguessable access token, independent of the credential.
/// URL-safe since it travels as a path segment when a QR code is scanned.
pub fn access_token() -> String {
    let mut bytes = [0_u8; ACCESS_TOKEN_BYTES];
    rand::thread_rng().fill(&mut bytes);
    BASE64URL_NOPAD.encode(&bytes)
}

/// Issues credentials that are unique across the student collection,
/// retrying a bounded number of times on collision.
pub struct CredentialIssuer<'a> {
    strategy: CredentialStrategy,
    attempts: u32,
    students: &'a Coll<Student>,
}

impl<'a> CredentialIssuer<'a> {
    pub fn new(strategy: CredentialStrategy, attempts: u32, students: &'a Coll<Student>) -> Self {
        Self {
            strategy,
            attempts,
            students,
        }
    }

    /// Issue a credential not used by any existing student.
    ///
    /// Fails with [`Error::IssuanceExhausted`] once the attempt budget runs
    /// out; the caller should treat that as fatal for the whole import.
    pub async fn issue(&self, sequence: u64) -> Result<String> {
        for _ in 0..self.attempts {
            // Generated in its own statement so the rng is dropped before the await.
            let candidate = self.strategy.generate(&mut rand::thread_rng(), sequence);
            let existing = self
                .students
                .find_one(doc! { "credential": &candidate }, None)
                .await?;
            if existing.is_none() {
                return Ok(candidate);
            }
        }
        Err(Error::IssuanceExhausted(self.attempts))
    }
}

#[cfg(test)]
mod tests {
    use rocket::local::asynchronous::Client;

    use crate::model::db::student::NewStudent;

    use super::*;

    #[test]
    fn alphanumeric_shape() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let credential = CredentialStrategy::Alphanumeric.generate(&mut rng, 1);
            assert_eq!(credential.len(), CREDENTIAL_LENGTH);
            assert!(credential
                .bytes()
                .all(|byte| CREDENTIAL_CHARSET.contains(&byte)));
        }
    }

    #[test]
    fn numeric_shape() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let credential = CredentialStrategy::Numeric.generate(&mut rng, 1);
            assert_eq!(credential.len(), CREDENTIAL_LENGTH);
            assert!(credential.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn sequential_embeds_sequence() {
        let mut rng = rand::thread_rng();
        let credential = CredentialStrategy::Sequential.generate(&mut rng, 42);
        assert!(credential.starts_with("0042-"));
        assert_eq!(credential.len(), 4 + 1 + SEQUENTIAL_SUFFIX_LENGTH);
    }

    #[backend_test]
    async fn issue_avoids_existing_credentials(
        _client: Client,
        new_students: Coll<NewStudent>,
        students: Coll<Student>,
    ) {
        let existing = NewStudent::example();
        new_students.insert_one(&existing, None).await.unwrap();

        let issuer = CredentialIssuer::new(CredentialStrategy::Alphanumeric, 20, &students);
        let credential = issuer.issue(1).await.unwrap();

        assert_ne!(credential, existing.credential);
        assert!(students
            .find_one(doc! { "credential": &credential }, None)
            .await
            .unwrap()
            .is_none());
    }

    #[backend_test]
    async fn issue_fails_once_attempts_run_out(
        _client: Client,
        new_students: Coll<NewStudent>,
        students: Coll<Student>,
    ) {
        // Exhaust by construction: every sequential credential for this
        // sequence number is already taken, so each attempt collides and is
        // retried until the budget runs out.
        let taken: Vec<NewStudent> = (0..CREDENTIAL_CHARSET.len())
            .flat_map(|first| (0..CREDENTIAL_CHARSET.len()).map(move |second| (first, second)))
            .map(|(first, second)| {
                let mut student = NewStudent::example();
                student.doc_id = String::new();
                student.credential = format!(
                    "0042-{}{}",
                    CREDENTIAL_CHARSET[first] as char,
                    CREDENTIAL_CHARSET[second] as char
                );
                student.access_token = format!("collision-{first}-{second}");
                student
            })
            .collect();
        new_students.insert_many(&taken, None).await.unwrap();

        let issuer = CredentialIssuer::new(CredentialStrategy::Sequential, 5, &students);
        assert!(matches!(
            issuer.issue(42).await,
            Err(Error::IssuanceExhausted(5))
        ));

        // With no attempt budget at all it fails immediately.
        let issuer = CredentialIssuer::new(CredentialStrategy::Alphanumeric, 0, &students);
        assert!(matches!(
            issuer.issue(1).await,
            Err(Error::IssuanceExhausted(0))
        ));
    }

    #[test]
    fn access_tokens_are_url_safe_and_distinct() {
        let first = access_token();
        let second = access_token();
        assert_ne!(first, second);
        for token in [first, second] {
            assert!(token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }
}
