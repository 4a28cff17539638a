use std::ops::{Deref, DerefMut};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::mongodb::{Coll, Id};

/// Username of the admin created on first launch.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
/// Password of the admin created on first launch. Change it immediately.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123!";

/// Core admin user data.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCore {
    pub username: String,
    pub password_hash: String,
}

impl AdminCore {
    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        // Unwrap safe because the only way to create an AdminCore is via
        // TryFrom<AdminCredentials>, so the hash is always well-formed.
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap()
    }
}

/// An admin without an ID.
pub type NewAdmin = AdminCore;

/// An admin user from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub admin: AdminCore,
}

impl Deref for Admin {
    type Target = AdminCore;

    fn deref(&self) -> &Self::Target {
        &self.admin
    }
}

impl DerefMut for Admin {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.admin
    }
}

/// Ensure that at least one admin exists, creating the default one if needed.
pub async fn ensure_admin_exists(admins: &Coll<NewAdmin>) -> Result<()> {
    use crate::model::api::admin::AdminCredentials;

    let count = admins.count_documents(None, None).await?;
    if count == 0 {
        let default_admin: NewAdmin = AdminCredentials {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
        .try_into()
        .unwrap(); // Valid since the default credentials meet the length requirements.
        admins.insert_one(default_admin, None).await?;
        warn!("Created default admin '{DEFAULT_ADMIN_USERNAME}'; change its password!");
    }
    Ok(())
}
