//! Backend server for a two-office school election.
//!
//! Admins register candidates and bulk-import the student roster; every
//! imported student receives a unique short login credential and an opaque
//! access token (the target of a printed QR code). Students authenticate with
//! either value, cast exactly one ballot covering both offices, and can never
//! authenticate again afterwards.

#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod import;
pub mod logging;
pub mod model;
pub mod report;

pub use config::Config;

use config::{ConfigFairing, DatabaseFairing};
use logging::LoggerFairing;
use rocket::{Build, Rocket};

/// Assemble the server: all routes plus the config, database, and logging fairings.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(LoggerFairing)
}

/// Get a database client for the configured `db_uri` (test version).
#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let db_config = rocket::build()
        .figment()
        .extract::<config::DbConfig>()
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(&db_config.db_uri)
        .await
        .expect("Could not connect to database")
}

/// Get a fresh database name (test version).
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
pub(crate) fn database() -> String {
    format!("test{}", rand::random::<u32>())
}

/// Build a rocket against an existing database connection (test version).
/// Performs the same database setup as [`config::DatabaseFairing`].
#[cfg(test)]
pub(crate) async fn rocket_for_db(client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    use model::{db::admin::ensure_admin_exists, mongodb::{ensure_indexes_exist, Coll}};

    let db = client.database(db_name);
    ensure_indexes_exist(&db).await.unwrap();
    ensure_admin_exists(&Coll::from_db(&db)).await.unwrap();

    rocket::build()
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .manage(client)
        .manage(db)
}
