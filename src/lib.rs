#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

#[cfg(test)]
use mongodb::Client as MongoClient;
use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use config::Config;

/// Build the server, with all routes mounted and fairings attached.
/// The database connection is established during ignition.
pub fn build() -> Rocket<Build> {
    mount_routes(rocket::build())
        .attach(config::ConfigFairing)
        .attach(config::DatabaseFairing)
}

/// Mount every API route and catcher onto the given rocket and attach the
/// request logger.
fn mount_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/api", api::routes())
        .mount("/api/reports", api::report_routes())
        .register("/", api::catchers())
        .attach(logging::LoggerFairing)
}

/// Build a test server around an already-connected database client,
/// using the named database rather than the production one.
#[cfg(test)]
pub(crate) async fn rocket_for_db(client: MongoClient, db_name: &str) -> Rocket<Build> {
    let db = client.database(db_name);
    model::mongodb::ensure_indexes_exist(&db)
        .await
        .expect("Failed to create test indexes");
    mount_routes(rocket::build())
        .attach(config::ConfigFairing)
        .manage(client)
        .manage(db)
}

/// Connect to the database configured in `Rocket.toml` for tests.
#[cfg(test)]
pub(crate) async fn db_client() -> MongoClient {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    MongoClient::with_uri_str(&db_uri)
        .await
        .expect("Could not connect to test database")
}

/// A fresh, randomly-named database for a single test.
#[cfg(test)]
pub(crate) fn database() -> String {
    let random: u32 = rand::random();
    format!("test{random}")
}
