use chrono::{Duration, NaiveDate};
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::{
    model::{
        common::Cnic,
        db::admin::{ensure_admin_exists, NewAdmin},
        mongodb::{ensure_indexes_exist, Coll},
    },
    service::CandidatePolicy,
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    admin_name: String,
    admin_cnic: Cnic,
    admin_dob: NaiveDate,
    #[serde(default)]
    candidate_policy: CandidatePolicy,
    // secrets
    jwt_secret: String,
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to encrypt JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// What to do with unknown candidate IDs in election requests.
    pub fn candidate_policy(&self) -> CandidatePolicy {
        self.candidate_policy
    }

    /// The admin created when the database has none.
    pub fn default_admin(&self) -> NewAdmin {
        NewAdmin {
            name: self.admin_name.clone(),
            cnic: self.admin_cnic.clone(),
            dob: self.admin_dob,
        }
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the other fairings and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    db_uri: String,
}

/// A fairing that loads the MongoDB config, connects to the database,
/// performs any setup necessary, and places both a `Client` and a `Database`
/// into managed state.
///
/// Must be attached after [`ConfigFairing`], since the default admin comes
/// from the [`Config`].
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        let client = match MongoClient::with_uri_str(config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&get_database_name());

        if let Err(e) = setup_database(&rocket, &db).await {
            error!("Failed to set up database: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        rocket = rocket.manage(client).manage(db);
        Ok(rocket)
    }
}

/// Ensure the indexes and the default admin exist.
pub(crate) async fn setup_database(
    rocket: &Rocket<Build>,
    db: &mongodb::Database,
) -> Result<(), mongodb::error::Error> {
    ensure_indexes_exist(db).await?;
    match rocket.state::<Config>() {
        Some(config) => ensure_admin_exists(&Coll::from_db(db), config).await,
        None => {
            warn!("No config loaded; skipping default admin creation");
            Ok(())
        }
    }
}

/// Get the name of the database to use (production version).
#[cfg(not(test))]
fn get_database_name() -> String {
    "evote".to_string()
}

/// Get the name of the database to use (test version).
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
pub(crate) fn get_database_name() -> String {
    let random: u32 = rand::random();
    let db = format!("test{random}");
    info!("Using database {db}");
    db
}

#[cfg(test)]
mod examples {
    use super::*;

    impl Config {
        pub fn example() -> Self {
            Self::example_with_secret("not a real secret, only for tests")
        }

        pub fn example_with_secret(secret: &str) -> Self {
            let admin = NewAdmin::example();
            Self {
                auth_ttl: 3600,
                admin_name: admin.name,
                admin_cnic: admin.cnic,
                admin_dob: admin.dob,
                candidate_policy: CandidatePolicy::Drop,
                jwt_secret: secret.to_string(),
            }
        }
    }
}
