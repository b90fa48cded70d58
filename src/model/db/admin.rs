use std::ops::{Deref, DerefMut};

use chrono::NaiveDate;
use mongodb::{bson::doc, error::Error as DbError};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    model::{
        common::Cnic,
        mongodb::{Coll, Id},
    },
};

/// Core admin user data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCore {
    pub name: String,
    pub cnic: Cnic,
    pub dob: NaiveDate,
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

/// If there are no admins, create the default one described by the config.
/// Otherwise, do nothing.
pub async fn ensure_admin_exists(admins: &Coll<NewAdmin>, config: &Config) -> Result<(), DbError> {
    let count = admins.count_documents(None, None).await?;
    if count == 0 {
        let admin = config.default_admin();
        warn!("No admins found; creating default admin {}", admin.cnic);
        admins.insert_one(admin, None).await?;
    }
    Ok(())
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl AdminCore {
        pub fn example() -> Self {
            Self {
                name: "Election Commissioner".to_string(),
                cnic: "11111-1111111-1".parse().unwrap(),
                dob: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            }
        }
    }
}
