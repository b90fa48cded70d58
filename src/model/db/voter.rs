use std::ops::{Deref, DerefMut};

use chrono::NaiveDate;
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    model::{
        common::Cnic,
        mongodb::{is_duplicate_key_error, Coll, Id},
    },
    service::VoterStore,
};

/// Core voter data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterCore {
    pub name: String,
    /// Unique national identity number.
    pub cnic: Cnic,
    pub dob: NaiveDate,
    /// Age in whole years at registration.
    pub age: i64,
    /// Legacy flag, never set; participation lives in each election's ledger.
    #[serde(default)]
    pub voted: bool,
}

impl VoterCore {
    pub fn new(name: String, cnic: Cnic, dob: NaiveDate, age: i64) -> Self {
        Self {
            name,
            cnic,
            dob,
            age,
            voted: false,
        }
    }
}

/// A voter without an ID.
pub type NewVoter = VoterCore;

/// A voter from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub voter: VoterCore,
}

impl Deref for Voter {
    type Target = VoterCore;

    fn deref(&self) -> &Self::Target {
        &self.voter
    }
}

impl DerefMut for Voter {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.voter
    }
}

#[rocket::async_trait]
impl VoterStore for Coll<Voter> {
    async fn exists(&self, cnic: &Cnic) -> Result<bool> {
        let count = self
            .count_documents(doc! { "cnic": cnic.as_str() }, None)
            .await?;
        Ok(count > 0)
    }

    async fn insert(&self, voter: NewVoter) -> Result<bool> {
        match self.retype::<NewVoter>().insert_one(&voter, None).await {
            Ok(_) => Ok(true),
            Err(e) if is_duplicate_key_error(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl VoterCore {
        pub fn example() -> Self {
            Self::new(
                "Ayesha Khan".to_string(),
                "35202-1234567-1".parse().unwrap(),
                NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
                34,
            )
        }

        pub fn example2() -> Self {
            Self::new(
                "Bilal Ahmed".to_string(),
                "35202-7654321-3".parse().unwrap(),
                NaiveDate::from_ymd_opt(1985, 3, 2).unwrap(),
                39,
            )
        }
    }
}
