use std::ops::{Deref, DerefMut};

use chrono::NaiveDate;
use mongodb::bson::doc;
use rocket::futures::TryStreamExt;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    model::{
        common::Cnic,
        mongodb::{is_duplicate_key_error, Coll, Id},
    },
    service::CandidateStore,
};

/// Core candidate data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    pub name: String,
    pub party: String,
    pub cnic: Cnic,
    pub dob: NaiveDate,
    /// Age in whole years at registration.
    pub age: i64,
}

/// A candidate without an ID.
pub type NewCandidate = CandidateCore;

/// A candidate from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Candidate {
    /// The view of this candidate that gets frozen into an election.
    pub fn snapshot(&self) -> CandidateSnapshot {
        CandidateSnapshot {
            id: self.id,
            name: self.name.clone(),
            party: self.party.clone(),
        }
    }
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}

/// A candidate as listed on an election's ballot. Later changes to the
/// candidate record do not affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSnapshot {
    #[serde(rename = "_id")]
    pub id: Id,
    pub name: String,
    pub party: String,
}

#[rocket::async_trait]
impl CandidateStore for Coll<Candidate> {
    async fn get(&self, id: &Id) -> Result<Option<Candidate>> {
        Ok(self.find_one(id.as_doc(), None).await?)
    }

    async fn find_by_identity(&self, cnic: &Cnic, dob: NaiveDate) -> Result<Option<Candidate>> {
        let filter = doc! {
            "cnic": cnic.as_str(),
            "dob": dob.format("%Y-%m-%d").to_string(),
        };
        Ok(self.find_one(filter, None).await?)
    }

    async fn insert(&self, candidate: NewCandidate) -> Result<Option<Id>> {
        match self.retype::<NewCandidate>().insert_one(&candidate, None).await {
            // Unwrap safe because the ID comes directly from the DB.
            Ok(result) => Ok(Some(result.inserted_id.as_object_id().unwrap().into())),
            Err(e) if is_duplicate_key_error(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<Candidate>> {
        Ok(self.find(None, None).await?.try_collect().await?)
    }
}
