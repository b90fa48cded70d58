use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, serde_helpers::chrono_datetime_as_bson_datetime, to_bson, DateTime as BsonDateTime},
    options::FindOptions,
};
use rocket::futures::TryStreamExt;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    model::{
        common::Cnic,
        db::candidate::CandidateSnapshot,
        mongodb::{Coll, Id},
    },
    service::{ElectionDetails, ElectionRepository, RecordOutcome, Schedule, VoteLedger, Window},
};

/// Core election data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionCore {
    /// Election name.
    pub name: String,
    /// Election start time.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start_time: DateTime<Utc>,
    /// Election end time.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub end_time: DateTime<Utc>,
    /// The ballot, in display order.
    pub candidates: Vec<CandidateSnapshot>,
    /// Vote counts and voter participation.
    #[serde(default)]
    pub votes: VoteLedger,
}

impl ElectionCore {
    /// A fresh election with an empty ledger.
    pub fn new(details: ElectionDetails) -> Self {
        Self {
            name: details.name,
            start_time: details.window.start(),
            end_time: details.window.end(),
            candidates: details.candidates,
            votes: VoteLedger::default(),
        }
    }

    /// The election's voting window.
    pub fn window(&self) -> Option<Window> {
        Window::new(self.start_time, self.end_time).ok()
    }

    /// Is voting open at the given instant? Both bounds are inclusive.
    pub fn is_active(&self, at: DateTime<Utc>) -> bool {
        self.start_time <= at && at <= self.end_time
    }
}

/// An election without an ID.
pub type NewElection = ElectionCore;

/// An election from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub election: ElectionCore,
}

impl Deref for Election {
    type Target = ElectionCore;

    fn deref(&self) -> &Self::Target {
        &self.election
    }
}

impl DerefMut for Election {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.election
    }
}

/// A view on just an election's scheduling window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionSchedule {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub end_time: DateTime<Utc>,
}

impl ElectionSchedule {
    /// Convert into a [`Schedule`], or `None` if the stored window is inverted.
    pub fn into_schedule(self) -> Option<Schedule> {
        let window = Window::new(self.start_time, self.end_time).ok()?;
        Some(Schedule {
            id: self.id,
            window,
        })
    }
}

/// Full document path of a ledger entry.
fn votes_path(relative: String) -> String {
    format!("votes.{relative}")
}

#[rocket::async_trait]
impl ElectionRepository for Coll<Election> {
    async fn get(&self, id: Id) -> Result<Option<Election>> {
        Ok(self.find_one(id.as_doc(), None).await?)
    }

    async fn find_overlapping(&self, window: &Window, exclude: Option<Id>) -> Result<Vec<Schedule>> {
        let mut filter = doc! {
            "start_time": { "$lte": BsonDateTime::from_chrono(window.end()) },
            "end_time": { "$gte": BsonDateTime::from_chrono(window.start()) },
        };
        if let Some(id) = exclude {
            filter.insert("_id", doc! { "$ne": id });
        }
        let options = FindOptions::builder()
            .projection(doc! { "start_time": 1, "end_time": 1 })
            .build();
        let schedules: Vec<ElectionSchedule> = self
            .retype::<ElectionSchedule>()
            .find(filter, options)
            .await?
            .try_collect()
            .await?;
        let mut valid = Vec::with_capacity(schedules.len());
        for schedule in schedules {
            let id = schedule.id;
            match schedule.into_schedule() {
                Some(schedule) => valid.push(schedule),
                None => warn!("Election {id} has an inverted window; ignoring it"),
            }
        }
        Ok(valid)
    }

    async fn find_active(&self, at: DateTime<Utc>) -> Result<Vec<Election>> {
        let at = BsonDateTime::from_chrono(at);
        let filter = doc! {
            "start_time": { "$lte": at },
            "end_time": { "$gte": at },
        };
        Ok(self.find(filter, None).await?.try_collect().await?)
    }

    async fn list(&self) -> Result<Vec<Election>> {
        Ok(self.find(None, None).await?.try_collect().await?)
    }

    async fn insert(&self, election: NewElection) -> Result<Id> {
        let id = self
            .retype::<NewElection>()
            .insert_one(&election, None)
            .await?
            .inserted_id
            .as_object_id()
            .unwrap() // Valid because the ID comes directly from the DB
            .into();
        Ok(id)
    }

    async fn update(&self, id: Id, details: ElectionDetails) -> Result<bool> {
        let update = doc! {
            "$set": {
                "name": details.name,
                "start_time": BsonDateTime::from_chrono(details.window.start()),
                "end_time": BsonDateTime::from_chrono(details.window.end()),
                "candidates": to_bson(&details.candidates)?,
            }
        };
        let result = self.update_one(id.as_doc(), update, None).await?;
        Ok(result.matched_count == 1)
    }

    async fn delete(&self, id: Id) -> Result<bool> {
        let result = self.delete_one(id.as_doc(), None).await?;
        Ok(result.deleted_count == 1)
    }

    async fn has_voted(&self, id: Id, voter: &Cnic) -> Result<bool> {
        let voter_path = votes_path(VoteLedger::voter_path(voter));
        let filter = doc! {
            "_id": id,
            &voter_path: true,
        };
        let count = self.count_documents(filter, None).await?;
        Ok(count > 0)
    }

    async fn record_vote(&self, id: Id, voter: &Cnic, candidate: Id) -> Result<RecordOutcome> {
        let voter_path = votes_path(VoteLedger::voter_path(voter));
        let tally_path = votes_path(VoteLedger::tally_path(&candidate));
        // The voter flag in the filter makes this a single conditional write:
        // of two concurrent votes by the same voter, only one can match.
        let filter = doc! {
            "_id": id,
            &voter_path: { "$exists": false },
        };
        let update = doc! {
            "$inc": { &tally_path: 1_i64 },
            "$set": { &voter_path: true },
        };
        let result = self.update_one(filter, update, None).await?;
        if result.matched_count == 1 {
            return Ok(RecordOutcome::Recorded);
        }
        // Work out why nothing matched.
        let exists = self.count_documents(id.as_doc(), None).await? > 0;
        Ok(if exists {
            RecordOutcome::AlreadyVoted
        } else {
            RecordOutcome::ElectionMissing
        })
    }
}
