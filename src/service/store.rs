//! The persistence seams used by the services.
//!
//! MongoDB implementations live next to the document types in
//! [`crate::model::db`]; [`super::memory::MemoryStore`] implements all of
//! them in process.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    error::Result,
    model::{
        common::Cnic,
        db::{
            candidate::{Candidate, CandidateSnapshot, NewCandidate},
            election::{Election, NewElection},
            voter::NewVoter,
        },
        mongodb::Id,
    },
};

use super::schedule::{Schedule, Window};

/// Registered voters, keyed by CNIC.
#[rocket::async_trait]
pub trait VoterStore: Send + Sync {
    async fn exists(&self, cnic: &Cnic) -> Result<bool>;

    /// Insert a voter. Returns `false` if the CNIC is already registered.
    async fn insert(&self, voter: NewVoter) -> Result<bool>;
}

/// Registered candidates.
#[rocket::async_trait]
pub trait CandidateStore: Send + Sync {
    async fn get(&self, id: &Id) -> Result<Option<Candidate>>;

    async fn find_by_identity(&self, cnic: &Cnic, dob: NaiveDate) -> Result<Option<Candidate>>;

    /// Insert a candidate. Returns `None` if one with the same CNIC and date
    /// of birth already exists.
    async fn insert(&self, candidate: NewCandidate) -> Result<Option<Id>>;

    async fn list(&self) -> Result<Vec<Candidate>>;
}

/// The mutable parts of an election, as set by create and edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionDetails {
    pub name: String,
    pub window: Window,
    pub candidates: Vec<CandidateSnapshot>,
}

/// Result of the conditional ledger write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// The voter's flag was already set; nothing was written.
    AlreadyVoted,
    /// The election no longer exists.
    ElectionMissing,
}

/// Owner of election documents and their embedded vote ledgers.
#[rocket::async_trait]
pub trait ElectionRepository: Send + Sync {
    async fn get(&self, id: Id) -> Result<Option<Election>>;

    /// Schedules of elections whose window overlaps `window`, except `exclude`.
    async fn find_overlapping(&self, window: &Window, exclude: Option<Id>) -> Result<Vec<Schedule>>;

    /// Elections whose window contains `at`.
    async fn find_active(&self, at: DateTime<Utc>) -> Result<Vec<Election>>;

    async fn list(&self) -> Result<Vec<Election>>;

    async fn insert(&self, election: NewElection) -> Result<Id>;

    /// Overwrite name, window and candidates, leaving the ledger alone.
    /// Returns `false` if there is no such election.
    async fn update(&self, id: Id, details: ElectionDetails) -> Result<bool>;

    /// Returns `false` if there is no such election.
    async fn delete(&self, id: Id) -> Result<bool>;

    /// Is the voter marked in the election's ledger? `false` for a missing election.
    async fn has_voted(&self, id: Id, voter: &Cnic) -> Result<bool>;

    /// Atomically increment the candidate's tally and mark the voter, but
    /// only if the voter is not marked already.
    async fn record_vote(&self, id: Id, voter: &Cnic, candidate: Id) -> Result<RecordOutcome>;
}
