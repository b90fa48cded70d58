use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    error::Result,
    model::{
        common::Cnic,
        db::{
            candidate::{Candidate, NewCandidate},
            election::{Election, NewElection},
            voter::{NewVoter, Voter},
        },
        mongodb::Id,
    },
};

use super::{
    schedule::{Schedule, Window},
    store::{CandidateStore, ElectionDetails, ElectionRepository, RecordOutcome, VoterStore},
};

/// An in-process implementation of every store. Each collection sits behind
/// its own mutex, so a ledger update is atomic with respect to other callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    voters: Mutex<BTreeMap<Cnic, Voter>>,
    candidates: Mutex<BTreeMap<Id, Candidate>>,
    elections: Mutex<BTreeMap<Id, Election>>,
}

/// Lock a mutex, recovering the data if another holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[rocket::async_trait]
impl VoterStore for MemoryStore {
    async fn exists(&self, cnic: &Cnic) -> Result<bool> {
        Ok(lock(&self.voters).contains_key(cnic))
    }

    async fn insert(&self, voter: NewVoter) -> Result<bool> {
        let mut voters = lock(&self.voters);
        if voters.contains_key(&voter.cnic) {
            return Ok(false);
        }
        voters.insert(
            voter.cnic.clone(),
            Voter {
                id: Id::new(),
                voter,
            },
        );
        Ok(true)
    }
}

#[rocket::async_trait]
impl CandidateStore for MemoryStore {
    async fn get(&self, id: &Id) -> Result<Option<Candidate>> {
        Ok(lock(&self.candidates).get(id).cloned())
    }

    async fn find_by_identity(&self, cnic: &Cnic, dob: NaiveDate) -> Result<Option<Candidate>> {
        Ok(lock(&self.candidates)
            .values()
            .find(|c| &c.cnic == cnic && c.dob == dob)
            .cloned())
    }

    async fn insert(&self, candidate: NewCandidate) -> Result<Option<Id>> {
        let mut candidates = lock(&self.candidates);
        let duplicate = candidates
            .values()
            .any(|c| c.cnic == candidate.cnic && c.dob == candidate.dob);
        if duplicate {
            return Ok(None);
        }
        let id = Id::new();
        candidates.insert(id, Candidate { id, candidate });
        Ok(Some(id))
    }

    async fn list(&self) -> Result<Vec<Candidate>> {
        Ok(lock(&self.candidates).values().cloned().collect())
    }
}

#[rocket::async_trait]
impl ElectionRepository for MemoryStore {
    async fn get(&self, id: Id) -> Result<Option<Election>> {
        Ok(lock(&self.elections).get(&id).cloned())
    }

    async fn find_overlapping(&self, window: &Window, exclude: Option<Id>) -> Result<Vec<Schedule>> {
        Ok(lock(&self.elections)
            .values()
            .filter(|e| Some(e.id) != exclude)
            .filter_map(|e| {
                e.window().map(|w| Schedule {
                    id: e.id,
                    window: w,
                })
            })
            .filter(|s| s.window.overlaps(window))
            .collect())
    }

    async fn find_active(&self, at: DateTime<Utc>) -> Result<Vec<Election>> {
        Ok(lock(&self.elections)
            .values()
            .filter(|e| e.is_active(at))
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<Election>> {
        Ok(lock(&self.elections).values().cloned().collect())
    }

    async fn insert(&self, election: NewElection) -> Result<Id> {
        let id = Id::new();
        lock(&self.elections).insert(id, Election { id, election });
        Ok(id)
    }

    async fn update(&self, id: Id, details: ElectionDetails) -> Result<bool> {
        let mut elections = lock(&self.elections);
        Ok(match elections.get_mut(&id) {
            Some(election) => {
                election.name = details.name;
                election.start_time = details.window.start();
                election.end_time = details.window.end();
                election.candidates = details.candidates;
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: Id) -> Result<bool> {
        Ok(lock(&self.elections).remove(&id).is_some())
    }

    async fn has_voted(&self, id: Id, voter: &Cnic) -> Result<bool> {
        Ok(lock(&self.elections)
            .get(&id)
            .map_or(false, |e| e.votes.has_voted(voter)))
    }

    async fn record_vote(&self, id: Id, voter: &Cnic, candidate: Id) -> Result<RecordOutcome> {
        let mut elections = lock(&self.elections);
        Ok(match elections.get_mut(&id) {
            Some(election) => {
                if election.votes.record(voter, candidate) {
                    RecordOutcome::Recorded
                } else {
                    RecordOutcome::AlreadyVoted
                }
            }
            None => RecordOutcome::ElectionMissing,
        })
    }
}
