use crate::{
    error::Result,
    model::{
        common::{
            time::{age_at, parse_date},
            Cnic,
        },
        db::{
            candidate::{CandidateSnapshot, NewCandidate},
            voter::NewVoter,
        },
        mongodb::Id,
    },
};

use super::{
    clock::Clock,
    store::{CandidateStore, VoterStore},
    Rejection,
};

pub const MIN_VOTER_AGE: i64 = 18;
pub const MIN_CANDIDATE_AGE: i64 = 25;

/// Registers voters and candidates.
pub struct RegistrationService<'a> {
    voters: &'a dyn VoterStore,
    candidates: &'a dyn CandidateStore,
    clock: &'a dyn Clock,
}

impl<'a> RegistrationService<'a> {
    pub fn new(voters: &'a dyn VoterStore, candidates: &'a dyn CandidateStore, clock: &'a dyn Clock) -> Self {
        Self {
            voters,
            candidates,
            clock,
        }
    }

    pub async fn register_voter(&self, name: String, cnic: &str, date_of_birth: &str) -> Result<()> {
        let dob = parse_date(date_of_birth)?;
        let cnic: Cnic = cnic.parse()?;
        if self.voters.exists(&cnic).await? {
            return Err(Rejection::VoterAlreadyRegistered.into());
        }
        let age = age_at(dob, self.clock.now());
        if age < MIN_VOTER_AGE {
            return Err(Rejection::Underage {
                role: "Voter",
                min_age: MIN_VOTER_AGE,
            }
            .into());
        }

        // Lost a race with a concurrent registration.
        if !self.voters.insert(NewVoter::new(name, cnic.clone(), dob, age)).await? {
            return Err(Rejection::VoterAlreadyRegistered.into());
        }
        info!("Registered voter {cnic}");
        Ok(())
    }

    pub async fn add_candidate(
        &self,
        name: String,
        party: String,
        cnic: &str,
        date_of_birth: &str,
    ) -> Result<Id> {
        let dob = parse_date(date_of_birth)?;
        let cnic: Cnic = cnic.parse()?;
        let age = age_at(dob, self.clock.now());
        if age < MIN_CANDIDATE_AGE {
            return Err(Rejection::Underage {
                role: "Candidate",
                min_age: MIN_CANDIDATE_AGE,
            }
            .into());
        }
        if self.candidates.find_by_identity(&cnic, dob).await?.is_some() {
            return Err(Rejection::CandidateAlreadyExists.into());
        }

        let candidate = NewCandidate {
            name,
            party,
            cnic,
            dob,
            age,
        };
        let id = self
            .candidates
            .insert(candidate)
            .await?
            .ok_or(Rejection::CandidateAlreadyExists)?;
        info!("Added candidate {id}");
        Ok(id)
    }

    pub async fn list_candidates(&self) -> Result<Vec<CandidateSnapshot>> {
        let candidates = self.candidates.list().await?;
        Ok(candidates.iter().map(|c| c.snapshot()).collect())
    }
}
