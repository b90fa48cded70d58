use crate::{
    error::Result,
    model::{
        common::{Cnic, Role},
        mongodb::Id,
    },
};

use super::{
    clock::Clock,
    store::{CandidateStore, ElectionRepository, RecordOutcome, VoterStore},
    Caller, Rejection,
};

/// Records votes. Each (voter, election) pair moves from "not voted" to
/// "voted" at most once, and never back.
pub struct VotingService<'a> {
    voters: &'a dyn VoterStore,
    candidates: &'a dyn CandidateStore,
    elections: &'a dyn ElectionRepository,
    clock: &'a dyn Clock,
}

impl<'a> VotingService<'a> {
    pub fn new(
        voters: &'a dyn VoterStore,
        candidates: &'a dyn CandidateStore,
        elections: &'a dyn ElectionRepository,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            voters,
            candidates,
            elections,
            clock,
        }
    }

    /// Cast the caller's vote for `candidate_id` in `election_id`.
    ///
    /// The checks run in a fixed order and the first failure wins. A
    /// malformed ID is treated as one that does not exist.
    pub async fn cast_vote(&self, caller: &Caller, election_id: &str, candidate_id: &str) -> Result<()> {
        if caller.role == Role::Admin {
            return Err(Rejection::Forbidden("Admins are not allowed to cast votes.").into());
        }

        let voter = match caller.id.parse::<Cnic>() {
            Ok(cnic) if self.voters.exists(&cnic).await? => cnic,
            _ => return Err(Rejection::NotRegistered.into()),
        };

        let election_id = election_id.parse::<Id>().ok();
        if let Some(id) = election_id {
            if self.elections.has_voted(id, &voter).await? {
                return Err(Rejection::AlreadyVoted.into());
            }
        }

        let election = match election_id {
            Some(id) => self.elections.get(id).await?,
            None => None,
        }
        .ok_or(Rejection::ElectionNotFound)?;

        let candidate = match candidate_id.parse::<Id>() {
            Ok(id) => self.candidates.get(&id).await?,
            Err(_) => None,
        }
        .ok_or(Rejection::CandidateNotFound)?;

        if !election.is_active(self.clock.now()) {
            return Err(Rejection::ElectionInactive.into());
        }

        match self
            .elections
            .record_vote(election.id, &voter, candidate.id)
            .await?
        {
            RecordOutcome::Recorded => {
                info!("Recorded vote in election {}", election.id);
                Ok(())
            }
            RecordOutcome::AlreadyVoted => {
                debug!("Concurrent duplicate vote by {voter} in election {}", election.id);
                Err(Rejection::AlreadyVoted.into())
            }
            RecordOutcome::ElectionMissing => Err(Rejection::ElectionNotFound.into()),
        }
    }
}
