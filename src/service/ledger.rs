use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    common::Cnic,
    mongodb::{serde_string_map, Id},
};

/// Per-election record of vote counts and voter participation.
///
/// Candidate tallies and voter flags are kept in separate maps so the two id
/// spaces can never collide. Entries are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteLedger {
    /// Vote count per candidate ID.
    #[serde(default, with = "serde_string_map")]
    tallies: HashMap<Id, u64>,
    /// Voters who have voted in this election; the value is always `true`.
    #[serde(default)]
    voters: HashMap<Cnic, bool>,
}

impl VoteLedger {
    /// Has nothing at all been recorded yet?
    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty() && self.voters.is_empty()
    }

    pub fn has_voted(&self, voter: &Cnic) -> bool {
        self.voters.get(voter).copied().unwrap_or(false)
    }

    /// Votes recorded for the candidate, zero if none.
    pub fn tally(&self, candidate: &Id) -> u64 {
        self.tallies.get(candidate).copied().unwrap_or(0)
    }

    /// Number of voters who have voted.
    pub fn turnout(&self) -> usize {
        self.voters.len()
    }

    /// Record a vote, unless this voter has already voted. Returns whether
    /// the vote was recorded.
    pub fn record(&mut self, voter: &Cnic, candidate: Id) -> bool {
        if self.has_voted(voter) {
            return false;
        }
        *self.tallies.entry(candidate).or_insert(0) += 1;
        self.voters.insert(voter.clone(), true);
        true
    }

    /// Document path of a candidate's tally, relative to the ledger.
    pub fn tally_path(candidate: &Id) -> String {
        format!("tallies.{}", candidate.to_hex())
    }

    /// Document path of a voter's participation flag, relative to the ledger.
    pub fn voter_path(voter: &Cnic) -> String {
        format!("voters.{voter}")
    }
}
