use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    api::{candidate::CandidateDescription, id::ApiId},
    db::election::Election,
};

/// A request to create or replace an election.
///
/// Times are ISO-8601 strings; see [`crate::model::common::time::parse_timestamp`].
/// Candidate IDs are hex strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionRequest {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub candidate_ids: Vec<String>,
}

/// A ballot choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub candidate_id: String,
}

/// Just enough to list an election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSummary {
    pub id: ApiId,
    pub name: String,
}

impl From<Election> for ElectionSummary {
    fn from(election: Election) -> Self {
        Self {
            id: election.id.into(),
            name: election.election.name,
        }
    }
}

/// Everything about an election except who voted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionDescription {
    pub id: ApiId,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub candidates: Vec<CandidateDescription>,
    pub turnout: usize,
}

impl From<Election> for ElectionDescription {
    fn from(election: Election) -> Self {
        let turnout = election.votes.turnout();
        let core = election.election;
        Self {
            id: election.id.into(),
            name: core.name,
            start_time: core.start_time,
            end_time: core.end_time,
            candidates: core.candidates.into_iter().map(Into::into).collect(),
            turnout,
        }
    }
}

/// The ballot an election was scheduled with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledElection {
    pub id: ApiId,
    pub candidates: Vec<CandidateDescription>,
}
