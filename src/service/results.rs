use serde::{Deserialize, Serialize};

use crate::{error::Result, model::mongodb::Id};

use super::{store::ElectionRepository, Rejection};

/// One candidate's line in an election's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub name: String,
    pub party: String,
    pub votes: u64,
}

impl ResultRow {
    /// The synthetic winner reported when several candidates share the top count.
    pub fn draw(votes: u64) -> Self {
        Self {
            name: "Draw".to_string(),
            party: "N/A".to_string(),
            votes,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionResults {
    pub results: Vec<ResultRow>,
    pub winner: Option<ResultRow>,
}

/// Read-only tallying of an election's ledger.
pub struct ResultsService<'a> {
    elections: &'a dyn ElectionRepository,
}

impl<'a> ResultsService<'a> {
    pub fn new(elections: &'a dyn ElectionRepository) -> Self {
        Self { elections }
    }

    pub async fn compute(&self, election_id: Id) -> Result<ElectionResults> {
        let election = self
            .elections
            .get(election_id)
            .await?
            .ok_or(Rejection::ElectionNotFound)?;

        if election.votes.is_empty() {
            return Ok(ElectionResults::default());
        }

        let results: Vec<_> = election
            .candidates
            .iter()
            .map(|candidate| ResultRow {
                name: candidate.name.clone(),
                party: candidate.party.clone(),
                votes: election.votes.tally(&candidate.id),
            })
            .collect();

        let Some(max) = results.iter().map(|row| row.votes).max() else {
            return Ok(ElectionResults::default());
        };
        let mut leaders = results.iter().filter(|row| row.votes == max);
        let winner = match (leaders.next(), leaders.next()) {
            (Some(leader), None) => leader.clone(),
            _ => ResultRow::draw(max),
        };

        Ok(ElectionResults {
            results,
            winner: Some(winner),
        })
    }
}
