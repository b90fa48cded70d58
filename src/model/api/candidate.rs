use serde::{Deserialize, Serialize};

use crate::model::{api::id::ApiId, db::candidate::CandidateSnapshot};

/// A request to add a candidate. Dates of birth are `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRegistration {
    pub name: String,
    pub party: String,
    pub cnic: String,
    pub dob: String,
}

/// A candidate as shown on a ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDescription {
    pub id: ApiId,
    pub name: String,
    pub party: String,
}

impl From<CandidateSnapshot> for CandidateDescription {
    fn from(snapshot: CandidateSnapshot) -> Self {
        Self {
            id: snapshot.id.into(),
            name: snapshot.name,
            party: snapshot.party,
        }
    }
}
