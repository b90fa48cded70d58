//! Election management rules, independent of HTTP and of the storage engine.

mod clock;
mod elections;
mod ledger;
pub mod memory;
mod registry;
mod rejection;
mod results;
mod schedule;
mod store;
mod voting;

pub use clock::{Clock, FixedClock, SystemClock};
pub use elections::{CandidatePolicy, ElectionService, Scheduled};
pub use ledger::VoteLedger;
pub use registry::{RegistrationService, MIN_CANDIDATE_AGE, MIN_VOTER_AGE};
pub use rejection::{FailureKind, Rejection};
pub use results::{ElectionResults, ResultRow, ResultsService};
pub use schedule::{has_conflict, Schedule, Window};
pub use store::{CandidateStore, ElectionDetails, ElectionRepository, RecordOutcome, VoterStore};
pub use voting::VotingService;

use crate::model::common::Role;

/// The authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// The caller's CNIC.
    pub id: String,
    pub role: Role,
}

impl Caller {
    pub fn voter(cnic: impl Into<String>) -> Self {
        Self {
            id: cnic.into(),
            role: Role::Voter,
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Admin,
        }
    }
}
