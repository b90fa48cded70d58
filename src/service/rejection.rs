use rocket::http::Status;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad classification of a [`Rejection`], reported to clients alongside
/// the human-readable message so they never have to parse it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Malformed or out-of-range input.
    Validation,
    /// Scheduling overlap or duplicate registration.
    Conflict,
    /// A referenced election, candidate or voter does not exist.
    NotFound,
    /// The caller's role does not permit the operation.
    Authorization,
    /// The operation is not valid in the current state.
    State,
}

impl FailureKind {
    /// The HTTP status used when reporting a failure of this kind.
    pub fn status(self) -> Status {
        match self {
            Self::Validation => Status::BadRequest,
            Self::Conflict | Self::State => Status::Conflict,
            Self::NotFound => Status::NotFound,
            Self::Authorization => Status::Forbidden,
        }
    }
}

/// An expected business failure. These are returned to the caller as typed
/// outcomes; they never indicate a defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Invalid election schedule.")]
    InvalidSchedule,
    #[error("Invalid date format. Use YYYY-MM-DD.")]
    InvalidDate,
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("Invalid CNIC.")]
    InvalidCnic,
    #[error("{role} must be at least {min_age} years old.")]
    Underage { role: &'static str, min_age: i64 },
    #[error("Candidate {0} not found.")]
    UnknownCandidate(String),
    #[error("Election schedule conflicts with an existing election.")]
    ScheduleConflict,
    #[error("Voter already registered.")]
    VoterAlreadyRegistered,
    #[error("Candidate already exists.")]
    CandidateAlreadyExists,
    #[error("Election not found.")]
    ElectionNotFound,
    #[error("Candidate not found.")]
    CandidateNotFound,
    #[error("Voter not registered.")]
    NotRegistered,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Voter has already cast a vote in this election.")]
    AlreadyVoted,
    #[error("Election is not active.")]
    ElectionInactive,
}

impl Rejection {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidSchedule
            | Self::InvalidDate
            | Self::InvalidTimestamp(_)
            | Self::InvalidCnic
            | Self::Underage { .. }
            | Self::UnknownCandidate(_) => FailureKind::Validation,
            Self::ScheduleConflict | Self::VoterAlreadyRegistered | Self::CandidateAlreadyExists => {
                FailureKind::Conflict
            }
            Self::ElectionNotFound | Self::CandidateNotFound | Self::NotRegistered => {
                FailureKind::NotFound
            }
            Self::Forbidden(_) | Self::InvalidCredentials => FailureKind::Authorization,
            Self::AlreadyVoted | Self::ElectionInactive => FailureKind::State,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::InvalidCredentials => Status::Unauthorized,
            other => other.kind().status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_messages() {
        assert_eq!(Rejection::ScheduleConflict.kind(), FailureKind::Conflict);
        assert_eq!(Rejection::AlreadyVoted.kind(), FailureKind::State);
        assert_eq!(Rejection::NotRegistered.kind(), FailureKind::NotFound);
        assert_eq!(
            Rejection::Forbidden("Admins are not allowed to cast votes.").to_string(),
            "Admins are not allowed to cast votes."
        );
        let underage = Rejection::Underage {
            role: "Candidate",
            min_age: 25,
        };
        assert_eq!(underage.kind(), FailureKind::Validation);
        assert_eq!(
            underage.to_string(),
            "Candidate must be at least 25 years old."
        );
    }

    #[test]
    fn statuses() {
        assert_eq!(Rejection::InvalidSchedule.status(), Status::BadRequest);
        assert_eq!(Rejection::ElectionInactive.status(), Status::Conflict);
        assert_eq!(Rejection::ElectionNotFound.status(), Status::NotFound);
        assert_eq!(Rejection::Forbidden("nope").status(), Status::Forbidden);
        assert_eq!(Rejection::InvalidCredentials.status(), Status::Unauthorized);
    }
}
