use serde::{Deserialize, Serialize};

/// A request to register a voter. Dates of birth are `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterRegistration {
    pub name: String,
    pub cnic: String,
    pub dob: String,
}

#[cfg(test)]
mod examples {
    use super::*;

    use crate::model::db::voter::NewVoter;

    impl VoterRegistration {
        pub fn example() -> Self {
            Self::from_voter(NewVoter::example())
        }

        pub fn example2() -> Self {
            Self::from_voter(NewVoter::example2())
        }

        fn from_voter(voter: NewVoter) -> Self {
            Self {
                name: voter.name,
                cnic: voter.cnic.to_string(),
                dob: voter.dob.to_string(),
            }
        }
    }
}
