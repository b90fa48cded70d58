use serde::{Deserialize, Serialize};

/// Login credentials: a CNIC and the matching date of birth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub cnic: String,
    pub dob: String,
}
