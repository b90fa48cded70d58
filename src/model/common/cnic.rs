use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::service::Rejection;

/// A national identity number. Voters are keyed by it.
///
/// Only ASCII letters, digits, `-` and `_` are allowed, so that a CNIC is
/// always safe to use as a document field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Cnic(String);

impl Cnic {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Cnic {
    type Err = Rejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(Rejection::InvalidCnic)
        }
    }
}

impl<'de> Deserialize<'de> for Cnic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Display for Cnic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
