//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way, e.g.:
//!
//! - IDs and datetimes are serialised in MongoDB's own format.
//! - Dates of birth are serialised as `YYYY-MM-DD` strings.

pub mod admin;
pub mod candidate;
pub mod election;
pub mod voter;
