//! Types shared between the database, API and service layers.

mod cnic;
mod role;
pub mod time;

pub use cnic::Cnic;
pub use role::Role;
