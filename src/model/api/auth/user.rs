use crate::model::{
    common::Role,
    db::{admin::Admin, voter::Voter},
};

/// A kind of user an [`AuthToken`](super::AuthToken) can be required for.
pub trait User {
    /// The role this user type has, or `None` if any role will do.
    const ROLE: Option<Role>;
}

impl User for Voter {
    const ROLE: Option<Role> = Some(Role::Voter);
}

impl User for Admin {
    const ROLE: Option<Role> = Some(Role::Admin);
}

/// Any logged-in user, whatever their role.
pub struct Anyone;

impl User for Anyone {
    const ROLE: Option<Role> = None;
}
