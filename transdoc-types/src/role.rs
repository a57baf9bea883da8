//! User roles.
//!
//! A session is bound to exactly one role at a time. Which `(entity,
//! operation)` pairs a role may execute is decided by the capability table
//! in the dispatch crate; this enum is only the closed set of role names.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    HealthcareAdmin,
    HealthcareDoctor,
    HealthcareUser,
    TransportAdmin,
    TransportDoctor,
    TransportInvoice,
    TransportUser,
    InsuranceAdmin,
    InsuranceUser,
    SuperUser,
}

impl UserRole {
    /// All roles, in declaration order. Used by permission-table tests.
    pub const ALL: [UserRole; 10] = [
        UserRole::HealthcareAdmin,
        UserRole::HealthcareDoctor,
        UserRole::HealthcareUser,
        UserRole::TransportAdmin,
        UserRole::TransportDoctor,
        UserRole::TransportInvoice,
        UserRole::TransportUser,
        UserRole::InsuranceAdmin,
        UserRole::InsuranceUser,
        UserRole::SuperUser,
    ];
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
