//! Shared vocabulary types for transdoc.
//!
//! Every other workspace crate depends on this one. It holds the typed
//! identifiers (`Id`, `Reference`), the entity/operation discriminants used
//! by the permission table, and the closed domain enums (transport reasons,
//! transportation types, user roles, document lifecycle states).

mod id;
mod kind;
mod role;
mod transport;

pub use id::{Id, Reference};
pub use kind::{EntityKind, OperationKind};
pub use role::UserRole;
pub use transport::{
    DocumentStatus, PatientCondition, TransportDirection, TransportReason, TransportationType,
};
