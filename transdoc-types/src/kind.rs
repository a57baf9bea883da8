//! Entity and operation discriminants.
//!
//! Every command maps to exactly one `(EntityKind, OperationKind)` pair,
//! which is the unit the permission table grants on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The entity a command targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Address,
    Insurance,
    InsuranceData,
    Patient,
    ServiceProvider,
    TransportDetails,
    TransportDocument,
    User,
    Invoice,
    ProtocolEntry,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Address => "address",
            EntityKind::Insurance => "insurance",
            EntityKind::InsuranceData => "insurance data",
            EntityKind::Patient => "patient",
            EntityKind::ServiceProvider => "service provider",
            EntityKind::TransportDetails => "transport details",
            EntityKind::TransportDocument => "transport document",
            EntityKind::User => "user",
            EntityKind::Invoice => "invoice",
            EntityKind::ProtocolEntry => "protocol entry",
        };
        f.write_str(name)
    }
}

/// The operation a command performs on its entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Create,
    CreateFull,
    CreateWithInsuranceData,
    Update,
    UpdateService,
    UpdateRole,
    UpdateCredentials,
    UpdateInsuranceData,
    UpdatePatientSignature,
    UpdateTransporterSignature,
    AssignPatient,
    AssignTransportProvider,
    Archive,
    Move,
    Settle,
    Delete,
    Login,
    Get,
    GetList,
    GetListByIdList,
}

impl OperationKind {
    /// True for operations that change stored state.
    pub fn is_mutation(self) -> bool {
        !matches!(
            self,
            OperationKind::Get
                | OperationKind::GetList
                | OperationKind::GetListByIdList
                | OperationKind::Login
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
