//! Insurance data entity: links a patient to an insurance with a status.

use crate::insurance::Insurance;
use crate::patient::Patient;
use serde::{Deserialize, Serialize};
use transdoc_types::{Id, OperationKind, Reference};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceData {
    pub id: Id<InsuranceData>,
    pub patient: Reference<Patient>,
    pub insurance: Reference<Insurance>,
    pub insurance_status: i32,
}

/// Operations on insurance data. Records are immutable once created:
/// status changes create a new record (no Update command).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Create {
        patient: Reference<Patient>,
        insurance: Reference<Insurance>,
        insurance_status: i32,
    },
    Delete {
        id: Id<InsuranceData>,
    },
    Get {
        id: Id<InsuranceData>,
    },
    GetList {
        filter: Filter,
    },
}

impl Command {
    pub fn operation(&self) -> OperationKind {
        match self {
            Command::Create { .. } => OperationKind::Create,
            Command::Delete { .. } => OperationKind::Delete,
            Command::Get { .. } => OperationKind::Get,
            Command::GetList { .. } => OperationKind::GetList,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub patient: Option<Reference<Patient>>,
    pub insurance: Option<Reference<Insurance>>,
}

impl Filter {
    pub fn matches(&self, data: &InsuranceData) -> bool {
        self.patient.as_ref().is_none_or(|p| *p == data.patient)
            && self.insurance.as_ref().is_none_or(|i| *i == data.insurance)
    }
}
