//! Patient entity and its commands.

use crate::address::Address;
use crate::insurance::Insurance;
use crate::insurance_data::InsuranceData;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use transdoc_types::{Id, OperationKind, Reference};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// The insurance number doubles as the patient's identifier.
    pub insurance_number: Id<Patient>,
    pub insurance_data: Reference<InsuranceData>,
    pub last_name: String,
    pub first_name: String,
    pub birth_date: NaiveDate,
    pub address: Reference<Address>,
}

impl Patient {
    pub fn update_with(
        &self,
        last_name: String,
        first_name: String,
        birth_date: NaiveDate,
        address: Reference<Address>,
    ) -> Self {
        Self {
            last_name,
            first_name,
            birth_date,
            address,
            ..self.clone()
        }
    }

    pub fn move_to(&self, address: Reference<Address>) -> Self {
        Self {
            address,
            ..self.clone()
        }
    }

    pub fn with_insurance_data(&self, insurance_data: Reference<InsuranceData>) -> Self {
        Self {
            insurance_data,
            ..self.clone()
        }
    }
}

/// Operations on patients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Create {
        insurance_number: String,
        insurance_data: Reference<InsuranceData>,
        last_name: String,
        first_name: String,
        birth_date: NaiveDate,
        address: Reference<Address>,
    },
    /// Creates the patient and its insurance data record in one step.
    CreateWithInsuranceData {
        insurance_number: String,
        insurance: Reference<Insurance>,
        insurance_status: i32,
        last_name: String,
        first_name: String,
        birth_date: NaiveDate,
        address: Reference<Address>,
    },
    Delete {
        insurance_number: Id<Patient>,
    },
    Move {
        insurance_number: Id<Patient>,
        address: Reference<Address>,
    },
    Update {
        insurance_number: Id<Patient>,
        last_name: String,
        first_name: String,
        birth_date: NaiveDate,
        address: Reference<Address>,
    },
    UpdateInsuranceData {
        insurance_number: Id<Patient>,
        insurance_data: Reference<InsuranceData>,
    },
    Get {
        insurance_number: Id<Patient>,
    },
    GetList {
        filter: Filter,
    },
}

impl Command {
    pub fn operation(&self) -> OperationKind {
        match self {
            Command::Create { .. } => OperationKind::Create,
            Command::CreateWithInsuranceData { .. } => OperationKind::CreateWithInsuranceData,
            Command::Delete { .. } => OperationKind::Delete,
            Command::Move { .. } => OperationKind::Move,
            Command::Update { .. } => OperationKind::Update,
            Command::UpdateInsuranceData { .. } => OperationKind::UpdateInsuranceData,
            Command::Get { .. } => OperationKind::Get,
            Command::GetList { .. } => OperationKind::GetList,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub address: Option<Reference<Address>>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub insurance_data: Option<Reference<InsuranceData>>,
}

impl Filter {
    pub fn matches(&self, patient: &Patient) -> bool {
        self.address.as_ref().is_none_or(|a| *a == patient.address)
            && self
                .last_name
                .as_ref()
                .is_none_or(|n| n.eq_ignore_ascii_case(&patient.last_name))
            && self
                .first_name
                .as_ref()
                .is_none_or(|n| n.eq_ignore_ascii_case(&patient.first_name))
            && self.birth_date.is_none_or(|d| d == patient.birth_date)
            && self
                .insurance_data
                .as_ref()
                .is_none_or(|i| *i == patient.insurance_data)
    }
}
