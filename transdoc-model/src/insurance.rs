//! Insurance entity and its commands.

use crate::address::Address;
use serde::{Deserialize, Serialize};
use transdoc_types::{Id, OperationKind, Reference};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insurance {
    /// Provider-assigned insurance identifier.
    pub id: Id<Insurance>,
    pub name: String,
    pub address: Reference<Address>,
}

impl Insurance {
    pub fn update_with(&self, name: String) -> Self {
        Self {
            name,
            ..self.clone()
        }
    }

    pub fn move_to(&self, address: Reference<Address>) -> Self {
        Self {
            address,
            ..self.clone()
        }
    }
}

/// Operations on insurances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Create {
        insurance_id: String,
        name: String,
        address: Reference<Address>,
    },
    Delete {
        id: Id<Insurance>,
    },
    Move {
        id: Id<Insurance>,
        address: Reference<Address>,
    },
    Update {
        id: Id<Insurance>,
        name: String,
    },
    Get {
        id: Id<Insurance>,
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
            Command::Move { .. } => OperationKind::Move,
            Command::Update { .. } => OperationKind::Update,
            Command::Get { .. } => OperationKind::Get,
            Command::GetList { .. } => OperationKind::GetList,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub address: Option<Reference<Address>>,
    pub name: Option<String>,
}

impl Filter {
    pub fn matches(&self, insurance: &Insurance) -> bool {
        self.address.as_ref().is_none_or(|a| *a == insurance.address)
            && self
                .name
                .as_ref()
                .is_none_or(|n| n.eq_ignore_ascii_case(&insurance.name))
    }
}
