//! Invoice entity: billing record for an executed transport leg.

use crate::insurance::Insurance;
use crate::transport_details::TransportDetails;
use serde::{Deserialize, Serialize};
use transdoc_types::{Id, OperationKind, Reference};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Id<Invoice>,
    pub transport_details: Reference<TransportDetails>,
    pub insurance: Reference<Insurance>,
    pub amount_cents: i64,
    pub is_settled: bool,
}

impl Invoice {
    pub fn settle(&self) -> Self {
        Self {
            is_settled: true,
            ..self.clone()
        }
    }
}

/// Operations on invoices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Create {
        transport_details: Reference<TransportDetails>,
        insurance: Reference<Insurance>,
        amount_cents: i64,
    },
    Settle {
        id: Id<Invoice>,
    },
    Delete {
        id: Id<Invoice>,
    },
    Get {
        id: Id<Invoice>,
    },
    GetList {
        filter: Filter,
    },
}

impl Command {
    pub fn operation(&self) -> OperationKind {
        match self {
            Command::Create { .. } => OperationKind::Create,
            Command::Settle { .. } => OperationKind::Settle,
            Command::Delete { .. } => OperationKind::Delete,
            Command::Get { .. } => OperationKind::Get,
            Command::GetList { .. } => OperationKind::GetList,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub insurance: Option<Reference<Insurance>>,
    pub is_settled: Option<bool>,
}

impl Filter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.insurance.as_ref().is_none_or(|i| *i == invoice.insurance)
            && self.is_settled.is_none_or(|s| s == invoice.is_settled)
    }
}
