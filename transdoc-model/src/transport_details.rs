//! Transport details entity: one executed (or planned) transport leg of a
//! transport document, including signatures.

use crate::address::Address;
use crate::service_provider::ServiceProvider;
use crate::transport_document::TransportDocument;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use transdoc_types::{Id, OperationKind, PatientCondition, Reference, TransportDirection};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransportDetails {
    pub id: Id<TransportDetails>,
    pub transport_document: Reference<TransportDocument>,
    pub transport_date: NaiveDate,
    pub start_address: Option<Reference<Address>>,
    pub end_address: Option<Reference<Address>>,
    pub direction: Option<TransportDirection>,
    pub patient_condition: Option<PatientCondition>,
    pub transport_provider: Option<Reference<ServiceProvider>>,
    pub tour_number: Option<String>,
    pub payment_exemption: Option<bool>,
    pub patient_signature: Option<String>,
    pub patient_signature_date: Option<NaiveDate>,
    pub transporter_signature: Option<String>,
    pub transporter_signature_date: Option<NaiveDate>,
}

impl TransportDetails {
    pub fn update_with(
        &self,
        start_address: Option<Reference<Address>>,
        end_address: Option<Reference<Address>>,
        direction: Option<TransportDirection>,
        patient_condition: Option<PatientCondition>,
        tour_number: Option<String>,
        payment_exemption: Option<bool>,
    ) -> Self {
        Self {
            start_address,
            end_address,
            direction,
            patient_condition,
            tour_number,
            payment_exemption,
            ..self.clone()
        }
    }

    pub fn assign_transport_provider(&self, provider: Reference<ServiceProvider>) -> Self {
        Self {
            transport_provider: Some(provider),
            ..self.clone()
        }
    }

    pub fn with_patient_signature(&self, signature: String, date: NaiveDate) -> Self {
        Self {
            patient_signature: Some(signature),
            patient_signature_date: Some(date),
            ..self.clone()
        }
    }

    pub fn with_transporter_signature(&self, signature: String, date: NaiveDate) -> Self {
        Self {
            transporter_signature: Some(signature),
            transporter_signature_date: Some(date),
            ..self.clone()
        }
    }

    /// Both the patient and the transporter have signed this leg.
    pub fn is_fully_signed(&self) -> bool {
        self.patient_signature.is_some() && self.transporter_signature.is_some()
    }
}

/// Operations on transport details.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    AssignTransportProvider {
        id: Id<TransportDetails>,
        transport_provider: Reference<ServiceProvider>,
    },
    Create {
        transport_document: Reference<TransportDocument>,
        transport_date: NaiveDate,
    },
    Delete {
        id: Id<TransportDetails>,
    },
    Update {
        id: Id<TransportDetails>,
        start_address: Option<Reference<Address>>,
        end_address: Option<Reference<Address>>,
        direction: Option<TransportDirection>,
        patient_condition: Option<PatientCondition>,
        tour_number: Option<String>,
        payment_exemption: Option<bool>,
    },
    UpdatePatientSignature {
        id: Id<TransportDetails>,
        patient_signature: String,
        patient_signature_date: NaiveDate,
    },
    UpdateTransporterSignature {
        id: Id<TransportDetails>,
        transporter_signature: String,
        transporter_signature_date: NaiveDate,
    },
    Get {
        id: Id<TransportDetails>,
    },
    GetList {
        filter: Filter,
    },
    GetListByIdList {
        ids: Vec<Id<TransportDetails>>,
    },
}

impl Command {
    pub fn operation(&self) -> OperationKind {
        match self {
            Command::AssignTransportProvider { .. } => OperationKind::AssignTransportProvider,
            Command::Create { .. } => OperationKind::Create,
            Command::Delete { .. } => OperationKind::Delete,
            Command::Update { .. } => OperationKind::Update,
            Command::UpdatePatientSignature { .. } => OperationKind::UpdatePatientSignature,
            Command::UpdateTransporterSignature { .. } => OperationKind::UpdateTransporterSignature,
            Command::Get { .. } => OperationKind::Get,
            Command::GetList { .. } => OperationKind::GetList,
            Command::GetListByIdList { .. } => OperationKind::GetListByIdList,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub transport_document: Option<Reference<TransportDocument>>,
    pub transport_date: Option<NaiveDate>,
    pub address: Option<Reference<Address>>,
    pub direction: Option<TransportDirection>,
    pub transport_provider: Option<Reference<ServiceProvider>>,
}

impl Filter {
    pub fn matches(&self, details: &TransportDetails) -> bool {
        self.transport_document
            .as_ref()
            .is_none_or(|d| *d == details.transport_document)
            && self
                .transport_date
                .is_none_or(|d| d == details.transport_date)
            // An address filter matches either end of the leg.
            && self.address.as_ref().is_none_or(|a| {
                details.start_address.as_ref() == Some(a)
                    || details.end_address.as_ref() == Some(a)
            })
            && self.direction.is_none_or(|d| details.direction == Some(d))
            && self
                .transport_provider
                .as_ref()
                .is_none_or(|p| details.transport_provider.as_ref() == Some(p))
    }
}
