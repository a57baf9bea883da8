//! Transport document entity, its commands and its lifecycle.
//!
//! The document is the center of the domain: it is created by a healthcare
//! provider, gets a patient assigned, accumulates transport details with
//! signatures, and ends its life archived. `Archived` is absorbing; the
//! dispatcher rejects every further mutation on an archived document.

use crate::error::DomainError;
use crate::insurance_data::InsuranceData;
use crate::patient::Patient;
use crate::service_provider::ServiceProvider;
use crate::user::User;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use transdoc_types::{
    DocumentStatus, Id, OperationKind, Reference, TransportReason, TransportationType,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransportDocument {
    pub id: Id<TransportDocument>,
    pub patient: Option<Reference<Patient>>,
    pub insurance_data: Option<Reference<InsuranceData>>,
    pub transport_reason: TransportReason,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub weekly_frequency: Option<u32>,
    pub healthcare_service_provider: Reference<ServiceProvider>,
    pub transportation_type: TransportationType,
    pub additional_info: Option<String>,
    /// The prescribing user's signature reference.
    pub signature: Reference<User>,
    pub status: DocumentStatus,
}

impl TransportDocument {
    /// Returns a copy with the updatable properties replaced. Patient and
    /// insurance data assignment go through [`assign_patient`] instead.
    ///
    /// [`assign_patient`]: TransportDocument::assign_patient
    #[allow(clippy::too_many_arguments)]
    pub fn update_with(
        &self,
        transport_reason: TransportReason,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        weekly_frequency: Option<u32>,
        healthcare_service_provider: Reference<ServiceProvider>,
        transportation_type: TransportationType,
        additional_info: Option<String>,
        signature: Reference<User>,
    ) -> Self {
        Self {
            transport_reason,
            start_date,
            end_date,
            weekly_frequency,
            healthcare_service_provider,
            transportation_type,
            additional_info,
            signature,
            ..self.clone()
        }
    }

    /// Assigns patient and insurance data, advancing `Draft` documents to
    /// `AssignedPatient`.
    pub fn assign_patient(
        &self,
        patient: Reference<Patient>,
        insurance_data: Reference<InsuranceData>,
    ) -> Result<Self, DomainError> {
        if self.status.is_archived() {
            return Err(DomainError::IsArchived {
                id: self.id.to_string(),
            });
        }
        let status = if self.status == DocumentStatus::Draft {
            DocumentStatus::AssignedPatient
        } else {
            // Re-assigning on a later state keeps the state.
            self.status
        };
        Ok(Self {
            patient: Some(patient),
            insurance_data: Some(insurance_data),
            status,
            ..self.clone()
        })
    }

    /// Advances the document along the state graph, validating the edge.
    pub fn advance_to(&self, next: DocumentStatus) -> Result<Self, DomainError> {
        if !self.status.can_transition(next) {
            return Err(DomainError::IllegalProcess(format!(
                "transport document {} cannot move from {:?} to {next:?}",
                self.id, self.status
            )));
        }
        Ok(Self {
            status: next,
            ..self.clone()
        })
    }

    /// Archives the document.
    ///
    /// Eligibility: a patient and insurance data must be assigned and the
    /// document's transport details must be fully signed (`fully_signed` is
    /// established by the dispatcher from the details records). Archiving
    /// an archived document fails.
    pub fn archive(&self, fully_signed: bool) -> Result<Self, DomainError> {
        let fail = |reason: &str| DomainError::IsNotArchivable {
            id: self.id.to_string(),
            reason: reason.to_string(),
        };
        if self.status.is_archived() {
            return Err(fail("already archived"));
        }
        if self.patient.is_none() || self.insurance_data.is_none() {
            return Err(fail("missing patient or insurance data"));
        }
        if !fully_signed {
            return Err(fail("missing signatures"));
        }
        Ok(Self {
            status: DocumentStatus::Archived,
            ..self.clone()
        })
    }
}

/// Operations on transport documents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Create {
        patient: Option<Reference<Patient>>,
        insurance_data: Option<Reference<InsuranceData>>,
        transport_reason: TransportReason,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        weekly_frequency: Option<u32>,
        healthcare_service_provider: Reference<ServiceProvider>,
        transportation_type: TransportationType,
        additional_info: Option<String>,
        signature: Reference<User>,
    },
    Update {
        id: Id<TransportDocument>,
        transport_reason: TransportReason,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        weekly_frequency: Option<u32>,
        healthcare_service_provider: Reference<ServiceProvider>,
        transportation_type: TransportationType,
        additional_info: Option<String>,
        signature: Reference<User>,
    },
    AssignPatient {
        id: Id<TransportDocument>,
        patient: Reference<Patient>,
        insurance_data: Reference<InsuranceData>,
    },
    Archive {
        id: Id<TransportDocument>,
    },
    Delete {
        id: Id<TransportDocument>,
    },
    Get {
        id: Id<TransportDocument>,
    },
    GetList {
        filter: Filter,
    },
}

impl Command {
    pub fn operation(&self) -> OperationKind {
        match self {
            Command::Create { .. } => OperationKind::Create,
            Command::Update { .. } => OperationKind::Update,
            Command::AssignPatient { .. } => OperationKind::AssignPatient,
            Command::Archive { .. } => OperationKind::Archive,
            Command::Delete { .. } => OperationKind::Delete,
            Command::Get { .. } => OperationKind::Get,
            Command::GetList { .. } => OperationKind::GetList,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub patient: Option<Reference<Patient>>,
    pub insurance_data: Option<Reference<InsuranceData>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub healthcare_service_provider: Option<Reference<ServiceProvider>>,
    pub transportation_type: Option<TransportationType>,
    pub signature: Option<Reference<User>>,
}

impl Filter {
    pub fn matches(&self, doc: &TransportDocument) -> bool {
        self.patient
            .as_ref()
            .is_none_or(|p| doc.patient.as_ref() == Some(p))
            && self
                .insurance_data
                .as_ref()
                .is_none_or(|i| doc.insurance_data.as_ref() == Some(i))
            && self.start_date.is_none_or(|d| d == doc.start_date)
            && self.end_date.is_none_or(|d| doc.end_date == Some(d))
            && self
                .healthcare_service_provider
                .as_ref()
                .is_none_or(|s| *s == doc.healthcare_service_provider)
            && self
                .transportation_type
                .is_none_or(|t| t == doc.transportation_type)
            && self.signature.as_ref().is_none_or(|s| *s == doc.signature)
    }
}
