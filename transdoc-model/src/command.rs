//! The top-level command/response unions crossing the wire.

use crate::error::DomainError;
use crate::{
    address, insurance, insurance_data, invoice, patient, protocol_entry, service_provider,
    transport_details, transport_document, user,
};
use crate::{
    Address, Insurance, InsuranceData, Invoice, Patient, ProtocolEntry, ServiceProvider,
    TransportDetails, TransportDocument, User,
};
use serde::{Deserialize, Serialize};
use transdoc_types::{EntityKind, OperationKind};

/// A typed request describing one entity operation and its parameters.
///
/// Exactly one variant is active; each variant wraps the target entity's
/// own command enum, so dispatch is exhaustive on both levels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Address(address::Command),
    Insurance(insurance::Command),
    InsuranceData(insurance_data::Command),
    Patient(patient::Command),
    ServiceProvider(service_provider::Command),
    TransportDetails(transport_details::Command),
    TransportDocument(transport_document::Command),
    User(user::Command),
    Invoice(invoice::Command),
    ProtocolEntry(protocol_entry::Command),
}

impl Command {
    /// The entity this command targets.
    pub fn entity(&self) -> EntityKind {
        match self {
            Command::Address(_) => EntityKind::Address,
            Command::Insurance(_) => EntityKind::Insurance,
            Command::InsuranceData(_) => EntityKind::InsuranceData,
            Command::Patient(_) => EntityKind::Patient,
            Command::ServiceProvider(_) => EntityKind::ServiceProvider,
            Command::TransportDetails(_) => EntityKind::TransportDetails,
            Command::TransportDocument(_) => EntityKind::TransportDocument,
            Command::User(_) => EntityKind::User,
            Command::Invoice(_) => EntityKind::Invoice,
            Command::ProtocolEntry(_) => EntityKind::ProtocolEntry,
        }
    }

    /// The operation this command performs.
    pub fn operation(&self) -> OperationKind {
        match self {
            Command::Address(c) => c.operation(),
            Command::Insurance(c) => c.operation(),
            Command::InsuranceData(c) => c.operation(),
            Command::Patient(c) => c.operation(),
            Command::ServiceProvider(c) => c.operation(),
            Command::TransportDetails(c) => c.operation(),
            Command::TransportDocument(c) => c.operation(),
            Command::User(c) => c.operation(),
            Command::Invoice(c) => c.operation(),
            Command::ProtocolEntry(c) => c.operation(),
        }
    }

    /// `(entity, operation)` pair, the unit permissions are granted on.
    pub fn descriptor(&self) -> (EntityKind, OperationKind) {
        (self.entity(), self.operation())
    }

    pub fn is_mutation(&self) -> bool {
        self.operation().is_mutation()
    }
}

/// The success payload of a dispatched command.
///
/// Variants mirror command shapes one-to-one: creates and updates return
/// the resulting record, deletes return [`Response::Acknowledged`], list
/// queries return the matching records in insertion order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Address(Address),
    AddressList(Vec<Address>),
    Insurance(Insurance),
    InsuranceList(Vec<Insurance>),
    InsuranceData(InsuranceData),
    InsuranceDataList(Vec<InsuranceData>),
    Patient(Patient),
    PatientList(Vec<Patient>),
    ServiceProvider(ServiceProvider),
    ServiceProviderList(Vec<ServiceProvider>),
    TransportDetails(TransportDetails),
    TransportDetailsList(Vec<TransportDetails>),
    TransportDocument(TransportDocument),
    TransportDocumentList(Vec<TransportDocument>),
    User(User),
    UserList(Vec<User>),
    Invoice(Invoice),
    InvoiceList(Vec<Invoice>),
    ProtocolEntry(ProtocolEntry),
    ProtocolEntryList(Vec<ProtocolEntry>),
    /// Acknowledges an operation with no payload (deletes).
    Acknowledged,
}

/// What actually crosses the wire inside the response envelope: either the
/// success payload or the typed domain failure.
pub type CommandResult = Result<Response, DomainError>;
