//! The full collaborator bundle used by tests and local runs.

use crate::auth::MemAuthStore;
use crate::table::MemTable;
use transdoc_model::{
    Address, Insurance, InsuranceData, Invoice, Patient, ProtocolEntry, ServiceProvider,
    TransportDetails, TransportDocument, User,
};

/// One in-memory table per entity plus the credential store.
///
/// Cloning is cheap and shares the underlying tables, matching how a real
/// deployment would hand the same backing store to every session.
#[derive(Clone, Default)]
pub struct MemDirectory {
    pub addresses: MemTable<Address>,
    pub insurances: MemTable<Insurance>,
    pub insurance_data: MemTable<InsuranceData>,
    pub patients: MemTable<Patient>,
    pub service_providers: MemTable<ServiceProvider>,
    pub transport_details: MemTable<TransportDetails>,
    pub transport_documents: MemTable<TransportDocument>,
    pub users: MemTable<User>,
    pub invoices: MemTable<Invoice>,
    pub protocol: MemTable<ProtocolEntry>,
    pub auth: MemAuthStore,
}

impl MemDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}
