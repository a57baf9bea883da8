//! Collaborator capability traits.

use crate::error::StorageResult;
use async_trait::async_trait;
use transdoc_model::{
    address, insurance, insurance_data, invoice, patient, protocol_entry, service_provider,
    transport_details, transport_document, user,
};
use transdoc_model::{
    Address, Insurance, InsuranceData, Invoice, Patient, ProtocolEntry, ServiceProvider,
    TransportDetails, TransportDocument, User,
};
use transdoc_types::EntityKind;

/// A stored record together with its optimistic-concurrency version.
#[derive(Clone, Debug, PartialEq)]
pub struct VersionedRecord<T> {
    pub record: T,
    pub version: u64,
}

/// Binds a model entity to its storage identity and filter.
///
/// Implemented in this crate for every entity so that one generic table
/// serves them all; external collaborators implement [`EntityOps`]
/// directly instead.
pub trait StoredEntity: Clone + Send + Sync + 'static {
    type Filter: Send + Sync + 'static;

    fn kind() -> EntityKind;
    fn id(&self) -> String;
    fn matches(&self, filter: &Self::Filter) -> bool;
}

/// Per-entity persistence capability consumed by the dispatcher.
///
/// Contract: `update` and `delete` provide per-Id mutual exclusion;
/// `update` applies iff the stored version still equals
/// `expected_version`, otherwise fails with `StorageError::Conflict` and
/// applies nothing. `get_list` returns records in insertion order and has
/// no side effects.
#[async_trait]
pub trait EntityOps: Send + Sync {
    type Record: StoredEntity;

    async fn create(&self, record: Self::Record) -> StorageResult<Self::Record>;

    async fn get(&self, id: &str) -> StorageResult<Option<VersionedRecord<Self::Record>>>;

    async fn update(
        &self,
        expected_version: u64,
        record: Self::Record,
    ) -> StorageResult<Self::Record>;

    async fn delete(&self, id: &str) -> StorageResult<()>;

    async fn get_list(
        &self,
        filter: &<Self::Record as StoredEntity>::Filter,
    ) -> StorageResult<Vec<Self::Record>>;
}

macro_rules! stored_entity {
    ($record:ty, $filter:ty, $kind:expr, $id:ident) => {
        impl StoredEntity for $record {
            type Filter = $filter;

            fn kind() -> EntityKind {
                $kind
            }

            fn id(&self) -> String {
                self.$id.to_string()
            }

            fn matches(&self, filter: &Self::Filter) -> bool {
                filter.matches(self)
            }
        }
    };
}

stored_entity!(Address, address::Filter, EntityKind::Address, id);
stored_entity!(Insurance, insurance::Filter, EntityKind::Insurance, id);
stored_entity!(
    InsuranceData,
    insurance_data::Filter,
    EntityKind::InsuranceData,
    id
);
stored_entity!(Patient, patient::Filter, EntityKind::Patient, insurance_number);
stored_entity!(
    ServiceProvider,
    service_provider::Filter,
    EntityKind::ServiceProvider,
    id
);
stored_entity!(
    TransportDetails,
    transport_details::Filter,
    EntityKind::TransportDetails,
    id
);
stored_entity!(
    TransportDocument,
    transport_document::Filter,
    EntityKind::TransportDocument,
    id
);
stored_entity!(User, user::Filter, EntityKind::User, id);
stored_entity!(Invoice, invoice::Filter, EntityKind::Invoice, id);
stored_entity!(
    ProtocolEntry,
    protocol_entry::Filter,
    EntityKind::ProtocolEntry,
    id
);
