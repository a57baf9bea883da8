//! The domain failure taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use transdoc_types::{EntityKind, OperationKind};

/// Typed failure of a dispatched command.
///
/// Unlike transport errors, these are part of the protocol: they serialize
/// into the encrypted response envelope and come back to the caller with
/// full type information. None of them is retried automatically; list
/// retrieval failures are the one family a caller may retry idempotently.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DomainError {
    // ── Authorization ───────────────────────────────────────────────
    #[error("role is not allowed to execute {operation} on {entity}")]
    UserNotAllowed {
        entity: EntityKind,
        operation: OperationKind,
    },

    #[error("no authenticated user bound to this session")]
    UserNotProvided,

    #[error("wrong credentials")]
    WrongCredentials,

    // ── Not found, per entity ───────────────────────────────────────
    #[error("address {id} not found")]
    AddressNotFound { id: String },

    #[error("insurance {id} not found")]
    InsuranceNotFound { id: String },

    #[error("insurance data {id} not found")]
    InsuranceDataNotFound { id: String },

    #[error("patient {id} not found")]
    PatientNotFound { id: String },

    #[error("service provider {id} not found")]
    ProviderNotFound { id: String },

    #[error("transport details {id} not found")]
    TransportDetailsNotFound { id: String },

    #[error("transport document {id} not found")]
    TransportDocumentNotFound { id: String },

    #[error("user {id} not found")]
    UserNotFound { id: String },

    #[error("invoice {id} not found")]
    InvoiceNotFound { id: String },

    #[error("protocol entry {id} not found")]
    ProtocolEntryNotFound { id: String },

    // ── State / process violations ──────────────────────────────────
    #[error("illegal process: {0}")]
    IllegalProcess(String),

    #[error("transport document {id} is archived and rejects further mutation")]
    IsArchived { id: String },

    #[error("transport document {id} is not archivable: {reason}")]
    IsNotArchivable { id: String, reason: String },

    // ── Conflicts ───────────────────────────────────────────────────
    #[error("user name {user_name:?} is already used")]
    UserNameAlreadyUsed { user_name: String },

    // ── List retrieval, per entity, cause preserved ─────────────────
    #[error("address list retrieval failed: {cause}")]
    AddressListFailed { cause: String },

    #[error("insurance list retrieval failed: {cause}")]
    InsuranceListFailed { cause: String },

    #[error("insurance data list retrieval failed: {cause}")]
    InsuranceDataListFailed { cause: String },

    #[error("patient list retrieval failed: {cause}")]
    PatientListFailed { cause: String },

    #[error("service provider list retrieval failed: {cause}")]
    ProviderListFailed { cause: String },

    #[error("transport details list retrieval failed: {cause}")]
    TransportDetailsListFailed { cause: String },

    #[error("transport document list retrieval failed: {cause}")]
    TransportDocumentListFailed { cause: String },

    #[error("user list retrieval failed: {cause}")]
    UserListFailed { cause: String },

    #[error("invoice list retrieval failed: {cause}")]
    InvoiceListFailed { cause: String },

    #[error("protocol list retrieval failed: {cause}")]
    ProtocolListFailed { cause: String },

    // ── Catch-all for unexpected dispatch failures ──────────────────
    #[error("processing failed: {0}")]
    Processing(String),
}

impl DomainError {
    /// Maps an entity kind to its not-found variant.
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        let id = id.into();
        match entity {
            EntityKind::Address => DomainError::AddressNotFound { id },
            EntityKind::Insurance => DomainError::InsuranceNotFound { id },
            EntityKind::InsuranceData => DomainError::InsuranceDataNotFound { id },
            EntityKind::Patient => DomainError::PatientNotFound { id },
            EntityKind::ServiceProvider => DomainError::ProviderNotFound { id },
            EntityKind::TransportDetails => DomainError::TransportDetailsNotFound { id },
            EntityKind::TransportDocument => DomainError::TransportDocumentNotFound { id },
            EntityKind::User => DomainError::UserNotFound { id },
            EntityKind::Invoice => DomainError::InvoiceNotFound { id },
            EntityKind::ProtocolEntry => DomainError::ProtocolEntryNotFound { id },
        }
    }

    /// Maps an entity kind to its list-retrieval-failed variant.
    pub fn list_failed(entity: EntityKind, cause: impl Into<String>) -> Self {
        let cause = cause.into();
        match entity {
            EntityKind::Address => DomainError::AddressListFailed { cause },
            EntityKind::Insurance => DomainError::InsuranceListFailed { cause },
            EntityKind::InsuranceData => DomainError::InsuranceDataListFailed { cause },
            EntityKind::Patient => DomainError::PatientListFailed { cause },
            EntityKind::ServiceProvider => DomainError::ProviderListFailed { cause },
            EntityKind::TransportDetails => DomainError::TransportDetailsListFailed { cause },
            EntityKind::TransportDocument => DomainError::TransportDocumentListFailed { cause },
            EntityKind::User => DomainError::UserListFailed { cause },
            EntityKind::Invoice => DomainError::InvoiceListFailed { cause },
            EntityKind::ProtocolEntry => DomainError::ProtocolListFailed { cause },
        }
    }
}
