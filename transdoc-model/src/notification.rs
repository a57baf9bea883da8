//! Server-pushed domain events.

use serde::{Deserialize, Serialize};
use transdoc_types::EntityKind;

/// Asynchronous out-of-band event pushed from server to clients, e.g. when
/// another client modified a shared transport document. Carried encrypted,
/// independent of any pending request/response exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    EntityCreated {
        entity: EntityKind,
        id: String,
    },
    EntityUpdated {
        entity: EntityKind,
        id: String,
    },
    EntityDeleted {
        entity: EntityKind,
        id: String,
    },
    DocumentArchived {
        id: String,
    },
    PatientAssigned {
        document: String,
        patient: String,
    },
    TransportProviderAssigned {
        details: String,
        provider: String,
    },
}
