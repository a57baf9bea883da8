//! Protocol entry: append-only trail of successful mutations.
//!
//! Entries are written by the dispatcher, never by clients; the only
//! client-facing operations are `Get` and `GetList`.

use crate::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use transdoc_types::{EntityKind, Id, OperationKind, Reference};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolEntry {
    pub id: Id<ProtocolEntry>,
    pub actor: Reference<User>,
    pub entity: EntityKind,
    pub entity_id: String,
    pub action: OperationKind,
    pub timestamp: DateTime<Utc>,
}

impl ProtocolEntry {
    /// Records that `actor` executed `action` on `entity`/`entity_id` now.
    pub fn record(
        actor: Reference<User>,
        entity: EntityKind,
        entity_id: impl Into<String>,
        action: OperationKind,
    ) -> Self {
        Self {
            id: Id::generate(),
            actor,
            entity,
            entity_id: entity_id.into(),
            action,
            timestamp: Utc::now(),
        }
    }
}

/// Read-only operations on the protocol trail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Get { id: Id<ProtocolEntry> },
    GetList { filter: Filter },
}

impl Command {
    pub fn operation(&self) -> OperationKind {
        match self {
            Command::Get { .. } => OperationKind::Get,
            Command::GetList { .. } => OperationKind::GetList,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub entity: Option<EntityKind>,
    pub actor: Option<Reference<User>>,
}

impl Filter {
    pub fn matches(&self, entry: &ProtocolEntry) -> bool {
        self.entity.is_none_or(|e| e == entry.entity)
            && self.actor.as_ref().is_none_or(|a| *a == entry.actor)
    }
}
