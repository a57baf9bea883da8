//! Address entity and its commands.

use serde::{Deserialize, Serialize};
use transdoc_types::{Id, OperationKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: Id<Address>,
    pub name: Option<String>,
    pub street_name: String,
    pub house_number: String,
    pub country: String,
    pub post_code: String,
    pub city: String,
}

impl Address {
    /// Returns a copy with the name replaced.
    pub fn update_with(&self, name: Option<String>) -> Self {
        Self {
            name,
            ..self.clone()
        }
    }
}

/// Payload for creating an address. Also embedded by the `CreateFull`
/// commands of entities that create their address in one step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub name: Option<String>,
    pub street_name: String,
    pub house_number: String,
    pub country: String,
    pub post_code: String,
    pub city: String,
}

impl NewAddress {
    /// Materializes the address under a fresh id.
    pub fn build(self) -> Address {
        Address {
            id: Id::generate(),
            name: self.name,
            street_name: self.street_name,
            house_number: self.house_number,
            country: self.country,
            post_code: self.post_code,
            city: self.city,
        }
    }
}

/// Operations on addresses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Create {
        name: Option<String>,
        street_name: String,
        house_number: String,
        country: String,
        post_code: String,
        city: String,
    },
    Delete {
        id: Id<Address>,
    },
    Update {
        id: Id<Address>,
        name: Option<String>,
    },
    Get {
        id: Id<Address>,
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
            Command::Update { .. } => OperationKind::Update,
            Command::Get { .. } => OperationKind::Get,
            Command::GetList { .. } => OperationKind::GetList,
        }
    }
}

/// Side-effect-free predicate for address list queries.
///
/// Empty filter matches every record. String fields compare
/// case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub street_name: Option<String>,
    pub post_code: Option<String>,
    pub city: Option<String>,
    pub name: Option<String>,
}

impl Filter {
    pub fn matches(&self, address: &Address) -> bool {
        let eq = |want: &Option<String>, have: &str| {
            want.as_ref().is_none_or(|w| w.eq_ignore_ascii_case(have))
        };
        eq(&self.street_name, &address.street_name)
            && eq(&self.post_code, &address.post_code)
            && eq(&self.city, &address.city)
            && self
                .name
                .as_ref()
                .is_none_or(|w| address.name.as_deref().is_some_and(|h| w.eq_ignore_ascii_case(h)))
    }
}
