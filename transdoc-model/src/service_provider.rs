//! Service provider entity (healthcare and/or transport) and its commands.

use crate::address::{Address, NewAddress};
use serde::{Deserialize, Serialize};
use transdoc_types::{Id, OperationKind, Reference};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceProvider {
    pub id: Id<ServiceProvider>,
    pub name: String,
    pub provider_type: String,
    pub is_healthcare_provider: bool,
    pub is_transport_provider: bool,
    pub address: Reference<Address>,
    pub contact_info: Option<String>,
}

impl ServiceProvider {
    pub fn update_with(
        &self,
        name: String,
        provider_type: String,
        contact_info: Option<String>,
    ) -> Self {
        Self {
            name,
            provider_type,
            contact_info,
            ..self.clone()
        }
    }

    pub fn update_service(&self, is_healthcare_provider: bool, is_transport_provider: bool) -> Self {
        Self {
            is_healthcare_provider,
            is_transport_provider,
            ..self.clone()
        }
    }

    pub fn move_to(&self, address: Reference<Address>) -> Self {
        Self {
            address,
            ..self.clone()
        }
    }
}

/// Payload for creating a provider together with its address, embedded by
/// `User::Command::CreateFull`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewServiceProvider {
    pub service_provider_id: String,
    pub name: String,
    pub provider_type: String,
    pub is_healthcare_provider: bool,
    pub is_transport_provider: bool,
    pub address: NewAddress,
    pub contact_info: Option<String>,
}

/// Operations on service providers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Create {
        service_provider_id: String,
        name: String,
        provider_type: String,
        is_healthcare_provider: bool,
        is_transport_provider: bool,
        address: Reference<Address>,
        contact_info: Option<String>,
    },
    /// Creates the provider and its address in one step.
    CreateFull {
        service_provider_id: String,
        name: String,
        provider_type: String,
        is_healthcare_provider: bool,
        is_transport_provider: bool,
        address: NewAddress,
        contact_info: Option<String>,
    },
    Delete {
        id: Id<ServiceProvider>,
    },
    Move {
        id: Id<ServiceProvider>,
        address: Reference<Address>,
    },
    Update {
        id: Id<ServiceProvider>,
        name: String,
        provider_type: String,
        contact_info: Option<String>,
    },
    UpdateService {
        id: Id<ServiceProvider>,
        is_healthcare_provider: bool,
        is_transport_provider: bool,
    },
    Get {
        id: Id<ServiceProvider>,
    },
    GetList {
        filter: Filter,
    },
}

impl Command {
    pub fn operation(&self) -> OperationKind {
        match self {
            Command::Create { .. } => OperationKind::Create,
            Command::CreateFull { .. } => OperationKind::CreateFull,
            Command::Delete { .. } => OperationKind::Delete,
            Command::Move { .. } => OperationKind::Move,
            Command::Update { .. } => OperationKind::Update,
            Command::UpdateService { .. } => OperationKind::UpdateService,
            Command::Get { .. } => OperationKind::Get,
            Command::GetList { .. } => OperationKind::GetList,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub address: Option<Reference<Address>>,
    pub name: Option<String>,
    pub provider_type: Option<String>,
    pub is_healthcare_provider: Option<bool>,
    pub is_transport_provider: Option<bool>,
}

impl Filter {
    pub fn matches(&self, provider: &ServiceProvider) -> bool {
        self.address.as_ref().is_none_or(|a| *a == provider.address)
            && self
                .name
                .as_ref()
                .is_none_or(|n| n.eq_ignore_ascii_case(&provider.name))
            && self
                .provider_type
                .as_ref()
                .is_none_or(|t| t.eq_ignore_ascii_case(&provider.provider_type))
            && self
                .is_healthcare_provider
                .is_none_or(|f| f == provider.is_healthcare_provider)
            && self
                .is_transport_provider
                .is_none_or(|f| f == provider.is_transport_provider)
    }
}
