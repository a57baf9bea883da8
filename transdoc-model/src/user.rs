//! User entity and its commands.
//!
//! Login credentials (user name and password hash) are not part of the
//! entity record; they live in the authentication store collaborator. The
//! commands that touch credentials (`Create`, `CreateFull`,
//! `UpdateCredentials`, `LoginUser`) carry them as cleartext fields only
//! inside the encrypted envelope.

use crate::address::{Address, NewAddress};
use crate::service_provider::{NewServiceProvider, ServiceProvider};
use serde::{Deserialize, Serialize};
use transdoc_types::{Id, OperationKind, Reference, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Id<User>,
    pub last_name: String,
    pub first_name: String,
    pub address: Reference<Address>,
    pub service_provider: Reference<ServiceProvider>,
    pub role: UserRole,
}

impl User {
    pub fn update_with(
        &self,
        last_name: String,
        first_name: String,
        address: Reference<Address>,
        service_provider: Reference<ServiceProvider>,
    ) -> Self {
        Self {
            last_name,
            first_name,
            address,
            service_provider,
            ..self.clone()
        }
    }

    pub fn with_role(&self, role: UserRole) -> Self {
        Self {
            role,
            ..self.clone()
        }
    }
}

/// Operations on users.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Create {
        user_name: String,
        password: String,
        last_name: String,
        first_name: String,
        address: Reference<Address>,
        service_provider: Reference<ServiceProvider>,
        role: UserRole,
    },
    /// Creates the user together with its address and service provider.
    /// This is the bootstrap path and is accepted without a session user.
    CreateFull {
        user_name: String,
        password: String,
        last_name: String,
        first_name: String,
        address: NewAddress,
        service_provider: NewServiceProvider,
        role: UserRole,
    },
    Delete {
        id: Id<User>,
    },
    Update {
        id: Id<User>,
        last_name: String,
        first_name: String,
        address: Reference<Address>,
        service_provider: Reference<ServiceProvider>,
    },
    UpdateRole {
        id: Id<User>,
        role: UserRole,
    },
    UpdateCredentials {
        old_user_name: String,
        new_user_name: String,
        old_password: String,
        new_password: String,
    },
    LoginUser {
        user_name: String,
        password: String,
    },
    Get {
        id: Id<User>,
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
            Command::Update { .. } => OperationKind::Update,
            Command::UpdateRole { .. } => OperationKind::UpdateRole,
            Command::UpdateCredentials { .. } => OperationKind::UpdateCredentials,
            Command::LoginUser { .. } => OperationKind::Login,
            Command::Get { .. } => OperationKind::Get,
            Command::GetList { .. } => OperationKind::GetList,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub address: Option<Reference<Address>>,
    pub service_provider: Option<Reference<ServiceProvider>>,
    pub role: Option<UserRole>,
}

impl Filter {
    pub fn matches(&self, user: &User) -> bool {
        self.last_name
            .as_ref()
            .is_none_or(|n| n.eq_ignore_ascii_case(&user.last_name))
            && self
                .first_name
                .as_ref()
                .is_none_or(|n| n.eq_ignore_ascii_case(&user.first_name))
            && self.address.as_ref().is_none_or(|a| *a == user.address)
            && self
                .service_provider
                .as_ref()
                .is_none_or(|s| *s == user.service_provider)
            && self.role.is_none_or(|r| r == user.role)
    }
}
