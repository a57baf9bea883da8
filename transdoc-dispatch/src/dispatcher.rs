//! The operations dispatcher.
//!
//! Every command a session submits passes through [`Dispatcher::dispatch`]:
//! authorization first, then the entity handler, then the bookkeeping that
//! only happens on success (protocol trail append, notification fan-out).
//! Failures return a typed [`DomainError`] and leave no partial effects.

use crate::permissions;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use transdoc_model::{
    Address, Command, CommandResult, DomainError, Insurance, InsuranceData, Invoice, Notification,
    Patient, ProtocolEntry, Response, ServiceProvider, TransportDetails, TransportDocument, User,
};
use transdoc_model::user;
use transdoc_storage::{
    AuthStore, EntityOps, MemDirectory, StorageError, StoredEntity, VersionedRecord,
};
use transdoc_types::{EntityKind, OperationKind, Reference};

/// Buffered notifications per subscriber before lagging ones drop events.
const NOTIFICATION_CAPACITY: usize = 256;

/// One state change produced by a handler, reported after success.
pub(crate) struct Effect {
    pub entity: EntityKind,
    pub entity_id: String,
    pub operation: OperationKind,
    pub notification: Notification,
}

impl Effect {
    pub fn created(entity: EntityKind, id: impl Into<String>) -> Self {
        let entity_id = id.into();
        Self {
            entity,
            entity_id: entity_id.clone(),
            operation: OperationKind::Create,
            notification: Notification::EntityCreated {
                entity,
                id: entity_id,
            },
        }
    }

    pub fn updated(entity: EntityKind, id: impl Into<String>, operation: OperationKind) -> Self {
        let entity_id = id.into();
        Self {
            entity,
            entity_id: entity_id.clone(),
            operation,
            notification: Notification::EntityUpdated {
                entity,
                id: entity_id,
            },
        }
    }

    pub fn deleted(entity: EntityKind, id: impl Into<String>) -> Self {
        let entity_id = id.into();
        Self {
            entity,
            entity_id: entity_id.clone(),
            operation: OperationKind::Delete,
            notification: Notification::EntityDeleted {
                entity,
                id: entity_id,
            },
        }
    }
}

/// A handler's successful result: the response plus the effects to record.
pub(crate) struct Outcome {
    pub response: Response,
    pub effects: Vec<Effect>,
    /// Protocol actor override for commands executed without a session
    /// user (self-registration records the created user as actor).
    pub actor: Option<Reference<User>>,
}

impl Outcome {
    pub fn read(response: Response) -> Self {
        Self {
            response,
            effects: Vec::new(),
            actor: None,
        }
    }

    pub fn changed(response: Response, effects: Vec<Effect>) -> Self {
        Self {
            response,
            effects,
            actor: None,
        }
    }
}

/// Routes commands to their entity collaborators behind a permission check.
///
/// Cloning shares the collaborators; every session holds its own clone.
#[derive(Clone)]
pub struct Dispatcher {
    pub(crate) addresses: Arc<dyn EntityOps<Record = Address>>,
    pub(crate) insurances: Arc<dyn EntityOps<Record = Insurance>>,
    pub(crate) insurance_data: Arc<dyn EntityOps<Record = InsuranceData>>,
    pub(crate) patients: Arc<dyn EntityOps<Record = Patient>>,
    pub(crate) service_providers: Arc<dyn EntityOps<Record = ServiceProvider>>,
    pub(crate) transport_details: Arc<dyn EntityOps<Record = TransportDetails>>,
    pub(crate) transport_documents: Arc<dyn EntityOps<Record = TransportDocument>>,
    pub(crate) users: Arc<dyn EntityOps<Record = User>>,
    pub(crate) invoices: Arc<dyn EntityOps<Record = Invoice>>,
    pub(crate) protocol: Arc<dyn EntityOps<Record = ProtocolEntry>>,
    pub(crate) auth: Arc<dyn AuthStore>,
    notifications: broadcast::Sender<Notification>,
}

impl Dispatcher {
    /// Wires the dispatcher to an in-memory collaborator bundle.
    pub fn in_memory(directory: MemDirectory) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            addresses: Arc::new(directory.addresses),
            insurances: Arc::new(directory.insurances),
            insurance_data: Arc::new(directory.insurance_data),
            patients: Arc::new(directory.patients),
            service_providers: Arc::new(directory.service_providers),
            transport_details: Arc::new(directory.transport_details),
            transport_documents: Arc::new(directory.transport_documents),
            users: Arc::new(directory.users),
            invoices: Arc::new(directory.invoices),
            protocol: Arc::new(directory.protocol),
            auth: Arc::new(directory.auth),
            notifications,
        }
    }

    /// Subscribes to the server-pushed notification stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Injects a notification into the stream, as if a command had
    /// emitted it. A send with no live subscribers is a no-op.
    pub fn publish(&self, notification: Notification) {
        let _ = self.notifications.send(notification);
    }

    /// Executes one command on behalf of `session_user`.
    ///
    /// `LoginUser` and the self-registration `User::CreateFull` are the
    /// only commands accepted without a session user; everything else
    /// fails with [`DomainError::UserNotProvided`]. An authorized command
    /// either fully applies or fully fails.
    pub async fn dispatch(&self, session_user: Option<&User>, command: Command) -> CommandResult {
        let (entity, operation) = command.descriptor();

        match session_user {
            Some(user) => {
                if !permissions::is_allowed(user.role, entity, operation) {
                    debug!(%entity, %operation, role = %user.role, "command denied");
                    return Err(DomainError::UserNotAllowed { entity, operation });
                }
            }
            None if Self::allowed_without_session(&command) => {}
            None => return Err(DomainError::UserNotProvided),
        }

        let outcome = self.route(command).await?;

        let actor = outcome
            .actor
            .or_else(|| session_user.map(|u| Reference::to(u.id.clone())));
        for effect in &outcome.effects {
            self.record_effect(actor.as_ref(), effect).await;
        }
        Ok(outcome.response)
    }

    fn allowed_without_session(command: &Command) -> bool {
        matches!(
            command,
            Command::User(user::Command::LoginUser { .. })
                | Command::User(user::Command::CreateFull { .. })
        )
    }

    async fn route(&self, command: Command) -> Result<Outcome, DomainError> {
        match command {
            Command::Address(c) => self.handle_address(c).await,
            Command::Insurance(c) => self.handle_insurance(c).await,
            Command::InsuranceData(c) => self.handle_insurance_data(c).await,
            Command::Patient(c) => self.handle_patient(c).await,
            Command::ServiceProvider(c) => self.handle_service_provider(c).await,
            Command::TransportDetails(c) => self.handle_transport_details(c).await,
            Command::TransportDocument(c) => self.handle_transport_document(c).await,
            Command::User(c) => self.handle_user(c).await,
            Command::Invoice(c) => self.handle_invoice(c).await,
            Command::ProtocolEntry(c) => self.handle_protocol(c).await,
        }
    }

    /// Appends the protocol entry and pushes the notification for one
    /// applied effect. A protocol append failure is logged and swallowed;
    /// the mutation itself already happened.
    async fn record_effect(&self, actor: Option<&Reference<User>>, effect: &Effect) {
        if let Some(actor) = actor {
            let entry = ProtocolEntry::record(
                actor.clone(),
                effect.entity,
                effect.entity_id.clone(),
                effect.operation,
            );
            if let Err(err) = self.protocol.create(entry).await {
                warn!(
                    entity = %effect.entity,
                    entity_id = %effect.entity_id,
                    %err,
                    "protocol append failed"
                );
            }
        }
        // Send only fails when nobody is subscribed.
        let _ = self.notifications.send(effect.notification.clone());
    }
}

// ── Shared handler plumbing ─────────────────────────────────────────────

/// Maps a storage failure to the domain taxonomy for `entity`.
pub(crate) fn map_storage(entity: EntityKind, err: StorageError) -> DomainError {
    match err {
        StorageError::NotFound { id } => DomainError::not_found(entity, id),
        StorageError::DuplicateId { id } => {
            DomainError::IllegalProcess(format!("{entity} {id} already exists"))
        }
        StorageError::Conflict { id, .. } => {
            DomainError::Processing(format!("concurrent modification of {entity} {id}"))
        }
        StorageError::UserNameTaken { user_name } => DomainError::UserNameAlreadyUsed { user_name },
        other => DomainError::Processing(other.to_string()),
    }
}

/// Loads a record or fails with the entity's not-found variant.
pub(crate) async fn fetch<T: StoredEntity>(
    store: &dyn EntityOps<Record = T>,
    id: &str,
) -> Result<VersionedRecord<T>, DomainError> {
    store
        .get(id)
        .await
        .map_err(|e| map_storage(T::kind(), e))?
        .ok_or_else(|| DomainError::not_found(T::kind(), id))
}

/// Confirms a referenced record exists without keeping it.
pub(crate) async fn require<T: StoredEntity>(
    store: &dyn EntityOps<Record = T>,
    id: &str,
) -> Result<(), DomainError> {
    fetch(store, id).await.map(|_| ())
}

/// Runs a list query, wrapping any failure in the entity's list variant.
pub(crate) async fn list<T: StoredEntity>(
    store: &dyn EntityOps<Record = T>,
    filter: &T::Filter,
) -> Result<Vec<T>, DomainError> {
    store
        .get_list(filter)
        .await
        .map_err(|e| DomainError::list_failed(T::kind(), e.to_string()))
}
