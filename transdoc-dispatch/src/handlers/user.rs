use crate::dispatcher::{fetch, list, map_storage, require, Dispatcher, Effect, Outcome};
use tracing::{info, warn};
use transdoc_model::user::Command;
use transdoc_model::{DomainError, Response, ServiceProvider, User};
use transdoc_types::{EntityKind, Id, OperationKind, Reference};

const ENTITY: EntityKind = EntityKind::User;

impl Dispatcher {
    pub(crate) async fn handle_user(&self, command: Command) -> Result<Outcome, DomainError> {
        match command {
            Command::Create {
                user_name,
                password,
                last_name,
                first_name,
                address,
                service_provider,
                role,
            } => {
                require(self.addresses.as_ref(), address.id().value()).await?;
                require(self.service_providers.as_ref(), service_provider.id().value()).await?;

                let id: Id<User> = Id::generate();
                // Reserve the user name first so a taken name fails before
                // the entity exists.
                self.auth
                    .put_credentials(&user_name, &password, id.clone())
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;

                let user = User {
                    id: id.clone(),
                    last_name,
                    first_name,
                    address,
                    service_provider,
                    role,
                };
                let created = match self.users.create(user).await {
                    Ok(created) => created,
                    Err(err) => {
                        if let Err(cleanup) = self.auth.remove_user(&id).await {
                            warn!(%id, %cleanup, "orphaned credentials after failed user create");
                        }
                        return Err(map_storage(ENTITY, err));
                    }
                };
                let effect = Effect::created(ENTITY, created.id.value());
                Ok(Outcome::changed(Response::User(created), vec![effect]))
            }
            Command::CreateFull {
                user_name,
                password,
                last_name,
                first_name,
                address,
                service_provider,
                role,
            } => {
                let id: Id<User> = Id::generate();
                self.auth
                    .put_credentials(&user_name, &password, id.clone())
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;

                let result = self
                    .create_full_records(
                        id.clone(),
                        last_name,
                        first_name,
                        address,
                        service_provider,
                        role,
                    )
                    .await;
                let (created, mut effects) = match result {
                    Ok(ok) => ok,
                    Err(err) => {
                        if let Err(cleanup) = self.auth.remove_user(&id).await {
                            warn!(%id, %cleanup, "orphaned credentials after failed registration");
                        }
                        return Err(err);
                    }
                };
                info!(user = %created.id, role = %created.role, "registered user");
                effects.push(Effect::created(ENTITY, created.id.value()));
                Ok(Outcome {
                    response: Response::User(created.clone()),
                    effects,
                    // Self-registration runs without a session; the new
                    // user is its own protocol actor.
                    actor: Some(Reference::to(created.id)),
                })
            }
            Command::Update {
                id,
                last_name,
                first_name,
                address,
                service_provider,
            } => {
                require(self.addresses.as_ref(), address.id().value()).await?;
                require(self.service_providers.as_ref(), service_provider.id().value()).await?;
                let stored = fetch(self.users.as_ref(), id.value()).await?;
                let updated = self
                    .users
                    .update(
                        stored.version,
                        stored
                            .record
                            .update_with(last_name, first_name, address, service_provider),
                    )
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::updated(ENTITY, id.value(), OperationKind::Update);
                Ok(Outcome::changed(Response::User(updated), vec![effect]))
            }
            Command::UpdateRole { id, role } => {
                let stored = fetch(self.users.as_ref(), id.value()).await?;
                let updated = self
                    .users
                    .update(stored.version, stored.record.with_role(role))
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::updated(ENTITY, id.value(), OperationKind::UpdateRole);
                Ok(Outcome::changed(Response::User(updated), vec![effect]))
            }
            Command::UpdateCredentials {
                old_user_name,
                new_user_name,
                old_password,
                new_password,
            } => {
                let changed = self
                    .auth
                    .update_credentials(&old_user_name, &new_user_name, &old_password, &new_password)
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                if !changed {
                    return Err(DomainError::WrongCredentials);
                }
                // The credential store does not expose the user id here;
                // the protocol entry keys on the new user name.
                let effect = Effect::updated(
                    ENTITY,
                    new_user_name.clone(),
                    OperationKind::UpdateCredentials,
                );
                Ok(Outcome::changed(Response::Acknowledged, vec![effect]))
            }
            Command::LoginUser {
                user_name,
                password,
            } => {
                let Some(id) = self
                    .auth
                    .verify(&user_name, &password)
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?
                else {
                    return Err(DomainError::WrongCredentials);
                };
                let stored = fetch(self.users.as_ref(), id.value()).await?;
                info!(user = %stored.record.id, "login");
                Ok(Outcome::read(Response::User(stored.record)))
            }
            Command::Delete { id } => {
                self.users
                    .delete(id.value())
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                self.auth
                    .remove_user(&id)
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::deleted(ENTITY, id.value());
                Ok(Outcome::changed(Response::Acknowledged, vec![effect]))
            }
            Command::Get { id } => {
                let stored = fetch(self.users.as_ref(), id.value()).await?;
                Ok(Outcome::read(Response::User(stored.record)))
            }
            Command::GetList { filter } => {
                let records = list(self.users.as_ref(), &filter).await?;
                Ok(Outcome::read(Response::UserList(records)))
            }
        }
    }

    /// Creates address, provider and user for a self-registration,
    /// unwinding earlier records when a later create fails.
    async fn create_full_records(
        &self,
        id: Id<User>,
        last_name: String,
        first_name: String,
        address: transdoc_model::address::NewAddress,
        provider: transdoc_model::service_provider::NewServiceProvider,
        role: transdoc_types::UserRole,
    ) -> Result<(User, Vec<Effect>), DomainError> {
        let address = self
            .addresses
            .create(address.build())
            .await
            .map_err(|e| map_storage(EntityKind::Address, e))?;

        let provider_address = match self.addresses.create(provider.address.build()).await {
            Ok(created) => created,
            Err(err) => {
                self.unwind_address(&address.id).await;
                return Err(map_storage(EntityKind::Address, err));
            }
        };
        let provider_record = ServiceProvider {
            id: Id::new(provider.service_provider_id),
            name: provider.name,
            provider_type: provider.provider_type,
            is_healthcare_provider: provider.is_healthcare_provider,
            is_transport_provider: provider.is_transport_provider,
            address: Reference::to(provider_address.id.clone()),
            contact_info: provider.contact_info,
        };
        let provider_record = match self.service_providers.create(provider_record).await {
            Ok(created) => created,
            Err(err) => {
                self.unwind_address(&provider_address.id).await;
                self.unwind_address(&address.id).await;
                return Err(map_storage(EntityKind::ServiceProvider, err));
            }
        };

        let user = User {
            id,
            last_name,
            first_name,
            address: Reference::to(address.id.clone()),
            service_provider: Reference::to(provider_record.id.clone()),
            role,
        };
        let created = match self.users.create(user).await {
            Ok(created) => created,
            Err(err) => {
                if let Err(cleanup) = self
                    .service_providers
                    .delete(provider_record.id.value())
                    .await
                {
                    warn!(id = %provider_record.id, %cleanup, "orphaned provider after failed registration");
                }
                self.unwind_address(&provider_address.id).await;
                self.unwind_address(&address.id).await;
                return Err(map_storage(ENTITY, err));
            }
        };

        let effects = vec![
            Effect::created(EntityKind::Address, address.id.value()),
            Effect::created(EntityKind::Address, provider_address.id.value()),
            Effect::created(EntityKind::ServiceProvider, provider_record.id.value()),
        ];
        Ok((created, effects))
    }

    async fn unwind_address(&self, id: &Id<transdoc_model::Address>) {
        if let Err(cleanup) = self.addresses.delete(id.value()).await {
            warn!(%id, %cleanup, "orphaned address after failed registration");
        }
    }
}
