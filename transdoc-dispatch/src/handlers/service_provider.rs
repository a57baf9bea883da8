use crate::dispatcher::{fetch, list, map_storage, require, Dispatcher, Effect, Outcome};
use tracing::warn;
use transdoc_model::service_provider::Command;
use transdoc_model::{DomainError, Response, ServiceProvider};
use transdoc_types::{EntityKind, Id, OperationKind, Reference};

const ENTITY: EntityKind = EntityKind::ServiceProvider;

impl Dispatcher {
    pub(crate) async fn handle_service_provider(
        &self,
        command: Command,
    ) -> Result<Outcome, DomainError> {
        match command {
            Command::Create {
                service_provider_id,
                name,
                provider_type,
                is_healthcare_provider,
                is_transport_provider,
                address,
                contact_info,
            } => {
                require(self.addresses.as_ref(), address.id().value()).await?;
                let provider = ServiceProvider {
                    id: Id::new(service_provider_id),
                    name,
                    provider_type,
                    is_healthcare_provider,
                    is_transport_provider,
                    address,
                    contact_info,
                };
                let created = self
                    .service_providers
                    .create(provider)
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::created(ENTITY, created.id.value());
                Ok(Outcome::changed(
                    Response::ServiceProvider(created),
                    vec![effect],
                ))
            }
            Command::CreateFull {
                service_provider_id,
                name,
                provider_type,
                is_healthcare_provider,
                is_transport_provider,
                address,
                contact_info,
            } => {
                let address = self
                    .addresses
                    .create(address.build())
                    .await
                    .map_err(|e| map_storage(EntityKind::Address, e))?;
                let provider = ServiceProvider {
                    id: Id::new(service_provider_id),
                    name,
                    provider_type,
                    is_healthcare_provider,
                    is_transport_provider,
                    address: Reference::to(address.id.clone()),
                    contact_info,
                };
                let created = match self.service_providers.create(provider).await {
                    Ok(created) => created,
                    Err(err) => {
                        if let Err(cleanup) = self.addresses.delete(address.id.value()).await {
                            warn!(id = %address.id, %cleanup, "orphaned address after failed provider create");
                        }
                        return Err(map_storage(ENTITY, err));
                    }
                };
                let effects = vec![
                    Effect::created(EntityKind::Address, address.id.value()),
                    Effect::created(ENTITY, created.id.value()),
                ];
                Ok(Outcome::changed(Response::ServiceProvider(created), effects))
            }
            Command::Update {
                id,
                name,
                provider_type,
                contact_info,
            } => {
                let stored = fetch(self.service_providers.as_ref(), id.value()).await?;
                let updated = self
                    .service_providers
                    .update(
                        stored.version,
                        stored.record.update_with(name, provider_type, contact_info),
                    )
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::updated(ENTITY, id.value(), OperationKind::Update);
                Ok(Outcome::changed(
                    Response::ServiceProvider(updated),
                    vec![effect],
                ))
            }
            Command::UpdateService {
                id,
                is_healthcare_provider,
                is_transport_provider,
            } => {
                let stored = fetch(self.service_providers.as_ref(), id.value()).await?;
                let updated = self
                    .service_providers
                    .update(
                        stored.version,
                        stored
                            .record
                            .update_service(is_healthcare_provider, is_transport_provider),
                    )
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::updated(ENTITY, id.value(), OperationKind::UpdateService);
                Ok(Outcome::changed(
                    Response::ServiceProvider(updated),
                    vec![effect],
                ))
            }
            Command::Move { id, address } => {
                require(self.addresses.as_ref(), address.id().value()).await?;
                let stored = fetch(self.service_providers.as_ref(), id.value()).await?;
                let moved = self
                    .service_providers
                    .update(stored.version, stored.record.move_to(address))
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::updated(ENTITY, id.value(), OperationKind::Move);
                Ok(Outcome::changed(
                    Response::ServiceProvider(moved),
                    vec![effect],
                ))
            }
            Command::Delete { id } => {
                self.service_providers
                    .delete(id.value())
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::deleted(ENTITY, id.value());
                Ok(Outcome::changed(Response::Acknowledged, vec![effect]))
            }
            Command::Get { id } => {
                let stored = fetch(self.service_providers.as_ref(), id.value()).await?;
                Ok(Outcome::read(Response::ServiceProvider(stored.record)))
            }
            Command::GetList { filter } => {
                let records = list(self.service_providers.as_ref(), &filter).await?;
                Ok(Outcome::read(Response::ServiceProviderList(records)))
            }
        }
    }
}
