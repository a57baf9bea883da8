use crate::dispatcher::{fetch, list, map_storage, Dispatcher, Effect, Outcome};
use transdoc_model::address::Command;
use transdoc_model::{Address, DomainError, Response};
use transdoc_types::{EntityKind, Id, OperationKind};

const ENTITY: EntityKind = EntityKind::Address;

impl Dispatcher {
    pub(crate) async fn handle_address(&self, command: Command) -> Result<Outcome, DomainError> {
        match command {
            Command::Create {
                name,
                street_name,
                house_number,
                country,
                post_code,
                city,
            } => {
                let address = Address {
                    id: Id::generate(),
                    name,
                    street_name,
                    house_number,
                    country,
                    post_code,
                    city,
                };
                let created = self
                    .addresses
                    .create(address)
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::created(ENTITY, created.id.value());
                Ok(Outcome::changed(Response::Address(created), vec![effect]))
            }
            Command::Update { id, name } => {
                let stored = fetch(self.addresses.as_ref(), id.value()).await?;
                let updated = self
                    .addresses
                    .update(stored.version, stored.record.update_with(name))
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::updated(ENTITY, id.value(), OperationKind::Update);
                Ok(Outcome::changed(Response::Address(updated), vec![effect]))
            }
            Command::Delete { id } => {
                self.addresses
                    .delete(id.value())
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::deleted(ENTITY, id.value());
                Ok(Outcome::changed(Response::Acknowledged, vec![effect]))
            }
            Command::Get { id } => {
                let stored = fetch(self.addresses.as_ref(), id.value()).await?;
                Ok(Outcome::read(Response::Address(stored.record)))
            }
            Command::GetList { filter } => {
                let records = list(self.addresses.as_ref(), &filter).await?;
                Ok(Outcome::read(Response::AddressList(records)))
            }
        }
    }
}
