use crate::dispatcher::{fetch, list, map_storage, require, Dispatcher, Effect, Outcome};
use transdoc_model::insurance::Command;
use transdoc_model::{DomainError, Insurance, Response};
use transdoc_types::{EntityKind, Id, OperationKind};

const ENTITY: EntityKind = EntityKind::Insurance;

impl Dispatcher {
    pub(crate) async fn handle_insurance(&self, command: Command) -> Result<Outcome, DomainError> {
        match command {
            Command::Create {
                insurance_id,
                name,
                address,
            } => {
                require(self.addresses.as_ref(), address.id().value()).await?;
                let insurance = Insurance {
                    id: Id::new(insurance_id),
                    name,
                    address,
                };
                let created = self
                    .insurances
                    .create(insurance)
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::created(ENTITY, created.id.value());
                Ok(Outcome::changed(Response::Insurance(created), vec![effect]))
            }
            Command::Update { id, name } => {
                let stored = fetch(self.insurances.as_ref(), id.value()).await?;
                let updated = self
                    .insurances
                    .update(stored.version, stored.record.update_with(name))
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::updated(ENTITY, id.value(), OperationKind::Update);
                Ok(Outcome::changed(Response::Insurance(updated), vec![effect]))
            }
            Command::Move { id, address } => {
                require(self.addresses.as_ref(), address.id().value()).await?;
                let stored = fetch(self.insurances.as_ref(), id.value()).await?;
                let moved = self
                    .insurances
                    .update(stored.version, stored.record.move_to(address))
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::updated(ENTITY, id.value(), OperationKind::Move);
                Ok(Outcome::changed(Response::Insurance(moved), vec![effect]))
            }
            Command::Delete { id } => {
                self.insurances
                    .delete(id.value())
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::deleted(ENTITY, id.value());
                Ok(Outcome::changed(Response::Acknowledged, vec![effect]))
            }
            Command::Get { id } => {
                let stored = fetch(self.insurances.as_ref(), id.value()).await?;
                Ok(Outcome::read(Response::Insurance(stored.record)))
            }
            Command::GetList { filter } => {
                let records = list(self.insurances.as_ref(), &filter).await?;
                Ok(Outcome::read(Response::InsuranceList(records)))
            }
        }
    }
}
