use crate::dispatcher::{fetch, list, map_storage, require, Dispatcher, Effect, Outcome};
use transdoc_model::insurance_data::Command;
use transdoc_model::{DomainError, InsuranceData, Response};
use transdoc_types::{EntityKind, Id};

const ENTITY: EntityKind = EntityKind::InsuranceData;

impl Dispatcher {
    pub(crate) async fn handle_insurance_data(
        &self,
        command: Command,
    ) -> Result<Outcome, DomainError> {
        match command {
            Command::Create {
                patient,
                insurance,
                insurance_status,
            } => {
                require(self.patients.as_ref(), patient.id().value()).await?;
                require(self.insurances.as_ref(), insurance.id().value()).await?;
                let data = InsuranceData {
                    id: Id::generate(),
                    patient,
                    insurance,
                    insurance_status,
                };
                let created = self
                    .insurance_data
                    .create(data)
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::created(ENTITY, created.id.value());
                Ok(Outcome::changed(
                    Response::InsuranceData(created),
                    vec![effect],
                ))
            }
            Command::Delete { id } => {
                self.insurance_data
                    .delete(id.value())
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::deleted(ENTITY, id.value());
                Ok(Outcome::changed(Response::Acknowledged, vec![effect]))
            }
            Command::Get { id } => {
                let stored = fetch(self.insurance_data.as_ref(), id.value()).await?;
                Ok(Outcome::read(Response::InsuranceData(stored.record)))
            }
            Command::GetList { filter } => {
                let records = list(self.insurance_data.as_ref(), &filter).await?;
                Ok(Outcome::read(Response::InsuranceDataList(records)))
            }
        }
    }
}
