use crate::dispatcher::{fetch, list, map_storage, require, Dispatcher, Effect, Outcome};
use tracing::warn;
use transdoc_model::patient::Command;
use transdoc_model::{DomainError, InsuranceData, Patient, Response};
use transdoc_types::{EntityKind, Id, OperationKind, Reference};

const ENTITY: EntityKind = EntityKind::Patient;

impl Dispatcher {
    pub(crate) async fn handle_patient(&self, command: Command) -> Result<Outcome, DomainError> {
        match command {
            Command::Create {
                insurance_number,
                insurance_data,
                last_name,
                first_name,
                birth_date,
                address,
            } => {
                require(self.insurance_data.as_ref(), insurance_data.id().value()).await?;
                require(self.addresses.as_ref(), address.id().value()).await?;
                let patient = Patient {
                    insurance_number: Id::new(insurance_number),
                    insurance_data,
                    last_name,
                    first_name,
                    birth_date,
                    address,
                };
                let created = self
                    .patients
                    .create(patient)
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::created(ENTITY, created.insurance_number.value());
                Ok(Outcome::changed(Response::Patient(created), vec![effect]))
            }
            Command::CreateWithInsuranceData {
                insurance_number,
                insurance,
                insurance_status,
                last_name,
                first_name,
                birth_date,
                address,
            } => {
                require(self.insurances.as_ref(), insurance.id().value()).await?;
                require(self.addresses.as_ref(), address.id().value()).await?;

                let patient_id: Id<Patient> = Id::new(insurance_number);
                let data = InsuranceData {
                    id: Id::generate(),
                    patient: Reference::to(patient_id.clone()),
                    insurance,
                    insurance_status,
                };
                let data = self
                    .insurance_data
                    .create(data)
                    .await
                    .map_err(|e| map_storage(EntityKind::InsuranceData, e))?;

                let patient = Patient {
                    insurance_number: patient_id,
                    insurance_data: Reference::to(data.id.clone()),
                    last_name,
                    first_name,
                    birth_date,
                    address,
                };
                let created = match self.patients.create(patient).await {
                    Ok(created) => created,
                    Err(err) => {
                        // Unwind the data record so the failure leaves
                        // nothing behind.
                        if let Err(cleanup) = self.insurance_data.delete(data.id.value()).await {
                            warn!(id = %data.id, %cleanup, "orphaned insurance data after failed patient create");
                        }
                        return Err(map_storage(ENTITY, err));
                    }
                };
                let effects = vec![
                    Effect::created(EntityKind::InsuranceData, data.id.value()),
                    Effect::created(ENTITY, created.insurance_number.value()),
                ];
                Ok(Outcome::changed(Response::Patient(created), effects))
            }
            Command::Update {
                insurance_number,
                last_name,
                first_name,
                birth_date,
                address,
            } => {
                require(self.addresses.as_ref(), address.id().value()).await?;
                let stored = fetch(self.patients.as_ref(), insurance_number.value()).await?;
                let updated = self
                    .patients
                    .update(
                        stored.version,
                        stored
                            .record
                            .update_with(last_name, first_name, birth_date, address),
                    )
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect =
                    Effect::updated(ENTITY, insurance_number.value(), OperationKind::Update);
                Ok(Outcome::changed(Response::Patient(updated), vec![effect]))
            }
            Command::Move {
                insurance_number,
                address,
            } => {
                require(self.addresses.as_ref(), address.id().value()).await?;
                let stored = fetch(self.patients.as_ref(), insurance_number.value()).await?;
                let moved = self
                    .patients
                    .update(stored.version, stored.record.move_to(address))
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::updated(ENTITY, insurance_number.value(), OperationKind::Move);
                Ok(Outcome::changed(Response::Patient(moved), vec![effect]))
            }
            Command::UpdateInsuranceData {
                insurance_number,
                insurance_data,
            } => {
                require(self.insurance_data.as_ref(), insurance_data.id().value()).await?;
                let stored = fetch(self.patients.as_ref(), insurance_number.value()).await?;
                let updated = self
                    .patients
                    .update(stored.version, stored.record.with_insurance_data(insurance_data))
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::updated(
                    ENTITY,
                    insurance_number.value(),
                    OperationKind::UpdateInsuranceData,
                );
                Ok(Outcome::changed(Response::Patient(updated), vec![effect]))
            }
            Command::Delete { insurance_number } => {
                self.patients
                    .delete(insurance_number.value())
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::deleted(ENTITY, insurance_number.value());
                Ok(Outcome::changed(Response::Acknowledged, vec![effect]))
            }
            Command::Get { insurance_number } => {
                let stored = fetch(self.patients.as_ref(), insurance_number.value()).await?;
                Ok(Outcome::read(Response::Patient(stored.record)))
            }
            Command::GetList { filter } => {
                let records = list(self.patients.as_ref(), &filter).await?;
                Ok(Outcome::read(Response::PatientList(records)))
            }
        }
    }
}
