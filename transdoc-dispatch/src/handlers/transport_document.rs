use crate::dispatcher::{fetch, list, map_storage, require, Dispatcher, Effect, Outcome};
use transdoc_model::transport_details;
use transdoc_model::transport_document::Command;
use transdoc_model::{DomainError, Notification, Response, TransportDocument};
use transdoc_types::{DocumentStatus, EntityKind, Id, OperationKind, Reference};

const ENTITY: EntityKind = EntityKind::TransportDocument;

impl Dispatcher {
    pub(crate) async fn handle_transport_document(
        &self,
        command: Command,
    ) -> Result<Outcome, DomainError> {
        match command {
            Command::Create {
                patient,
                insurance_data,
                transport_reason,
                start_date,
                end_date,
                weekly_frequency,
                healthcare_service_provider,
                transportation_type,
                additional_info,
                signature,
            } => {
                let provider = fetch(
                    self.service_providers.as_ref(),
                    healthcare_service_provider.id().value(),
                )
                .await?;
                if !provider.record.is_healthcare_provider {
                    return Err(DomainError::IllegalProcess(format!(
                        "service provider {} is not a healthcare provider",
                        provider.record.id
                    )));
                }
                if let Some(patient) = &patient {
                    require(self.patients.as_ref(), patient.id().value()).await?;
                }
                if let Some(data) = &insurance_data {
                    require(self.insurance_data.as_ref(), data.id().value()).await?;
                }
                let status = if patient.is_some() && insurance_data.is_some() {
                    DocumentStatus::AssignedPatient
                } else {
                    DocumentStatus::Draft
                };
                let document = TransportDocument {
                    id: Id::generate(),
                    patient,
                    insurance_data,
                    transport_reason,
                    start_date,
                    end_date,
                    weekly_frequency,
                    healthcare_service_provider,
                    transportation_type,
                    additional_info,
                    signature,
                    status,
                };
                let created = self
                    .transport_documents
                    .create(document)
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::created(ENTITY, created.id.value());
                Ok(Outcome::changed(
                    Response::TransportDocument(created),
                    vec![effect],
                ))
            }
            Command::Update {
                id,
                transport_reason,
                start_date,
                end_date,
                weekly_frequency,
                healthcare_service_provider,
                transportation_type,
                additional_info,
                signature,
            } => {
                let stored = fetch(self.transport_documents.as_ref(), id.value()).await?;
                reject_archived(&stored.record)?;
                require(
                    self.service_providers.as_ref(),
                    healthcare_service_provider.id().value(),
                )
                .await?;
                let updated = self
                    .transport_documents
                    .update(
                        stored.version,
                        stored.record.update_with(
                            transport_reason,
                            start_date,
                            end_date,
                            weekly_frequency,
                            healthcare_service_provider,
                            transportation_type,
                            additional_info,
                            signature,
                        ),
                    )
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::updated(ENTITY, id.value(), OperationKind::Update);
                Ok(Outcome::changed(
                    Response::TransportDocument(updated),
                    vec![effect],
                ))
            }
            Command::AssignPatient {
                id,
                patient,
                insurance_data,
            } => {
                let stored = fetch(self.transport_documents.as_ref(), id.value()).await?;
                require(self.patients.as_ref(), patient.id().value()).await?;
                require(self.insurance_data.as_ref(), insurance_data.id().value()).await?;
                let assigned = stored
                    .record
                    .assign_patient(patient.clone(), insurance_data)?;
                let updated = self
                    .transport_documents
                    .update(stored.version, assigned)
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effects = vec![Effect {
                    entity: ENTITY,
                    entity_id: id.value().to_string(),
                    operation: OperationKind::AssignPatient,
                    notification: Notification::PatientAssigned {
                        document: id.value().to_string(),
                        patient: patient.id().value().to_string(),
                    },
                }];
                Ok(Outcome::changed(
                    Response::TransportDocument(updated),
                    effects,
                ))
            }
            Command::Archive { id } => {
                let stored = fetch(self.transport_documents.as_ref(), id.value()).await?;
                reject_archived(&stored.record)?;
                let fully_signed = self.document_fully_signed(&stored.record.id).await?;
                let archived = stored.record.archive(fully_signed)?;
                let updated = self
                    .transport_documents
                    .update(stored.version, archived)
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effects = vec![Effect {
                    entity: ENTITY,
                    entity_id: id.value().to_string(),
                    operation: OperationKind::Archive,
                    notification: Notification::DocumentArchived {
                        id: id.value().to_string(),
                    },
                }];
                Ok(Outcome::changed(
                    Response::TransportDocument(updated),
                    effects,
                ))
            }
            Command::Delete { id } => {
                let stored = fetch(self.transport_documents.as_ref(), id.value()).await?;
                reject_archived(&stored.record)?;
                self.transport_documents
                    .delete(id.value())
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::deleted(ENTITY, id.value());
                Ok(Outcome::changed(Response::Acknowledged, vec![effect]))
            }
            Command::Get { id } => {
                let stored = fetch(self.transport_documents.as_ref(), id.value()).await?;
                Ok(Outcome::read(Response::TransportDocument(stored.record)))
            }
            Command::GetList { filter } => {
                let records = list(self.transport_documents.as_ref(), &filter).await?;
                Ok(Outcome::read(Response::TransportDocumentList(records)))
            }
        }
    }

    /// A document is fully signed when it has at least one transport leg
    /// and every leg carries both signatures.
    pub(crate) async fn document_fully_signed(
        &self,
        document: &Id<TransportDocument>,
    ) -> Result<bool, DomainError> {
        let filter = transport_details::Filter {
            transport_document: Some(Reference::to(document.clone())),
            ..Default::default()
        };
        let legs = list(self.transport_details.as_ref(), &filter).await?;
        Ok(!legs.is_empty() && legs.iter().all(|l| l.is_fully_signed()))
    }
}

/// Archived documents reject every mutation, including a second archive.
pub(crate) fn reject_archived(document: &TransportDocument) -> Result<(), DomainError> {
    if document.status.is_archived() {
        return Err(DomainError::IsArchived {
            id: document.id.to_string(),
        });
    }
    Ok(())
}
