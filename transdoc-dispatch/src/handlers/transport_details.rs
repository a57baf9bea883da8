use crate::dispatcher::{fetch, list, map_storage, Dispatcher, Effect, Outcome};
use crate::handlers::transport_document::reject_archived;
use transdoc_model::transport_details::Command;
use transdoc_model::{
    DomainError, Notification, Response, TransportDetails, TransportDocument,
};
use transdoc_storage::VersionedRecord;
use transdoc_types::{DocumentStatus, EntityKind, Id, OperationKind};

const ENTITY: EntityKind = EntityKind::TransportDetails;

impl Dispatcher {
    pub(crate) async fn handle_transport_details(
        &self,
        command: Command,
    ) -> Result<Outcome, DomainError> {
        match command {
            Command::Create {
                transport_document,
                transport_date,
            } => {
                let doc = fetch(
                    self.transport_documents.as_ref(),
                    transport_document.id().value(),
                )
                .await?;
                reject_archived(&doc.record)?;
                let details = TransportDetails {
                    id: Id::generate(),
                    transport_document,
                    transport_date,
                    start_address: None,
                    end_address: None,
                    direction: None,
                    patient_condition: None,
                    transport_provider: None,
                    tour_number: None,
                    payment_exemption: None,
                    patient_signature: None,
                    patient_signature_date: None,
                    transporter_signature: None,
                    transporter_signature_date: None,
                };
                let created = self
                    .transport_details
                    .create(details)
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::created(ENTITY, created.id.value());
                Ok(Outcome::changed(
                    Response::TransportDetails(created),
                    vec![effect],
                ))
            }
            Command::Update {
                id,
                start_address,
                end_address,
                direction,
                patient_condition,
                tour_number,
                payment_exemption,
            } => {
                let (stored, _doc) = self.fetch_leg_with_live_document(&id).await?;
                let updated = self
                    .transport_details
                    .update(
                        stored.version,
                        stored.record.update_with(
                            start_address,
                            end_address,
                            direction,
                            patient_condition,
                            tour_number,
                            payment_exemption,
                        ),
                    )
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::updated(ENTITY, id.value(), OperationKind::Update);
                Ok(Outcome::changed(
                    Response::TransportDetails(updated),
                    vec![effect],
                ))
            }
            Command::AssignTransportProvider {
                id,
                transport_provider,
            } => {
                let (stored, doc) = self.fetch_leg_with_live_document(&id).await?;
                let provider = fetch(
                    self.service_providers.as_ref(),
                    transport_provider.id().value(),
                )
                .await?;
                if !provider.record.is_transport_provider {
                    return Err(DomainError::IllegalProcess(format!(
                        "service provider {} is not a transport provider",
                        provider.record.id
                    )));
                }
                let updated = self
                    .transport_details
                    .update(
                        stored.version,
                        stored
                            .record
                            .assign_transport_provider(transport_provider.clone()),
                    )
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;

                let mut effects = vec![Effect {
                    entity: ENTITY,
                    entity_id: id.value().to_string(),
                    operation: OperationKind::AssignTransportProvider,
                    notification: Notification::TransportProviderAssigned {
                        details: id.value().to_string(),
                        provider: transport_provider.id().value().to_string(),
                    },
                }];
                // First assigned provider moves the parent document on.
                if doc.record.status == DocumentStatus::AssignedPatient {
                    self.advance_document(&doc, DocumentStatus::AssignedProvider, &mut effects)
                        .await?;
                }
                Ok(Outcome::changed(
                    Response::TransportDetails(updated),
                    effects,
                ))
            }
            Command::UpdatePatientSignature {
                id,
                patient_signature,
                patient_signature_date,
            } => {
                let (stored, doc) = self.fetch_leg_with_live_document(&id).await?;
                let updated = self
                    .transport_details
                    .update(
                        stored.version,
                        stored
                            .record
                            .with_patient_signature(patient_signature, patient_signature_date),
                    )
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let mut effects = vec![Effect::updated(
                    ENTITY,
                    id.value(),
                    OperationKind::UpdatePatientSignature,
                )];
                self.advance_if_fully_signed(&doc, &mut effects).await?;
                Ok(Outcome::changed(
                    Response::TransportDetails(updated),
                    effects,
                ))
            }
            Command::UpdateTransporterSignature {
                id,
                transporter_signature,
                transporter_signature_date,
            } => {
                let (stored, doc) = self.fetch_leg_with_live_document(&id).await?;
                let updated = self
                    .transport_details
                    .update(
                        stored.version,
                        stored.record.with_transporter_signature(
                            transporter_signature,
                            transporter_signature_date,
                        ),
                    )
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let mut effects = vec![Effect::updated(
                    ENTITY,
                    id.value(),
                    OperationKind::UpdateTransporterSignature,
                )];
                self.advance_if_fully_signed(&doc, &mut effects).await?;
                Ok(Outcome::changed(
                    Response::TransportDetails(updated),
                    effects,
                ))
            }
            Command::Delete { id } => {
                let (_, _doc) = self.fetch_leg_with_live_document(&id).await?;
                self.transport_details
                    .delete(id.value())
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::deleted(ENTITY, id.value());
                Ok(Outcome::changed(Response::Acknowledged, vec![effect]))
            }
            Command::Get { id } => {
                let stored = fetch(self.transport_details.as_ref(), id.value()).await?;
                Ok(Outcome::read(Response::TransportDetails(stored.record)))
            }
            Command::GetList { filter } => {
                let records = list(self.transport_details.as_ref(), &filter).await?;
                Ok(Outcome::read(Response::TransportDetailsList(records)))
            }
            Command::GetListByIdList { ids } => {
                // Fails on the first missing id rather than silently
                // returning a shorter list.
                let mut records = Vec::with_capacity(ids.len());
                for id in &ids {
                    let stored = fetch(self.transport_details.as_ref(), id.value()).await?;
                    records.push(stored.record);
                }
                Ok(Outcome::read(Response::TransportDetailsList(records)))
            }
        }
    }

    /// Loads a leg together with its parent document, rejecting the
    /// mutation when the document is archived.
    async fn fetch_leg_with_live_document(
        &self,
        id: &Id<TransportDetails>,
    ) -> Result<
        (
            VersionedRecord<TransportDetails>,
            VersionedRecord<TransportDocument>,
        ),
        DomainError,
    > {
        let stored = fetch(self.transport_details.as_ref(), id.value()).await?;
        let doc = fetch(
            self.transport_documents.as_ref(),
            stored.record.transport_document.id().value(),
        )
        .await?;
        reject_archived(&doc.record)?;
        Ok((stored, doc))
    }

    /// Moves the parent document to `Signed` once every leg carries both
    /// signatures. Documents that are not yet at `AssignedProvider` stay
    /// where they are.
    async fn advance_if_fully_signed(
        &self,
        doc: &VersionedRecord<TransportDocument>,
        effects: &mut Vec<Effect>,
    ) -> Result<(), DomainError> {
        if doc.record.status != DocumentStatus::AssignedProvider {
            return Ok(());
        }
        if self.document_fully_signed(&doc.record.id).await? {
            self.advance_document(doc, DocumentStatus::Signed, effects)
                .await?;
        }
        Ok(())
    }

    async fn advance_document(
        &self,
        doc: &VersionedRecord<TransportDocument>,
        next: DocumentStatus,
        effects: &mut Vec<Effect>,
    ) -> Result<(), DomainError> {
        let advanced = doc.record.advance_to(next)?;
        self.transport_documents
            .update(doc.version, advanced)
            .await
            .map_err(|e| map_storage(EntityKind::TransportDocument, e))?;
        effects.push(Effect::updated(
            EntityKind::TransportDocument,
            doc.record.id.value(),
            OperationKind::Update,
        ));
        Ok(())
    }
}
