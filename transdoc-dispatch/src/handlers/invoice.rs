use crate::dispatcher::{fetch, list, map_storage, require, Dispatcher, Effect, Outcome};
use transdoc_model::invoice::Command;
use transdoc_model::{DomainError, Invoice, Response};
use transdoc_types::{EntityKind, Id, OperationKind};

const ENTITY: EntityKind = EntityKind::Invoice;

impl Dispatcher {
    pub(crate) async fn handle_invoice(&self, command: Command) -> Result<Outcome, DomainError> {
        match command {
            Command::Create {
                transport_details,
                insurance,
                amount_cents,
            } => {
                require(self.transport_details.as_ref(), transport_details.id().value()).await?;
                require(self.insurances.as_ref(), insurance.id().value()).await?;
                let invoice = Invoice {
                    id: Id::generate(),
                    transport_details,
                    insurance,
                    amount_cents,
                    is_settled: false,
                };
                let created = self
                    .invoices
                    .create(invoice)
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::created(ENTITY, created.id.value());
                Ok(Outcome::changed(Response::Invoice(created), vec![effect]))
            }
            Command::Settle { id } => {
                let stored = fetch(self.invoices.as_ref(), id.value()).await?;
                if stored.record.is_settled {
                    return Err(DomainError::IllegalProcess(format!(
                        "invoice {id} is already settled"
                    )));
                }
                let settled = self
                    .invoices
                    .update(stored.version, stored.record.settle())
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::updated(ENTITY, id.value(), OperationKind::Settle);
                Ok(Outcome::changed(Response::Invoice(settled), vec![effect]))
            }
            Command::Delete { id } => {
                self.invoices
                    .delete(id.value())
                    .await
                    .map_err(|e| map_storage(ENTITY, e))?;
                let effect = Effect::deleted(ENTITY, id.value());
                Ok(Outcome::changed(Response::Acknowledged, vec![effect]))
            }
            Command::Get { id } => {
                let stored = fetch(self.invoices.as_ref(), id.value()).await?;
                Ok(Outcome::read(Response::Invoice(stored.record)))
            }
            Command::GetList { filter } => {
                let records = list(self.invoices.as_ref(), &filter).await?;
                Ok(Outcome::read(Response::InvoiceList(records)))
            }
        }
    }
}
