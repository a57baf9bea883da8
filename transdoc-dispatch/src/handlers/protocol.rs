use crate::dispatcher::{fetch, list, Dispatcher, Outcome};
use transdoc_model::protocol_entry::Command;
use transdoc_model::{DomainError, Response};

impl Dispatcher {
    pub(crate) async fn handle_protocol(&self, command: Command) -> Result<Outcome, DomainError> {
        match command {
            Command::Get { id } => {
                let stored = fetch(self.protocol.as_ref(), id.value()).await?;
                Ok(Outcome::read(Response::ProtocolEntry(stored.record)))
            }
            Command::GetList { filter } => {
                let records = list(self.protocol.as_ref(), &filter).await?;
                Ok(Outcome::read(Response::ProtocolEntryList(records)))
            }
        }
    }
}
