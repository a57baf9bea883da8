//! Entity records and the typed command/response protocol.
//!
//! One module per entity, each holding the record itself, its closed
//! `Command` enum (one variant per operation, complete payload per
//! variant) and its `Filter` for list queries. The top-level [`Command`]
//! and [`Response`] unions in [`command`] are what actually crosses the
//! wire, always inside an encrypted envelope.
//!
//! Domain failures cross the wire too: [`DomainError`] serializes inside
//! the response envelope so a client can distinguish "rejected by domain
//! logic" from "never reached the server intact".

pub mod address;
pub mod command;
mod error;
pub mod insurance;
pub mod insurance_data;
pub mod invoice;
mod notification;
pub mod patient;
pub mod protocol_entry;
pub mod service_provider;
pub mod transport_details;
pub mod transport_document;
pub mod user;

pub use address::Address;
pub use command::{Command, CommandResult, Response};
pub use error::DomainError;
pub use insurance::Insurance;
pub use insurance_data::InsuranceData;
pub use invoice::Invoice;
pub use notification::Notification;
pub use patient::Patient;
pub use protocol_entry::ProtocolEntry;
pub use service_provider::ServiceProvider;
pub use transport_details::TransportDetails;
pub use transport_document::TransportDocument;
pub use user::User;
