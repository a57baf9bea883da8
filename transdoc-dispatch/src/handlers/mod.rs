//! Per-entity command handlers.
//!
//! Each module extends [`Dispatcher`](crate::Dispatcher) with the handler
//! for one entity's command enum. Handlers assume authorization already
//! happened; they validate references and lifecycle state, apply the
//! change through the entity's collaborator, and report the effects.

mod address;
mod insurance;
mod insurance_data;
mod invoice;
mod patient;
mod protocol;
mod service_provider;
mod transport_details;
mod transport_document;
mod user;
