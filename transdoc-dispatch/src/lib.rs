//! Command dispatch: authorization, lifecycle guards and collaborator
//! orchestration.
//!
//! The [`Dispatcher`] is the single entry point for executing a
//! [`Command`](transdoc_model::Command). The session layer hands it the
//! decrypted command together with the session's authenticated user; it
//! answers with the [`CommandResult`](transdoc_model::CommandResult) that
//! goes back inside the response envelope. Successful mutations also
//! append to the protocol trail and fan out a
//! [`Notification`](transdoc_model::Notification) to subscribers.

mod dispatcher;
mod handlers;
mod permissions;

pub use dispatcher::Dispatcher;
pub use permissions::is_allowed;
