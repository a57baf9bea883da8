//! Encrypted client/server transport for transdoc.
//!
//! Frames are length-prefixed JSON; every payload inside them is an
//! encrypted envelope under the connection's session key, established by
//! the sealed-key handshake in `transdoc-crypto`. The [`Client`]
//! multiplexes requests by id over one connection; the [`Server`] runs one
//! tokio task per session and pushes dispatcher notifications to every
//! live session.

mod client;
mod error;
mod frame;
mod server;

pub use client::{Client, DEFAULT_REQUEST_TIMEOUT};
pub use error::{ClientError, NetError, NetResult};
pub use frame::{read_frame, write_frame, Frame, MAX_FRAME_SIZE};
pub use server::{Server, ServerHandle};
