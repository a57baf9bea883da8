//! Encryption envelope for transdoc wire traffic.
//!
//! Every command, response and notification crosses the wire as an opaque
//! [`EncryptedObject`]; no cleartext payload ever leaves this crate's
//! callers. Two primitives are involved:
//!
//! 1. **Session AEAD**: XChaCha20-Poly1305 under a per-session
//!    [`SessionKey`]. Random 24-byte nonces make nonce reuse a non-issue
//!    for session lifetimes.
//! 2. **Handshake sealing**: the client generates the session key and seals
//!    it to the server's X25519 public key with an ephemeral sender keypair
//!    (crypto_box), so the key itself is never transmitted in cleartext.
//!
//! The transport layers treat [`EncryptedObject`] as an atomic blob; only
//! this crate inspects or produces its fields.

mod cipher;
mod error;
mod handshake;

pub use cipher::{
    decrypt, encrypt, open_value, seal_value, EncryptedObject, SessionKey, NONCE_SIZE, TAG_SIZE,
};
pub use crypto_box::{PublicKey, SecretKey};
pub use error::{CryptoError, CryptoResult};
pub use handshake::{
    generate_transport_keypair, open_session_key, seal_session_key, SealedSessionKey,
    TransportKeyPair,
};
