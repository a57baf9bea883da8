//! Session AEAD: XChaCha20-Poly1305 under a per-session key.

use crate::error::{CryptoError, CryptoResult};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// XChaCha20 nonce size in bytes.
pub const NONCE_SIZE: usize = 24;
/// Poly1305 tag size in bytes (appended to the ciphertext).
pub const TAG_SIZE: usize = 16;

const KEY_SIZE: usize = 32;

/// Symmetric session key plus its identifier.
///
/// Key material is zeroized on drop and never serialized in cleartext; the
/// only way a session key crosses a process boundary is sealed to an X25519
/// public key (see [`crate::seal_session_key`]). Safe for concurrent use:
/// encryption and decryption only read the key bytes.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    #[zeroize(skip)]
    id: Uuid,
    key: [u8; KEY_SIZE],
}

impl SessionKey {
    /// Generates a fresh random session key.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut key);
        Self {
            id: Uuid::new_v4(),
            key,
        }
    }

    /// Reconstructs a session key from its parts (handshake unsealing).
    pub fn from_parts(id: Uuid, key: [u8; KEY_SIZE]) -> Self {
        Self { id, key }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs.
        f.debug_struct("SessionKey").field("id", &self.id).finish()
    }
}

/// Opaque encrypted envelope carried over the wire.
///
/// `key_id` names the session key the payload was sealed under; a receiver
/// holding a different key fails with [`CryptoError::KeyMismatch`] instead
/// of attempting the decrypt. The Poly1305 tag is embedded at the end of
/// `ciphertext`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedObject {
    pub key_id: Uuid,
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

/// Encrypts a payload under the session key, producing an opaque envelope.
pub fn encrypt(key: &SessionKey, plaintext: &[u8]) -> CryptoResult<EncryptedObject> {
    let cipher = XChaCha20Poly1305::new(key.bytes().into());

    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(format!("AEAD seal failed: {e}")))?;

    Ok(EncryptedObject {
        key_id: key.id(),
        nonce,
        ciphertext,
    })
}

/// Decrypts an envelope under the session key.
///
/// Fails if the envelope names a different key, if the integrity tag does
/// not verify, or if the envelope is truncated. Never returns partial
/// plaintext.
pub fn decrypt(key: &SessionKey, envelope: &EncryptedObject) -> CryptoResult<Vec<u8>> {
    if envelope.key_id != key.id() {
        return Err(CryptoError::KeyMismatch {
            envelope_key: envelope.key_id,
            session_key: key.id(),
        });
    }
    if envelope.ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::Malformed(format!(
            "ciphertext shorter than the {TAG_SIZE}-byte tag"
        )));
    }

    let cipher = XChaCha20Poly1305::new(key.bytes().into());
    cipher
        .decrypt(XNonce::from_slice(&envelope.nonce), envelope.ciphertext.as_ref())
        .map_err(|_| CryptoError::Decryption("wrong key or tampered envelope".to_string()))
}

/// Serializes a typed payload and encrypts it in one step.
pub fn seal_value<T: Serialize>(key: &SessionKey, value: &T) -> CryptoResult<EncryptedObject> {
    let plaintext = serde_json::to_vec(value)?;
    encrypt(key, &plaintext)
}

/// Decrypts an envelope and deserializes the typed payload in one step.
pub fn open_value<T: DeserializeOwned>(
    key: &SessionKey,
    envelope: &EncryptedObject,
) -> CryptoResult<T> {
    let plaintext = decrypt(key, envelope)?;
    Ok(serde_json::from_slice(&plaintext)?)
}
