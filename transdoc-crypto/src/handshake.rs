//! Session-key exchange.
//!
//! The client generates the symmetric session key and seals it to the
//! server's long-lived X25519 public key using an ephemeral sender keypair
//! (X25519 + XSalsa20-Poly1305). The ephemeral public key rides along so
//! the server can reconstruct the shared secret; the sender stays
//! anonymous and each handshake gets forward secrecy.

use crate::cipher::SessionKey;
use crate::error::{CryptoError, CryptoResult};
use crypto_box::aead::Aead;
use crypto_box::{PublicKey, SalsaBox, SecretKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// X25519 keypair identifying one transport endpoint.
///
/// The secret key zeroizes on drop (from crypto_box).
pub struct TransportKeyPair {
    pub secret: SecretKey,
    pub public: PublicKey,
}

impl TransportKeyPair {
    pub fn public_bytes(&self) -> [u8; 32] {
        *self.public.as_bytes()
    }

    /// Reconstructs a keypair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        let secret = SecretKey::from(bytes);
        let public = secret.public_key();
        Self { secret, public }
    }
}

/// A session key sealed to a recipient's X25519 public key.
///
/// This is the only serialized form a session key ever takes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SealedSessionKey {
    /// Identifier of the sealed session key (cleartext on purpose: the
    /// receiver needs it to match envelopes before unsealing).
    pub key_id: Uuid,
    /// Ephemeral X25519 public key (sender side of DH).
    pub ephemeral_public_key: [u8; 32],
    /// XSalsa20 nonce (24 bytes).
    pub nonce: [u8; 24],
    /// Encrypted key material (XSalsa20-Poly1305 ciphertext + tag).
    pub ciphertext: Vec<u8>,
}

/// Generates a new endpoint keypair.
pub fn generate_transport_keypair() -> TransportKeyPair {
    let secret = SecretKey::generate(&mut rand::rngs::OsRng);
    let public = secret.public_key();
    TransportKeyPair { secret, public }
}

/// Seals a session key for a recipient.
///
/// A fresh ephemeral keypair is generated per seal operation.
pub fn seal_session_key(
    session_key: &SessionKey,
    recipient_pk: &PublicKey,
) -> CryptoResult<SealedSessionKey> {
    let ephemeral = SecretKey::generate(&mut rand::rngs::OsRng);
    let ephemeral_pk = ephemeral.public_key();

    let salsa_box = SalsaBox::new(recipient_pk, &ephemeral);

    let mut nonce = [0u8; 24];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let ciphertext = salsa_box
        .encrypt(crypto_box::Nonce::from_slice(&nonce), session_key.bytes().as_slice())
        .map_err(|e| CryptoError::Encryption(format!("session key seal failed: {e}")))?;

    Ok(SealedSessionKey {
        key_id: session_key.id(),
        ephemeral_public_key: *ephemeral_pk.as_bytes(),
        nonce,
        ciphertext,
    })
}

/// Opens a sealed session key with the recipient's secret key.
pub fn open_session_key(
    sealed: &SealedSessionKey,
    recipient_sk: &SecretKey,
) -> CryptoResult<SessionKey> {
    let ephemeral_pk = PublicKey::from(sealed.ephemeral_public_key);
    let salsa_box = SalsaBox::new(&ephemeral_pk, recipient_sk);

    let plaintext = salsa_box
        .decrypt(
            crypto_box::Nonce::from_slice(&sealed.nonce),
            sealed.ciphertext.as_ref(),
        )
        .map_err(|_| {
            CryptoError::Decryption("session key open failed (wrong key or tampered data)".into())
        })?;

    if plaintext.len() != 32 {
        return Err(CryptoError::Malformed(format!(
            "sealed session key has {} bytes, expected 32",
            plaintext.len()
        )));
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&plaintext);
    Ok(SessionKey::from_parts(sealed.key_id, key))
}
