//! Wire framing: length-prefixed JSON frames over a byte stream.
//!
//! Each frame is a 4-byte big-endian length followed by the JSON encoding
//! of one [`Frame`]. Payloads of requests, responses and notifications are
//! opaque [`EncryptedObject`]s; only the handshake `Hello` and the frame
//! skeleton itself travel in cleartext.

use crate::error::{NetError, NetResult};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use transdoc_crypto::{EncryptedObject, SealedSessionKey};

/// Upper bound on one frame body. Commands are small; anything beyond
/// this is a corrupt length prefix or an abusive peer.
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// One unit of wire traffic in either direction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Frame {
    /// First client frame of a connection: the sealed session key.
    Hello(SealedSessionKey),
    /// An encrypted command, correlated by `id`.
    Request { id: u64, envelope: EncryptedObject },
    /// The encrypted result for the request with the same `id`.
    Response { id: u64, envelope: EncryptedObject },
    /// An encrypted server-pushed notification, uncorrelated.
    Notification { envelope: EncryptedObject },
}

/// Writes one frame and flushes it.
pub async fn write_frame<W>(writer: &mut W, frame: &Frame) -> NetResult<()>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(frame)?;
    if body.len() > MAX_FRAME_SIZE {
        return Err(NetError::Codec(format!(
            "frame of {} bytes exceeds the {MAX_FRAME_SIZE} byte limit",
            body.len()
        )));
    }
    writer.write_all(&(body.len() as u32).to_be_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame. `Ok(None)` means the peer closed the stream cleanly
/// at a frame boundary.
pub async fn read_frame<R>(reader: &mut R) -> NetResult<Option<Frame>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    match reader.read_exact(&mut prefix).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_be_bytes(prefix) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(NetError::Codec(format!(
            "announced frame of {len} bytes exceeds the {MAX_FRAME_SIZE} byte limit"
        )));
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(serde_json::from_slice(&body)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use transdoc_crypto::{encrypt, SessionKey};

    #[tokio::test]
    async fn frames_round_trip_through_a_buffer() {
        let key = SessionKey::generate();
        let envelope = encrypt(&key, b"payload").unwrap();
        let frame = Frame::Request { id: 7, envelope };

        let mut buf = Vec::new();
        write_frame(&mut buf, &frame).await.unwrap();

        let mut cursor = std::io::Cursor::new(buf);
        let read = read_frame(&mut cursor).await.unwrap().unwrap();
        match read {
            Frame::Request { id, envelope } => {
                assert_eq!(id, 7);
                assert_eq!(envelope.key_id, key.id());
            }
            other => panic!("wrong frame: {other:?}"),
        }
        // Stream exhausted at a frame boundary.
        assert!(read_frame(&mut cursor).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oversized_length_prefix_is_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(u32::MAX).to_be_bytes());
        buf.extend_from_slice(b"junk");
        let mut cursor = std::io::Cursor::new(buf);
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, NetError::Codec(_)), "{err:?}");
    }

    #[tokio::test]
    async fn truncated_body_is_an_io_error() {
        let key = SessionKey::generate();
        let envelope = encrypt(&key, b"payload").unwrap();
        let mut buf = Vec::new();
        write_frame(&mut buf, &Frame::Notification { envelope })
            .await
            .unwrap();
        buf.truncate(buf.len() - 3);
        let mut cursor = std::io::Cursor::new(buf);
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, NetError::Io(_)), "{err:?}");
    }
}
