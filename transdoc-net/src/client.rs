//! Client side of the encrypted transport.
//!
//! One [`Client`] is one connection: it generates the session key, seals
//! it to the server during connect, and multiplexes concurrent `send`
//! calls over the single stream by request id. A background reader task
//! demultiplexes responses to their waiting callers and feeds pushed
//! notifications into a separate channel.

use crate::error::ClientError;
use crate::frame::{read_frame, write_frame, Frame};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use transdoc_crypto::{open_value, seal_session_key, seal_value, EncryptedObject, PublicKey, SessionKey};
use transdoc_model::{Command, CommandResult, Notification, Response};

/// Default time to wait for a response before giving up on a request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<EncryptedObject>>>>;

/// An encrypted connection to a transdoc server.
pub struct Client {
    session_key: Arc<SessionKey>,
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    pending: PendingMap,
    next_id: AtomicU64,
    timeout: Duration,
    notifications: Mutex<Option<mpsc::UnboundedReceiver<Notification>>>,
    reader: JoinHandle<()>,
}

impl Client {
    /// Connects and performs the handshake: a fresh session key is sealed
    /// to `server_public_key` and sent as the first frame.
    pub async fn connect(
        addr: impl ToSocketAddrs,
        server_public_key: &PublicKey,
    ) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, mut write_half) = stream.into_split();

        let session_key = Arc::new(SessionKey::generate());
        let sealed = seal_session_key(&session_key, server_public_key)?;
        write_frame(&mut write_half, &Frame::Hello(sealed)).await?;

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(reader_loop(
            read_half,
            Arc::clone(&session_key),
            Arc::clone(&pending),
            notify_tx,
        ));

        Ok(Self {
            session_key,
            writer: tokio::sync::Mutex::new(write_half),
            pending,
            next_id: AtomicU64::new(1),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            notifications: Mutex::new(Some(notify_rx)),
            reader,
        })
    }

    /// Replaces the request timeout (default
    /// [`DEFAULT_REQUEST_TIMEOUT`]).
    pub fn set_request_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Takes the notification stream. The first call returns the
    /// receiver; later calls return `None`. Notifications queue without
    /// bound until polled, so a consumer never misses one by being slow.
    pub fn notifications(&self) -> Option<mpsc::UnboundedReceiver<Notification>> {
        self.notifications.lock().unwrap().take()
    }

    /// Executes one command on the server.
    ///
    /// Concurrent calls interleave freely on the connection. Dropping the
    /// returned future cancels the request: the pending slot is released
    /// and a late response for it is discarded by the reader.
    pub async fn send(&self, command: Command) -> Result<Response, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = seal_value(&self.session_key, &command)?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(id, tx);
        let _slot = PendingSlot {
            pending: &self.pending,
            id,
        };

        {
            let mut writer = self.writer.lock().await;
            write_frame(&mut *writer, &Frame::Request { id, envelope }).await?;
        }

        let envelope = tokio::time::timeout(self.timeout, rx)
            .await
            .map_err(|_| ClientError::Timeout)?
            .map_err(|_| ClientError::ConnectionClosed)?;

        let result: CommandResult = open_value(&self.session_key, &envelope)?;
        result.map_err(ClientError::Domain)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Releases a request's pending slot when its future is dropped before
/// the response arrived.
struct PendingSlot<'a> {
    pending: &'a PendingMap,
    id: u64,
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        self.pending.lock().unwrap().remove(&self.id);
    }
}

async fn reader_loop(
    mut read_half: OwnedReadHalf,
    session_key: Arc<SessionKey>,
    pending: PendingMap,
    notify_tx: mpsc::UnboundedSender<Notification>,
) {
    loop {
        let frame = match read_frame(&mut read_half).await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(err) => {
                warn!(%err, "connection reader failed");
                break;
            }
        };
        match frame {
            Frame::Response { id, envelope } => {
                let waiter = pending.lock().unwrap().remove(&id);
                match waiter {
                    // A closed receiver means the caller gave up already.
                    Some(tx) => drop(tx.send(envelope)),
                    None => debug!(id, "dropping response for cancelled or unknown request"),
                }
            }
            Frame::Notification { envelope } => {
                match open_value::<Notification>(&session_key, &envelope) {
                    // Send only fails once the receiver is gone.
                    Ok(notification) => {
                        if notify_tx.send(notification).is_err() {
                            debug!("notification stream closed by the consumer");
                        }
                    }
                    Err(err) => warn!(%err, "undecryptable notification"),
                }
            }
            Frame::Hello(_) | Frame::Request { .. } => {
                warn!("protocol violation: client-bound frame of the wrong kind");
                break;
            }
        }
    }
    // Wake every waiter with ConnectionClosed.
    pending.lock().unwrap().clear();
}
