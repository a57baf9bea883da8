//! Server side of the encrypted transport.
//!
//! One tokio task per session. A session starts with the client's `Hello`
//! frame carrying the sealed session key; after unsealing it, the session
//! loop decrypts commands, dispatches them, and writes encrypted results
//! back under the same request id. A successful `LoginUser` binds the
//! authenticated user to the session; every later command runs as that
//! user. Dispatcher notifications are forwarded to all live sessions
//! through per-session outbound queues so a slow consumer never blocks
//! request traffic.

use crate::error::{NetError, NetResult};
use crate::frame::{read_frame, write_frame, Frame};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use transdoc_crypto::{open_session_key, open_value, seal_value, SessionKey, TransportKeyPair};
use transdoc_dispatch::Dispatcher;
use transdoc_model::{user, Command, Notification, Response, User};

/// Outbound frames buffered per session before the session is considered
/// too slow and pushed notifications get dropped.
const OUTBOUND_BUFFER: usize = 64;

/// Listening endpoint accepting encrypted sessions.
pub struct Server {
    listener: TcpListener,
    keypair: Arc<TransportKeyPair>,
    dispatcher: Dispatcher,
}

impl Server {
    /// Binds the listener. The keypair's public half is what clients seal
    /// their session keys to.
    pub async fn bind(
        addr: impl ToSocketAddrs,
        keypair: TransportKeyPair,
        dispatcher: Dispatcher,
    ) -> NetResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            keypair: Arc::new(keypair),
            dispatcher,
        })
    }

    pub fn local_addr(&self) -> NetResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Moves the accept loop onto a background task.
    pub fn spawn(self) -> ServerHandle {
        let addr = self.listener.local_addr().ok();
        let dispatcher = self.dispatcher.clone();
        let task = tokio::spawn(self.run());
        ServerHandle {
            task,
            addr,
            dispatcher,
        }
    }

    /// Accepts sessions until the task is aborted.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(%peer, "session accepted");
                    let keypair = Arc::clone(&self.keypair);
                    let dispatcher = self.dispatcher.clone();
                    tokio::spawn(async move {
                        if let Err(err) = run_session(stream, keypair, dispatcher).await {
                            info!(%peer, %err, "session ended");
                        }
                    });
                }
                Err(err) => {
                    warn!(%err, "accept failed");
                }
            }
        }
    }
}

/// Handle to a spawned server; aborting it stops the accept loop.
pub struct ServerHandle {
    task: JoinHandle<()>,
    addr: Option<SocketAddr>,
    dispatcher: Dispatcher,
}

impl ServerHandle {
    pub fn addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    /// Pushes a notification to every live session, outside of any
    /// command. Each session seals it under its own key before sending.
    pub fn broadcast(&self, notification: Notification) {
        self.dispatcher.publish(notification);
    }

    pub fn shutdown(self) {
        self.task.abort();
    }
}

async fn run_session(
    stream: TcpStream,
    keypair: Arc<TransportKeyPair>,
    dispatcher: Dispatcher,
) -> NetResult<()> {
    let (mut read_half, write_half) = stream.into_split();

    // The first frame must be the sealed session key.
    let session_key = match read_frame(&mut read_half).await? {
        Some(Frame::Hello(sealed)) => Arc::new(open_session_key(&sealed, &keypair.secret)?),
        Some(_) => {
            return Err(NetError::Codec(
                "expected a handshake frame first".to_string(),
            ))
        }
        None => return Ok(()),
    };

    let (outbound_tx, outbound_rx) = mpsc::channel::<Frame>(OUTBOUND_BUFFER);
    let writer = tokio::spawn(writer_loop(write_half, outbound_rx));
    let forwarder = tokio::spawn(notification_loop(
        dispatcher.subscribe(),
        Arc::clone(&session_key),
        outbound_tx.clone(),
    ));

    let result = session_loop(
        &mut read_half,
        &session_key,
        &dispatcher,
        &outbound_tx,
    )
    .await;

    forwarder.abort();
    drop(outbound_tx);
    let _ = writer.await;
    result
}

async fn session_loop(
    read_half: &mut OwnedReadHalf,
    session_key: &SessionKey,
    dispatcher: &Dispatcher,
    outbound: &mpsc::Sender<Frame>,
) -> NetResult<()> {
    let mut session_user: Option<User> = None;

    while let Some(frame) = read_frame(read_half).await? {
        let (id, envelope) = match frame {
            Frame::Request { id, envelope } => (id, envelope),
            other => {
                return Err(NetError::Codec(format!(
                    "unexpected frame kind {other:?} from client"
                )))
            }
        };
        // An envelope that does not open under this session's key poisons
        // only this session.
        let command: Command = open_value(session_key, &envelope)?;

        let binds_session = matches!(
            &command,
            Command::User(user::Command::LoginUser { .. })
        );
        let result = dispatcher.dispatch(session_user.as_ref(), command).await;
        if binds_session {
            if let Ok(Response::User(user)) = &result {
                info!(user = %user.id, "session authenticated");
                session_user = Some(user.clone());
            }
        }

        let envelope = seal_value(session_key, &result)?;
        if outbound.send(Frame::Response { id, envelope }).await.is_err() {
            return Err(NetError::ConnectionClosed);
        }
    }
    Ok(())
}

async fn writer_loop(mut write_half: OwnedWriteHalf, mut outbound: mpsc::Receiver<Frame>) {
    while let Some(frame) = outbound.recv().await {
        if let Err(err) = write_frame(&mut write_half, &frame).await {
            warn!(%err, "session write failed");
            break;
        }
    }
}

async fn notification_loop(
    mut notifications: tokio::sync::broadcast::Receiver<Notification>,
    session_key: Arc<SessionKey>,
    outbound: mpsc::Sender<Frame>,
) {
    loop {
        let notification = match notifications.recv().await {
            Ok(notification) => notification,
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "session lagged behind the notification stream");
                continue;
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        };
        let envelope = match seal_value(&session_key, &notification) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(%err, "notification encryption failed");
                continue;
            }
        };
        // try_send: a slow session loses pushes, not request throughput.
        if let Err(mpsc::error::TrySendError::Closed(_)) =
            outbound.try_send(Frame::Notification { envelope })
        {
            break;
        }
    }
}
