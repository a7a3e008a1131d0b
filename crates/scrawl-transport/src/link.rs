//! The lobby link: one connection, two background loops, two queues.
//!
//! ```text
//!   Link::send ──► outbound queue ──► sender loop ──► Connection::send
//!   Link::try_recv ◄── inbound queue ◄── receiver loop ◄── Connection::recv
//! ```
//!
//! Both loops observe a shared shutdown signal and an atomic [`LinkState`];
//! neither ever touches the other's half of the connection. Teardown is
//! owned by the sender loop: it performs the close handshake after the
//! signal fires, so the connection handle is only released once both loops
//! have exited.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::{Connection, ConnectionId, TransportError};

const OPEN: u8 = 0;
const CLOSING: u8 = 1;
const CLOSED: u8 = 2;

/// Default time allowed for the close handshake and for each loop to exit.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for a [`Link`].
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// How long [`Link::close`] waits for each background loop before
    /// aborting it.
    pub shutdown_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

/// The lifecycle state of a link.
///
/// ```text
/// Open ──(close requested)──► Closing ──(loops joined)──► Closed
///   └────────────(transport failure / peer close)─────────►┘
/// ```
///
/// There is no way back to `Open`: a dropped connection is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Open,
    Closing,
    Closed,
}

impl LinkState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            OPEN => Self::Open,
            CLOSING => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// State shared between the link handle and its loops.
struct LinkControl {
    state: AtomicU8,
    shutdown: watch::Sender<bool>,
}

impl LinkControl {
    fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            state: AtomicU8::new(OPEN),
            shutdown,
        }
    }

    fn state(&self) -> LinkState {
        LinkState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Open → Closing. A link that already failed stays Closed.
    fn begin_close(&self) {
        let _ = self.state.compare_exchange(
            OPEN,
            CLOSING,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    fn mark_closed(&self) {
        self.state.store(CLOSED, Ordering::Release);
    }

    fn signal_shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}

/// A running connection to a lobby.
///
/// `send` is fire-and-forget: it only enqueues. Inbound messages pile up
/// in the inbound queue until the owner drains them with
/// [`try_recv`](Self::try_recv) or [`drain`](Self::drain).
pub struct Link {
    id: Option<ConnectionId>,
    outbound: mpsc::UnboundedSender<String>,
    inbound: mpsc::UnboundedReceiver<String>,
    control: Arc<LinkControl>,
    tasks: Option<(JoinHandle<()>, JoinHandle<()>)>,
    config: LinkConfig,
}

impl Link {
    /// Spawns the sender and receiver loops for `conn`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open<C: Connection>(conn: C, config: LinkConfig) -> Self {
        let id = conn.id();
        let conn = Arc::new(conn);
        let control = Arc::new(LinkControl::new());
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let sender = tokio::spawn(send_loop(
            Arc::clone(&conn),
            outbound_rx,
            Arc::clone(&control),
            control.shutdown.subscribe(),
        ));
        let receiver = tokio::spawn(receive_loop(
            conn,
            inbound_tx,
            Arc::clone(&control),
            control.shutdown.subscribe(),
        ));

        tracing::info!(conn = %id, "link opened");

        Self {
            id: Some(id),
            outbound: outbound_tx,
            inbound: inbound_rx,
            control,
            tasks: Some((sender, receiver)),
            config,
        }
    }

    /// Creates a link with no connection behind it.
    ///
    /// The returned [`LoopbackPeer`] plays the part of the network: whatever
    /// it pushes shows up in the inbound queue, and whatever the link sends
    /// can be read back from it.
    pub fn loopback() -> (Self, LoopbackPeer) {
        let control = Arc::new(LinkControl::new());
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let link = Self {
            id: None,
            outbound: outbound_tx,
            inbound: inbound_rx,
            control: Arc::clone(&control),
            tasks: None,
            config: LinkConfig::default(),
        };
        let peer = LoopbackPeer {
            inbound: inbound_tx,
            outbound: outbound_rx,
            control,
        };
        (link, peer)
    }

    /// Returns the connection ID, or `None` for a loopback link.
    pub fn id(&self) -> Option<ConnectionId> {
        self.id
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> LinkState {
        self.control.state()
    }

    /// Returns `true` while messages can still be sent.
    pub fn is_open(&self) -> bool {
        self.state() == LinkState::Open
    }

    /// Queues a text message for the sender loop.
    ///
    /// # Errors
    /// Returns [`TransportError::ConnectionClosed`] once the link is no
    /// longer open.
    pub fn send(&self, text: String) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::ConnectionClosed(
                "link is not open".into(),
            ));
        }
        self.outbound.send(text).map_err(|_| TransportError::Shutdown)
    }

    /// Pops the oldest received message, if any.
    pub fn try_recv(&mut self) -> Option<String> {
        self.inbound.try_recv().ok()
    }

    /// Pops every queued message in receipt order.
    ///
    /// Messages received before the link closed remain drainable afterwards.
    pub fn drain(&mut self) -> impl Iterator<Item = String> + '_ {
        std::iter::from_fn(move || self.inbound.try_recv().ok())
    }

    /// Closes the link: signals both loops, lets the sender loop flush its
    /// queue and perform the close handshake, then joins both loops.
    ///
    /// Loops that do not exit within `shutdown_timeout` are aborted.
    /// Calling `close` again is a no-op.
    pub async fn close(&mut self) {
        self.control.begin_close();
        self.control.signal_shutdown();

        if let Some((sender, receiver)) = self.tasks.take() {
            let timeout = self.config.shutdown_timeout;
            join_loop("sender", sender, timeout).await;
            join_loop("receiver", receiver, timeout).await;
        }

        self.control.mark_closed();
        match self.id {
            Some(id) => tracing::info!(conn = %id, "link closed"),
            None => tracing::debug!("loopback link closed"),
        }
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        if self.tasks.is_some() {
            self.control.begin_close();
            self.control.signal_shutdown();
        }
    }
}

async fn join_loop(name: &str, mut task: JoinHandle<()>, timeout: Duration) {
    match tokio::time::timeout(timeout, &mut task).await {
        Ok(Ok(())) => {}
        Ok(Err(join_err)) => {
            tracing::warn!(task = name, error = %join_err, "link loop failed");
        }
        Err(_) => {
            tracing::warn!(task = name, "link loop did not exit in time, aborting");
            task.abort();
        }
    }
}

/// Writes queued messages until shutdown, then performs the close handshake.
async fn send_loop<C: Connection>(
    conn: Arc<C>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    control: Arc<LinkControl>,
    mut shutdown: watch::Receiver<bool>,
) {
    let id = conn.id();
    tracing::debug!(conn = %id, "sender loop started");

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            next = outbound.recv() => {
                let Some(text) = next else { break };
                if let Err(e) = conn.send(&text).await {
                    tracing::error!(conn = %id, error = %e, "send failed, closing link");
                    control.mark_closed();
                    control.signal_shutdown();
                    return;
                }
            }
        }
    }

    if control.state() == LinkState::Closing {
        while let Ok(text) = outbound.try_recv() {
            if conn.send(&text).await.is_err() {
                break;
            }
        }
        if let Err(e) = conn.close().await {
            tracing::debug!(conn = %id, error = %e, "close handshake failed");
        }
    }

    tracing::debug!(conn = %id, "sender loop stopped");
}

/// Pushes every received message onto the inbound queue until shutdown or
/// until the connection fails.
async fn receive_loop<C: Connection>(
    conn: Arc<C>,
    inbound: mpsc::UnboundedSender<String>,
    control: Arc<LinkControl>,
    mut shutdown: watch::Receiver<bool>,
) {
    let id = conn.id();
    tracing::debug!(conn = %id, "receiver loop started");

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            frame = conn.recv() => match frame {
                Ok(Some(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => {
                        if inbound.send(text).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(conn = %id, error = %e, "dropping non UTF-8 message");
                    }
                },
                Ok(None) => {
                    tracing::info!(conn = %id, "connection closed by peer");
                    control.mark_closed();
                    control.signal_shutdown();
                    break;
                }
                Err(e) => {
                    tracing::error!(conn = %id, error = %e, "receive failed, closing link");
                    control.mark_closed();
                    control.signal_shutdown();
                    break;
                }
            }
        }
    }

    tracing::debug!(conn = %id, "receiver loop stopped");
}

/// The far end of a [`Link::loopback`] link.
pub struct LoopbackPeer {
    inbound: mpsc::UnboundedSender<String>,
    outbound: mpsc::UnboundedReceiver<String>,
    control: Arc<LinkControl>,
}

impl LoopbackPeer {
    /// Delivers a message to the link's inbound queue.
    ///
    /// Returns `false` if the link has been dropped.
    pub fn push(&self, text: impl Into<String>) -> bool {
        self.inbound.send(text.into()).is_ok()
    }

    /// Takes the oldest message the link has sent, if any.
    pub fn next_outbound(&mut self) -> Option<String> {
        self.outbound.try_recv().ok()
    }

    /// Simulates a transport failure.
    pub fn disconnect(&self) {
        self.control.mark_closed();
    }
}
