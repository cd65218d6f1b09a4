use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use depot_core::Endpoint;
use depot_core::Message;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to listen on {endpoint}: {source}")]
    Bind {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },
    #[error("connection to {0} was refused")]
    Refused(Endpoint),
    #[error("already listening on {0}")]
    AlreadyConnected(Endpoint),
    #[error("failed to start {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport is not connected")]
    NotConnected,
    #[error("transport channel closed")]
    Closed,
    #[error("cannot encode message: {0}")]
    Encode(String),
    #[error("malformed wire line {0:?}")]
    Decode(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Message-passing endpoint the session runs on.
///
/// `send` only enqueues. Inbound messages are exposed as a channel so the
/// receive loop can select over them together with its shutdown signal.
pub trait Transport: Send {
    /// Establishes the listening identity. Failure is fatal to the session.
    fn connect(&mut self, endpoint: &Endpoint) -> Result<(), ConnectionError>;

    fn send(&self, message: Message) -> Result<(), TransportError>;

    fn inbound(&self) -> Receiver<Message>;

    /// Blocks until one message is available.
    fn receive(&self) -> Result<Message, TransportError> {
        self.inbound().recv().map_err(|_| TransportError::Closed)
    }
}

/// In-memory transport. The paired [`LocalPeer`] plays the server.
pub struct LocalTransport {
    outbound: Sender<Message>,
    inbound: Receiver<Message>,
    refuse: Arc<AtomicBool>,
    local: Option<Endpoint>,
}

pub struct LocalPeer {
    sent: Receiver<Message>,
    replies: Sender<Message>,
    refuse: Arc<AtomicBool>,
}

impl LocalTransport {
    pub fn pair() -> (Self, LocalPeer) {
        let (outbound_tx, outbound_rx) = crossbeam_channel::unbounded();
        let (inbound_tx, inbound_rx) = crossbeam_channel::unbounded();
        let refuse = Arc::new(AtomicBool::new(false));
        let transport = Self {
            outbound: outbound_tx,
            inbound: inbound_rx,
            refuse: Arc::clone(&refuse),
            local: None,
        };
        let peer = LocalPeer {
            sent: outbound_rx,
            replies: inbound_tx,
            refuse,
        };
        (transport, peer)
    }

    pub fn local_endpoint(&self) -> Option<&Endpoint> {
        self.local.as_ref()
    }
}

impl Transport for LocalTransport {
    fn connect(&mut self, endpoint: &Endpoint) -> Result<(), ConnectionError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(ConnectionError::Refused(endpoint.clone()));
        }
        if let Some(local) = &self.local {
            return Err(ConnectionError::AlreadyConnected(local.clone()));
        }
        self.local = Some(endpoint.clone());
        Ok(())
    }

    fn send(&self, message: Message) -> Result<(), TransportError> {
        if self.local.is_none() {
            return Err(TransportError::NotConnected);
        }
        self.outbound
            .send(message)
            .map_err(|_| TransportError::Closed)
    }

    fn inbound(&self) -> Receiver<Message> {
        self.inbound.clone()
    }
}

impl LocalPeer {
    /// Delivers `message` to the client as if the server had sent it.
    pub fn reply(&self, message: Message) -> Result<(), TransportError> {
        self.replies
            .send(message)
            .map_err(|_| TransportError::Closed)
    }

    pub fn next_sent(&self, timeout: Duration) -> Option<Message> {
        self.sent.recv_timeout(timeout).ok()
    }

    /// Everything sent so far, without waiting.
    pub fn drain_sent(&self) -> Vec<Message> {
        self.sent.try_iter().collect()
    }

    /// Makes every later `connect` fail.
    pub fn refuse_connections(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }
}
