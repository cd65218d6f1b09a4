use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use depot_core::reduce;
use depot_core::ClientAction;
use depot_core::ClientEffect;
use depot_core::ClientState;
use depot_core::UserAction;
use thiserror::Error;
use tracing::info;

use crate::dispatch::DispatchTable;
use crate::receiver::ReceiveLoop;
use crate::receiver::ReceiveStats;
use crate::transport::ConnectionError;
use crate::transport::Transport;
use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to start receiver thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("session already started")]
    AlreadyStarted,
}

/// One client session: owns the transport, the client state, and the
/// receiver thread. All state mutation happens on the thread that owns the
/// session, in the order replies were dispatched.
pub struct Session<T: Transport> {
    transport: T,
    state: ClientState,
    table: Arc<DispatchTable>,
    receiver: Option<ReceiveLoop>,
    foreground_tx: mpsc::Sender<ClientAction>,
    foreground_rx: mpsc::Receiver<ClientAction>,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, state: ClientState) -> Self {
        Self::with_table(transport, state, DispatchTable::standard())
    }

    pub fn with_table(transport: T, state: ClientState, table: DispatchTable) -> Self {
        let (foreground_tx, foreground_rx) = mpsc::channel();
        Self {
            transport,
            state,
            table: Arc::new(table),
            receiver: None,
            foreground_tx,
            foreground_rx,
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_started(&self) -> bool {
        self.receiver.is_some()
    }

    /// Listens on the client endpoint, starts the receiver, and sends the
    /// connect request plus the initial listings for every view.
    pub fn start(&mut self) -> Result<Vec<ClientEffect>, SessionError> {
        if self.is_started() {
            return Err(SessionError::AlreadyStarted);
        }
        let client = self.state.route.client.clone();
        self.transport.connect(&client)?;
        let receiver = ReceiveLoop::spawn(
            self.transport.inbound(),
            Arc::clone(&self.table),
            self.foreground_tx.clone(),
        )
        .map_err(SessionError::Spawn)?;
        self.receiver = Some(receiver);
        info!(%client, server = %self.state.route.server, "session started");
        self.submit(UserAction::Start)
    }

    /// Applies a user action, sends its messages, and returns the remaining
    /// effects for the caller to render.
    ///
    /// The state change is kept when a send fails; a warning is pushed to the
    /// status history so the user knows the view may be out of date.
    pub fn submit(&mut self, action: UserAction) -> Result<Vec<ClientEffect>, SessionError> {
        self.apply(ClientAction::User(action))
    }

    /// Applies every reply posted so far without blocking.
    pub fn process_pending(&mut self) -> Result<Vec<ClientEffect>, SessionError> {
        let mut effects = Vec::new();
        while let Ok(action) = self.foreground_rx.try_recv() {
            effects.extend(self.apply(action)?);
        }
        Ok(effects)
    }

    /// Waits up to `timeout` for one reply, then drains whatever else is queued.
    pub fn wait_next(&mut self, timeout: Duration) -> Result<Vec<ClientEffect>, SessionError> {
        let mut effects = match self.foreground_rx.recv_timeout(timeout) {
            Ok(action) => self.apply(action)?,
            Err(_) => return Ok(Vec::new()),
        };
        effects.extend(self.process_pending()?);
        Ok(effects)
    }

    /// Stops the receiver and hands back the final state.
    pub fn shutdown(mut self) -> (ClientState, ReceiveStats) {
        let stats = self
            .receiver
            .take()
            .map(ReceiveLoop::shutdown)
            .unwrap_or_default();
        info!(?stats, "session stopped");
        (self.state, stats)
    }

    fn apply(&mut self, action: ClientAction) -> Result<Vec<ClientEffect>, SessionError> {
        let mut rest = Vec::new();
        for effect in reduce(&mut self.state, action) {
            match effect {
                ClientEffect::Send(message) => {
                    if let Err(err) = self.transport.send(message) {
                        self.state
                            .status
                            .warn(format!("Request not sent ({err}); refresh the view"));
                        return Err(err.into());
                    }
                }
                other => rest.push(other),
            }
        }
        Ok(rest)
    }
}
