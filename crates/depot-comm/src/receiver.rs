use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

use crossbeam_channel::select;
use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use depot_core::ClientAction;
use depot_core::Message;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::dispatch::Dispatch;
use crate::dispatch::DispatchTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveStats {
    pub received: u64,
    pub dispatched: u64,
    pub discarded: u64,
    pub failed: u64,
}

/// Background thread that decodes replies and posts them to the foreground.
pub struct ReceiveLoop {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<ReceiveStats>>,
}

impl ReceiveLoop {
    pub fn spawn(
        inbound: Receiver<Message>,
        table: Arc<DispatchTable>,
        foreground: mpsc::Sender<ClientAction>,
    ) -> io::Result<Self> {
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
        let handle = thread::Builder::new()
            .name("depot-receiver".to_string())
            .spawn(move || run(inbound, shutdown_rx, &table, &foreground))?;
        Ok(Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Stops the thread and waits for it.
    pub fn shutdown(mut self) -> ReceiveStats {
        self.stop()
    }

    fn stop(&mut self) -> ReceiveStats {
        // Dropping the sender disconnects the shutdown channel, which wakes the select.
        self.shutdown.take();
        match self.handle.take().map(JoinHandle::join) {
            Some(Ok(stats)) => stats,
            Some(Err(_)) => {
                error!("receiver thread panicked");
                ReceiveStats::default()
            }
            None => ReceiveStats::default(),
        }
    }
}

impl Drop for ReceiveLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    inbound: Receiver<Message>,
    shutdown: Receiver<()>,
    table: &DispatchTable,
    foreground: &mpsc::Sender<ClientAction>,
) -> ReceiveStats {
    let mut stats = ReceiveStats::default();
    loop {
        let message = select! {
            recv(shutdown) -> _ => break,
            recv(inbound) -> message => match message {
                Ok(message) => message,
                Err(_) => {
                    info!("inbound channel closed");
                    break;
                }
            },
        };
        stats.received += 1;

        match table.dispatch(&message) {
            Dispatch::Handled(reply) => {
                debug!(command = reply.command_name(), "reply decoded");
                if foreground.send(ClientAction::Reply(reply)).is_err() {
                    info!("foreground executor gone");
                    break;
                }
                stats.dispatched += 1;
            }
            Dispatch::MissingCommand => {
                debug!(fields = message.len(), "discarding message without a command");
                stats.discarded += 1;
            }
            Dispatch::Unregistered(command) => {
                debug!(%command, "discarding message with no handler");
                stats.discarded += 1;
            }
            Dispatch::Failed { command, error } => {
                warn!(command, error = %error, "reply handler failed");
                stats.failed += 1;
            }
            Dispatch::Panicked { command } => {
                error!(command, "reply handler panicked");
                stats.failed += 1;
            }
        }
    }
    debug!(?stats, "receive loop stopped");
    stats
}
