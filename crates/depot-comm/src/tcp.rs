//! Line-framed TCP transport.
//!
//! Each attribute is written as `key:value` on its own line, in insertion
//! order; an empty line ends the message. Values may contain `:`, keys may not.

use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::net::Shutdown;
use std::net::TcpListener;
use std::net::TcpStream;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use depot_core::Endpoint;
use depot_core::Message;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::transport::ConnectionError;
use crate::transport::Transport;
use crate::transport::TransportError;

pub fn encode(message: &Message) -> Result<String, TransportError> {
    let mut out = String::new();
    for (key, value) in message.attributes() {
        if key.contains([':', '\n', '\r']) {
            return Err(TransportError::Encode(format!("key {key:?} cannot be framed")));
        }
        if value.contains(['\n', '\r']) {
            return Err(TransportError::Encode(format!(
                "value of {key:?} contains a line break"
            )));
        }
        out.push_str(key);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }
    out.push('\n');
    Ok(out)
}

/// Reads the next message. `Ok(None)` means the stream ended cleanly.
///
/// A frame with a line lacking `:` is consumed up to its terminating blank
/// line and reported as `Decode`, so the reader stays aligned on the next frame.
pub fn read_message<R: BufRead>(reader: &mut R) -> Result<Option<Message>, TransportError> {
    let mut message = Message::new();
    let mut malformed: Option<String> = None;
    let mut line = String::new();
    loop {
        line.clear();
        let eof = reader.read_line(&mut line)? == 0;
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if eof || trimmed.is_empty() {
            if let Some(bad) = malformed.take() {
                return Err(TransportError::Decode(bad));
            }
            if !message.is_empty() {
                return Ok(Some(message));
            }
            if eof {
                return Ok(None);
            }
            continue;
        }
        if malformed.is_some() {
            continue;
        }
        match trimmed.split_once(':') {
            Some((key, value)) => message.add(key, value),
            None => malformed = Some(trimmed.to_string()),
        }
    }
}

/// A frame ready for the sender thread.
struct Outgoing {
    target: Endpoint,
    frame: String,
}

/// State shared with the accept thread.
#[derive(Default)]
struct Listening {
    stopping: AtomicBool,
    readers: Mutex<Vec<TcpStream>>,
}

pub struct TcpTransport {
    inbound_tx: Sender<Message>,
    inbound_rx: Receiver<Message>,
    outbound: Option<Sender<Outgoing>>,
    local: Option<Endpoint>,
    listening: Arc<Listening>,
}

impl TcpTransport {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = crossbeam_channel::unbounded();
        Self {
            inbound_tx,
            inbound_rx,
            outbound: None,
            local: None,
            listening: Arc::new(Listening::default()),
        }
    }

    pub fn local_endpoint(&self) -> Option<&Endpoint> {
        self.local.as_ref()
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, endpoint: &Endpoint) -> Result<(), ConnectionError> {
        if let Some(local) = &self.local {
            return Err(ConnectionError::AlreadyConnected(local.clone()));
        }
        let listener = TcpListener::bind((endpoint.address.as_str(), endpoint.port)).map_err(
            |source| ConnectionError::Bind {
                endpoint: endpoint.clone(),
                source,
            },
        )?;
        // Port 0 binds an ephemeral port; advertise the real one.
        let bound = listener
            .local_addr()
            .map(|addr| Endpoint::new(endpoint.address.clone(), addr.port()))
            .unwrap_or_else(|_| endpoint.clone());

        let inbound = self.inbound_tx.clone();
        let listening = Arc::clone(&self.listening);
        thread::Builder::new()
            .name("depot-accept".to_string())
            .spawn(move || accept_loop(listener, inbound, &listening))
            .map_err(|source| ConnectionError::Spawn {
                name: "accept",
                source,
            })?;

        let (outbound_tx, outbound_rx) = crossbeam_channel::unbounded();
        thread::Builder::new()
            .name("depot-sender".to_string())
            .spawn(move || send_loop(outbound_rx))
            .map_err(|source| ConnectionError::Spawn {
                name: "sender",
                source,
            })?;

        info!(endpoint = %bound, "listening for replies");
        self.outbound = Some(outbound_tx);
        self.local = Some(bound);
        Ok(())
    }

    fn send(&self, message: Message) -> Result<(), TransportError> {
        let outbound = self.outbound.as_ref().ok_or(TransportError::NotConnected)?;
        let target = message
            .recipient()
            .ok_or_else(|| TransportError::Encode("message has no `to` endpoint".to_string()))?;
        let frame = encode(&message)?;
        outbound
            .send(Outgoing { target, frame })
            .map_err(|_| TransportError::Closed)
    }

    fn inbound(&self) -> Receiver<Message> {
        self.inbound_rx.clone()
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.listening.stopping.store(true, Ordering::SeqCst);
        if let Ok(readers) = self.listening.readers.lock() {
            for stream in readers.iter() {
                let _ = stream.shutdown(Shutdown::Both);
            }
        }
        // Wake the blocking accept so the thread can observe the flag.
        if let Some(local) = &self.local {
            let _ = TcpStream::connect((local.address.as_str(), local.port));
        }
    }
}

fn accept_loop(listener: TcpListener, inbound: Sender<Message>, listening: &Listening) {
    for stream in listener.incoming() {
        if listening.stopping.load(Ordering::SeqCst) {
            break;
        }
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                warn!(error = %err, "accept failed");
                continue;
            }
        };
        match (stream.try_clone(), listening.readers.lock()) {
            (Ok(handle), Ok(mut readers)) => readers.push(handle),
            _ => warn!("reader will not be closed on drop"),
        }
        let inbound = inbound.clone();
        let spawned = thread::Builder::new()
            .name("depot-reader".to_string())
            .spawn(move || read_loop(stream, inbound));
        if let Err(err) = spawned {
            warn!(error = %err, "failed to start reader thread");
        }
    }
    debug!("accept loop stopped");
}

fn read_loop(stream: TcpStream, inbound: Sender<Message>) {
    let peer = stream.peer_addr().ok();
    let mut reader = BufReader::new(stream);
    loop {
        match read_message(&mut reader) {
            Ok(Some(message)) => {
                if inbound.send(message).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(TransportError::Decode(line)) => {
                warn!(?peer, %line, "skipping malformed frame");
            }
            Err(err) => {
                warn!(?peer, error = %err, "closing connection");
                break;
            }
        }
    }
    debug!(?peer, "reader closed");
}

fn send_loop(outbound: Receiver<Outgoing>) {
    let mut connection: Option<(Endpoint, TcpStream)> = None;
    for Outgoing { target, frame } in outbound {
        if connection.as_ref().map(|(endpoint, _)| endpoint) != Some(&target) {
            connection = match TcpStream::connect((target.address.as_str(), target.port)) {
                Ok(stream) => Some((target.clone(), stream)),
                Err(err) => {
                    warn!(%target, error = %err, "could not reach peer");
                    continue;
                }
            };
        }
        if let Some((_, stream)) = connection.as_mut() {
            if let Err(err) = stream.write_all(frame.as_bytes()) {
                warn!(%target, error = %err, "send failed");
                connection = None;
            }
        }
    }
    debug!("sender stopped");
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::io::Read;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn encode_writes_lines_in_insertion_order() {
        let message = Message::new()
            .with("to", "localhost:8080")
            .with("command", "getDirsForBrowse")
            .with("path", "repo/src");
        assert_eq!(
            encode(&message).expect("encode"),
            "to:localhost:8080\ncommand:getDirsForBrowse\npath:repo/src\n\n"
        );
    }

    #[test]
    fn encode_rejects_unframeable_fields() {
        let bad_key = Message::new().with("a:b", "x");
        assert!(matches!(encode(&bad_key), Err(TransportError::Encode(_))));
        let bad_value = Message::new().with("description", "two\nlines");
        assert!(matches!(encode(&bad_value), Err(TransportError::Encode(_))));
    }

    #[test]
    fn read_message_splits_on_blank_lines() {
        let mut reader = Cursor::new("\ncommand:serverQuit\n\ndir1:include\r\ndir2:src\n");
        let first = read_message(&mut reader).expect("read").expect("message");
        assert_eq!(first.command(), Some("serverQuit"));
        let second = read_message(&mut reader).expect("read").expect("message");
        let dirs: Vec<&str> = second.tagged_values("dir").collect();
        assert_eq!(dirs, vec!["include", "src"]);
        assert!(read_message(&mut reader).expect("read").is_none());
    }

    #[test]
    fn read_message_rejects_line_without_separator() {
        let mut reader = Cursor::new("garbage\n\n");
        assert!(matches!(
            read_message(&mut reader),
            Err(TransportError::Decode(_))
        ));
    }

    #[test]
    fn read_message_skips_to_the_frame_after_a_bad_one() {
        let mut reader = Cursor::new("garbage\npath:repo\n\ncommand:serverQuit\n\n");
        match read_message(&mut reader) {
            Err(TransportError::Decode(line)) => assert_eq!(line, "garbage"),
            other => panic!("expected decode error, got {other:?}"),
        }
        let next = read_message(&mut reader).expect("read").expect("message");
        assert_eq!(next.command(), Some("serverQuit"));
        assert_eq!(next.len(), 1);
        assert!(read_message(&mut reader).expect("read").is_none());
    }

    fn listening() -> (TcpTransport, TcpStream) {
        let mut transport = TcpTransport::new();
        transport
            .connect(&Endpoint::new("127.0.0.1", 0))
            .expect("bind");
        let local = transport.local_endpoint().cloned().expect("bound");
        let client = TcpStream::connect((local.address.as_str(), local.port)).expect("connect");
        client
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("timeout");
        (transport, client)
    }

    #[test]
    fn malformed_frame_keeps_connection_open() {
        let (transport, mut client) = listening();
        client
            .write_all(b"garbage\n\ncommand:serverQuit\n\n")
            .expect("write");

        let received = transport
            .inbound()
            .recv_timeout(Duration::from_secs(5))
            .expect("frame after the bad one");
        assert_eq!(received.command(), Some("serverQuit"));
    }

    #[test]
    fn dropping_transport_closes_open_connections() {
        let (transport, mut client) = listening();
        client.write_all(b"command:serverQuit\n\n").expect("write");
        transport
            .inbound()
            .recv_timeout(Duration::from_secs(5))
            .expect("delivered");

        drop(transport);
        let mut buf = [0u8; 16];
        assert_eq!(client.read(&mut buf).expect("eof"), 0);
    }

    #[test]
    fn send_without_recipient_is_rejected() {
        let mut transport = TcpTransport::new();
        transport
            .connect(&Endpoint::new("127.0.0.1", 0))
            .expect("bind");
        assert!(matches!(
            transport.send(Message::new().with("command", "serverQuit")),
            Err(TransportError::Encode(_))
        ));
    }

    #[test]
    fn loopback_delivers_message_to_listener() {
        let mut transport = TcpTransport::new();
        transport
            .connect(&Endpoint::new("127.0.0.1", 0))
            .expect("bind");
        let local = transport.local_endpoint().cloned().expect("bound");

        let message = Message::routed(&local, &local, "connectToServer").with("note", "a:b");
        transport.send(message.clone()).expect("send");

        let received = transport
            .inbound()
            .recv_timeout(Duration::from_secs(5))
            .expect("loopback");
        assert_eq!(received, message);
    }

    #[test]
    fn send_before_connect_fails() {
        let transport = TcpTransport::new();
        assert!(matches!(
            transport.send(Message::new()),
            Err(TransportError::NotConnected)
        ));
    }
}
