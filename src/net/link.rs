//! TCP peer link: one JSON message per line over a reliable, ordered stream.
//!
//! The host listens and checks the guest's [`Hello`]; the guest dials,
//! waits for the echoed hello, and reconnects with [`Backoff`] when the
//! stream drops. Link tasks never touch game state: they forward
//! [`LinkEvent`]s to the driver and drain the outbound channel onto the
//! socket.

use super::protocol::{
    ChannelTransport, ConnectionStatus, Hello, PROTOCOL_VERSION, PeerMessage, decode, encode,
};
use super::room::Backoff;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Peer link error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Link error: {} at {}:{}", message, file, line)]
pub struct LinkError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LinkError {
    /// Creates a new link error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for LinkError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

/// What the link reports to its driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Connection state changed.
    Status(ConnectionStatus),
    /// The peer sent a message.
    Message(PeerMessage),
}

/// Timing for the guest side of a link.
#[derive(Debug, Clone, Copy, Getters, new)]
pub struct LinkSettings {
    /// Limit for dialing plus handshake.
    connect_timeout: Duration,
    /// Reconnect pacing after the stream drops.
    backoff: Backoff,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self::new(Duration::from_secs(15), Backoff::default())
    }
}

/// Receiving half of a running link. Dropping it stops the link.
#[derive(Debug)]
pub struct LinkEvents {
    events: mpsc::UnboundedReceiver<LinkEvent>,
    task: JoinHandle<()>,
}

impl LinkEvents {
    /// Waits for the next event; `None` once the link task has ended.
    pub async fn recv(&mut self) -> Option<LinkEvent> {
        self.events.recv().await
    }
}

impl Drop for LinkEvents {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A started peer link.
#[derive(Debug)]
pub struct PeerLink {
    transport: ChannelTransport,
    events: LinkEvents,
    local_addr: SocketAddr,
}

enum Closed {
    /// The peer went away or the stream failed.
    Peer,
    /// Our side dropped its channels.
    Local,
}

type Reader = Lines<BufReader<OwnedReadHalf>>;

impl PeerLink {
    /// Opens a room on `bind` and serves one guest at a time.
    ///
    /// The listener is bound before this returns, so [`PeerLink::local_addr`]
    /// is ready for the guest. A connection that sends no hello within
    /// `hello_timeout` is dropped.
    #[instrument(skip(bind), fields(room = %room_code))]
    pub async fn host(
        bind: impl ToSocketAddrs,
        room_code: String,
        hello_timeout: Duration,
    ) -> Result<Self, LinkError> {
        let listener = TcpListener::bind(bind).await?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "Room open");

        let (transport, outbound) = ChannelTransport::pair();
        let (events_tx, events) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_host(
            listener,
            room_code,
            hello_timeout,
            outbound,
            events_tx,
        ));
        Ok(Self {
            transport,
            events: LinkEvents { events, task },
            local_addr,
        })
    }

    /// Joins the room at `addr`.
    ///
    /// Fails if the host cannot be reached, or rejects the room code, within
    /// the connect timeout. Later drops are retried in the background.
    #[instrument(skip(settings), fields(room = %room_code))]
    pub async fn join(
        addr: String,
        room_code: String,
        settings: LinkSettings,
    ) -> Result<Self, LinkError> {
        let (reader, writer) = dial(&addr, &room_code, settings.connect_timeout).await?;
        let local_addr = writer.local_addr()?;
        info!(%addr, "Joined room");

        let (transport, outbound) = ChannelTransport::pair();
        let (events_tx, events) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_guest(
            addr, room_code, settings, reader, writer, outbound, events_tx,
        ));
        Ok(Self {
            transport,
            events: LinkEvents { events, task },
            local_addr,
        })
    }

    /// Address of our end of the link.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Splits into the transport for the session and the event stream for
    /// the driver.
    pub fn split(self) -> (ChannelTransport, LinkEvents) {
        (self.transport, self.events)
    }
}

// ─────────────────────────────────────────────────────────────
//  Host
// ─────────────────────────────────────────────────────────────

async fn run_host(
    listener: TcpListener,
    room_code: String,
    hello_timeout: Duration,
    mut outbound: mpsc::UnboundedReceiver<PeerMessage>,
    events: mpsc::UnboundedSender<LinkEvent>,
) {
    loop {
        if events
            .send(LinkEvent::Status(ConnectionStatus::Waiting))
            .is_err()
        {
            return;
        }
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "Accept failed");
                continue;
            }
        };
        let admitted = tokio::time::timeout(hello_timeout, admit(stream, &room_code))
            .await
            .unwrap_or_else(|_| Err(LinkError::new("No hello in time")));
        let (reader, mut writer) = match admitted {
            Ok(halves) => halves,
            Err(e) => {
                warn!(%peer, error = %e, "Guest refused");
                continue;
            }
        };
        info!(%peer, "Guest connected");
        if events
            .send(LinkEvent::Status(ConnectionStatus::Connected))
            .is_err()
        {
            return;
        }
        match serve(reader, &mut writer, &mut outbound, &events).await {
            Closed::Local => return,
            Closed::Peer => {
                info!(%peer, "Guest left");
                if events
                    .send(LinkEvent::Status(ConnectionStatus::Disconnected))
                    .is_err()
                {
                    return;
                }
            }
        }
    }
}

/// Reads the guest's hello, checks it, and echoes it back.
async fn admit(
    stream: TcpStream,
    room_code: &str,
) -> Result<(Reader, OwnedWriteHalf), LinkError> {
    let (read, mut writer) = stream.into_split();
    let mut reader = BufReader::new(read).lines();
    let line = reader
        .next_line()
        .await?
        .ok_or_else(|| LinkError::new("Closed before hello"))?;
    let hello: Hello = decode(&line)?;
    if *hello.protocol() != PROTOCOL_VERSION {
        return Err(LinkError::new(format!(
            "Protocol {} not supported",
            hello.protocol()
        )));
    }
    if !hello.room_code().eq_ignore_ascii_case(room_code) {
        return Err(LinkError::new(format!("Unknown room {}", hello.room_code())));
    }
    write_line(&mut writer, &encode(&hello)?).await?;
    Ok((reader, writer))
}

// ─────────────────────────────────────────────────────────────
//  Guest
// ─────────────────────────────────────────────────────────────

async fn dial(
    addr: &str,
    room_code: &str,
    limit: Duration,
) -> Result<(Reader, OwnedWriteHalf), LinkError> {
    let handshake = async {
        let stream = TcpStream::connect(addr).await?;
        let (read, mut writer) = stream.into_split();
        let mut reader = BufReader::new(read).lines();
        let hello = Hello::new(room_code.to_string(), PROTOCOL_VERSION);
        write_line(&mut writer, &encode(&hello)?).await?;
        let reply = reader
            .next_line()
            .await?
            .ok_or_else(|| LinkError::new("Room not found"))?;
        let echoed: Hello = decode(&reply)?;
        if echoed != hello {
            return Err(LinkError::new("Host answered for another room"));
        }
        Ok((reader, writer))
    };
    tokio::time::timeout(limit, handshake)
        .await
        .map_err(|_| LinkError::new("Connection timeout"))?
}

async fn run_guest(
    addr: String,
    room_code: String,
    settings: LinkSettings,
    mut reader: Reader,
    mut writer: OwnedWriteHalf,
    mut outbound: mpsc::UnboundedReceiver<PeerMessage>,
    events: mpsc::UnboundedSender<LinkEvent>,
) {
    loop {
        if events
            .send(LinkEvent::Status(ConnectionStatus::Connected))
            .is_err()
        {
            return;
        }
        if let Closed::Local = serve(reader, &mut writer, &mut outbound, &events).await {
            return;
        }
        info!("Lost host");
        if events
            .send(LinkEvent::Status(ConnectionStatus::Disconnected))
            .is_err()
        {
            return;
        }

        let mut attempt = 1;
        (reader, writer) = loop {
            let Some(delay) = settings.backoff.delay(attempt) else {
                let reason = format!(
                    "Gave up after {} reconnect attempts",
                    settings.backoff.max_attempts()
                );
                warn!(%reason, "Reconnect failed");
                let _ = events.send(LinkEvent::Status(ConnectionStatus::Failed { reason }));
                return;
            };
            if events
                .send(LinkEvent::Status(ConnectionStatus::Reconnecting { attempt }))
                .is_err()
            {
                return;
            }
            tokio::time::sleep(delay).await;
            match dial(&addr, &room_code, settings.connect_timeout).await {
                Ok(halves) => break halves,
                Err(e) => {
                    debug!(attempt, error = %e, "Reconnect attempt failed");
                    attempt += 1;
                }
            }
        };
        info!(attempt, "Reconnected");
    }
}

// ─────────────────────────────────────────────────────────────
//  Shared pump
// ─────────────────────────────────────────────────────────────

async fn serve(
    mut reader: Reader,
    writer: &mut OwnedWriteHalf,
    outbound: &mut mpsc::UnboundedReceiver<PeerMessage>,
    events: &mpsc::UnboundedSender<LinkEvent>,
) -> Closed {
    loop {
        tokio::select! {
            line = reader.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match decode::<PeerMessage>(&line) {
                    Ok(message) => {
                        debug!(kind = message.kind(), "Received");
                        if events.send(LinkEvent::Message(message)).is_err() {
                            return Closed::Local;
                        }
                    }
                    Err(e) => warn!(error = %e, "Dropping malformed line"),
                },
                Ok(None) => return Closed::Peer,
                Err(e) => {
                    warn!(error = %e, "Read failed");
                    return Closed::Peer;
                }
            },
            message = outbound.recv() => {
                let Some(message) = message else {
                    return Closed::Local;
                };
                let written = match encode(&message) {
                    Ok(line) => write_line(writer, &line).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = written {
                    warn!(kind = message.kind(), error = %e, "Send failed");
                    return Closed::Peer;
                }
            }
        }
    }
}

async fn write_line(writer: &mut OwnedWriteHalf, line: &str) -> Result<(), LinkError> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
