//! Messages exchanged between two peers, and the transport seam.
//!
//! Every message is one JSON object tagged by `"type"`. Arrangement updates
//! carry the full arrangement state; reveals and placements carry deltas.

use crate::games::twist::{Arrangement, BlockSequence, End, Seat, Symbol, TwistGame};
use crate::net::LinkError;
use derive_getters::Getters;
use derive_new::new;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{instrument, trace};

/// Version of the message format, checked during the handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// Full state the host shares on request and on restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Snapshot {
    /// The game record.
    game: TwistGame,
    /// Seat revealing from the front in this game.
    front_seat: Seat,
    /// Games won by the host in this room.
    host_wins: u32,
    /// Games won by the guest in this room.
    guest_wins: u32,
}

/// A reveal performed by the sender, with the cursors it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct RevealDelta {
    /// End the block was taken from.
    end: End,
    /// Slot that was consumed.
    index: usize,
    /// Symbol found in the slot.
    symbol: Symbol,
    /// Front cursor after the reveal.
    front_index: usize,
    /// Exclusive back cursor after the reveal.
    back_end: usize,
    /// Every consumed slot, in reveal order.
    revealed: Vec<usize>,
}

/// Application message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PeerMessage {
    /// Ask the peer for a full snapshot.
    RequestState,
    /// Full snapshot, answering `request_state`.
    GameState(Snapshot),
    /// The sender revealed a block.
    BlockReveal(RevealDelta),
    /// The sender placed its pending symbol.
    SquareClick {
        /// Cell index, row-major.
        index: usize,
    },
    /// The sender committed an arrangement step.
    BlockArrangement {
        /// Sequence including the new commit.
        sequence: BlockSequence,
        /// Arrangement state, `None` once arranging is complete.
        arrangement: Option<Arrangement>,
    },
    /// The host started a new game.
    GameRestart(Snapshot),
    /// Room win counters.
    WinCount {
        /// Games won by the host.
        host_wins: u32,
        /// Games won by the guest.
        guest_wins: u32,
    },
}

impl PeerMessage {
    /// Tag name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PeerMessage::RequestState => "request_state",
            PeerMessage::GameState(_) => "game_state",
            PeerMessage::BlockReveal(_) => "block_reveal",
            PeerMessage::SquareClick { .. } => "square_click",
            PeerMessage::BlockArrangement { .. } => "block_arrangement",
            PeerMessage::GameRestart(_) => "game_restart",
            PeerMessage::WinCount { .. } => "win_count",
        }
    }
}

/// First line sent by a joining peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
#[serde(tag = "type", rename = "hello")]
pub struct Hello {
    /// Room the guest wants to enter.
    room_code: String,
    /// Message format version.
    protocol: u32,
}

/// Link state reported to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Room open, nobody joined yet.
    Waiting,
    /// Peer present.
    Connected,
    /// Trying to re-establish a lost link.
    Reconnecting {
        /// One-based attempt number.
        attempt: u32,
    },
    /// Link lost.
    Disconnected,
    /// Gave up; the room has to be created or joined again.
    Failed {
        /// Why the link gave up.
        reason: String,
    },
}

impl ConnectionStatus {
    /// Returns true while the peer is reachable.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

/// Outbound half of a peer connection, injected into the session.
pub trait Transport: Send {
    /// Queues a message for delivery, preserving order.
    fn send(&mut self, message: &PeerMessage) -> Result<(), LinkError>;
}

/// Transport backed by an unbounded tokio channel.
///
/// The peer link drains the receiving half onto the socket; tests read it
/// directly to wire two sessions together.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    outbound: mpsc::UnboundedSender<PeerMessage>,
}

impl ChannelTransport {
    /// Wraps the sending half of a channel.
    pub fn new(outbound: mpsc::UnboundedSender<PeerMessage>) -> Self {
        Self { outbound }
    }

    /// Creates a transport and the receiver its messages arrive on.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<PeerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Transport for ChannelTransport {
    #[instrument(skip(self, message), fields(kind = message.kind()))]
    fn send(&mut self, message: &PeerMessage) -> Result<(), LinkError> {
        trace!("Queueing message");
        self.outbound
            .send(message.clone())
            .map_err(|_| LinkError::new("Peer link closed"))
    }
}

/// Encodes one message as a single line of JSON, without the newline.
pub fn encode<T: Serialize>(message: &T) -> Result<String, LinkError> {
    serde_json::to_string(message).map_err(|e| LinkError::new(format!("Encode failed: {}", e)))
}

/// Decodes one line of JSON.
pub fn decode<T: DeserializeOwned>(line: &str) -> Result<T, LinkError> {
    serde_json::from_str(line.trim()).map_err(|e| LinkError::new(format!("Decode failed: {}", e)))
}
