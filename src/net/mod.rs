//! Peer-to-peer plumbing: wire messages, the transport seam, the TCP link
//! and room codes.

mod link;
mod protocol;
mod room;

pub use link::{LinkError, LinkEvent, LinkEvents, LinkSettings, PeerLink};
pub use protocol::{
    ChannelTransport, ConnectionStatus, Hello, PROTOCOL_VERSION, PeerMessage, RevealDelta,
    Snapshot, Transport, decode, encode,
};
pub use room::{
    Backoff, ROOM_CODE_ALPHABET, ROOM_CODE_LEN, generate_room_code, is_valid_room_code,
    normalize_room_code,
};
