//! TwistTacToe library - tic-tac-toe with hidden, double-ended symbol reveals
//!
//! Ten hidden blocks hold five X and five O. Player 1 reveals from the
//! front, player 2 from the back, and whoever reveals a symbol places it.
//!
//! # Architecture
//!
//! - **Games**: the rules engine (blocks, reveal deque, arrangement, history)
//! - **Players**: the heuristic computer opponent
//! - **Session**: mode controller for local, computer and online play
//! - **Net**: wire messages, the transport seam and the TCP peer link
//! - **Config / Store**: TOML settings and persisted preferences
//!
//! # Example
//!
//! ```
//! use twist_tac_toe::{End, Session, SessionOptions};
//!
//! let mut session = Session::local(SessionOptions::default().with_seed(7));
//! let symbol = session.reveal(End::Front).expect("front reveals first");
//! session.place(4).expect("centre is empty");
//! assert_eq!(session.view().board().squares()[4], twist_tac_toe::Square::Occupied(symbol));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod console;
pub mod games;
pub mod net;
pub mod players;
pub mod session;
pub mod store;

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig};

// Crate-level exports - Game types
pub use games::twist::{
    Arrangement, ArrangementStep, BlockDeque, BlockSequence, Board, End, Outcome, Phase,
    Position, Rejection, Seat, Square, Symbol, Transition, TwistGame, Variant,
};

// Crate-level exports - Players
pub use players::ComputerOpponent;

// Crate-level exports - Session management
pub use session::{Mode, Notice, Role, Session, SessionOptions, Task, Ticket, View};

// Crate-level exports - Networking
pub use net::{ConnectionStatus, LinkError, PeerMessage, Snapshot, Transport};

// Crate-level exports - Preferences
pub use store::{LastRoom, PreferenceStore, Preferences, StoreError};
