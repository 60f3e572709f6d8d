//! Non-human players.

mod computer;

pub use computer::ComputerOpponent;
