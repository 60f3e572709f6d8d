//! Command-line interface for twist_tac_toe.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// TwistTacToe - tic-tac-toe where the symbol you place is revealed from a
/// hidden, double-ended row of blocks
#[derive(Parser, Debug)]
#[command(name = "twist_tac_toe")]
#[command(about = "Tic-tac-toe with hidden, double-ended symbol reveals", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = "twist_tac_toe.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every mode.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct GameArgs {
    /// Arrange the hidden blocks before playing
    #[arg(long)]
    pub arrangement: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Two players at this terminal
    Local {
        #[command(flatten)]
        game: GameArgs,
    },

    /// Play against the computer
    Computer {
        #[command(flatten)]
        game: GameArgs,
    },

    /// Open an online room and wait for a guest
    Host {
        #[command(flatten)]
        game: GameArgs,

        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind to
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Join an online room
    Join {
        #[command(flatten)]
        game: GameArgs,

        /// Five-character room code
        code: String,

        /// Host address, e.g. 192.168.1.20:7878
        address: String,
    },

    /// Rejoin the last room, if it is recent enough
    Rejoin {
        #[command(flatten)]
        game: GameArgs,
    },
}
