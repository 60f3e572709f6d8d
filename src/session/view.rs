//! Read-only snapshot for the presentation layer.

use super::{Mode, Role, Session};
use crate::games::twist::{Arrangement, Board, End, Outcome, Phase, Pool, Seat, Symbol};
use crate::net::ConnectionStatus;
use derive_getters::Getters;

/// Events the presentation layer should surface once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A line was completed.
    Celebration {
        /// The winning symbol.
        winner: Symbol,
    },
    /// The link changed in a way worth telling the player.
    Connection(String),
}

/// Everything a renderer needs, re-derived after every transition.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct View {
    mode: Mode,
    role: Option<Role>,
    room_code: Option<String>,
    board: Board,
    history_len: usize,
    step: usize,
    front_index: usize,
    back_index: Option<usize>,
    remaining: usize,
    revealed: Vec<usize>,
    revealed_blocks: Vec<(usize, Symbol)>,
    pending: Option<Symbol>,
    phase: Phase,
    end_to_move: End,
    front_seat: Seat,
    arranging: Option<End>,
    pools: Option<(Pool, Pool)>,
    staged: Option<usize>,
    arranged_slots: Vec<(usize, Symbol)>,
    outcome: Option<Outcome>,
    celebrating: bool,
    connected: bool,
    host_wins: u32,
    guest_wins: u32,
    status: String,
}

impl Session {
    /// Derives the current view.
    pub fn view(&self) -> View {
        let game = &self.game;
        let deque = game.deque();
        let sequence = deque.sequence();
        let arrangement = game.arrangement();
        let (host_wins, guest_wins) = self
            .online
            .as_ref()
            .map_or((0, 0), |online| (online.host_wins, online.guest_wins));

        View {
            mode: self.mode,
            role: self.role(),
            room_code: self.room_code().map(str::to_string),
            board: game.board().clone(),
            history_len: game.history().len(),
            step: game.step(),
            front_index: deque.front_index(),
            back_index: deque.back_index(),
            remaining: deque.remaining(),
            revealed: deque.revealed().to_vec(),
            revealed_blocks: deque
                .revealed()
                .iter()
                .filter_map(|&index| sequence.get(index).map(|symbol| (index, symbol)))
                .collect(),
            pending: game.pending(),
            phase: game.phase().clone(),
            end_to_move: game.end_to_move(),
            front_seat: self.front_seat,
            arranging: arrangement.map(Arrangement::turn),
            pools: arrangement.map(|a| (*a.pool(End::Front), *a.pool(End::Back))),
            staged: arrangement.and_then(Arrangement::staged),
            arranged_slots: arrangement
                .map(|a| {
                    Arrangement::target_slots(a.turn())
                        .into_iter()
                        .filter_map(|index| sequence.get(index).map(|symbol| (index, symbol)))
                        .collect()
                })
                .unwrap_or_default(),
            outcome: game.outcome(),
            celebrating: self.celebrating,
            connected: self
                .online
                .as_ref()
                .is_some_and(|online| online.status.is_connected()),
            host_wins,
            guest_wins,
            status: self.status(),
        }
    }

    /// One-line description of whose move it is.
    pub fn status(&self) -> String {
        let online = self.online.as_ref();
        if let Some(ConnectionStatus::Failed { reason }) = online.map(|online| &online.status) {
            return format!("Connection failed: {}", reason);
        }
        let (end, action) = match self.game.phase() {
            Phase::Finished { outcome, .. } => return outcome.to_string(),
            _ if online.is_some_and(|online| !online.status.is_connected()) => {
                return "Waiting for opponent...".to_string();
            }
            Phase::Arranging(arrangement) => (arrangement.turn(), "arrange your blocks".to_string()),
            Phase::AwaitingReveal => {
                let end = self.game.end_to_move();
                (end, format!("reveal from the {} block", end))
            }
            Phase::AwaitingPlacement { symbol } => {
                (self.game.end_to_move(), format!("place {}", symbol))
            }
        };

        let seat = self.seat_of(end);
        match (self.mode, &self.computer, online) {
            (Mode::Computer, Some(computer), _) if seat == computer.seat() => {
                format!("{} is thinking...", computer.name())
            }
            (Mode::Online, _, Some(online)) if seat != online.role.seat() => {
                "Opponent's turn".to_string()
            }
            (Mode::Local, _, _) => format!("{}: {}", seat, action),
            _ => format!("Your turn: {}", action),
        }
    }
}
