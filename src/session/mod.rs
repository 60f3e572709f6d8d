//! Session controller: owns one game, its seats and its play mode.
//!
//! Every intent (local input, computer timer, peer message) enters through
//! a `&mut self` method, is validated against the current state, and either
//! changes the game or returns a [`Rejection`] with nothing changed.

mod online;
mod schedule;
mod view;

pub use schedule::{Task, Ticket};
pub use view::{Notice, View};

use crate::config::GameConfig;
use crate::games::twist::{
    ArrangementStep, End, Phase, Rejection, Seat, Symbol, Transition, TwistGame, Variant,
};
use crate::net::{PeerMessage, RevealDelta, Transport};
use crate::players::ComputerOpponent;
use derive_getters::Getters;
use derive_more::Display;
use online::OnlineState;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// How the two seats are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Two players at one terminal.
    #[display("local")]
    Local,
    /// One human against the computer.
    #[display("computer")]
    Computer,
    /// Two peers over a link.
    #[display("online")]
    Online,
}

/// Which side of an online room this session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Opened the room; authoritative for restarts.
    #[display("host")]
    Host,
    /// Joined the room.
    #[display("guest")]
    Guest,
}

impl Role {
    /// The seat this role plays from.
    pub fn seat(self) -> Seat {
        match self {
            Role::Host => Seat::One,
            Role::Guest => Seat::Two,
        }
    }
}

/// Settings a session is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct SessionOptions {
    /// How hidden sequences are produced.
    variant: Variant,
    /// Pause before each computer action.
    think_delay: Duration,
    /// How long a win is celebrated.
    celebration: Duration,
    /// Fixed seed for reproducible games.
    seed: Option<u64>,
}

impl SessionOptions {
    /// Creates options with default timings.
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Takes timings and seed from the config. Arrangement is on if either
    /// the flag or the config asks for it.
    pub fn from_config(config: &GameConfig, arrangement: bool) -> Self {
        Self {
            variant: if arrangement || *config.arrangement() {
                Variant::Arranged
            } else {
                Variant::Shuffled
            },
            think_delay: Duration::from_millis(*config.think_delay_ms()),
            celebration: Duration::from_millis(*config.celebration_ms()),
            seed: *config.seed(),
        }
    }

    /// Replaces the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the computer think delay.
    pub fn with_think_delay(mut self, delay: Duration) -> Self {
        self.think_delay = delay;
        self
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            variant: Variant::Shuffled,
            think_delay: Duration::from_millis(700),
            celebration: Duration::from_millis(2500),
            seed: None,
        }
    }
}

/// A running game in one of the three modes.
pub struct Session {
    mode: Mode,
    options: SessionOptions,
    game: TwistGame,
    rng: ChaCha20Rng,
    front_seat: Seat,
    generation: u64,
    computer: Option<ComputerOpponent>,
    online: Option<OnlineState>,
    transport: Option<Box<dyn Transport>>,
    scheduled: Vec<Ticket>,
    notices: Vec<Notice>,
    celebrating: bool,
}

// ─────────────────────────────────────────────────────────────
//  Construction
// ─────────────────────────────────────────────────────────────

impl Session {
    /// Two players sharing one terminal.
    pub fn local(options: SessionOptions) -> Self {
        Self::build(Mode::Local, options, None, None, None)
    }

    /// A human in seat one against the computer in seat two.
    pub fn computer(options: SessionOptions) -> Self {
        Self::build(
            Mode::Computer,
            options,
            Some(ComputerOpponent::default()),
            None,
            None,
        )
    }

    /// Host side of an online room.
    pub fn host(
        options: SessionOptions,
        room_code: impl Into<String>,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self::build(
            Mode::Online,
            options,
            None,
            Some(OnlineState::new(Role::Host, room_code.into())),
            Some(transport),
        )
    }

    /// Guest side of an online room. The game is replaced by the host's
    /// snapshot once connected.
    pub fn guest(
        options: SessionOptions,
        room_code: impl Into<String>,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self::build(
            Mode::Online,
            options,
            None,
            Some(OnlineState::new(Role::Guest, room_code.into())),
            Some(transport),
        )
    }

    fn build(
        mode: Mode,
        options: SessionOptions,
        computer: Option<ComputerOpponent>,
        online: Option<OnlineState>,
        transport: Option<Box<dyn Transport>>,
    ) -> Self {
        let mut rng = match options.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        let game = TwistGame::new(options.variant, &mut rng);
        info!(%mode, variant = ?options.variant, "Session started");
        Self {
            mode,
            options,
            game,
            rng,
            front_seat: Seat::One,
            generation: 0,
            computer,
            online,
            transport,
            scheduled: Vec::new(),
            notices: Vec::new(),
            celebrating: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Accessors
// ─────────────────────────────────────────────────────────────

impl Session {
    /// Play mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Online role, if any.
    pub fn role(&self) -> Option<Role> {
        self.online.as_ref().map(|online| online.role)
    }

    /// The game being played.
    pub fn game(&self) -> &TwistGame {
        &self.game
    }

    /// Seat revealing from the front in this game.
    pub fn front_seat(&self) -> Seat {
        self.front_seat
    }

    /// Bumped by every restart and adopted snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Seat playing `end` in this game.
    pub fn seat_of(&self, end: End) -> Seat {
        match end {
            End::Front => self.front_seat,
            End::Back => self.front_seat.other(),
        }
    }

    /// Takes the tickets scheduled since the last call.
    pub fn take_scheduled(&mut self) -> Vec<Ticket> {
        std::mem::take(&mut self.scheduled)
    }

    /// Takes the notices raised since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

// ─────────────────────────────────────────────────────────────
//  Intents
// ─────────────────────────────────────────────────────────────

impl Session {
    /// Reveals the next block from `end`.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub fn reveal(&mut self, end: End) -> Result<Symbol, Rejection> {
        self.try_reveal(end)
            .inspect_err(|rejection| debug!(%rejection, "Reveal rejected"))
    }

    fn try_reveal(&mut self, end: End) -> Result<Symbol, Rejection> {
        self.game.check_reveal(end)?;
        self.check_local_turn(end)?;
        let symbol = self.game.reveal(end)?;
        if self.mode == Mode::Online {
            let deque = self.game.deque();
            let index = deque.revealed().last().copied().unwrap_or_default();
            let delta = RevealDelta::new(
                end,
                index,
                symbol,
                deque.front_index(),
                deque.back_end(),
                deque.revealed().to_vec(),
            );
            self.broadcast(PeerMessage::BlockReveal(delta));
        }
        Ok(symbol)
    }

    /// Places the revealed symbol on `cell` (0-8, row-major).
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub fn place(&mut self, cell: usize) -> Result<Transition, Rejection> {
        self.try_place(cell)
            .inspect_err(|rejection| debug!(%rejection, "Placement rejected"))
    }

    fn try_place(&mut self, cell: usize) -> Result<Transition, Rejection> {
        self.game.check_place(cell)?;
        self.check_local_turn(self.game.end_to_move())?;
        let transition = self.game.place(cell)?;
        self.broadcast(PeerMessage::SquareClick { index: cell });
        self.after_placement(transition);
        Ok(transition)
    }

    /// Stages an entry of the arranging player's pool.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub fn select_pool(&mut self, pool_index: usize) -> Result<Symbol, Rejection> {
        self.try_select(pool_index)
            .inspect_err(|rejection| debug!(%rejection, "Selection rejected"))
    }

    fn try_select(&mut self, pool_index: usize) -> Result<Symbol, Rejection> {
        let end = self.arranging_end()?;
        self.check_local_turn(end)?;
        self.game.select(pool_index)
    }

    /// Commits the staged entry into hidden slot `block_index`.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub fn commit_block(&mut self, block_index: usize) -> Result<ArrangementStep, Rejection> {
        self.try_commit(block_index)
            .inspect_err(|rejection| debug!(%rejection, "Commit rejected"))
    }

    fn try_commit(&mut self, block_index: usize) -> Result<ArrangementStep, Rejection> {
        let end = self.arranging_end()?;
        self.check_local_turn(end)?;
        let step = self.game.commit(block_index)?;
        if self.mode == Mode::Online {
            let message = PeerMessage::BlockArrangement {
                sequence: self.game.deque().sequence().clone(),
                arrangement: self.game.arrangement().cloned(),
            };
            self.broadcast(message);
        }
        self.schedule_computer_turn();
        Ok(step)
    }

    /// Starts a new game.
    ///
    /// Online, only the host restarts; a won game is credited to the seat
    /// that placed last before the board is reset.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub fn restart(&mut self) -> Result<(), Rejection> {
        if self.role() == Some(Role::Guest) {
            debug!("Restart rejected: guest");
            return Err(Rejection::NotHost);
        }
        self.credit_winner();
        self.reset_game();
        if let Some(online) = &self.online {
            let wins = PeerMessage::WinCount {
                host_wins: online.host_wins,
                guest_wins: online.guest_wins,
            };
            self.broadcast(PeerMessage::GameRestart(self.snapshot()));
            self.broadcast(wins);
        }
        Ok(())
    }

    /// Views turn record `step`. Step 0 starts a new game.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub fn jump_to(&mut self, step: usize) -> Result<(), Rejection> {
        if self.mode != Mode::Local {
            debug!("Jump rejected outside local mode");
            return Err(Rejection::JumpUnavailable);
        }
        if step == 0 {
            return self.restart();
        }
        self.game
            .jump_to(step)
            .inspect_err(|rejection| debug!(%rejection, "Jump rejected"))
    }

    /// Runs a scheduled task, unless it belongs to an older game.
    #[instrument(skip(self), fields(task = ?ticket.task()))]
    pub fn fire(&mut self, ticket: Ticket) {
        if ticket.generation() != self.generation {
            debug!(
                ticket = ticket.generation(),
                current = self.generation,
                "Dropping stale ticket"
            );
            return;
        }
        match ticket.task() {
            Task::ComputerReveal => self.computer_reveal(),
            Task::ComputerPlace => self.computer_place(),
            Task::ComputerArrange => self.computer_arrange(),
            Task::EndCelebration => self.celebrating = false,
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Turn ownership
// ─────────────────────────────────────────────────────────────

impl Session {
    fn arranging_end(&self) -> Result<End, Rejection> {
        self.game
            .arrangement()
            .map(|arrangement| arrangement.turn())
            .ok_or(Rejection::NotArranging)
    }

    /// Checks that this side may act for `end`.
    fn check_local_turn(&self, end: End) -> Result<(), Rejection> {
        let seat = self.seat_of(end);
        match (self.mode, &self.computer, &self.online) {
            (Mode::Computer, Some(computer), _) if seat == computer.seat() => {
                Err(Rejection::ComputerTurn)
            }
            (Mode::Online, _, Some(online)) => {
                if seat != online.role.seat() {
                    Err(Rejection::NotYourTurn)
                } else if !online.status.is_connected() {
                    Err(Rejection::AwaitingOpponent)
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Game lifecycle
// ─────────────────────────────────────────────────────────────

impl Session {
    fn after_placement(&mut self, transition: Transition) {
        match transition {
            Transition::Finished(outcome) => {
                if let Some(winner) = outcome.winner() {
                    self.celebrate(winner);
                }
            }
            Transition::Continue => self.schedule_computer_turn(),
        }
    }

    fn celebrate(&mut self, winner: Symbol) {
        info!(%winner, "Celebrating");
        self.celebrating = true;
        self.notices.push(Notice::Celebration { winner });
        self.schedule(Task::EndCelebration, self.options.celebration);
    }

    fn credit_winner(&mut self) {
        let won_by = self
            .game
            .outcome()
            .and_then(|outcome| outcome.winner())
            .and(self.game.last_placed());
        let Some(end) = won_by else {
            return;
        };
        let seat = self.seat_of(end);
        if let Some(online) = self.online.as_mut() {
            let role = online.credit(seat);
            info!(
                %role,
                host_wins = online.host_wins,
                guest_wins = online.guest_wins,
                "Win credited"
            );
        }
    }

    fn reset_game(&mut self) {
        self.game = TwistGame::new(self.options.variant, &mut self.rng);
        if self.mode != Mode::Computer {
            self.front_seat = self.front_seat.other();
        }
        self.bump_generation();
        info!(
            generation = self.generation,
            front_seat = %self.front_seat,
            "Game restarted"
        );
        self.schedule_computer_turn();
    }

    fn bump_generation(&mut self) {
        self.generation += 1;
        self.scheduled.clear();
        self.celebrating = false;
    }

    fn schedule(&mut self, task: Task, delay: Duration) {
        debug!(?task, ?delay, generation = self.generation, "Scheduling");
        self.scheduled.push(Ticket::new(self.generation, task, delay));
    }
}

// ─────────────────────────────────────────────────────────────
//  Computer turns
// ─────────────────────────────────────────────────────────────

impl Session {
    /// Queues the computer's next action if the turn is its own.
    fn schedule_computer_turn(&mut self) {
        let Some(computer_seat) = self.computer.as_ref().map(|c| c.seat()) else {
            return;
        };
        let task = match self.game.phase() {
            Phase::Arranging(arrangement) if self.seat_of(arrangement.turn()) == computer_seat => {
                Task::ComputerArrange
            }
            Phase::AwaitingReveal if self.seat_of(self.game.end_to_move()) == computer_seat => {
                Task::ComputerReveal
            }
            _ => return,
        };
        self.schedule(task, self.options.think_delay);
    }

    fn computer_reveal(&mut self) {
        let Some(end) = self.computer.as_ref().map(|c| c.reveal_end()) else {
            return;
        };
        match self.game.reveal(end) {
            Ok(symbol) => {
                debug!(%symbol, "Computer revealed");
                self.schedule(Task::ComputerPlace, self.options.think_delay);
            }
            Err(rejection) => warn!(%rejection, "Computer reveal skipped"),
        }
    }

    fn computer_place(&mut self) {
        let (Some(computer), Some(symbol)) = (self.computer.as_ref(), self.game.pending()) else {
            debug!("Computer has nothing to place");
            return;
        };
        let Some(pos) = computer.choose_move(self.game.board(), symbol, &mut self.rng) else {
            warn!("Computer found no empty cell");
            return;
        };
        match self.game.place(pos.to_index()) {
            Ok(transition) => self.after_placement(transition),
            Err(rejection) => warn!(%rejection, "Computer placement skipped"),
        }
    }

    fn computer_arrange(&mut self) {
        match self.game.auto_arrange(&mut self.rng) {
            Ok(step) => {
                debug!(?step, "Computer arranged");
                self.schedule_computer_turn();
            }
            Err(rejection) => warn!(%rejection, "Computer arrangement skipped"),
        }
    }
}
