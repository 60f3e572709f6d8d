//! The TwistTacToe game record: hidden blocks, history and phase.
//!
//! Every operation validates first and mutates only on success, so a
//! returned [`Rejection`] always means the game is unchanged.

use super::action::Rejection;
use super::arrangement::{Arrangement, ArrangementStep};
use super::blocks::BlockSequence;
use super::deque::BlockDeque;
use super::invariants::{InvariantSet, TwistInvariants};
use super::phases::{Outcome, Phase, Transition};
use super::rules::{check_winner, is_draw};
use super::{Board, End, Position, Square, Symbol};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// How the hidden sequence is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Five X and five O, shuffled.
    Shuffled,
    /// Two anchors plus slots arranged by the players.
    Arranged,
}

/// One game of TwistTacToe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwistGame {
    pub(super) variant: Variant,
    pub(super) history: Vec<Board>,
    pub(super) step: usize,
    pub(super) deque: BlockDeque,
    pub(super) phase: Phase,
    pub(super) last_placed: Option<End>,
}

// ─────────────────────────────────────────────────────────────
//  Construction
// ─────────────────────────────────────────────────────────────

impl TwistGame {
    /// Starts a game of the given variant with a fresh hidden sequence.
    #[instrument(skip(rng))]
    pub fn new<R: Rng + ?Sized>(variant: Variant, rng: &mut R) -> Self {
        let game = match variant {
            Variant::Shuffled => Self::with_sequence(BlockSequence::shuffled(rng)),
            Variant::Arranged => Self::from_parts(
                Variant::Arranged,
                BlockSequence::arranged(rng),
                Phase::Arranging(Arrangement::new()),
            ),
        };
        info!(?variant, phase = game.phase.name(), "New game");
        game
    }

    /// Starts a shuffled-variant game over a known, complete sequence.
    pub fn with_sequence(sequence: BlockSequence) -> Self {
        Self::from_parts(Variant::Shuffled, sequence, Phase::AwaitingReveal)
    }

    /// Starts an arrangement with a fixed front anchor.
    pub fn arranged_with_anchor(front_anchor: Symbol) -> Self {
        Self::from_parts(
            Variant::Arranged,
            BlockSequence::anchored(front_anchor),
            Phase::Arranging(Arrangement::new()),
        )
    }

    fn from_parts(variant: Variant, sequence: BlockSequence, phase: Phase) -> Self {
        Self {
            variant,
            history: vec![Board::new()],
            step: 0,
            deque: BlockDeque::new(sequence),
            phase,
            last_placed: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Accessors
// ─────────────────────────────────────────────────────────────

impl TwistGame {
    /// How the sequence was produced.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The board of the viewed turn record.
    pub fn board(&self) -> &Board {
        &self.history[self.step]
    }

    /// Every turn record, starting with the empty board.
    pub fn history(&self) -> &[Board] {
        &self.history
    }

    /// Index of the viewed turn record.
    pub fn step(&self) -> usize {
        self.step
    }

    /// The hidden blocks and their cursors.
    pub fn deque(&self) -> &BlockDeque {
        &self.deque
    }

    /// The current phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The revealed symbol waiting to be placed.
    pub fn pending(&self) -> Option<Symbol> {
        self.phase.pending()
    }

    /// The outcome if the viewed record is terminal.
    pub fn outcome(&self) -> Option<Outcome> {
        self.phase.outcome()
    }

    /// Arrangement state while arranging.
    pub fn arrangement(&self) -> Option<&Arrangement> {
        match &self.phase {
            Phase::Arranging(arrangement) => Some(arrangement),
            _ => None,
        }
    }

    /// The end whose player made the latest placement.
    pub fn last_placed(&self) -> Option<End> {
        self.last_placed
    }

    /// The end whose turn it is to reveal and place.
    pub fn end_to_move(&self) -> End {
        self.deque.next_end()
    }
}

// ─────────────────────────────────────────────────────────────
//  Reveal
// ─────────────────────────────────────────────────────────────

impl TwistGame {
    /// Validates a reveal from `end` and returns the slot it would consume.
    pub fn check_reveal(&self, end: End) -> Result<usize, Rejection> {
        match self.phase {
            Phase::Arranging(_) => Err(Rejection::StillArranging),
            Phase::Finished { .. } => Err(Rejection::GameOver),
            Phase::AwaitingPlacement { .. } => Err(Rejection::AlreadyRevealed),
            Phase::AwaitingReveal => self.deque.check(end),
        }
    }

    /// Reveals the next block from `end`.
    #[instrument(skip(self), fields(step = self.step))]
    pub fn reveal(&mut self, end: End) -> Result<Symbol, Rejection> {
        self.check_reveal(end)?;
        let (index, symbol) = self.deque.take(end)?;
        self.phase = Phase::AwaitingPlacement { symbol };
        debug!(index, %symbol, "Reveal accepted");
        Ok(symbol)
    }

    /// Applies a reveal performed by the peer, trusting its symbol.
    ///
    /// The same checks as [`TwistGame::reveal`] apply; the slot index must
    /// match this side's cursor. If the peer's symbol differs from the local
    /// slot, the slot takes the peer's symbol and the displaced one moves to
    /// a hidden slot, so the sequence stays balanced.
    #[instrument(skip(self), fields(step = self.step))]
    pub fn accept_reveal(
        &mut self,
        end: End,
        index: usize,
        symbol: Symbol,
    ) -> Result<(), Rejection> {
        let expected = self.check_reveal(end)?;
        if expected != index {
            warn!(expected, index, "Peer revealed a different slot");
            return Err(Rejection::InvalidSnapshot(format!(
                "peer revealed slot {index}, expected {expected}"
            )));
        }
        let mut candidate = self.clone();
        if let Some(local) = self.deque.sequence().get(index).filter(|local| *local != symbol) {
            warn!(index, %symbol, %local, "Peer symbol differs from local sequence");
            let swap = (self.deque.front_index()..self.deque.back_end())
                .filter(|hidden| *hidden != index)
                .find(|hidden| self.deque.sequence().get(*hidden) == Some(symbol))
                .ok_or_else(|| {
                    Rejection::InvalidSnapshot(format!("no hidden {symbol} left for slot {index}"))
                })?;
            let sequence = candidate.deque.sequence_mut();
            sequence.fill(swap, local);
            sequence.fill(index, symbol);
        }
        candidate.deque.advance(end, index);
        candidate.phase = Phase::AwaitingPlacement { symbol };
        candidate.verify()?;
        *self = candidate;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Placement
// ─────────────────────────────────────────────────────────────

impl TwistGame {
    /// Validates a placement on `cell`.
    pub fn check_place(&self, cell: usize) -> Result<(Position, Symbol), Rejection> {
        match self.phase {
            Phase::Arranging(_) => return Err(Rejection::StillArranging),
            Phase::Finished { .. } => return Err(Rejection::GameOver),
            _ => {}
        }
        let pos = Position::from_index(cell).ok_or(Rejection::OutOfBounds(cell))?;
        if !self.board().is_empty(pos) {
            return Err(Rejection::SquareOccupied(pos));
        }
        let symbol = self.pending().ok_or(Rejection::NothingRevealed)?;
        Ok((pos, symbol))
    }

    /// Places the revealed symbol on `cell` and records a new turn.
    ///
    /// Any records after the viewed step are discarded first.
    #[instrument(skip(self), fields(step = self.step))]
    pub fn place(&mut self, cell: usize) -> Result<Transition, Rejection> {
        let (pos, symbol) = self.check_place(cell)?;

        let mut board = self.board().clone();
        board.set(pos, Square::Occupied(symbol));
        self.history.truncate(self.step + 1);
        self.history.push(board);
        self.step += 1;
        self.last_placed = Some(self.deque.next_end());
        self.deque.pass_turn();

        let transition = match Self::verdict(self.board(), self.deque.remaining()) {
            Some(outcome) => {
                info!(%outcome, step = self.step, "Game finished");
                self.phase = Phase::Finished {
                    outcome,
                    held: None,
                };
                Transition::Finished(outcome)
            }
            None => {
                self.phase = Phase::AwaitingReveal;
                Transition::Continue
            }
        };

        debug_assert!(
            TwistInvariants::check_all(self).is_ok(),
            "Invariants violated after placement"
        );
        debug!(%pos, %symbol, ?transition, "Placement accepted");
        Ok(transition)
    }

    fn verdict(board: &Board, remaining: usize) -> Option<Outcome> {
        if let Some(symbol) = check_winner(board) {
            Some(Outcome::Winner(symbol))
        } else if is_draw(board, remaining) {
            Some(Outcome::Draw)
        } else {
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Time travel
// ─────────────────────────────────────────────────────────────

impl TwistGame {
    /// Views an earlier (or later, if not yet discarded) turn record.
    ///
    /// The hidden blocks are not rewound. The phase is re-derived from the
    /// viewed board; a pending symbol survives the jump, held aside while a
    /// terminal record is viewed.
    #[instrument(skip(self), fields(from = self.step))]
    pub fn jump_to(&mut self, step: usize) -> Result<(), Rejection> {
        if matches!(self.phase, Phase::Arranging(_)) {
            return Err(Rejection::StillArranging);
        }
        if step >= self.history.len() {
            return Err(Rejection::StepOutOfRange(step));
        }
        let held = self.phase.held();
        self.step = step;
        self.phase = match (Self::verdict(self.board(), self.deque.remaining()), held) {
            (Some(outcome), held) => Phase::Finished { outcome, held },
            (None, Some(symbol)) => Phase::AwaitingPlacement { symbol },
            (None, None) => Phase::AwaitingReveal,
        };
        debug!(phase = self.phase.name(), "Jumped");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Arrangement
// ─────────────────────────────────────────────────────────────

impl TwistGame {
    fn arrangement_mut(&mut self) -> Result<&mut Arrangement, Rejection> {
        match &mut self.phase {
            Phase::Arranging(arrangement) => Ok(arrangement),
            _ => Err(Rejection::NotArranging),
        }
    }

    /// Stages a pool entry of the arranging player.
    pub fn select(&mut self, pool_index: usize) -> Result<Symbol, Rejection> {
        self.arrangement_mut()?.select(pool_index)
    }

    /// Commits the staged symbol into a hidden slot.
    #[instrument(skip(self))]
    pub fn commit(&mut self, block_index: usize) -> Result<ArrangementStep, Rejection> {
        let Phase::Arranging(arrangement) = &mut self.phase else {
            return Err(Rejection::NotArranging);
        };
        let step = arrangement.commit(self.deque.sequence_mut(), block_index)?;
        self.finish_arrangement_step(step);
        Ok(step)
    }

    /// Fills the arranging player's remaining slots at random.
    #[instrument(skip(self, rng))]
    pub fn auto_arrange<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<ArrangementStep, Rejection> {
        let Phase::Arranging(arrangement) = &mut self.phase else {
            return Err(Rejection::NotArranging);
        };
        let step = arrangement.auto_fill(self.deque.sequence_mut(), rng);
        self.finish_arrangement_step(step);
        Ok(step)
    }

    fn finish_arrangement_step(&mut self, step: ArrangementStep) {
        if step == ArrangementStep::Complete {
            info!("Arrangement complete, play begins");
            self.phase = Phase::AwaitingReveal;
        }
    }

    /// Adopts the arrangement broadcast by the peer.
    ///
    /// Anchors and already arranged slots must agree with this side, and the
    /// result must satisfy every invariant.
    #[instrument(skip(self, sequence, arrangement))]
    pub fn adopt_arrangement(
        &mut self,
        sequence: BlockSequence,
        arrangement: Option<Arrangement>,
    ) -> Result<(), Rejection> {
        self.arrangement_mut()?;
        let keeps_local = self
            .deque
            .sequence()
            .blocks()
            .iter()
            .zip(sequence.blocks())
            .all(|(local, remote)| local.is_none() || local == remote);
        if !keeps_local {
            return Err(Rejection::InvalidSnapshot(
                "arrangement overwrites filled blocks".to_string(),
            ));
        }

        let mut candidate = self.clone();
        *candidate.deque.sequence_mut() = sequence;
        candidate.phase = match arrangement {
            Some(arrangement) => Phase::Arranging(arrangement),
            None => Phase::AwaitingReveal,
        };
        candidate.verify()?;
        *self = candidate;
        Ok(())
    }

    /// Checks every invariant, as done before adopting state from the peer.
    pub fn verify(&self) -> Result<(), Rejection> {
        TwistInvariants::check_all(self).map_err(|violations| {
            Rejection::InvalidSnapshot(
                violations
                    .iter()
                    .map(|v| v.description.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })
    }
}
