//! Arrangement protocol: players fill each other's hidden blocks.
//!
//! Player 1 (front) places its pool into the back half (slots 6-9), then
//! player 2 (back) places its pool into the front half (slots 1-4). The
//! anchors at 0 and 5 are never arranged.

use super::action::Rejection;
use super::blocks::BlockSequence;
use super::{End, Symbol};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Entries in each player's pool.
pub const POOL_SIZE: usize = 4;

const FRONT_TARGETS: [usize; POOL_SIZE] = [6, 7, 8, 9];
const BACK_TARGETS: [usize; POOL_SIZE] = [1, 2, 3, 4];

/// One player's arrangement pool; `None` marks a consumed entry.
pub type Pool = [Option<Symbol>; POOL_SIZE];

/// Progress made by a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrangementStep {
    /// The same player keeps arranging.
    Continue,
    /// The acting pool is empty; the other end arranges now.
    TurnPassed(End),
    /// Both pools are empty; play begins.
    Complete,
}

/// Arrangement in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrangement {
    turn: End,
    front_pool: Pool,
    back_pool: Pool,
    pub(super) staged: Option<usize>,
}

impl Arrangement {
    /// Player 1 arranges first; each pool holds two X and two O.
    pub fn new() -> Self {
        let pool = [Some(Symbol::X), Some(Symbol::X), Some(Symbol::O), Some(Symbol::O)];
        Self {
            turn: End::Front,
            front_pool: pool,
            back_pool: pool,
            staged: None,
        }
    }

    /// The end whose pool is being placed.
    pub fn turn(&self) -> End {
        self.turn
    }

    /// Pool owned by the player revealing from `end`.
    pub fn pool(&self, end: End) -> &Pool {
        match end {
            End::Front => &self.front_pool,
            End::Back => &self.back_pool,
        }
    }

    fn pool_mut(&mut self, end: End) -> &mut Pool {
        match end {
            End::Front => &mut self.front_pool,
            End::Back => &mut self.back_pool,
        }
    }

    /// Pool index currently staged for placement.
    pub fn staged(&self) -> Option<usize> {
        self.staged
    }

    /// Slots the player at `end` arranges: always on the opponent's half.
    pub fn target_slots(end: End) -> [usize; POOL_SIZE] {
        match end {
            End::Front => FRONT_TARGETS,
            End::Back => BACK_TARGETS,
        }
    }

    /// Stages an unconsumed entry of the arranging player's pool.
    #[instrument(skip(self), fields(turn = %self.turn))]
    pub fn select(&mut self, pool_index: usize) -> Result<Symbol, Rejection> {
        let symbol = self
            .pool(self.turn)
            .get(pool_index)
            .copied()
            .flatten()
            .ok_or(Rejection::PoolEntryUnavailable(pool_index))?;
        self.staged = Some(pool_index);
        debug!(pool_index, %symbol, "Pool entry staged");
        Ok(symbol)
    }

    /// Writes the staged symbol into an empty target slot.
    #[instrument(skip(self, sequence), fields(turn = %self.turn))]
    pub(super) fn commit(
        &mut self,
        sequence: &mut BlockSequence,
        block_index: usize,
    ) -> Result<ArrangementStep, Rejection> {
        let pool_index = self.staged.ok_or(Rejection::NothingStaged)?;
        if !Self::target_slots(self.turn).contains(&block_index) {
            return Err(Rejection::InvalidSlot(block_index));
        }
        if sequence.get(block_index).is_some() {
            return Err(Rejection::SlotFilled(block_index));
        }
        let turn = self.turn;
        let symbol = self
            .pool_mut(turn)
            .get_mut(pool_index)
            .and_then(Option::take)
            .ok_or(Rejection::PoolEntryUnavailable(pool_index))?;
        sequence.fill(block_index, symbol);
        self.staged = None;
        debug!(block_index, %symbol, "Block arranged");
        Ok(self.advance())
    }

    /// Fills every empty target slot of the arranging player with a uniform
    /// random permutation of what is left in its pool.
    #[instrument(skip(self, sequence, rng), fields(turn = %self.turn))]
    pub(super) fn auto_fill<R: Rng + ?Sized>(
        &mut self,
        sequence: &mut BlockSequence,
        rng: &mut R,
    ) -> ArrangementStep {
        let turn = self.turn;
        let mut symbols: Vec<Symbol> = self
            .pool_mut(turn)
            .iter_mut()
            .filter_map(Option::take)
            .collect();
        symbols.shuffle(rng);
        let empty: Vec<usize> = Self::target_slots(turn)
            .into_iter()
            .filter(|index| sequence.get(*index).is_none())
            .collect();
        for (index, symbol) in empty.into_iter().zip(symbols) {
            sequence.fill(index, symbol);
        }
        self.staged = None;
        debug!("Pool auto-filled");
        self.advance()
    }

    fn advance(&mut self) -> ArrangementStep {
        if self.pool(self.turn).iter().any(Option::is_some) {
            return ArrangementStep::Continue;
        }
        match self.turn {
            End::Front => {
                self.turn = End::Back;
                ArrangementStep::TurnPassed(End::Back)
            }
            End::Back => ArrangementStep::Complete,
        }
    }
}

impl Default for Arrangement {
    fn default() -> Self {
        Self::new()
    }
}
