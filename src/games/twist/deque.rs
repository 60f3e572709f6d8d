//! Two-ended consumption of the hidden block sequence.

use super::action::Rejection;
use super::blocks::{BLOCK_COUNT, BlockSequence};
use super::{End, Symbol};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Hidden blocks plus the cursors bounding the unrevealed region.
///
/// The unrevealed region is `front..back_end`; `back_end` is one past the
/// back cursor so an exhausted deque needs no negative index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDeque {
    pub(super) sequence: BlockSequence,
    pub(super) front: usize,
    pub(super) back_end: usize,
    pub(super) revealed: Vec<usize>,
    pub(super) next_end: End,
}

impl BlockDeque {
    /// Fresh deque over a sequence; the front reveals first.
    pub fn new(sequence: BlockSequence) -> Self {
        Self {
            sequence,
            front: 0,
            back_end: BLOCK_COUNT,
            revealed: Vec::new(),
            next_end: End::Front,
        }
    }

    /// The hidden sequence.
    pub fn sequence(&self) -> &BlockSequence {
        &self.sequence
    }

    pub(super) fn sequence_mut(&mut self) -> &mut BlockSequence {
        &mut self.sequence
    }

    /// Next slot revealed from the front.
    pub fn front_index(&self) -> usize {
        self.front
    }

    /// Next slot revealed from the back, `None` once the back has met the
    /// front at slot 0.
    pub fn back_index(&self) -> Option<usize> {
        self.back_end.checked_sub(1)
    }

    /// One past the back cursor.
    pub fn back_end(&self) -> usize {
        self.back_end
    }

    /// Blocks still hidden.
    pub fn remaining(&self) -> usize {
        self.back_end.saturating_sub(self.front)
    }

    /// True when every block has been revealed.
    pub fn is_exhausted(&self) -> bool {
        self.front >= self.back_end
    }

    /// Indices revealed so far, in reveal order.
    pub fn revealed(&self) -> &[usize] {
        &self.revealed
    }

    /// The end whose turn it is to reveal.
    pub fn next_end(&self) -> End {
        self.next_end
    }

    /// Slot that a reveal from `end` would consume, after checking supply
    /// and side. Does not mutate.
    pub fn check(&self, end: End) -> Result<usize, Rejection> {
        if self.is_exhausted() {
            return Err(Rejection::Exhausted);
        }
        if end != self.next_end {
            return Err(Rejection::WrongSide(self.next_end));
        }
        Ok(match end {
            End::Front => self.front,
            End::Back => self.back_end - 1,
        })
    }

    /// Reveals the block at `end`, moving that cursor inward.
    #[instrument(skip(self), fields(front = self.front, back_end = self.back_end))]
    pub fn take(&mut self, end: End) -> Result<(usize, Symbol), Rejection> {
        let index = self.check(end)?;
        let symbol = self
            .sequence
            .get(index)
            .ok_or(Rejection::StillArranging)?;
        self.advance(end, index);
        debug!(index, %symbol, remaining = self.remaining(), "Block revealed");
        Ok((index, symbol))
    }

    /// Moves the cursor at `end` past `index` without reading the slot.
    ///
    /// Used when the symbol comes from the peer that revealed it.
    pub(super) fn advance(&mut self, end: End, index: usize) {
        match end {
            End::Front => self.front += 1,
            End::Back => self.back_end -= 1,
        }
        self.revealed.push(index);
    }

    /// Hands the reveal to the other end.
    pub(super) fn pass_turn(&mut self) {
        self.next_end = self.next_end.opposite();
    }
}
