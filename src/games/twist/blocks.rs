//! The hidden block sequence and its generators.

use super::Symbol;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Number of hidden blocks in a game.
pub const BLOCK_COUNT: usize = 10;

/// How many of each symbol a complete sequence holds.
pub const PER_SYMBOL: usize = BLOCK_COUNT / 2;

/// Slot of the system-assigned anchor on the front half.
pub const FRONT_ANCHOR: usize = 0;

/// Slot of the system-assigned anchor on the back half.
pub const BACK_ANCHOR: usize = 5;

/// Ten hidden slots, revealed from either end.
///
/// Slots are only `None` while an arrangement is being filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSequence {
    blocks: [Option<Symbol>; BLOCK_COUNT],
}

impl BlockSequence {
    /// Five X and five O in a uniformly random order.
    ///
    /// A single Fisher-Yates pass is uniform over all orderings, so neither
    /// symbol is favoured at any slot.
    #[instrument(skip(rng))]
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut symbols = [Symbol::X; BLOCK_COUNT];
        for slot in symbols.iter_mut().skip(PER_SYMBOL) {
            *slot = Symbol::O;
        }
        symbols.shuffle(rng);
        debug!(?symbols, "Shuffled hidden blocks");
        Self {
            blocks: symbols.map(Some),
        }
    }

    /// Builds a complete sequence from explicit symbols.
    ///
    /// Returns `None` unless the symbols are five X and five O.
    pub fn from_symbols(symbols: [Symbol; BLOCK_COUNT]) -> Option<Self> {
        let sequence = Self {
            blocks: symbols.map(Some),
        };
        sequence.is_balanced().then_some(sequence)
    }

    /// Arrangement start: a coin flip picks the front anchor.
    #[instrument(skip(rng))]
    pub fn arranged<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let anchor = if rng.gen_bool(0.5) {
            Symbol::X
        } else {
            Symbol::O
        };
        Self::anchored(anchor)
    }

    /// Arrangement start with a fixed front anchor; the back anchor is its
    /// complement and every other slot is empty.
    pub fn anchored(front_anchor: Symbol) -> Self {
        let mut blocks = [None; BLOCK_COUNT];
        blocks[FRONT_ANCHOR] = Some(front_anchor);
        blocks[BACK_ANCHOR] = Some(front_anchor.complement());
        Self { blocks }
    }

    /// Symbol at the slot, if filled.
    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.blocks.get(index).copied().flatten()
    }

    /// All slots.
    pub fn blocks(&self) -> &[Option<Symbol>; BLOCK_COUNT] {
        &self.blocks
    }

    /// Fills an arrangement slot.
    pub(super) fn fill(&mut self, index: usize, symbol: Symbol) {
        self.blocks[index] = Some(symbol);
    }

    /// Number of slots holding `symbol`.
    pub fn count(&self, symbol: Symbol) -> usize {
        self.blocks.iter().filter(|b| **b == Some(symbol)).count()
    }

    /// True when no slot is empty.
    pub fn is_complete(&self) -> bool {
        self.blocks.iter().all(Option::is_some)
    }

    /// True when the sequence is complete with five of each symbol.
    pub fn is_balanced(&self) -> bool {
        self.is_complete()
            && self.count(Symbol::X) == PER_SYMBOL
            && self.count(Symbol::O) == PER_SYMBOL
    }

    /// True when both anchors are filled with different symbols.
    pub fn anchors_differ(&self) -> bool {
        match (self.get(FRONT_ANCHOR), self.get(BACK_ANCHOR)) {
            (Some(front), Some(back)) => front != back,
            _ => false,
        }
    }
}
