//! Delayed work handed to the driver.
//!
//! The session never sleeps. It emits [`Ticket`]s; the driver waits out
//! each delay and hands the ticket back through `Session::fire`. A ticket
//! from an older game generation is dropped on arrival.

use std::time::Duration;

/// Work the session wants done later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// The computer reveals from its end.
    ComputerReveal,
    /// The computer places its revealed symbol.
    ComputerPlace,
    /// The computer fills its arrangement slots.
    ComputerArrange,
    /// The win celebration is over.
    EndCelebration,
}

/// A task tagged with the game generation that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    task: Task,
    delay: Duration,
}

impl Ticket {
    pub(super) fn new(generation: u64, task: Task, delay: Duration) -> Self {
        Self {
            generation,
            task,
            delay,
        }
    }

    /// Generation of the game this ticket belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The scheduled work.
    pub fn task(&self) -> Task {
        self.task
    }

    /// How long the driver waits before firing.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}
