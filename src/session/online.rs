//! Online synchronization: applying peer messages and connection changes.
//!
//! Remote intents go through the same game checks as local ones, with turn
//! ownership seen from the peer's seat.

use super::{Mode, Notice, Role, Session};
use crate::games::twist::{End, Rejection, Seat};
use crate::net::{ConnectionStatus, PeerMessage, RevealDelta, Snapshot};
use tracing::{debug, info, instrument, warn};

/// Identity and counters of an online room.
#[derive(Debug, Clone)]
pub(super) struct OnlineState {
    pub(super) role: Role,
    pub(super) room_code: String,
    pub(super) status: ConnectionStatus,
    pub(super) host_wins: u32,
    pub(super) guest_wins: u32,
}

impl OnlineState {
    pub(super) fn new(role: Role, room_code: String) -> Self {
        Self {
            role,
            room_code,
            status: ConnectionStatus::Waiting,
            host_wins: 0,
            guest_wins: 0,
        }
    }

    /// Counts a win for whoever sits in `seat`.
    pub(super) fn credit(&mut self, seat: Seat) -> Role {
        if seat == Role::Host.seat() {
            self.host_wins += 1;
            Role::Host
        } else {
            self.guest_wins += 1;
            Role::Guest
        }
    }
}

impl Session {
    /// Room code, online only.
    pub fn room_code(&self) -> Option<&str> {
        self.online.as_ref().map(|online| online.room_code.as_str())
    }

    /// Current link state, online only.
    pub fn connection(&self) -> Option<&ConnectionStatus> {
        self.online.as_ref().map(|online| &online.status)
    }

    /// Full state as shared with the peer.
    pub fn snapshot(&self) -> Snapshot {
        let (host_wins, guest_wins) = self
            .online
            .as_ref()
            .map_or((0, 0), |online| (online.host_wins, online.guest_wins));
        Snapshot::new(self.game.clone(), self.front_seat, host_wins, guest_wins)
    }

    /// Applies a message from the peer.
    ///
    /// A rejected message leaves the session unchanged and is logged.
    #[instrument(skip(self, message), fields(kind = message.kind()))]
    pub fn on_message(&mut self, message: PeerMessage) -> Result<(), Rejection> {
        if self.mode != Mode::Online {
            warn!("Peer message outside an online session");
            return Err(Rejection::NotOnline);
        }
        self.apply_message(message)
            .inspect_err(|rejection| warn!(%rejection, "Dropped peer message"))
    }

    fn apply_message(&mut self, message: PeerMessage) -> Result<(), Rejection> {
        match message {
            PeerMessage::RequestState => {
                self.broadcast(PeerMessage::GameState(self.snapshot()));
                Ok(())
            }
            PeerMessage::GameState(snapshot) => self.adopt_snapshot(snapshot),
            PeerMessage::GameRestart(snapshot) => {
                if self.role() == Some(Role::Host) {
                    return Err(Rejection::NotHost);
                }
                self.adopt_snapshot(snapshot)
            }
            PeerMessage::BlockReveal(delta) => self.remote_reveal(delta),
            PeerMessage::SquareClick { index } => {
                self.game.check_place(index)?;
                self.check_remote_turn(self.game.end_to_move())?;
                let transition = self.game.place(index)?;
                self.after_placement(transition);
                Ok(())
            }
            PeerMessage::BlockArrangement {
                sequence,
                arrangement,
            } => {
                let end = self.arranging_end()?;
                self.check_remote_turn(end)?;
                self.game.adopt_arrangement(sequence, arrangement)?;
                debug!(phase = self.game.phase().name(), "Adopted arrangement");
                Ok(())
            }
            PeerMessage::WinCount {
                host_wins,
                guest_wins,
            } => {
                let Some(online) = self.online.as_mut() else {
                    return Ok(());
                };
                if online.role == Role::Host {
                    return Err(Rejection::NotHost);
                }
                online.host_wins = host_wins;
                online.guest_wins = guest_wins;
                Ok(())
            }
        }
    }

    fn remote_reveal(&mut self, delta: RevealDelta) -> Result<(), Rejection> {
        let end = *delta.end();
        self.game.check_reveal(end)?;
        self.check_remote_turn(end)?;
        self.game.accept_reveal(end, *delta.index(), *delta.symbol())?;
        let deque = self.game.deque();
        if deque.front_index() != *delta.front_index()
            || deque.back_end() != *delta.back_end()
            || deque.revealed() != delta.revealed().as_slice()
        {
            warn!(
                front = deque.front_index(),
                back_end = deque.back_end(),
                "Cursors differ from peer after reveal"
            );
        }
        Ok(())
    }

    /// Checks that the peer may act for `end`.
    fn check_remote_turn(&self, end: End) -> Result<(), Rejection> {
        match &self.online {
            Some(online) if self.seat_of(end) == online.role.seat() => Err(Rejection::NotYourTurn),
            _ => Ok(()),
        }
    }

    fn adopt_snapshot(&mut self, snapshot: Snapshot) -> Result<(), Rejection> {
        snapshot.game().verify()?;
        self.game = snapshot.game().clone();
        self.front_seat = *snapshot.front_seat();
        if let Some(online) = self.online.as_mut() {
            online.host_wins = *snapshot.host_wins();
            online.guest_wins = *snapshot.guest_wins();
        }
        self.bump_generation();
        info!(
            generation = self.generation,
            step = self.game.step(),
            phase = self.game.phase().name(),
            "Adopted peer snapshot"
        );
        Ok(())
    }

    /// Records a link state change.
    #[instrument(skip(self))]
    pub fn on_connection(&mut self, status: ConnectionStatus) {
        let Some(online) = self.online.as_mut() else {
            warn!("Connection status outside an online session");
            return;
        };
        info!(role = %online.role, "Connection changed");
        online.status = status.clone();
        let role = online.role;
        match status {
            ConnectionStatus::Connected => {
                if role == Role::Guest {
                    self.broadcast(PeerMessage::RequestState);
                }
            }
            ConnectionStatus::Waiting => {}
            ConnectionStatus::Reconnecting { attempt } => self.notices.push(Notice::Connection(
                format!("Connection lost. Reconnecting (attempt {})...", attempt),
            )),
            ConnectionStatus::Disconnected => self
                .notices
                .push(Notice::Connection("Opponent disconnected".to_string())),
            ConnectionStatus::Failed { reason } => self
                .notices
                .push(Notice::Connection(format!("Connection failed: {}", reason))),
        }
    }

    /// Sends to the peer, if there is one. Failures are logged only.
    pub(super) fn broadcast(&mut self, message: PeerMessage) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        if let Err(e) = transport.send(&message) {
            warn!(kind = message.kind(), error = %e, "Broadcast failed");
        }
    }
}
