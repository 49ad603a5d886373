// One game's mutable state and the only operations allowed to touch it.

use crate::domain::terrain;
use crate::domain::{Board, Troop};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

/// Errors returned by session operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// A seat cap is configured and every seat is taken.
    SessionFull,
    /// The acting seat does not exist in this session.
    UnknownPlayer,
    /// Troop ordinal outside the owner's troop list.
    TroopIndexOutOfRange,
    /// Tile coordinates outside the current board.
    TileOutOfBounds,
    /// Requested board length above the configured maximum.
    BoardTooLarge,
    /// Chunk scale missing, zero, negative, or not finite.
    InvalidChunkScale,
}

impl SessionError {
    /// One-line explanation sent to the offending connection.
    pub fn message(&self) -> &'static str {
        match self {
            SessionError::SessionFull => "game is full",
            SessionError::UnknownPlayer => "unknown player",
            SessionError::TroopIndexOutOfRange => "troop index out of range",
            SessionError::TileOutOfBounds => "tile coordinates out of bounds",
            SessionError::BoardTooLarge => "board length too large",
            SessionError::InvalidChunkScale => "chunk scale must be a positive number",
        }
    }
}

/// Caps applied to client-driven growth; 0 disables a cap.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionLimits {
    pub max_players: usize,
    pub max_board_length: usize,
}

/// One seat in a session.
pub struct Player {
    /// 0-based seat number, assigned at join and never reused.
    pub index: usize,
    /// False once the seat's connection read loop has exited. State is
    /// retained on disconnect so a reconnect path can be added later.
    pub connected: bool,
    /// Sender half of the connection's outbound frame channel.
    pub outbound: mpsc::Sender<String>,
    pub troops: Vec<Troop>,
    pub wood: i32,
    pub stone: i32,
}

/// Mutable state of one game.
///
/// Fields are readable by the codec for frame composition; all mutation
/// goes through the methods below, always under the owning session's
/// lock.
pub struct GameState {
    pub board: Board,
    pub seed: f64,
    pub chunk_scale: f64,
    pub players: Vec<Player>,
    /// Whose move it is. Tracked for clients; no command arbitrates it.
    pub turn: u32,
    limits: SessionLimits,
}

impl GameState {
    /// Build a fresh game with a generated board and no players seated.
    pub fn new(length: usize, chunk_scale: f64, seed: f64, limits: SessionLimits) -> Self {
        Self {
            board: terrain::generate(length, chunk_scale, seed),
            seed,
            chunk_scale,
            players: Vec::new(),
            turn: 0,
            limits,
        }
    }

    /// Seat a new player and return the assigned index.
    pub fn join(&mut self, outbound: mpsc::Sender<String>) -> Result<usize, SessionError> {
        if self.limits.max_players != 0 && self.players.len() >= self.limits.max_players {
            return Err(SessionError::SessionFull);
        }
        let index = self.players.len();
        self.players.push(Player {
            index,
            connected: true,
            outbound,
            troops: Vec::new(),
            wood: 0,
            stone: 0,
        });
        info!(seat = index, "player joined session");
        Ok(index)
    }

    /// The single regeneration primitive: validates the parameters and
    /// replaces the board wholesale. `seed: None` keeps the current
    /// seed; tile modifications do not survive regeneration.
    pub fn regenerate(
        &mut self,
        length: usize,
        chunk_scale: f64,
        seed: Option<f64>,
    ) -> Result<(), SessionError> {
        if !chunk_scale.is_finite() || chunk_scale <= 0.0 {
            return Err(SessionError::InvalidChunkScale);
        }
        if self.limits.max_board_length != 0 && length > self.limits.max_board_length {
            return Err(SessionError::BoardTooLarge);
        }
        if let Some(seed) = seed {
            self.seed = seed;
        }
        self.chunk_scale = chunk_scale;
        self.board = terrain::generate(length, chunk_scale, self.seed);
        debug!(length, chunk_scale, "board regenerated");
        Ok(())
    }

    /// Append a troop for the given seat. Positions are not checked
    /// against the board; off-board placement is allowed.
    pub fn add_troop(&mut self, seat: usize, x: i32, y: i32) -> Result<(), SessionError> {
        let player = self
            .players
            .get_mut(seat)
            .ok_or(SessionError::UnknownPlayer)?;
        player.troops.push(Troop {
            x,
            y,
            on_ship: false,
        });
        Ok(())
    }

    /// Overwrite the position of the troop at `troop_index` in the
    /// seat's troop list.
    pub fn move_troop(
        &mut self,
        seat: usize,
        troop_index: usize,
        x: i32,
        y: i32,
    ) -> Result<(), SessionError> {
        let player = self
            .players
            .get_mut(seat)
            .ok_or(SessionError::UnknownPlayer)?;
        let troop = player
            .troops
            .get_mut(troop_index)
            .ok_or(SessionError::TroopIndexOutOfRange)?;
        troop.x = x;
        troop.y = y;
        Ok(())
    }

    /// Flip the modified flag at `(row = y, col = x)`.
    pub fn toggle_tile(&mut self, x: i32, y: i32) -> Result<(), SessionError> {
        if x < 0 || y < 0 {
            return Err(SessionError::TileOutOfBounds);
        }
        self.board
            .toggle_modified(y as usize, x as usize)
            .ok_or(SessionError::TileOutOfBounds)?;
        Ok(())
    }

    /// Record that the seat's connection is gone. Troops and resources
    /// are retained, not purged.
    pub fn mark_disconnected(&mut self, seat: usize) {
        if let Some(player) = self.players.get_mut(seat) {
            player.connected = false;
            info!(seat, "player marked disconnected");
        }
    }

    /// Deliver an already-rendered frame to every connected player
    /// except `skip_seat`. Sends never block: a full or closed peer
    /// channel is logged and skipped, so one slow client cannot stall
    /// the mutation that triggered the broadcast, and a failed delivery
    /// to one peer does not abort delivery to the others.
    pub fn broadcast(&self, skip_seat: usize, frame: &str) {
        for player in &self.players {
            if player.index == skip_seat || !player.connected {
                continue;
            }
            match player.outbound.try_send(frame.to_string()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(seat = player.index, "outbound channel full; dropping broadcast");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(seat = player.index, "outbound channel closed; dropping broadcast");
                }
            }
        }
    }
}

/// One independent game in progress.
///
/// The mutex is the per-session exclusive-access discipline: every
/// mutation and every broadcast composition happens inside a single
/// critical section, so emitted frames always reflect one consistent
/// post-mutation snapshot. Different sessions hold different mutexes
/// and never contend.
pub struct Session {
    pub session_id: u64,
    pub state: Mutex<GameState>,
}
