use std::{env, time::Duration};

// Runtime/server constants (not gameplay rules).

pub fn http_port() -> u16 {
    env::var("TERRITORY_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10000)
}

// Per-read idle timeout; a connection that stays silent longer is
// treated as failed.
pub fn idle_timeout() -> Duration {
    let secs = env::var("IDLE_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(600);
    Duration::from_secs(secs)
}

pub const OUTBOUND_CHANNEL_CAPACITY: usize = 64;

// Gameplay defaults: the board `create-game` builds. Clients assume
// these values until the first map frame arrives.
pub const DEFAULT_BOARD_LENGTH: usize = 19;
pub const DEFAULT_CHUNK_SCALE: f64 = 5.23;
// Map seeds are drawn uniformly from [0, SEED_SPAN).
pub const SEED_SPAN: f64 = 1e9;

// Guard rails for client-supplied regeneration parameters; 0 disables
// a cap.
pub const MAX_BOARD_LENGTH: usize = 256;
pub const MAX_PLAYERS_PER_SESSION: usize = 0;
