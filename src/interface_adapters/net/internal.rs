use crate::interface_adapters::state::AppState;
use axum::{Json, extract::State};
use std::sync::Arc;

/// Summary of one live session for the operational listing.
#[derive(Debug, serde::Serialize)]
pub struct SessionSummary {
    pub session_id: u64,
    // Seats ever assigned, including disconnected players.
    pub players: usize,
    // Seats with a live connection.
    pub connected: usize,
    pub board_length: usize,
    pub turn: u32,
}

/// GET /sessions — operational view of the registry, in creation
/// order. Not part of the game protocol.
pub async fn list_sessions_handler(State(state): State<Arc<AppState>>) -> Json<Vec<SessionSummary>> {
    let sessions = state.registry.sessions().await;
    let mut summaries = Vec::with_capacity(sessions.len());
    for session in sessions {
        let game = session.state.lock().await;
        summaries.push(SessionSummary {
            session_id: session.session_id,
            players: game.players.len(),
            connected: game.players.iter().filter(|p| p.connected).count(),
            board_length: game.board.size(),
            turn: game.turn,
        });
    }
    Json(summaries)
}
