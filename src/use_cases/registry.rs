// Registry of every live session; sessions are never torn down.

use crate::use_cases::session::{GameState, Session, SessionError, SessionLimits};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::info;

/// Shared configuration applied to newly created sessions.
#[derive(Debug, Clone)]
pub struct RegistrySettings {
    /// Board dimension used by `create-game`.
    pub default_board_length: usize,
    /// Chunk scale used by `create-game`.
    pub default_chunk_scale: f64,
    /// Caps on client-driven growth (seats, board length).
    pub limits: SessionLimits,
}

/// Process-wide, append-only list of sessions.
///
/// Join policy is "most recently created session with room":
/// `sessions_newest_first` exposes the scan order and the caller
/// attempts the join under each candidate's own lock, so the room
/// check and the seat assignment are one atomic step. Session teardown
/// is a future extension point; nothing here removes a session.
pub struct SessionRegistry {
    settings: RegistrySettings,
    sessions: RwLock<Vec<Arc<Session>>>,
}

impl SessionRegistry {
    /// Creates a new registry with the provided settings.
    pub fn new(settings: RegistrySettings) -> Self {
        Self {
            settings,
            sessions: RwLock::new(Vec::new()),
        }
    }

    /// Create a session with a fresh board and the creator seated at
    /// index 0.
    pub async fn create_session(
        &self,
        session_id: u64,
        seed: f64,
        creator_outbound: mpsc::Sender<String>,
    ) -> Result<Arc<Session>, SessionError> {
        let mut state = GameState::new(
            self.settings.default_board_length,
            self.settings.default_chunk_scale,
            seed,
            self.settings.limits,
        );
        state.join(creator_outbound)?;

        let session = Arc::new(Session {
            session_id,
            state: Mutex::new(state),
        });

        let mut sessions = self.sessions.write().await;
        sessions.push(session.clone());
        info!(session_id, total = sessions.len(), "session created");
        Ok(session)
    }

    /// Snapshot of all sessions in creation order.
    pub async fn sessions(&self) -> Vec<Arc<Session>> {
        self.sessions.read().await.clone()
    }

    /// Sessions newest-first, for the most-recent-with-room join scan.
    pub async fn sessions_newest_first(&self) -> Vec<Arc<Session>> {
        let sessions = self.sessions.read().await;
        sessions.iter().rev().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(RegistrySettings {
            default_board_length: 19,
            default_chunk_scale: 5.23,
            limits: SessionLimits::default(),
        })
    }

    fn sender() -> mpsc::Sender<String> {
        mpsc::channel(8).0
    }

    #[tokio::test]
    async fn create_session_seats_the_creator() {
        let registry = registry();
        let session = registry.create_session(1, 42.0, sender()).await.unwrap();
        let game = session.state.lock().await;
        assert_eq!(game.players.len(), 1);
        assert_eq!(game.players[0].index, 0);
        assert_eq!(game.board.size(), 19);
        assert_eq!(game.seed, 42.0);
    }

    #[tokio::test]
    async fn newest_first_order() {
        let registry = registry();
        registry.create_session(1, 1.0, sender()).await.unwrap();
        registry.create_session(2, 2.0, sender()).await.unwrap();
        registry.create_session(3, 3.0, sender()).await.unwrap();

        let newest_first: Vec<u64> = registry
            .sessions_newest_first()
            .await
            .iter()
            .map(|s| s.session_id)
            .collect();
        assert_eq!(newest_first, vec![3, 2, 1]);

        let creation_order: Vec<u64> = registry
            .sessions()
            .await
            .iter()
            .map(|s| s.session_id)
            .collect();
        assert_eq!(creation_order, vec![1, 2, 3]);
    }
}
