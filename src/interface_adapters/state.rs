use crate::use_cases::SessionRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    // Process-wide session registry shared by every connection.
    pub registry: Arc<SessionRegistry>,
}
