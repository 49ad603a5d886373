// Use cases layer: session state and the session registry.

pub mod registry;
pub mod session;

pub use registry::{RegistrySettings, SessionRegistry};
pub use session::{GameState, Player, Session, SessionError, SessionLimits};
