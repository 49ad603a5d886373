// Network adapter modules split by player sockets vs internal HTTP routes.

pub mod client;
pub mod internal;

pub use client::ws_handler;
pub use internal::list_sessions_handler;
