// Domain layer: board, terrain, and unit types.

pub mod board;
pub mod noise;
pub mod pieces;
pub mod terrain;

pub use board::{Board, Tile, TileKind};
pub use pieces::Troop;
