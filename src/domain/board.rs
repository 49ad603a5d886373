// Board grid and tile categories.

/// One terrain, structure, or unit-marker category a tile can hold.
///
/// The terrain generator only ever produces the eight terrain
/// categories (`Ocean` through `Volcano`); the remaining kinds exist so
/// boards can carry structures and markers without a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Grass,
    Forest,
    Plains,
    Mountain,
    Volcano,
    Water,
    Coast,
    Ocean,
    Swamp,
    Snow,
    SoldierBlue,
    SoldierRed,
    Lava,
    Port,
    Ship,
    Castle,
    Wood,
    Stone,
}

/// One board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub kind: TileKind,
    // Free-form player-toggled flag (claimed/marked); no other semantics.
    pub modified: bool,
}

/// Square grid of tiles, row-major: `(row, col)` both in `[0, size)`.
///
/// Every row has length `size`; the constructor is the only way to
/// build one, so the invariant holds for the life of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    tiles: Vec<Vec<Tile>>,
}

impl Board {
    pub fn new(tiles: Vec<Vec<Tile>>) -> Self {
        debug_assert!(tiles.iter().all(|row| row.len() == tiles.len()));
        Self { tiles }
    }

    pub fn size(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile(&self, row: usize, col: usize) -> Option<&Tile> {
        self.tiles.get(row).and_then(|r| r.get(col))
    }

    /// Flip the modified flag at `(row, col)` and return the new value,
    /// or `None` when the coordinates fall outside the board.
    pub fn toggle_modified(&mut self, row: usize, col: usize) -> Option<bool> {
        let tile = self.tiles.get_mut(row)?.get_mut(col)?;
        tile.modified = !tile.modified;
        Some(tile.modified)
    }

    /// Rows in row-major order.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.iter().map(Vec::as_slice)
    }
}
