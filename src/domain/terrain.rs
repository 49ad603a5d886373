// Procedural terrain: noise sampling and the fixed classification ladder.

use crate::domain::board::{Board, Tile, TileKind};
use crate::domain::noise;

/// Classify a normalized noise value into a terrain kind.
///
/// Ordered half-open thresholds, lowest first. Clients key their
/// visible terrain ratios to this exact partition of noise space.
pub fn classify(value: f64) -> TileKind {
    if value < 0.25 {
        TileKind::Ocean
    } else if value < 0.40 {
        TileKind::Water
    } else if value < 0.45 {
        TileKind::Coast
    } else if value < 0.52 {
        TileKind::Plains
    } else if value < 0.62 {
        TileKind::Grass
    } else if value < 0.72 {
        TileKind::Forest
    } else if value < 0.80 {
        TileKind::Mountain
    } else {
        TileKind::Volcano
    }
}

/// Generate a `length x length` board of unmodified tiles.
///
/// Pure: identical `(length, chunk_scale, seed)` always produce an
/// identical board. `chunk_scale` must be finite and non-zero; callers
/// validate before invoking (a zero scale would divide by zero).
pub fn generate(length: usize, chunk_scale: f64, seed: f64) -> Board {
    let mut rows = Vec::with_capacity(length);
    for row in 0..length {
        let mut tiles = Vec::with_capacity(length);
        for col in 0..length {
            let value = noise::perlin(col as f64 / chunk_scale, row as f64 / chunk_scale, seed);
            tiles.push(Tile {
                kind: classify(value),
                modified: false,
            });
        }
        rows.push(tiles);
    }
    Board::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let first = generate(19, 5.23, 81346.5);
        let second = generate(19, 5.23, 81346.5);
        assert_eq!(first, second);
    }

    #[test]
    fn board_is_square() {
        let board = generate(19, 5.23, 7.0);
        assert_eq!(board.size(), 19);
        for row in board.rows() {
            assert_eq!(row.len(), 19);
        }
    }

    #[test]
    fn fresh_boards_are_unmodified() {
        let board = generate(8, 2.5, 42.0);
        for row in board.rows() {
            assert!(row.iter().all(|tile| !tile.modified));
        }
    }

    #[test]
    fn classification_is_total_and_monotonic() {
        // The ladder from ocean to volcano, in threshold order.
        let ladder = [
            TileKind::Ocean,
            TileKind::Water,
            TileKind::Coast,
            TileKind::Plains,
            TileKind::Grass,
            TileKind::Forest,
            TileKind::Mountain,
            TileKind::Volcano,
        ];
        let rank = |kind: TileKind| ladder.iter().position(|k| *k == kind).unwrap();

        let mut previous = 0;
        for step in 0..=1000 {
            let value = step as f64 / 1000.0;
            let current = rank(classify(value));
            assert!(current >= previous, "ladder went backwards at {value}");
            previous = current;
        }
        assert_eq!(previous, ladder.len() - 1);
    }

    #[test]
    fn threshold_boundaries() {
        assert_eq!(classify(0.0), TileKind::Ocean);
        assert_eq!(classify(0.25), TileKind::Water);
        assert_eq!(classify(0.40), TileKind::Coast);
        assert_eq!(classify(0.45), TileKind::Plains);
        assert_eq!(classify(0.52), TileKind::Grass);
        assert_eq!(classify(0.62), TileKind::Forest);
        assert_eq!(classify(0.72), TileKind::Mountain);
        assert_eq!(classify(0.80), TileKind::Volcano);
        assert_eq!(classify(1.0), TileKind::Volcano);
    }

    #[test]
    fn empty_board_is_allowed() {
        let board = generate(0, 5.23, 1.0);
        assert_eq!(board.size(), 0);
    }
}
