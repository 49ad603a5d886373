// Mobile units owned by players.

/// One mobile unit belonging to exactly one player.
///
/// A troop has no stable identifier: it is addressed by its ordinal in
/// the owner's troop list, and no operation removes troops, so ordinals
/// never shift. Coordinates are not constrained to the board; clients
/// use off-board positions for staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Troop {
    pub x: i32,
    pub y: i32,
    pub on_ship: bool,
}
