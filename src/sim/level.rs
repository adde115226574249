/// The baked maze and spawn table.
///
/// A single fixed 20×20 layout. Codes: 1 = wall, 0 = pellet, 2 = empty.
/// Row 9 opens onto both edges but there is no wrap-around; the edge
/// cells are simply the end of the corridor.
///
/// Two ghost spawns, (9,10) and (10,10), sit on wall cells. They are kept
/// as-is: legality only checks the destination, so those ghosts walk out.

use crate::domain::cell::Cell;
use crate::domain::entity::{Direction, Ghost, Player};

pub const MAZE_WIDTH: usize = 20;
pub const MAZE_HEIGHT: usize = 20;

pub const PLAYER_SPAWN: (i32, i32) = (1, 1);

/// (x, y, initial heading) per ghost identity.
pub const GHOST_SPAWNS: [(i32, i32, Direction); 4] = [
    (9, 9, Direction::RIGHT),
    (10, 9, Direction::LEFT),
    (9, 10, Direction::DOWN),
    (10, 10, Direction::UP),
];

const LAYOUT: [[u8; MAZE_WIDTH]; MAZE_HEIGHT] = [
    [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
    [1,0,0,0,0,0,0,0,0,1,1,0,0,0,0,0,0,0,0,1],
    [1,0,1,1,0,1,1,1,0,1,1,0,1,1,1,0,1,1,0,1],
    [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,0,1,1,0,1,0,1,1,1,1,1,1,0,1,0,1,1,0,1],
    [1,0,0,0,0,1,0,0,0,1,1,0,0,0,1,0,0,0,0,1],
    [1,1,1,1,0,1,1,1,2,1,1,2,1,1,1,0,1,1,1,1],
    [1,1,1,1,0,1,2,2,2,2,2,2,2,2,1,0,1,1,1,1],
    [1,1,1,1,0,1,2,1,1,2,2,1,1,2,1,0,1,1,1,1],
    [2,2,2,2,0,2,2,1,2,2,2,2,1,2,2,0,2,2,2,2],
    [1,1,1,1,0,1,2,1,1,1,1,1,1,2,1,0,1,1,1,1],
    [1,1,1,1,0,1,2,2,2,2,2,2,2,2,1,0,1,1,1,1],
    [1,1,1,1,0,1,1,1,2,1,1,2,1,1,1,0,1,1,1,1],
    [1,0,0,0,0,0,0,0,0,1,1,0,0,0,0,0,0,0,0,1],
    [1,0,1,1,0,1,1,1,0,1,1,0,1,1,1,0,1,1,0,1],
    [1,0,0,1,0,0,0,0,0,0,0,0,0,0,0,0,1,0,0,1],
    [1,1,0,1,0,1,0,1,1,1,1,1,1,0,1,0,1,0,1,1],
    [1,0,0,0,0,1,0,0,0,1,1,0,0,0,1,0,0,0,0,1],
    [1,0,1,1,1,1,1,1,0,1,1,0,1,1,1,1,1,1,0,1],
    [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
];

/// Fresh copy of the maze with every pellet in place.
pub fn maze_grid() -> Vec<Vec<Cell>> {
    LAYOUT
        .iter()
        .map(|row| row.iter().map(|&code| Cell::from_code(code)).collect())
        .collect()
}

pub fn spawn_player() -> Player {
    Player::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1)
}

pub fn spawn_ghosts() -> Vec<Ghost> {
    GHOST_SPAWNS
        .iter()
        .enumerate()
        .map(|(id, &(x, y, dir))| Ghost::new(id, x, y, dir))
        .collect()
}
