/// Movement legality and level-completion rules.
///
/// Pure functions over an immutable grid view, without side effects.
/// These encode "what is legal" without performing the action.
///
/// ### Step (any entity, any direction)
/// ┌──────────────────────────┬────────┐
/// │ Condition                │ Allow? │
/// ├──────────────────────────┼────────┤
/// │ Target out of bounds     │ DENY   │
/// │ Target cell is Wall      │ DENY   │
/// │ Otherwise                │ ALLOW  │
/// └──────────────────────────┴────────┘
///
/// Only the target cell is examined. An entity standing on a wall cell
/// (two ghost spawns do) may still step out of it.

use super::cell::Cell;
use super::entity::Direction;

/// Immutable view of the maze for rule queries.
pub struct MapView<'a> {
    pub cells: &'a [Vec<Cell>],
    pub width: usize,
    pub height: usize,
}

impl<'a> MapView<'a> {
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn cell_at(&self, x: i32, y: i32) -> Cell {
        if !self.in_bounds(x, y) {
            return Cell::Wall; // out of bounds = wall
        }
        self.cells[y as usize][x as usize]
    }

    pub fn pellets_remaining(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_pellet()).count()
    }
}

/// Can an entity at (x, y) step one cell along `dir`?
pub fn legal_move(map: &MapView, x: i32, y: i32, dir: Direction) -> bool {
    let (nx, ny) = (x + dir.dx, y + dir.dy);
    map.in_bounds(nx, ny) && map.cell_at(nx, ny).is_passable()
}

/// True once no cell holds a pellet.
pub fn check_level_complete(map: &MapView) -> bool {
    !map.cells.iter().flatten().any(|c| c.is_pellet())
}

#[inline]
pub fn manhattan(ax: i32, ay: i32, bx: i32, by: i32) -> i32 {
    (ax - bx).abs() + (ay - by).abs()
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
