/// Maze cell types and their properties.
/// Properties are queried via methods so cell semantics live in one place.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Cell {
    Wall,
    Pellet,
    #[default]
    Empty,
}

impl Cell {
    /// Layout code used by the baked maze: 1 = wall, 0 = pellet, 2 = empty.
    pub fn from_code(code: u8) -> Cell {
        match code {
            1 => Cell::Wall,
            0 => Cell::Pellet,
            _ => Cell::Empty,
        }
    }

    /// Can an entity occupy this cell?
    pub fn is_passable(self) -> bool {
        !matches!(self, Cell::Wall)
    }

    pub fn is_pellet(self) -> bool {
        matches!(self, Cell::Pellet)
    }
}
