/// Entities: Player and Ghost, plus the direction vector they move by.
/// Positions are signed grid coordinates so projected targets may fall
/// outside the maze without wrapping.

use super::color::{self, Rgb};

/// Axis-aligned step vector with components in {-1, 0, 1}.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Direction {
    pub dx: i32,
    pub dy: i32,
}

impl Direction {
    pub const NONE: Direction = Direction { dx: 0, dy: 0 };
    pub const UP: Direction = Direction { dx: 0, dy: -1 };
    pub const DOWN: Direction = Direction { dx: 0, dy: 1 };
    pub const LEFT: Direction = Direction { dx: -1, dy: 0 };
    pub const RIGHT: Direction = Direction { dx: 1, dy: 0 };

    pub fn is_none(self) -> bool {
        self == Direction::NONE
    }

    pub fn reverse(self) -> Direction {
        Direction { dx: -self.dx, dy: -self.dy }
    }
}

/// Frame input snapshot handed to the tick.
/// `movement` is the most recent directional intent (last write wins).
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub movement: Option<Direction>,
    pub restart: bool,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    /// Queued turn, applied at the next cadence boundary if legal.
    pub next_direction: Direction,
    pub move_timer: u32,
}

impl Player {
    pub fn new(x: i32, y: i32) -> Self {
        Player {
            x, y,
            direction: Direction::NONE,
            next_direction: Direction::NONE,
            move_timer: 0,
        }
    }
}

/// Behaviour family, fixed by ghost identity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GhostKind {
    Chaser,    // 0: direct pursuit
    Ambusher,  // 1: aims ahead of the player
    Patroller, // 2: chases when close, wanders otherwise
    Shy,       // 3: chases from afar, flees when close
}

impl GhostKind {
    pub fn from_identity(id: usize) -> GhostKind {
        match id % 4 {
            0 => GhostKind::Chaser,
            1 => GhostKind::Ambusher,
            2 => GhostKind::Patroller,
            _ => GhostKind::Shy,
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            GhostKind::Chaser => color::GHOST_RED,
            GhostKind::Ambusher => color::GHOST_PINK,
            GhostKind::Patroller => color::GHOST_CYAN,
            GhostKind::Shy => color::GHOST_ORANGE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ghost {
    pub id: usize,
    pub kind: GhostKind,
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    pub move_timer: u32,
    pub spawn_x: i32,
    pub spawn_y: i32,
    pub spawn_direction: Direction,
}

impl Ghost {
    pub fn new(id: usize, x: i32, y: i32, direction: Direction) -> Self {
        Ghost {
            id,
            kind: GhostKind::from_identity(id),
            x, y,
            direction,
            move_timer: 0,
            spawn_x: x,
            spawn_y: y,
            spawn_direction: direction,
        }
    }

    pub fn color(&self) -> Rgb {
        self.kind.color()
    }

    /// Return to spawn cell, heading and timer.
    pub fn respawn(&mut self) {
        self.x = self.spawn_x;
        self.y = self.spawn_y;
        self.direction = self.spawn_direction;
        self.move_timer = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_directions() {
        assert_eq!(Direction::UP.reverse(), Direction::DOWN);
        assert_eq!(Direction::LEFT.reverse(), Direction::RIGHT);
        assert_eq!(Direction::NONE.reverse(), Direction::NONE);
    }

    #[test]
    fn identity_fixes_kind_and_color() {
        assert_eq!(GhostKind::from_identity(0), GhostKind::Chaser);
        assert_eq!(GhostKind::from_identity(3), GhostKind::Shy);
        let g = Ghost::new(1, 10, 9, Direction::LEFT);
        assert_eq!(g.color(), color::GHOST_PINK);
    }

    #[test]
    fn ghost_respawn_restores_heading() {
        let mut g = Ghost::new(2, 9, 10, Direction::DOWN);
        g.x = 4;
        g.y = 3;
        g.direction = Direction::LEFT;
        g.move_timer = 7;
        g.respawn();
        assert_eq!((g.x, g.y), (9, 10));
        assert_eq!(g.direction, Direction::DOWN);
        assert_eq!(g.move_timer, 0);
    }
}
