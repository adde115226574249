/// WorldState: the complete gameplay state of a running session.
///
/// ## Grid
///
/// `cells` is the live maze. The only runtime mutation is Pellet → Empty
/// via `set_cell()`; `reset_round_state` restores the full layout.
///
/// ## Timers
///
/// All timers count ticks, never wall-clock time:
///   - `player.move_timer` / `ghost.move_timer`: cadence counters
///   - `message_timer`: 0 means the message stays until replaced
///   - `celebration_timer`: new-high-score banner countdown

use crate::config::SpeedConfig;
use crate::domain::cell::Cell;
use crate::domain::entity::{Direction, Ghost, Player};
use crate::domain::rules::MapView;

use super::level;

pub const START_LIVES: u32 = 3;
pub const PELLET_SCORE: u32 = 10;
pub const CELEBRATION_TICKS: u32 = 180;

pub const START_PROMPT: &str = "Use arrow keys or WASD to move! Press any movement key to start";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Start,
    Playing,
    GameOver,
    LevelComplete,
}

impl Phase {
    /// Round is over and waiting for the restart signal.
    pub fn is_finished(self) -> bool {
        matches!(self, Phase::GameOver | Phase::LevelComplete)
    }
}

pub struct WorldState {
    // ── Grid ──
    pub cells: Vec<Vec<Cell>>,
    pub width: usize,
    pub height: usize,

    // ── Entities ──
    pub player: Player,
    pub ghosts: Vec<Ghost>,

    // ── Speed config ──
    pub speed: SpeedConfig,

    // ── Meta ──
    pub phase: Phase,
    pub score: u32,
    pub lives: u32,
    pub tick: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    pub celebration_timer: u32,
}

// ── Grid query / mutation API ──

impl WorldState {
    pub fn map(&self) -> MapView<'_> {
        MapView { cells: &self.cells, width: self.width, height: self.height }
    }

    #[inline]
    pub fn cell_at(&self, x: i32, y: i32) -> Cell {
        self.map().cell_at(x, y)
    }

    #[inline]
    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        if self.map().in_bounds(x, y) {
            self.cells[y as usize][x as usize] = cell;
        }
    }
}

// ── Construction ──

impl WorldState {
    pub fn new(speed: SpeedConfig) -> Self {
        let cells = level::maze_grid();
        WorldState {
            width: level::MAZE_WIDTH,
            height: level::MAZE_HEIGHT,
            cells,
            player: level::spawn_player(),
            ghosts: level::spawn_ghosts(),
            speed,
            phase: Phase::Start,
            score: 0,
            lives: START_LIVES,
            tick: 0,
            message: START_PROMPT.to_string(),
            message_timer: 0,
            celebration_timer: 0,
        }
    }

    /// Full reset for a new game: grid, entities, score, lives, banner.
    pub fn reset_round_state(&mut self) {
        self.cells = level::maze_grid();
        self.player = level::spawn_player();
        self.ghosts = level::spawn_ghosts();
        self.phase = Phase::Start;
        self.score = 0;
        self.lives = START_LIVES;
        self.celebration_timer = 0;
        self.set_message(START_PROMPT, 0);
    }

    /// Return player and ghosts to spawn after a non-fatal catch. The
    /// player's move timer keeps running.
    pub fn respawn_actors(&mut self) {
        let (x, y) = level::PLAYER_SPAWN;
        self.player.x = x;
        self.player.y = y;
        self.player.direction = Direction::NONE;
        self.player.next_direction = Direction::NONE;
        for g in &mut self.ghosts {
            g.respawn();
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    pub fn clear_message(&mut self) {
        self.message.clear();
        self.message_timer = 0;
    }

    pub fn arm_celebration(&mut self) {
        self.celebration_timer = CELEBRATION_TICKS;
    }

    pub fn celebrating(&self) -> bool {
        self.celebration_timer > 0
    }

    /// Count down per-tick UI timers. Runs in every phase.
    pub fn tick_timers(&mut self) {
        if self.celebration_timer > 0 {
            self.celebration_timer -= 1;
        }
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 { self.message.clear(); }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn world() -> WorldState {
        WorldState::new(GameConfig::default().speed)
    }

    #[test]
    fn new_world_waits_at_start() {
        let w = world();
        assert_eq!(w.phase, Phase::Start);
        assert_eq!(w.lives, START_LIVES);
        assert_eq!(w.message, START_PROMPT);
        assert_eq!(w.ghosts.len(), 4);
    }

    #[test]
    fn set_cell_ignores_out_of_bounds() {
        let mut w = world();
        w.set_cell(-1, 3, Cell::Pellet);
        w.set_cell(20, 3, Cell::Pellet);
        w.set_cell(1, 1, Cell::Empty);
        assert_eq!(w.cell_at(1, 1), Cell::Empty);
        assert_eq!(w.cell_at(-1, 3), Cell::Wall);
    }

    #[test]
    fn celebration_counts_down_to_zero() {
        let mut w = world();
        w.arm_celebration();
        for _ in 0..CELEBRATION_TICKS - 1 {
            w.tick_timers();
        }
        assert!(w.celebrating());
        w.tick_timers();
        assert!(!w.celebrating());
        w.tick_timers();
        assert_eq!(w.celebration_timer, 0);
    }

    #[test]
    fn timed_message_expires_persistent_stays() {
        let mut w = world();
        w.set_message("Ouch", 2);
        w.tick_timers();
        assert_eq!(w.message, "Ouch");
        w.tick_timers();
        assert!(w.message.is_empty());

        w.set_message("Sticky", 0);
        for _ in 0..10 { w.tick_timers(); }
        assert_eq!(w.message, "Sticky");
    }

    #[test]
    fn reset_restores_pellets_and_lives() {
        let mut w = world();
        w.set_cell(1, 1, Cell::Empty);
        w.score = 120;
        w.lives = 1;
        w.phase = Phase::GameOver;
        w.reset_round_state();
        assert_eq!(w.cell_at(1, 1), Cell::Pellet);
        assert_eq!((w.score, w.lives, w.phase), (0, START_LIVES, Phase::Start));
    }

    #[test]
    fn respawn_keeps_the_player_move_timer() {
        let mut w = world();
        w.player.x = 6;
        w.player.y = 3;
        w.player.direction = Direction::LEFT;
        w.player.next_direction = Direction::DOWN;
        w.player.move_timer = 5;
        w.ghosts[1].x = 4;
        w.respawn_actors();
        assert_eq!((w.player.x, w.player.y), (1, 1));
        assert!(w.player.direction.is_none());
        assert!(w.player.next_direction.is_none());
        assert_eq!(w.player.move_timer, 5);
        assert_eq!(w.ghosts[1].x, 10);
    }
}
