/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Input (start trigger / queued turn)
///   2. Player movement + pellet pickup + level completion
///   3. Ghost movement (selector, then obstacle fallback)
///   4. Collision resolution
///
/// A phase change to LevelComplete or GameOver ends the tick early.
/// Restart is not handled here: the controller owns the score board and
/// particle engine, which must be reset alongside the world.

use rand::Rng;

use crate::domain::ai;
use crate::domain::cell::Cell;
use crate::domain::entity::{Direction, FrameInput};
use crate::domain::rules;
use super::event::GameEvent;
use super::world::{Phase, WorldState, PELLET_SCORE};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput, rng: &mut impl Rng) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();

    match world.phase {
        Phase::Start => match input.movement {
            Some(dir) => start_game(world, dir, &mut events),
            None => return events,
        },
        Phase::Playing => {
            if let Some(dir) = input.movement {
                world.player.next_direction = dir;
            }
        }
        Phase::GameOver | Phase::LevelComplete => return events,
    }

    world.tick += 1;

    if resolve_player_movement(world, &mut events) { return events; }
    resolve_ghost_movement(world, rng);
    resolve_collisions(world, &mut events);

    events
}

/// Start → Playing. The triggering direction is queued, and a pellet on
/// the start cell is collected immediately.
pub fn start_game(world: &mut WorldState, dir: Direction, events: &mut Vec<GameEvent>) {
    world.phase = Phase::Playing;
    world.player.next_direction = dir;
    world.clear_message();
    events.push(GameEvent::GameStarted);

    let (x, y) = (world.player.x, world.player.y);
    collect_pellet(world, x, y, events);
}

/// Full reset for a new game. The caller runs the high-score check first.
pub fn restart(world: &mut WorldState) {
    world.reset_round_state();
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

/// Returns true if the level was completed this tick.
fn resolve_player_movement(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    world.player.move_timer += 1;
    if world.player.move_timer < world.speed.player_cadence {
        return false;
    }
    world.player.move_timer = 0;

    let map = world.map();
    let p = &world.player;
    let turn = p.next_direction;
    let turn_ok = !turn.is_none() && rules::legal_move(&map, p.x, p.y, turn);
    let heading = if turn_ok { turn } else { p.direction };
    let step_ok = rules::legal_move(&map, p.x, p.y, heading);

    world.player.direction = heading;
    if !step_ok {
        return false;
    }

    // A zero heading is a legal step onto the current cell.
    if heading.is_none() {
        let (x, y) = (world.player.x, world.player.y);
        events.push(GameEvent::PlayerHeld { x, y });
        return false;
    }

    let (from_x, from_y) = (world.player.x, world.player.y);
    events.push(GameEvent::PlayerMoved { from_x, from_y });
    world.player.x += heading.dx;
    world.player.y += heading.dy;

    let (x, y) = (world.player.x, world.player.y);
    collect_pellet(world, x, y, events)
}

/// Eat a pellet at (x, y) if present. Returns true if that was the last one.
fn collect_pellet(world: &mut WorldState, x: i32, y: i32, events: &mut Vec<GameEvent>) -> bool {
    if world.cell_at(x, y) != Cell::Pellet {
        return false;
    }
    world.set_cell(x, y, Cell::Empty);
    world.score += PELLET_SCORE;
    events.push(GameEvent::PelletCollected { x, y });

    if rules::check_level_complete(&world.map()) {
        world.phase = Phase::LevelComplete;
        events.push(GameEvent::LevelComplete);
        return true;
    }
    false
}

// ══════════════════════════════════════════════════════════════
// Ghosts
// ══════════════════════════════════════════════════════════════

fn resolve_ghost_movement(world: &mut WorldState, rng: &mut impl Rng) {
    let cadence = world.speed.ghost_cadence;
    let map = rules::MapView { cells: &world.cells, width: world.width, height: world.height };
    let player = &world.player;

    for ghost in world.ghosts.iter_mut() {
        ghost.move_timer += 1;
        if ghost.move_timer < cadence {
            continue;
        }
        ghost.move_timer = 0;

        if let Some(dir) = ai::choose_direction(ghost, player, &map, rng) {
            ghost.direction = dir;
        }

        if rules::legal_move(&map, ghost.x, ghost.y, ghost.direction) {
            ghost.x += ghost.direction.dx;
            ghost.y += ghost.direction.dy;
        } else if let Some(alt) = ai::avoid_obstacle(&map, ghost, rng) {
            ghost.direction = alt;
            if rules::legal_move(&map, ghost.x, ghost.y, alt) {
                ghost.x += alt.dx;
                ghost.y += alt.dy;
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Collisions
// ══════════════════════════════════════════════════════════════

/// At most one catch per tick: the first ghost on the player's cell.
fn resolve_collisions(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let (px, py) = (world.player.x, world.player.y);
    let hit = match world.ghosts.iter().find(|g| g.x == px && g.y == py) {
        Some(g) => g.id,
        None => return,
    };

    events.push(GameEvent::PlayerCaught { ghost: hit, x: px, y: py });
    world.lives = world.lives.saturating_sub(1);

    if world.lives == 0 {
        world.phase = Phase::GameOver;
        events.push(GameEvent::GameOver);
    } else {
        world.respawn_actors();
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::world::START_LIVES;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn world() -> WorldState {
        WorldState::new(GameConfig::default().speed)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn press(dir: Direction) -> FrameInput {
        FrameInput { movement: Some(dir), restart: false }
    }

    /// Park ghosts in the tunnel so they stay away from the player's corner.
    fn park_ghosts(w: &mut WorldState) {
        for g in &mut w.ghosts {
            g.x = 0;
            g.y = 9;
            g.spawn_x = 0;
            g.spawn_y = 9;
            g.move_timer = 0;
        }
        w.speed.ghost_cadence = u32::MAX;
    }

    #[test]
    fn idle_start_does_nothing() {
        let mut w = world();
        let ev = step(&mut w, idle(), &mut rng());
        assert!(ev.is_empty());
        assert_eq!(w.phase, Phase::Start);
        assert_eq!(w.tick, 0);
    }

    #[test]
    fn first_direction_starts_and_collects_spawn_pellet() {
        let mut w = world();
        let ev = step(&mut w, press(Direction::DOWN), &mut rng());
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.score, 10);
        assert_eq!(w.cell_at(1, 1), Cell::Empty);
        assert_eq!(w.player.next_direction, Direction::DOWN);
        assert!(ev.contains(&GameEvent::GameStarted));
        assert!(ev.contains(&GameEvent::PelletCollected { x: 1, y: 1 }));
        assert!(w.message.is_empty());
    }

    #[test]
    fn player_steps_on_the_eighth_tick() {
        let mut w = world();
        park_ghosts(&mut w);
        let mut r = rng();
        step(&mut w, press(Direction::DOWN), &mut r);
        for _ in 0..6 {
            step(&mut w, idle(), &mut r);
            assert_eq!((w.player.x, w.player.y), (1, 1));
        }
        let ev = step(&mut w, idle(), &mut r);
        assert_eq!((w.player.x, w.player.y), (1, 2));
        assert_eq!(w.score, 20);
        assert_eq!(w.cell_at(1, 2), Cell::Empty);
        assert_eq!(ev[0], GameEvent::PlayerMoved { from_x: 1, from_y: 1 });
        assert!(ev.contains(&GameEvent::PelletCollected { x: 1, y: 2 }));
        assert_eq!(w.player.move_timer, 0);
    }

    #[test]
    fn illegal_turn_keeps_current_heading() {
        let mut w = world();
        park_ghosts(&mut w);
        w.phase = Phase::Playing;
        w.player.direction = Direction::RIGHT;
        w.player.move_timer = w.speed.player_cadence - 1;
        // (1,0) is wall, so UP is rejected and RIGHT continues
        step(&mut w, press(Direction::UP), &mut rng());
        assert_eq!((w.player.x, w.player.y), (2, 1));
        assert_eq!(w.player.direction, Direction::RIGHT);
    }

    #[test]
    fn player_without_heading_holds_its_cell() {
        let mut w = world();
        park_ghosts(&mut w);
        w.phase = Phase::Playing;
        w.player.move_timer = w.speed.player_cadence - 1;
        let ev = step(&mut w, idle(), &mut rng());
        assert_eq!(ev, vec![GameEvent::PlayerHeld { x: 1, y: 1 }]);
        assert_eq!((w.player.x, w.player.y), (1, 1));
        assert_eq!(w.player.move_timer, 0);
    }

    #[test]
    fn blocked_heading_emits_nothing() {
        let mut w = world();
        park_ghosts(&mut w);
        w.phase = Phase::Playing;
        w.player.direction = Direction::UP;
        w.player.move_timer = w.speed.player_cadence - 1;
        let ev = step(&mut w, idle(), &mut rng());
        assert!(ev.is_empty());
        assert_eq!(w.player.direction, Direction::UP);
    }

    #[test]
    fn first_turn_into_a_wall_leaves_the_player_holding() {
        let mut w = world();
        park_ghosts(&mut w);
        let mut r = rng();
        step(&mut w, press(Direction::UP), &mut r);
        let mut held = 0;
        for _ in 0..40 {
            let ev = step(&mut w, idle(), &mut r);
            held += ev.iter().filter(|e| matches!(e, GameEvent::PlayerHeld { .. })).count();
        }
        assert_eq!((w.player.x, w.player.y), (1, 1));
        assert!(w.player.direction.is_none());
        assert_eq!(held, 5);
    }

    #[test]
    fn last_pellet_completes_level_same_tick() {
        let mut w = world();
        park_ghosts(&mut w);
        for row in w.cells.iter_mut() {
            for c in row.iter_mut() {
                if *c == Cell::Pellet { *c = Cell::Empty; }
            }
        }
        w.set_cell(2, 1, Cell::Pellet);
        w.phase = Phase::Playing;
        w.player.direction = Direction::RIGHT;
        w.player.move_timer = w.speed.player_cadence - 1;

        let ev = step(&mut w, idle(), &mut rng());
        assert_eq!(w.phase, Phase::LevelComplete);
        assert!(ev.contains(&GameEvent::LevelComplete));
        assert!(rules::check_level_complete(&w.map()));
    }

    #[test]
    fn finished_round_ignores_movement() {
        let mut w = world();
        w.phase = Phase::GameOver;
        let ev = step(&mut w, press(Direction::RIGHT), &mut rng());
        assert!(ev.is_empty());
        assert_eq!((w.player.x, w.player.y), (1, 1));
    }

    #[test]
    fn catch_costs_one_life_and_respawns() {
        let mut w = world();
        w.phase = Phase::Playing;
        w.speed.ghost_cadence = u32::MAX;
        w.player.x = 4;
        w.player.y = 3;
        w.ghosts[0].x = 4;
        w.ghosts[0].y = 3;
        let ev = step(&mut w, idle(), &mut rng());
        assert_eq!(w.lives, START_LIVES - 1);
        assert_eq!(ev, vec![GameEvent::PlayerCaught { ghost: 0, x: 4, y: 3 }]);
        assert_eq!((w.player.x, w.player.y), (1, 1));
        assert_eq!((w.ghosts[0].x, w.ghosts[0].y), (9, 9));
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn stacked_ghosts_cost_exactly_one_life() {
        let mut w = world();
        w.phase = Phase::Playing;
        w.speed.ghost_cadence = u32::MAX;
        for g in &mut w.ghosts {
            g.x = 1;
            g.y = 1;
        }
        step(&mut w, idle(), &mut rng());
        assert_eq!(w.lives, START_LIVES - 1);
    }

    #[test]
    fn last_life_ends_the_game() {
        let mut w = world();
        w.phase = Phase::Playing;
        w.speed.ghost_cadence = u32::MAX;
        w.lives = 1;
        w.ghosts[2].x = 1;
        w.ghosts[2].y = 1;
        let ev = step(&mut w, idle(), &mut rng());
        assert_eq!(w.phase, Phase::GameOver);
        assert_eq!(w.lives, 0);
        assert_eq!(ev.last(), Some(&GameEvent::GameOver));
    }

    #[test]
    fn ghosts_move_on_their_cadence() {
        let mut w = world();
        w.phase = Phase::Playing;
        let mut r = rng();
        for _ in 0..w.speed.ghost_cadence - 1 {
            step(&mut w, idle(), &mut r);
        }
        assert_eq!((w.ghosts[0].x, w.ghosts[0].y), (9, 9));
        step(&mut w, idle(), &mut r);
        // chaser: equal gap to (1,1), vertical first → up
        assert_eq!((w.ghosts[0].x, w.ghosts[0].y), (9, 8));
    }

    #[test]
    fn restart_resets_everything() {
        let mut w = world();
        step(&mut w, press(Direction::RIGHT), &mut rng());
        w.lives = 0;
        w.phase = Phase::GameOver;
        restart(&mut w);
        assert_eq!(w.phase, Phase::Start);
        assert_eq!(w.score, 0);
        assert_eq!(w.cell_at(1, 1), Cell::Pellet);
    }
}
