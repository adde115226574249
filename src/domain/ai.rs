/// Ghost AI: one greedy heuristic per ghost identity.
///
/// Four modes, keyed by `GhostKind`:
///   1. **Chaser**: reduce the larger axis gap to the player first.
///   2. **Ambusher**: chase a point four cells ahead of the player.
///   3. **Patroller**: chase when within 8 cells, otherwise keep heading.
///   4. **Shy**: chase from beyond 6 cells, flee when closer.
///
/// All selectors are pure apart from the caller-supplied RNG. When the
/// selected direction is blocked the step layer asks `avoid_obstacle`.

use rand::seq::SliceRandom;
use rand::Rng;

use super::entity::{Direction, Ghost, GhostKind, Player};
use super::rules::{self, MapView};

const AMBUSH_LOOKAHEAD: i32 = 4;
const PATROL_CHASE_RANGE: i32 = 8;
const SHY_FLEE_RANGE: i32 = 6;

const PATROL_DIRS: [Direction; 4] = [
    Direction::RIGHT, Direction::LEFT, Direction::DOWN, Direction::UP,
];
const AVOID_DIRS: [Direction; 4] = [
    Direction::UP, Direction::DOWN, Direction::LEFT, Direction::RIGHT,
];

/// Pick the next heading for `ghost`. `None` keeps the current heading.
pub fn choose_direction(
    ghost: &Ghost,
    player: &Player,
    map: &MapView,
    rng: &mut impl Rng,
) -> Option<Direction> {
    let distance = rules::manhattan(ghost.x, ghost.y, player.x, player.y);
    match ghost.kind {
        GhostKind::Chaser => chase(map, ghost.x, ghost.y, player.x, player.y),
        GhostKind::Ambusher => {
            let tx = player.x + player.direction.dx * AMBUSH_LOOKAHEAD;
            let ty = player.y + player.direction.dy * AMBUSH_LOOKAHEAD;
            chase(map, ghost.x, ghost.y, tx, ty)
        }
        GhostKind::Patroller => {
            if distance < PATROL_CHASE_RANGE {
                chase(map, ghost.x, ghost.y, player.x, player.y)
            } else {
                patrol(map, ghost, rng)
            }
        }
        GhostKind::Shy => {
            if distance > SHY_FLEE_RANGE {
                chase(map, ghost.x, ghost.y, player.x, player.y)
            } else {
                flee(map, ghost.x, ghost.y, player.x, player.y)
            }
        }
    }
}

// ── Chase ──

/// Greedy pursuit of (tx, ty). The dominant axis goes first; ties favour
/// the vertical axis because the comparison is strict.
pub fn chase(map: &MapView, gx: i32, gy: i32, tx: i32, ty: i32) -> Option<Direction> {
    let dx = tx - gx;
    let dy = ty - gy;

    let mut candidates: Vec<Direction> = Vec::with_capacity(4);
    if dx.abs() > dy.abs() {
        push_horizontal(&mut candidates, dx);
        push_vertical(&mut candidates, dy);
    } else {
        push_vertical(&mut candidates, dy);
        push_horizontal(&mut candidates, dx);
    }

    first_legal(map, gx, gy, &candidates)
}

fn push_horizontal(out: &mut Vec<Direction>, dx: i32) {
    if dx > 0 { out.push(Direction::RIGHT); }
    if dx < 0 { out.push(Direction::LEFT); }
}

fn push_vertical(out: &mut Vec<Direction>, dy: i32) {
    if dy > 0 { out.push(Direction::DOWN); }
    if dy < 0 { out.push(Direction::UP); }
}

// ── Patrol ──

fn patrol(map: &MapView, ghost: &Ghost, rng: &mut impl Rng) -> Option<Direction> {
    if !ghost.direction.is_none() && rules::legal_move(map, ghost.x, ghost.y, ghost.direction) {
        return Some(ghost.direction);
    }
    let legal: Vec<Direction> = PATROL_DIRS
        .iter()
        .copied()
        .filter(|&d| rules::legal_move(map, ghost.x, ghost.y, d))
        .collect();
    legal.choose(rng).copied()
}

// ── Flee ──

/// Step away from (px, py), with perpendicular backups.
pub fn flee(map: &MapView, gx: i32, gy: i32, px: i32, py: i32) -> Option<Direction> {
    let dx = px - gx;
    let dy = py - gy;

    let mut candidates: Vec<Direction> = Vec::with_capacity(4);
    if dx > 0 { candidates.push(Direction::LEFT); }
    if dx < 0 { candidates.push(Direction::RIGHT); }
    if dy > 0 { candidates.push(Direction::UP); }
    if dy < 0 { candidates.push(Direction::DOWN); }

    if dx.abs() > dy.abs() {
        candidates.extend([Direction::DOWN, Direction::UP]);
    } else {
        candidates.extend([Direction::RIGHT, Direction::LEFT]);
    }

    first_legal(map, gx, gy, &candidates)
}

// ── Fallback ──

/// Random legal heading that does not double back. Reversing is allowed
/// only in a dead end; `None` means the ghost is boxed in.
pub fn avoid_obstacle(map: &MapView, ghost: &Ghost, rng: &mut impl Rng) -> Option<Direction> {
    let reverse = ghost.direction.reverse();
    let legal: Vec<Direction> = AVOID_DIRS
        .iter()
        .copied()
        .filter(|&d| rules::legal_move(map, ghost.x, ghost.y, d))
        .collect();

    let forward: Vec<Direction> = legal.iter().copied().filter(|&d| d != reverse).collect();
    if let Some(d) = forward.choose(rng) {
        return Some(*d);
    }
    legal.choose(rng).copied()
}

fn first_legal(map: &MapView, x: i32, y: i32, candidates: &[Direction]) -> Option<Direction> {
    candidates.iter().copied().find(|&d| rules::legal_move(map, x, y, d))
}
