/// Read-only projection of the session for the renderer.
///
/// Nothing here mutates state; the renderer only ever sees a `Frame`.

use crate::domain::cell::Cell;
use crate::domain::color::Rgb;
use crate::domain::entity::Direction;
use crate::fx::{ParticleDraw, ParticleStats, CANVAS_PX, CELL_PX};

use super::world::{Phase, WorldState};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostView {
    pub x: i32,
    pub y: i32,
    pub color: Rgb,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub high_score: u32,
    pub lives: u32,
    pub pellets: usize,
    /// Present only while performance mode is on.
    pub performance: Option<ParticleStats>,
}

pub struct Frame<'a> {
    pub cells: &'a [Vec<Cell>],
    pub player: (i32, i32),
    pub facing: Direction,
    pub ghosts: Vec<GhostView>,
    pub particles: Vec<ParticleDraw>,
    pub hud: Hud,
    pub message: &'a str,
    pub banner: bool,
    pub phase: Phase,
}

pub fn project<'a>(
    world: &'a WorldState,
    high_score: u32,
    particles: Vec<ParticleDraw>,
    stats: ParticleStats,
) -> Frame<'a> {
    let ghosts = world
        .ghosts
        .iter()
        .map(|g| GhostView { x: g.x, y: g.y, color: g.color() })
        .collect();

    Frame {
        cells: &world.cells,
        player: (world.player.x, world.player.y),
        facing: world.player.direction,
        ghosts,
        particles,
        hud: Hud {
            score: world.score,
            high_score,
            lives: world.lives,
            pellets: world.map().pellets_remaining(),
            performance: stats.performance_mode.then_some(stats),
        },
        message: &world.message,
        banner: world.celebrating(),
        phase: world.phase,
    }
}

/// Map a particle's canvas position to a terminal cell. Each maze cell is
/// two columns wide, so a column covers half a maze cell horizontally.
pub fn particle_cell(x: f32, y: f32) -> Option<(usize, usize)> {
    if !(0.0..CANVAS_PX).contains(&x) || !(0.0..CANVAS_PX).contains(&y) {
        return None;
    }
    let col = (x / (CELL_PX / 2.0)) as usize;
    let row = (y / CELL_PX) as usize;
    Some((col, row))
}
