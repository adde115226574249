/// Game controller: owns the world, score board, particle engine and RNG,
/// and drives one tick at a time.
///
/// Events from `step` are translated into effects here:
///   PlayerMoved      → trail at the vacated cell
///   PlayerHeld       → trail at the current cell
///   PelletCollected  → sparkle
///   PlayerCaught     → explosion
///   LevelComplete    → high-score check (+ confetti, banner)
///   GameOver         → high-score check (+ confetti, banner)
///
/// Particle faults never escape a tick: the engine is cleared, forced into
/// performance mode, and the frame carries on.

use std::time::Instant;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::domain::entity::FrameInput;
use crate::fx::{ParticleEngine, CELL_PX};

use super::event::GameEvent;
use super::save::{ScoreBoard, ScoreStore};
use super::step;
use super::view::{self, Frame};
use super::world::WorldState;

const LEVEL_COMPLETE_MSG: &str = "Level Complete! Press SPACE to restart";
const GAME_OVER_MSG: &str = "Game Over! Press SPACE to restart";
const NEW_HIGH_PREFIX: &str = "New High Score! ";

pub struct Game<S: ScoreStore, R: Rng> {
    world: WorldState,
    scores: ScoreBoard<S>,
    particles: ParticleEngine,
    rng: R,
    frames: u64,
    audit_interval: u64,
}

impl<S: ScoreStore, R: Rng> Game<S, R> {
    pub fn new(config: &GameConfig, store: S, rng: R) -> Self {
        Game {
            world: WorldState::new(config.speed.clone()),
            scores: ScoreBoard::new(store),
            particles: ParticleEngine::new(&config.effects),
            rng,
            frames: 0,
            audit_interval: config.effects.audit_interval.max(1),
        }
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn scores(&self) -> &ScoreBoard<S> {
        &self.scores
    }

    pub fn particles(&self) -> &ParticleEngine {
        &self.particles
    }

    /// Advance one fixed tick. `now` feeds the particle frame-time governor.
    pub fn tick(&mut self, input: FrameInput, now: Instant) -> Vec<GameEvent> {
        if input.restart && self.world.phase.is_finished() {
            self.restart();
        }

        self.world.tick_timers();

        let events = step::step(&mut self.world, input, &mut self.rng);
        self.scores.update_current(self.world.score);
        self.process_events(&events);

        if let Err(e) = self.particles.update(now) {
            warn!(error = %e, "particle update failed, clearing effects");
            self.particles.recover();
        }

        self.frames += 1;
        if self.frames % self.audit_interval == 0 {
            self.audit_particles();
        }

        events
    }

    /// Offer the score to the high-score check, then reset for a new game.
    pub fn restart(&mut self) {
        self.scores.update_current(self.world.score);
        self.scores.check_new_high_score();
        step::restart(&mut self.world);
        self.scores.update_current(0);
        self.particles.reset();
        info!("game restarted");
    }

    /// Manual override of the particle governor. Turning it on clamps the
    /// cap to the reduced level; turning it off restores full quality.
    pub fn set_performance_mode(&mut self, enabled: bool) {
        self.particles.set_performance_mode(enabled);
        info!(enabled, cap = self.particles.stats().max_particles, "performance mode set");
    }

    /// Project the current state for rendering. A corrupt particle set is
    /// dropped (and performance mode forced) rather than drawn.
    pub fn frame(&mut self) -> Frame<'_> {
        let draws = match self.particles.draw_list() {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "particle render failed, clearing effects");
                self.particles.recover();
                Vec::new()
            }
        };
        view::project(&self.world, self.scores.high(), draws, self.particles.stats())
    }

    // ── Event → effect ──

    fn process_events(&mut self, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::GameStarted => info!("game started"),
                GameEvent::PlayerMoved { from_x: x, from_y: y } | GameEvent::PlayerHeld { x, y } => {
                    let (ax, ay) = cell_px(x, y);
                    self.particles.emit_trail(ax, ay);
                }
                GameEvent::PelletCollected { x, y } => {
                    let (ax, ay) = cell_px(x, y);
                    self.particles.emit_sparkle(ax, ay, &mut self.rng);
                }
                GameEvent::PlayerCaught { ghost, x, y } => {
                    let (ax, ay) = cell_px(x, y);
                    self.particles.emit_explosion(ax, ay, &mut self.rng);
                    info!(ghost, lives = self.world.lives, "player caught");
                }
                GameEvent::LevelComplete => self.finish_round(LEVEL_COMPLETE_MSG),
                GameEvent::GameOver => self.finish_round(GAME_OVER_MSG),
            }
        }
    }

    fn finish_round(&mut self, outcome: &str) {
        let new_high = self.scores.check_new_high_score();
        if new_high {
            self.particles.emit_confetti(&mut self.rng);
            self.world.arm_celebration();
        }
        let msg = if new_high {
            format!("{}{}", NEW_HIGH_PREFIX, outcome)
        } else {
            outcome.to_string()
        };
        self.world.set_message(&msg, 0);
        info!(score = self.world.score, phase = ?self.world.phase, new_high, "round finished");
    }

    fn audit_particles(&mut self) {
        let stats = self.particles.stats();
        if stats.performance_mode {
            info!(active = stats.active, cap = stats.max_particles, "performance mode active");
        }
        if self.particles.audit() {
            let after = self.particles.stats();
            warn!(active = after.active, cap = after.max_particles, "particle density high, performance mode forced");
        } else {
            debug!(active = stats.active, pooled = stats.pooled, "particle audit");
        }
    }

    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    #[cfg(test)]
    pub(crate) fn particles_mut(&mut self) -> &mut ParticleEngine {
        &mut self.particles
    }
}

fn cell_px(x: i32, y: i32) -> (f32, f32) {
    (x as f32 * CELL_PX, y as f32 * CELL_PX)
}
