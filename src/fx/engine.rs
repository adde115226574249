//! Particle engine: emitters, per-frame update, draw list.
//!
//! Particles are kept in insertion order in `active`; the oldest sit at
//! the front and are evicted first when the governor lowers the cap.
//! Storage is the `ParticlePool` arena, so the active list only holds ids.

use std::collections::VecDeque;
use std::f32::consts::TAU;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::config::EffectsConfig;
use crate::domain::color::{self, Rgb};

use super::governor::Governor;
use super::particle::{Particle, ParticleKind};
use super::pool::{ParticlePool, SlotId};
use super::{CANVAS_PX, CELL_PX};

const ANCHOR_OFFSET: f32 = CELL_PX / 2.0;
/// Above this many live particles, performance mode draws every other one.
const THIN_DRAW_ABOVE: usize = 100;
/// Density the periodic audit tolerates outside performance mode.
pub const AUDIT_DENSITY: usize = 100;

const EXPLOSION_COLORS: [Rgb; 3] = [color::RED, color::ORANGE, color::YELLOW];
const SPARKLE_COLORS: [Rgb; 2] = [color::WHITE, color::YELLOW];
const CONFETTI_COLORS: [Rgb; 5] = [color::PURPLE, color::RED, color::GREEN, color::BLUE, color::YELLOW];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParticleError {
    #[error("active slot {0:?} holds no particle")]
    DanglingSlot(SlotId),
    #[error("particle in slot {0:?} has non-finite state")]
    NonFinite(SlotId),
}

/// What the renderer needs for one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleDraw {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Rgb,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleStats {
    pub active: usize,
    pub max_particles: usize,
    pub performance_mode: bool,
    pub frame_time_ms: f32,
    pub pooled: usize,
    pub utilization_pct: f32,
}

pub struct ParticleEngine {
    pool: ParticlePool,
    active: VecDeque<SlotId>,
    governor: Governor,
}

impl ParticleEngine {
    pub fn new(cfg: &EffectsConfig) -> Self {
        ParticleEngine {
            pool: ParticlePool::new(cfg.pool_capacity),
            active: VecDeque::with_capacity(cfg.max_particles),
            governor: Governor::new(cfg),
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn performance_mode(&self) -> bool {
        self.governor.performance_mode()
    }

    fn spawn(&mut self, particle: Particle) {
        let id = self.pool.acquire(particle);
        self.active.push_back(id);
    }

    // ── Emitters ──

    /// Purple dot left behind at a vacated cell. Skipped in performance mode.
    pub fn emit_trail(&mut self, ax: f32, ay: f32) {
        if self.performance_mode() {
            return;
        }
        self.spawn(Particle::new(
            ParticleKind::Trail,
            ax + ANCHOR_OFFSET, ay + ANCHOR_OFFSET,
            0.0, 0.0,
            color::PURPLE, 4.0, 20,
        ));
    }

    /// Radial burst, evenly spaced angles.
    pub fn emit_explosion(&mut self, ax: f32, ay: f32, rng: &mut impl Rng) {
        let count = if self.performance_mode() { 4 } else { 8 };
        for i in 0..count {
            let angle = i as f32 / count as f32 * TAU;
            let speed = rng.gen_range(2.0..4.0);
            let color = *EXPLOSION_COLORS.choose(rng).unwrap_or(&color::RED);
            self.spawn(
                Particle::new(
                    ParticleKind::Explosion,
                    ax + ANCHOR_OFFSET, ay + ANCHOR_OFFSET,
                    angle.cos() * speed, angle.sin() * speed,
                    color, 6.0, 30,
                )
                .with_gravity(0.1),
            );
        }
    }

    /// Small twinkling cluster around a cell.
    pub fn emit_sparkle(&mut self, ax: f32, ay: f32, rng: &mut impl Rng) {
        let count = if self.performance_mode() { 2 } else { rng.gen_range(3..=5) };
        for _ in 0..count {
            let x = ax + ANCHOR_OFFSET + rng.gen_range(-10.0..10.0);
            let y = ay + ANCHOR_OFFSET + rng.gen_range(-10.0..10.0);
            let vx = rng.gen_range(-1.0..1.0);
            let vy = rng.gen_range(-1.0..1.0);
            let color = *SPARKLE_COLORS.choose(rng).unwrap_or(&color::WHITE);
            self.spawn(
                Particle::new(ParticleKind::Sparkle, x, y, vx, vy, color, 3.0, 25).with_twinkle(),
            );
        }
    }

    /// Screen-wide shower from just above the top edge.
    pub fn emit_confetti(&mut self, rng: &mut impl Rng) {
        let count = if self.performance_mode() { 25 } else { 50 };
        for _ in 0..count {
            let x = rng.gen_range(0.0..CANVAS_PX);
            let vx = rng.gen_range(-2.0..2.0);
            let vy = rng.gen_range(1.0..3.0);
            let color = *CONFETTI_COLORS.choose(rng).unwrap_or(&color::PURPLE);
            self.spawn(
                Particle::new(ParticleKind::Confetti, x, -10.0, vx, vy, color, 5.0, 120)
                    .with_gravity(0.1),
            );
        }
    }

    // ── Frame ──

    /// Governor measurement, integration, expiry, then cap eviction.
    pub fn update(&mut self, now: Instant) -> Result<(), ParticleError> {
        self.governor.measure(now);

        for &id in &self.active {
            let p = self.pool.get_mut(id).ok_or(ParticleError::DanglingSlot(id))?;
            p.update();
            if !p.is_finite() {
                return Err(ParticleError::NonFinite(id));
            }
        }

        self.cleanup();

        let cap = self.governor.max_particles();
        while self.active.len() > cap {
            if let Some(id) = self.active.pop_front() {
                self.pool.release(id);
            }
        }
        Ok(())
    }

    /// Drop expired particles without advancing the others.
    pub fn cleanup(&mut self) {
        let pool = &mut self.pool;
        self.active.retain(|&id| {
            let dead = pool.get(id).map_or(true, Particle::is_dead);
            if dead {
                pool.release(id);
            }
            !dead
        });
    }

    /// Visible particles in insertion order. Thinned to every other one
    /// in performance mode once the set is dense.
    pub fn draw_list(&self) -> Result<Vec<ParticleDraw>, ParticleError> {
        let stride = if self.performance_mode() && self.active.len() > THIN_DRAW_ABOVE { 2 } else { 1 };
        let mut out = Vec::with_capacity(self.active.len() / stride + 1);
        for &id in self.active.iter().step_by(stride) {
            let p = self.pool.get(id).ok_or(ParticleError::DanglingSlot(id))?;
            if !p.is_finite() {
                return Err(ParticleError::NonFinite(id));
            }
            if p.opacity > 0.0 {
                out.push(ParticleDraw {
                    x: p.x,
                    y: p.y,
                    radius: p.radius,
                    color: p.color,
                    opacity: p.opacity,
                });
            }
        }
        Ok(out)
    }

    // ── Control ──

    fn release_all(&mut self) {
        for id in self.active.drain(..) {
            self.pool.release(id);
        }
    }

    /// Fault path: drop every active particle and degrade quality.
    pub fn recover(&mut self) {
        self.release_all();
        self.governor.force_degraded();
    }

    /// New game: empty, full quality.
    pub fn reset(&mut self) {
        self.release_all();
        self.governor.reset();
    }

    pub fn set_performance_mode(&mut self, enabled: bool) {
        self.governor.set_performance_mode(enabled);
    }

    /// Periodic density check. Returns true if performance mode was forced.
    pub fn audit(&mut self) -> bool {
        self.governor.audit(self.active.len(), AUDIT_DENSITY)
    }

    pub fn stats(&self) -> ParticleStats {
        let capacity = self.pool.capacity();
        let pooled = self.pool.pooled();
        ParticleStats {
            active: self.active.len(),
            max_particles: self.governor.max_particles(),
            performance_mode: self.governor.performance_mode(),
            frame_time_ms: self.governor.frame_time_ms(),
            pooled,
            utilization_pct: if capacity == 0 {
                0.0
            } else {
                (capacity - pooled) as f32 / capacity as f32 * 100.0
            },
        }
    }

    #[cfg(test)]
    pub(crate) fn corrupt_first(&mut self) {
        if let Some(&id) = self.active.front() {
            self.pool.forget(id);
        }
    }

    #[cfg(test)]
    pub(crate) fn poison_first(&mut self) {
        if let Some(&id) = self.active.front() {
            if let Some(p) = self.pool.get_mut(id) {
                p.vx = f32::NAN;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn pooled(&self) -> usize {
        self.pool.pooled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn engine() -> ParticleEngine {
        ParticleEngine::new(&EffectsConfig::default())
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    /// Steady 16ms frames: never slow, never fast.
    fn frames(start: Instant) -> impl Iterator<Item = Instant> {
        (1..).map(move |i| start + Duration::from_millis(16 * i))
    }

    #[test]
    fn emitter_counts() {
        let mut e = engine();
        let mut r = rng();
        e.emit_trail(30.0, 30.0);
        assert_eq!(e.len(), 1);
        e.emit_explosion(30.0, 30.0, &mut r);
        assert_eq!(e.len(), 9);
        e.emit_confetti(&mut r);
        assert_eq!(e.len(), 59);
        e.emit_sparkle(30.0, 30.0, &mut r);
        assert!((62..=64).contains(&e.len()));
    }

    #[test]
    fn performance_mode_thins_emitters() {
        let mut e = engine();
        let mut r = rng();
        e.set_performance_mode(true);
        e.emit_trail(0.0, 0.0);
        assert_eq!(e.len(), 0);
        e.emit_explosion(0.0, 0.0, &mut r);
        e.emit_sparkle(0.0, 0.0, &mut r);
        e.emit_confetti(&mut r);
        assert_eq!(e.len(), 4 + 2 + 25);
    }

    #[test]
    fn trail_sits_at_cell_centre() {
        let mut e = engine();
        e.emit_trail(60.0, 90.0);
        let d = e.draw_list().unwrap();
        assert_eq!((d[0].x, d[0].y, d[0].radius), (75.0, 105.0, 4.0));
        assert_eq!(d[0].color, color::PURPLE);
    }

    #[test]
    fn confetti_starts_above_canvas() {
        let mut e = engine();
        e.emit_confetti(&mut rng());
        let d = e.draw_list().unwrap();
        assert!(d.iter().all(|p| p.y == -10.0 && (0.0..600.0).contains(&p.x)));
    }

    #[test]
    fn particles_expire_after_max_life() {
        let mut e = engine();
        e.emit_trail(0.0, 0.0);
        let mut clock = frames(Instant::now());
        for _ in 0..19 {
            e.update(clock.next().unwrap()).unwrap();
        }
        assert_eq!(e.len(), 1);
        e.update(clock.next().unwrap()).unwrap();
        assert!(e.is_empty());
    }

    #[test]
    fn cap_evicts_oldest_first() {
        let mut e = engine();
        let mut r = rng();
        e.emit_trail(0.0, 0.0);
        e.set_performance_mode(true); // cap 75
        for _ in 0..4 {
            e.emit_confetti(&mut r); // 25 each
        }
        assert_eq!(e.len(), 101);
        e.update(Instant::now()).unwrap();
        assert_eq!(e.len(), 75);
        // the trail went first
        assert!(e.draw_list().unwrap().iter().all(|p| p.color != color::PURPLE || p.radius != 4.0));
    }

    #[test]
    fn pool_never_exceeds_capacity() {
        let mut e = engine();
        let mut r = rng();
        let mut clock = frames(Instant::now());
        for round in 0..40 {
            e.emit_confetti(&mut r);
            e.emit_explosion(90.0, 90.0, &mut r);
            if round % 3 == 0 { e.set_performance_mode(true); }
            if round % 5 == 0 { e.set_performance_mode(false); }
            for _ in 0..7 {
                e.update(clock.next().unwrap()).unwrap();
                assert!(e.pooled() <= 50);
            }
        }
        e.reset();
        assert!(e.pooled() <= 50);
        assert!(e.is_empty());
    }

    #[test]
    fn dense_performance_mode_draws_every_other() {
        let mut e = engine();
        let mut r = rng();
        for _ in 0..3 {
            e.emit_confetti(&mut r);
        }
        assert_eq!(e.draw_list().unwrap().len(), 150);
        e.set_performance_mode(true);
        assert_eq!(e.draw_list().unwrap().len(), 75);
    }

    #[test]
    fn dangling_slot_is_an_error() {
        let mut e = engine();
        e.emit_trail(0.0, 0.0);
        e.corrupt_first();
        assert!(matches!(e.update(Instant::now()), Err(ParticleError::DanglingSlot(_))));
        assert!(matches!(e.draw_list(), Err(ParticleError::DanglingSlot(_))));
    }

    #[test]
    fn non_finite_state_is_an_error() {
        let mut e = engine();
        e.emit_trail(0.0, 0.0);
        e.poison_first();
        assert!(matches!(e.update(Instant::now()), Err(ParticleError::NonFinite(_))));
    }

    #[test]
    fn fresh_engine_has_idle_pool() {
        let s = engine().stats();
        assert_eq!((s.active, s.pooled), (0, 50));
        assert_eq!(s.utilization_pct, 0.0);
    }

    #[test]
    fn recover_clears_and_degrades() {
        let mut e = engine();
        e.emit_confetti(&mut rng());
        e.recover();
        assert!(e.is_empty());
        assert!(e.performance_mode());
        e.reset();
        assert!(!e.performance_mode());
        assert_eq!(e.stats().max_particles, 150);
    }

    #[test]
    fn audit_forces_mode_when_dense() {
        let mut e = engine();
        let mut r = rng();
        for _ in 0..3 {
            e.emit_confetti(&mut r);
        }
        assert!(e.audit());
        let s = e.stats();
        assert!(s.performance_mode);
        assert_eq!(s.max_particles, 130);
        // every pre-filled slot was handed out
        assert_eq!(s.pooled, 0);
        assert_eq!(s.utilization_pct, 100.0);
    }
}
