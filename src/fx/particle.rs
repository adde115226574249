//! Particle state and per-frame integration.

use crate::domain::color::{self, Rgb};

/// Twinkle phase advance per frame (radians).
const TWINKLE_STEP: f32 = 0.3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParticleKind {
    Trail,
    Explosion,
    Sparkle,
    Confetti,
    /// Parked in the pool, not simulated or drawn.
    Pooled,
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub color: Rgb,
    pub radius: f32,
    pub opacity: f32,
    pub age: u32,
    pub max_life: u32,
    pub kind: ParticleKind,
    pub gravity: f32,
    pub twinkle: bool,
    pub phase: f32,
}

impl Particle {
    pub fn new(kind: ParticleKind, x: f32, y: f32, vx: f32, vy: f32, color: Rgb, radius: f32, max_life: u32) -> Self {
        Particle {
            x, y, vx, vy,
            color,
            radius,
            opacity: 1.0,
            age: 0,
            max_life,
            kind,
            gravity: 0.0,
            twinkle: false,
            phase: 0.0,
        }
    }

    /// Inert particle held by the pool.
    pub fn inert() -> Self {
        Particle::new(ParticleKind::Pooled, 0.0, 0.0, 0.0, 0.0, color::WHITE, 1.0, 1)
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_twinkle(mut self) -> Self {
        self.twinkle = true;
        self
    }

    /// Park for reuse: age, opacity and twinkle phase cleared.
    pub fn park(&mut self) {
        self.kind = ParticleKind::Pooled;
        self.age = 0;
        self.opacity = 1.0;
        self.phase = 0.0;
    }

    /// Advance one frame.
    pub fn update(&mut self) {
        self.age += 1;
        self.x += self.vx;
        self.y += self.vy;
        if self.gravity > 0.0 {
            self.vy += self.gravity;
        }

        let life = self.max_life.max(1) as f32;
        self.opacity = (1.0 - self.age as f32 / life).max(0.0);

        if self.twinkle {
            self.phase += TWINKLE_STEP;
            self.opacity *= 0.5 + 0.5 * self.phase.sin();
        }
    }

    pub fn is_dead(&self) -> bool {
        self.age >= self.max_life
    }

    /// Every numeric field is finite.
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.vx, self.vy, self.opacity, self.phase, self.radius]
            .iter()
            .all(|v| v.is_finite())
    }
}
