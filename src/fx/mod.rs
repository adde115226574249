//! Particle effects: pooled storage, adaptive cap, emitters.
//!
//! Coordinates are logical canvas pixels (600×600, 30px cells).

pub mod engine;
pub mod governor;
pub mod particle;
pub mod pool;

pub const CELL_PX: f32 = 30.0;
pub const CANVAS_PX: f32 = 600.0;

pub use engine::{ParticleDraw, ParticleEngine, ParticleStats};
