//! Adaptive particle cap driven by measured frame time.
//!
//! Hysteresis: a slow frame (> slow threshold) enters performance mode and
//! lowers the cap; a fast frame (< fast threshold) while in performance
//! mode leaves it and raises the cap. Frames in between change nothing.
//! The cap always stays within [min_cap, max_cap].

use std::time::Instant;

use tracing::debug;

use crate::config::EffectsConfig;

const SLOW_STEP_DOWN: usize = 10;
const FAST_STEP_UP: usize = 5;
const AUDIT_STEP_DOWN: usize = 20;
const FORCED_CAP: usize = 75;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameBudget {
    pub slow_ms: f32,
    pub fast_ms: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameClass {
    Fast,
    Nominal,
    Slow,
}

pub fn classify_frame(frame_ms: f32, budget: FrameBudget) -> FrameClass {
    if frame_ms > budget.slow_ms {
        return FrameClass::Slow;
    }
    if frame_ms < budget.fast_ms {
        return FrameClass::Fast;
    }
    FrameClass::Nominal
}

pub struct Governor {
    max_particles: usize,
    performance_mode: bool,
    last_frame: Option<Instant>,
    frame_time_ms: f32,
    min_cap: usize,
    max_cap: usize,
    budget: FrameBudget,
}

impl Governor {
    pub fn new(cfg: &EffectsConfig) -> Self {
        let max_cap = cfg.max_particles.max(cfg.min_particles);
        Governor {
            max_particles: max_cap,
            performance_mode: false,
            last_frame: None,
            frame_time_ms: 0.0,
            min_cap: cfg.min_particles,
            max_cap,
            budget: FrameBudget { slow_ms: cfg.slow_frame_ms, fast_ms: cfg.fast_frame_ms },
        }
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    pub fn performance_mode(&self) -> bool {
        self.performance_mode
    }

    pub fn frame_time_ms(&self) -> f32 {
        self.frame_time_ms
    }

    /// Measure the gap since the previous call and adjust. The first call
    /// only records the timestamp.
    pub fn measure(&mut self, now: Instant) -> FrameClass {
        let prev = self.last_frame.replace(now);
        let Some(prev) = prev else { return FrameClass::Nominal };

        self.frame_time_ms = now.saturating_duration_since(prev).as_secs_f32() * 1000.0;
        let class = classify_frame(self.frame_time_ms, self.budget);
        match class {
            FrameClass::Slow => {
                self.performance_mode = true;
                self.max_particles = self.max_particles.saturating_sub(SLOW_STEP_DOWN).max(self.min_cap);
                debug!(frame_ms = self.frame_time_ms, cap = self.max_particles, "slow frame");
            }
            FrameClass::Fast if self.performance_mode => {
                self.performance_mode = false;
                self.max_particles = (self.max_particles + FAST_STEP_UP).min(self.max_cap);
                debug!(frame_ms = self.frame_time_ms, cap = self.max_particles, "recovered");
            }
            _ => {}
        }
        class
    }

    /// Force performance mode on (cap ≤ 75) or off (cap back to max).
    pub fn set_performance_mode(&mut self, enabled: bool) {
        self.performance_mode = enabled;
        self.max_particles = if enabled {
            self.max_particles.min(FORCED_CAP).max(self.min_cap)
        } else {
            self.max_cap
        };
    }

    /// Periodic density audit: too many live particles outside performance
    /// mode forces it on and lowers the cap. Returns true if it tripped.
    pub fn audit(&mut self, active: usize, threshold: usize) -> bool {
        if self.performance_mode || active <= threshold {
            return false;
        }
        self.performance_mode = true;
        self.max_particles = self.max_particles.saturating_sub(AUDIT_STEP_DOWN).max(self.min_cap);
        true
    }

    /// Fault recovery: performance mode on, cap untouched.
    pub fn force_degraded(&mut self) {
        self.performance_mode = true;
    }

    pub fn reset(&mut self) {
        self.performance_mode = false;
        self.max_particles = self.max_cap;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn governor() -> Governor {
        Governor::new(&EffectsConfig::default())
    }

    #[test]
    fn classify_thresholds_are_strict() {
        let b = FrameBudget { slow_ms: 20.0, fast_ms: 12.0 };
        assert_eq!(classify_frame(20.0, b), FrameClass::Nominal);
        assert_eq!(classify_frame(20.5, b), FrameClass::Slow);
        assert_eq!(classify_frame(12.0, b), FrameClass::Nominal);
        assert_eq!(classify_frame(11.0, b), FrameClass::Fast);
    }

    #[test]
    fn first_measure_only_records() {
        let mut g = governor();
        assert_eq!(g.measure(Instant::now()), FrameClass::Nominal);
        assert!(!g.performance_mode());
        assert_eq!(g.max_particles(), 150);
    }

    #[test]
    fn slow_frame_enters_performance_mode() {
        let mut g = governor();
        let t0 = Instant::now();
        g.measure(t0);
        g.measure(t0 + Duration::from_millis(30));
        assert!(g.performance_mode());
        assert_eq!(g.max_particles(), 140);
    }

    #[test]
    fn fast_frame_outside_performance_mode_is_ignored() {
        let mut g = governor();
        let t0 = Instant::now();
        g.measure(t0);
        g.measure(t0 + Duration::from_millis(5));
        assert!(!g.performance_mode());
        assert_eq!(g.max_particles(), 150);
    }

    #[test]
    fn alternating_frames_stay_in_bounds() {
        let mut g = governor();
        let mut t = Instant::now();
        g.measure(t);
        for i in 0..200 {
            let gap = if i % 3 == 2 { 5 } else { 30 };
            t += Duration::from_millis(gap);
            let was = g.performance_mode();
            let before = g.max_particles();
            let class = g.measure(t);
            assert!((50..=150).contains(&g.max_particles()));
            match class {
                FrameClass::Fast => {
                    assert!(!g.performance_mode());
                    assert!(g.max_particles() <= before + 5);
                    if !was { assert_eq!(g.max_particles(), before); }
                }
                FrameClass::Slow => assert!(g.performance_mode()),
                FrameClass::Nominal => assert_eq!(g.performance_mode(), was),
            }
        }
        assert_eq!(g.max_particles(), 50);
    }

    #[test]
    fn recovery_climbs_to_ceiling() {
        let mut g = governor();
        let mut t = Instant::now();
        g.measure(t);
        for _ in 0..500 {
            t += Duration::from_millis(30);
            g.measure(t);
            t += Duration::from_millis(5);
            g.measure(t);
        }
        // each pair nets -5 until the floor
        assert_eq!(g.max_particles(), 55);
        g.set_performance_mode(false);
        assert_eq!(g.max_particles(), 150);
    }

    #[test]
    fn forced_mode_caps_at_75() {
        let mut g = governor();
        g.set_performance_mode(true);
        assert!(g.performance_mode());
        assert_eq!(g.max_particles(), 75);
        g.set_performance_mode(false);
        assert!(!g.performance_mode());
        assert_eq!(g.max_particles(), 150);
    }

    #[test]
    fn audit_trips_only_when_dense() {
        let mut g = governor();
        assert!(!g.audit(100, 100));
        assert!(g.audit(101, 100));
        assert_eq!(g.max_particles(), 130);
        // already in performance mode
        assert!(!g.audit(140, 100));
    }
}
