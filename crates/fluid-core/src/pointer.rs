//! Pointer field: device coordinates in, smoothed surface coordinates out.
//!
//! `target` follows the most recent pointer event; `smoothed` chases it by a
//! fixed fraction once per tick. With no events the smoothed position simply
//! holds (unless idle recentering is configured).

use crate::constants::{pointer_rest_vec2, DEFAULT_POINTER_ALPHA};
use crate::error::{ensure_positive, ConfigError};
use glam::{UVec2, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerConfig {
    /// Fraction of the remaining distance covered per tick, in (0, 1].
    pub alpha: f32,
    pub track_velocity: bool,
    /// Seconds without events after which the target returns to `rest`.
    pub recenter_after: Option<f32>,
    pub rest: Vec2,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_POINTER_ALPHA,
            track_velocity: false,
            recenter_after: None,
            rest: pointer_rest_vec2(),
        }
    }
}

impl PointerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::Alpha(self.alpha));
        }
        if let Some(secs) = self.recenter_after {
            ensure_positive("pointer recenter delay", secs)?;
        }
        Ok(())
    }
}

/// Device pixels (origin top-left) to surface coordinates (origin
/// bottom-left), clamped to the unit square.
pub fn device_to_normalized(x: f32, y: f32, size: UVec2) -> Vec2 {
    let w = size.x.max(1) as f32;
    let h = size.y.max(1) as f32;
    Vec2::new(x / w, 1.0 - y / h).clamp(Vec2::ZERO, Vec2::ONE)
}

/// Ticks needed for the smoothed value to close all but `tolerance` of a jump.
pub fn ticks_to_settle(alpha: f32, tolerance: f32) -> u32 {
    if alpha >= 1.0 {
        return 1;
    }
    let n = tolerance.ln() / (1.0 - alpha).ln();
    n.ceil().max(1.0) as u32
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointerState {
    config: PointerConfig,
    target: Vec2,
    smoothed: Vec2,
    previous: Vec2,
    velocity: Option<Vec2>,
    idle_sec: f32,
}

impl PointerState {
    pub fn new(config: PointerConfig) -> Self {
        Self::with_position(config, config.rest)
    }

    /// Start with both target and smoothed position at `start`.
    pub fn with_position(config: PointerConfig, start: Vec2) -> Self {
        Self {
            config,
            target: start,
            smoothed: start,
            previous: start,
            velocity: config.track_velocity.then_some(Vec2::ZERO),
            idle_sec: 0.0,
        }
    }

    /// Overwrite the target (surface coordinates). Non-finite input is ignored.
    pub fn set_target(&mut self, target: Vec2) {
        if !target.is_finite() {
            return;
        }
        self.target = target.clamp(Vec2::ZERO, Vec2::ONE);
        self.idle_sec = 0.0;
    }

    pub fn set_target_from_device(&mut self, x: f32, y: f32, size: UVec2) {
        if x.is_finite() && y.is_finite() {
            self.set_target(device_to_normalized(x, y, size));
        }
    }

    /// Advance one tick: one exponential step toward the target.
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.idle_sec += dt;
        if let Some(after) = self.config.recenter_after {
            if self.idle_sec >= after {
                self.target = self.config.rest;
            }
        }

        self.previous = self.smoothed;
        self.smoothed = self.smoothed.lerp(self.target, self.config.alpha);

        if self.config.track_velocity {
            let v = if dt > 0.0 {
                (self.smoothed - self.previous) / dt
            } else {
                Vec2::ZERO
            };
            self.velocity = Some(v);
        }
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn smoothed(&self) -> Vec2 {
        self.smoothed
    }

    /// Surface units per second; `None` unless velocity tracking is enabled.
    pub fn velocity(&self) -> Option<Vec2> {
        self.velocity
    }

    pub fn config(&self) -> &PointerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_origin_is_flipped() {
        let size = UVec2::new(200, 100);
        assert_eq!(device_to_normalized(0.0, 0.0, size), Vec2::new(0.0, 1.0));
        assert_eq!(device_to_normalized(200.0, 100.0, size), Vec2::new(1.0, 0.0));
        assert_eq!(device_to_normalized(50.0, 25.0, size), Vec2::new(0.25, 0.75));
        // outside the surface clamps
        assert_eq!(device_to_normalized(-10.0, 500.0, size), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn holds_position_without_events() {
        let mut p = PointerState::new(PointerConfig::default());
        p.set_target(Vec2::new(0.2, 0.9));
        for _ in 0..500 {
            p.step(1.0 / 60.0);
        }
        let settled = p.smoothed();
        for _ in 0..500 {
            p.step(1.0 / 60.0);
        }
        assert!((p.smoothed() - settled).length() < 1e-4);
        assert!((p.smoothed() - Vec2::new(0.2, 0.9)).length() < 1e-4);
    }

    #[test]
    fn recenters_only_when_configured() {
        let cfg = PointerConfig {
            recenter_after: Some(1.0),
            ..PointerConfig::default()
        };
        let mut p = PointerState::new(cfg);
        p.set_target(Vec2::new(1.0, 1.0));
        for _ in 0..30 {
            p.step(1.0 / 60.0);
        }
        assert_eq!(p.target(), Vec2::new(1.0, 1.0));
        for _ in 0..40 {
            p.step(1.0 / 60.0);
        }
        assert_eq!(p.target(), cfg.rest);
    }

    #[test]
    fn velocity_only_when_tracked() {
        let mut plain = PointerState::new(PointerConfig::default());
        plain.set_target(Vec2::ONE);
        plain.step(0.1);
        assert!(plain.velocity().is_none());

        let cfg = PointerConfig {
            alpha: 0.5,
            track_velocity: true,
            ..PointerConfig::default()
        };
        let mut tracked = PointerState::with_position(cfg, Vec2::ZERO);
        tracked.set_target(Vec2::ONE);
        tracked.step(0.5);
        // moved 0.5 in half a second
        let v = tracked.velocity().unwrap();
        assert!((v - Vec2::ONE).length() < 1e-5);
        tracked.step(0.0);
        assert_eq!(tracked.velocity(), Some(Vec2::ZERO));
    }

    #[test]
    fn settle_ticks_formula() {
        assert_eq!(ticks_to_settle(0.08, 0.01), 56);
        assert_eq!(ticks_to_settle(1.0, 0.01), 1);
        assert_eq!(ticks_to_settle(0.5, 0.01), 7);
    }
}
