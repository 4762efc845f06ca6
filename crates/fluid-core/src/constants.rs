use glam::Vec2;

// Shared tuning constants used by the core and both frontends.

// Frame pacing
pub const TARGET_FPS: f32 = 60.0;
pub const MAX_TICK_DELTA_SEC: f64 = 0.25; // longer gaps (backgrounded tab, debugger) advance by this much
pub const TIME_PRECISION_WARN_SEC: f64 = 65_536.0; // f32 time step exceeds ~7ms past this point

// Viewport
pub const MIN_VIEWPORT_PX: u32 = 1;
pub const DEFAULT_DPR_CAP: f32 = 1.5;
pub const DEFAULT_ZOOM: f32 = 1.2; // orthographic projection zoom of the surface plane

// Pointer
pub const DEFAULT_POINTER_ALPHA: f32 = 0.08; // per-tick exponential smoothing factor
pub const POINTER_REST: [f32; 2] = [0.5, 0.5]; // surface-space rest position
pub const POINTER_SETTLE_TOLERANCE: f32 = 0.01;

// Fractal noise
pub const MAX_OCTAVES: u32 = 8; // also the octave loop bound in fluid.wgsl

// Time
pub const DEFAULT_TIME_SCALE: f32 = 0.35;

#[inline]
pub fn pointer_rest_vec2() -> Vec2 {
    Vec2::new(POINTER_REST[0], POINTER_REST[1])
}
