// Pure helpers behind the browser listeners. No web-sys here so the host
// tests can include this file directly.

use fluid_core::{ConfigError, Preset};
use glam::Vec2;

/// Canvas bounding box in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    /// CSS size scaled to device pixels. Values are passed through
    /// unvalidated; the viewport clamps them.
    pub fn device_size(&self, dpr: f64) -> (f64, f64) {
        let dpr = sanitize_dpr(dpr);
        (self.width * dpr, self.height * dpr)
    }

    /// Client coordinates of a pointer event to device pixels relative to
    /// the canvas, origin top-left.
    pub fn pointer_device_px(&self, client_x: f64, client_y: f64, dpr: f64) -> Option<Vec2> {
        if !(client_x.is_finite() && client_y.is_finite()) {
            return None;
        }
        let dpr = sanitize_dpr(dpr);
        let x = (client_x - self.left) * dpr;
        let y = (client_y - self.top) * dpr;
        Some(Vec2::new(x as f32, y as f32))
    }
}

#[inline]
pub fn sanitize_dpr(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 {
        dpr
    } else {
        1.0
    }
}

/// Seconds between requestAnimationFrame timestamps (milliseconds).
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn elapsed(&mut self, now_ms: f64) -> f64 {
        if !now_ms.is_finite() {
            return 0.0;
        }
        let dt = match self.last_ms {
            Some(prev) => ((now_ms - prev) / 1000.0).max(0.0),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// `?preset=<name>` from `location.search`. Missing selects the default.
pub fn parse_preset_query(search: &str) -> Result<Preset, ConfigError> {
    let query = search.strip_prefix('?').unwrap_or(search);
    let value = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "preset")
        .map(|(_, value)| value.trim());
    match value {
        Some(name) if !name.is_empty() => name.parse(),
        _ => Ok(Preset::default()),
    }
}
