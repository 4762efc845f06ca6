//! Surface size bookkeeping.
//!
//! Hosts report sizes in device pixels. Dimensions are validated here, before
//! any aspect math, so the shading stage never divides by zero.

use crate::constants::{DEFAULT_DPR_CAP, MIN_VIEWPORT_PX};
use crate::error::FluidError;
use glam::UVec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    width: u32,
    height: u32,
    device_pixel_ratio: f32,
    dpr_cap: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            width: MIN_VIEWPORT_PX,
            height: MIN_VIEWPORT_PX,
            device_pixel_ratio: 1.0,
            dpr_cap: DEFAULT_DPR_CAP,
        }
    }
}

/// Validate a reported size before it reaches any aspect math.
pub fn checked_dimension(width: f64, height: f64) -> Result<(u32, u32), FluidError> {
    let ok = |v: f64| v.is_finite() && v >= MIN_VIEWPORT_PX as f64;
    if ok(width) && ok(height) {
        Ok((width.round() as u32, height.round() as u32))
    } else {
        Err(FluidError::InvalidViewport { width, height })
    }
}

fn clamp_dimension(v: f64) -> u32 {
    if v.is_finite() && v >= MIN_VIEWPORT_PX as f64 {
        v.round().min(u32::MAX as f64) as u32
    } else {
        MIN_VIEWPORT_PX
    }
}

impl ViewportState {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f32, dpr_cap: f32) -> Self {
        let mut vp = Self {
            dpr_cap: if dpr_cap.is_finite() && dpr_cap > 0.0 {
                dpr_cap
            } else {
                DEFAULT_DPR_CAP
            },
            ..Self::default()
        };
        vp.set_device_pixel_ratio(device_pixel_ratio);
        vp.resize(width, height);
        vp
    }

    /// Apply a resize notification. Invalid dimensions are clamped to 1 px.
    pub fn resize(&mut self, width: f64, height: f64) {
        match checked_dimension(width, height) {
            Ok((w, h)) => {
                self.width = w;
                self.height = h;
            }
            Err(err) => {
                log::warn!("[viewport] {err}");
                self.width = clamp_dimension(width);
                self.height = clamp_dimension(height);
            }
        }
    }

    pub fn set_device_pixel_ratio(&mut self, dpr: f32) {
        self.device_pixel_ratio = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    pub fn dpr_cap(&self) -> f32 {
        self.dpr_cap
    }

    pub fn effective_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio.min(self.dpr_cap)
    }

    /// Shaded resolution: device size scaled down when the display density
    /// exceeds the cap.
    pub fn render_resolution(&self) -> UVec2 {
        let scale = self.effective_pixel_ratio() / self.device_pixel_ratio;
        let w = ((self.width as f32 * scale).round() as u32).max(MIN_VIEWPORT_PX);
        let h = ((self.height as f32 * scale).round() as u32).max(MIN_VIEWPORT_PX);
        UVec2::new(w, h)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
