//! Color composition: density, halo and pointer proximity through fixed stops.

use crate::error::{ensure_positive, ensure_unit, ConfigError};
use glam::{Vec2, Vec3};

/// Hermite step; a degenerate edge pair acts as a hard step at `edge0`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gradient {
    pub base: Vec3,
    pub mid: Vec3,
    pub accent: Vec3,
}

/// Radial vignette brightening the middle of the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Halo {
    pub inner: f32,
    pub outer: f32,
    pub weight: f32,
}

impl Halo {
    /// `centered` is the aspect-corrected offset from the surface center.
    pub fn mask(&self, centered: Vec2) -> f32 {
        smoothstep(self.inner, self.outer, 1.0 - centered.length()) * self.weight
    }
}

/// Finer second density pass blended into the main one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetailPass {
    pub scale: f32,
    pub weight: f32,
}

/// Additive tint around the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Highlight {
    pub tint: Vec3,
    pub strength: f32,
    /// Extra strength per unit of pointer speed (speed clamped to 1).
    pub velocity_gain: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorConfig {
    pub gradient: Gradient,
    pub halo: Halo,
    /// Luminance smoothstep edges.
    pub lo: f32,
    pub hi: f32,
    /// Luminance clamp after the smoothstep.
    pub floor: f32,
    pub ceiling: f32,
    /// Final mix from `base` toward the mid/accent blend.
    pub global_blend: f32,
    pub density_scale: f32,
    pub density_drift: f32,
    pub detail: Option<DetailPass>,
    pub highlight: Option<Highlight>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            gradient: Gradient {
                base: Vec3::new(0.02, 0.05, 0.12),
                mid: Vec3::new(0.10, 0.24, 0.55),
                accent: Vec3::new(0.52, 0.93, 0.86),
            },
            halo: Halo {
                inner: 0.08,
                outer: 0.94,
                weight: 0.12,
            },
            lo: 0.1,
            hi: 0.9,
            floor: 0.05,
            ceiling: 0.78,
            global_blend: 0.82,
            density_scale: 4.0,
            density_drift: 1.0,
            detail: None,
            highlight: None,
        }
    }
}

impl ColorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.lo < self.hi) {
            return Err(ConfigError::Edges {
                name: "luminance",
                lo: self.lo,
                hi: self.hi,
            });
        }
        if !(self.floor <= self.ceiling) {
            return Err(ConfigError::Edges {
                name: "luminance clamp",
                lo: self.floor,
                hi: self.ceiling,
            });
        }
        if !(self.halo.inner < self.halo.outer) {
            return Err(ConfigError::Edges {
                name: "halo",
                lo: self.halo.inner,
                hi: self.halo.outer,
            });
        }
        ensure_unit("global blend", self.global_blend)?;
        ensure_positive("density scale", self.density_scale)?;
        for stop in [self.gradient.base, self.gradient.mid, self.gradient.accent] {
            if !stop.is_finite() {
                return Err(ConfigError::NonFinite("gradient stop"));
            }
        }
        if let Some(detail) = self.detail {
            ensure_positive("detail scale", detail.scale)?;
            ensure_unit("detail weight", detail.weight)?;
        }
        if let Some(h) = self.highlight {
            if !h.tint.is_finite() || !h.strength.is_finite() || !h.velocity_gain.is_finite() {
                return Err(ConfigError::NonFinite("highlight"));
            }
        }
        Ok(())
    }

    /// Clamped luminance for a density plus halo contribution.
    pub fn luminance(&self, density: f32, mask: f32) -> f32 {
        smoothstep(self.lo, self.hi, density + mask).clamp(self.floor, self.ceiling)
    }

    /// Final color, each channel in `[0, 1]`.
    pub fn compose(&self, density: f32, mask: f32, influence: f32, speed: f32) -> Vec3 {
        let g = &self.gradient;
        let lum = self.luminance(density, mask);
        let mut color = g.mid.lerp(g.accent, lum);
        color = g.base.lerp(color, self.global_blend);
        if let Some(h) = self.highlight {
            let gain = h.strength + h.velocity_gain * speed.clamp(0.0, 1.0);
            color += h.tint * influence * gain;
        }
        color.clamp(Vec3::ZERO, Vec3::ONE)
    }
}

/// Opaque 8-bit RGBA; input channels are clamped first.
#[inline]
pub fn to_rgba8(color: Vec3) -> [u8; 4] {
    let c = color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8, 255]
}
