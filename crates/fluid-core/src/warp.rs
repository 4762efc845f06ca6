//! Domain warp: displace the sampling coordinate before density evaluation.
//!
//! Two FBM lookups drifting in opposite directions with time produce the
//! advected look; a pointer pull bends the field toward the smoothed pointer.
//! Apparent viscosity comes entirely from this coupling.

use crate::color::smoothstep;
use crate::error::{ensure_positive, ConfigError};
use crate::fbm::FbmConfig;
use crate::noise::ScalarField;
use glam::Vec2;

/// Shape of the pointer influence as a function of distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Falloff {
    /// `exp(−(d / radius)^exponent)`; exactly 1 at the pointer.
    Exponential { radius: f32, exponent: f32 },
    /// `1 − smoothstep(inner, outer, d)`.
    Smoothstep { inner: f32, outer: f32 },
}

impl Falloff {
    pub fn weight(self, distance: f32) -> f32 {
        match self {
            Self::Exponential { radius, exponent } => (-(distance / radius).powf(exponent)).exp(),
            Self::Smoothstep { inner, outer } => 1.0 - smoothstep(inner, outer, distance),
        }
    }

    /// `(kind, p0, p1)` as read by the GPU program.
    pub fn gpu_params(self) -> [f32; 3] {
        match self {
            Self::Exponential { radius, exponent } => [0.0, radius, exponent],
            Self::Smoothstep { inner, outer } => [1.0, inner, outer],
        }
    }

    fn validate(self) -> Result<(), ConfigError> {
        match self {
            Self::Exponential { radius, exponent } => {
                ensure_positive("falloff radius", radius)?;
                ensure_positive("falloff exponent", exponent)
            }
            Self::Smoothstep { inner, outer } => {
                if inner >= 0.0 && inner < outer {
                    Ok(())
                } else {
                    Err(ConfigError::Edges {
                        name: "falloff",
                        lo: inner,
                        hi: outer,
                    })
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerPull {
    pub falloff: Falloff,
    /// Influence is zero at and beyond this distance (surface units).
    pub cutoff: f32,
    pub strength: f32,
}

impl PointerPull {
    /// Pointer-proximity scalar in `[0, 1]`.
    pub fn influence(&self, distance: f32) -> f32 {
        if !(distance < self.cutoff) {
            return 0.0;
        }
        self.falloff.weight(distance).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarpConfig {
    /// Coordinate scale fed to the displacement FBM.
    pub scale: f32,
    pub strength: f32,
    /// Offset of the second displacement lookup.
    pub second_offset: Vec2,
    /// Use two independent lookups; otherwise both axes share the first.
    pub dual: bool,
    pub pull: PointerPull,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            scale: 3.1,
            strength: 0.14,
            second_offset: Vec2::splat(10.0),
            dual: true,
            pull: PointerPull {
                falloff: Falloff::Exponential {
                    radius: 0.1,
                    exponent: 2.4,
                },
                cutoff: 0.3,
                strength: 0.18,
            },
        }
    }
}

impl WarpConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("warp scale", self.scale)?;
        if !self.strength.is_finite() || !self.pull.strength.is_finite() {
            return Err(ConfigError::NonFinite("warp strength"));
        }
        ensure_positive("pointer cutoff", self.pull.cutoff)?;
        self.pull.falloff.validate()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarpSample {
    pub uv: Vec2,
    pub displacement: Vec2,
    /// Pointer-proximity scalar at the unwarped coordinate.
    pub influence: f32,
}

/// Warp `uv` at scaled time `t` toward `pointer`.
pub fn warp<F: ScalarField>(
    uv: Vec2,
    t: f32,
    pointer: Vec2,
    config: &WarpConfig,
    fbm: &FbmConfig,
    field: &F,
) -> WarpSample {
    let base = uv * config.scale;
    let x = fbm.sample(field, base + Vec2::splat(t));
    let y = if config.dual {
        fbm.sample(field, base - Vec2::splat(t) + config.second_offset)
    } else {
        x
    };
    let displacement = Vec2::new(x, y);

    let influence = config.pull.influence(uv.distance(pointer));
    let pull = (pointer - uv) * influence * config.pull.strength;

    WarpSample {
        uv: uv + displacement * config.strength + pull,
        displacement,
        influence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::ValueNoise;

    #[test]
    fn influence_is_one_at_pointer_and_zero_past_cutoff() {
        let pull = WarpConfig::default().pull;
        assert!((pull.influence(0.0) - 1.0).abs() < 1e-6);
        assert_eq!(pull.influence(pull.cutoff), 0.0);
        assert_eq!(pull.influence(5.0), 0.0);
        assert!(pull.influence(0.05) > pull.influence(0.1));
    }

    #[test]
    fn smoothstep_falloff_is_monotone() {
        let f = Falloff::Smoothstep {
            inner: 0.02,
            outer: 0.25,
        };
        assert_eq!(f.weight(0.0), 1.0);
        assert_eq!(f.weight(0.3), 0.0);
        let mut prev = 1.0;
        for i in 0..30 {
            let w = f.weight(i as f32 * 0.01);
            assert!(w <= prev + 1e-6);
            prev = w;
        }
    }

    #[test]
    fn no_pull_far_from_pointer() {
        let noise = ValueNoise::default();
        let cfg = WarpConfig::default();
        let fbm = FbmConfig::default();
        let uv = Vec2::new(0.1, 0.1);
        let s = warp(uv, 1.0, Vec2::new(0.9, 0.9), &cfg, &fbm, &noise);
        assert_eq!(s.influence, 0.0);
        assert!((s.uv - (uv + s.displacement * cfg.strength)).length() < 1e-6);
    }

    #[test]
    fn single_mode_shares_displacement() {
        let noise = ValueNoise::default();
        let cfg = WarpConfig {
            dual: false,
            ..WarpConfig::default()
        };
        let s = warp(Vec2::new(0.4, 0.6), 2.0, Vec2::ZERO, &cfg, &FbmConfig::default(), &noise);
        assert_eq!(s.displacement.x, s.displacement.y);
    }

    #[test]
    fn pointer_pull_moves_toward_pointer() {
        let noise = ValueNoise::default();
        let mut cfg = WarpConfig::default();
        cfg.strength = 0.0;
        let uv = Vec2::new(0.5, 0.5);
        let pointer = Vec2::new(0.52, 0.5);
        let s = warp(uv, 0.0, pointer, &cfg, &FbmConfig::default(), &noise);
        assert!(s.uv.x > uv.x && s.uv.x < pointer.x);
        assert!((s.uv.y - uv.y).abs() < 1e-6);
    }
}
