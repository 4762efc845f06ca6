//! Named visual presets.
//!
//! The visual variants differ only in constants, so each one is a `Preset`
//! value rather than a separate code path. `tide` is the default.

use crate::color::{ColorConfig, DetailPass, Gradient, Halo, Highlight};
use crate::constants::{DEFAULT_DPR_CAP, DEFAULT_TIME_SCALE, DEFAULT_ZOOM};
use crate::error::{ensure_positive, ConfigError};
use crate::fbm::FbmConfig;
use crate::noise::Interpolation;
use crate::pointer::PointerConfig;
use crate::warp::{Falloff, PointerPull, WarpConfig};
use glam::{Vec2, Vec3};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub interpolation: Interpolation,
    pub fbm: FbmConfig,
    pub warp: WarpConfig,
    pub color: ColorConfig,
    pub pointer: PointerConfig,
    /// Multiplier from accumulated seconds to field time.
    pub time_scale: f32,
    /// Orthographic camera zoom. The surface plane is sized by `1 / zoom`,
    /// so the field always spans the whole target and the pointer lands
    /// under the cursor at any zoom.
    pub zoom: f32,
    pub dpr_cap: f32,
}

impl Default for Preset {
    fn default() -> Self {
        Self::tide()
    }
}

impl Preset {
    pub const NAMES: [&'static str; 3] = ["tide", "ember", "aurora"];

    /// Deep blue water with a mint crest; the reference look.
    pub fn tide() -> Self {
        Self {
            name: "tide",
            interpolation: Interpolation::Cubic,
            fbm: FbmConfig::default(),
            warp: WarpConfig::default(),
            color: ColorConfig::default(),
            pointer: PointerConfig::default(),
            time_scale: DEFAULT_TIME_SCALE,
            zoom: DEFAULT_ZOOM,
            dpr_cap: DEFAULT_DPR_CAP,
        }
    }

    /// Warm, heavier swirl with a soft-edged pointer well and a detail pass.
    pub fn ember() -> Self {
        Self {
            name: "ember",
            interpolation: Interpolation::Quintic,
            fbm: FbmConfig {
                rotation: 0.5,
                offset: Vec2::new(1.7, 9.2),
                ..FbmConfig::default()
            },
            warp: WarpConfig {
                scale: 2.6,
                strength: 0.22,
                pull: PointerPull {
                    falloff: Falloff::Smoothstep {
                        inner: 0.02,
                        outer: 0.22,
                    },
                    cutoff: 0.22,
                    strength: 0.24,
                },
                ..WarpConfig::default()
            },
            color: ColorConfig {
                gradient: Gradient {
                    base: Vec3::new(0.08, 0.02, 0.03),
                    mid: Vec3::new(0.55, 0.16, 0.08),
                    accent: Vec3::new(0.98, 0.72, 0.36),
                },
                halo: Halo {
                    inner: 0.1,
                    outer: 0.9,
                    weight: 0.16,
                },
                lo: 0.15,
                hi: 0.85,
                floor: 0.04,
                ceiling: 0.85,
                global_blend: 0.88,
                detail: Some(DetailPass {
                    scale: 2.3,
                    weight: 0.3,
                }),
                ..ColorConfig::default()
            },
            pointer: PointerConfig {
                alpha: 0.06,
                ..PointerConfig::default()
            },
            time_scale: 0.28,
            ..Self::tide()
        }
    }

    /// Green/violet curtains; tracks pointer velocity to brighten a tinted
    /// highlight and drifts back to center when the pointer rests.
    pub fn aurora() -> Self {
        Self {
            name: "aurora",
            fbm: FbmConfig {
                octaves: 6,
                decay: 0.5,
                growth: 1.9,
                ..FbmConfig::default()
            },
            warp: WarpConfig {
                scale: 3.6,
                strength: 0.1,
                second_offset: Vec2::new(5.2, 1.3),
                pull: PointerPull {
                    falloff: Falloff::Exponential {
                        radius: 0.14,
                        exponent: 2.0,
                    },
                    cutoff: 0.45,
                    strength: 0.12,
                },
                ..WarpConfig::default()
            },
            color: ColorConfig {
                gradient: Gradient {
                    base: Vec3::new(0.01, 0.02, 0.06),
                    mid: Vec3::new(0.22, 0.10, 0.45),
                    accent: Vec3::new(0.35, 0.95, 0.62),
                },
                highlight: Some(Highlight {
                    tint: Vec3::new(0.45, 0.85, 1.0),
                    strength: 0.05,
                    velocity_gain: 0.25,
                }),
                ..ColorConfig::default()
            },
            pointer: PointerConfig {
                alpha: 0.12,
                track_velocity: true,
                recenter_after: Some(6.0),
                ..PointerConfig::default()
            },
            time_scale: 0.42,
            ..Self::tide()
        }
    }

    pub fn named(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "tide" => Some(Self::tide()),
            "ember" => Some(Self::ember()),
            "aurora" => Some(Self::aurora()),
            _ => None,
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::tide(), Self::ember(), Self::aurora()]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fbm.validate()?;
        self.warp.validate()?;
        self.color.validate()?;
        self.pointer.validate()?;
        ensure_positive("time scale", self.time_scale)?;
        ensure_positive("zoom", self.zoom)?;
        ensure_positive("dpr cap", self.dpr_cap)
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::named(s).ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_preset_resolves_and_validates() {
        for name in Preset::NAMES {
            let p = Preset::named(name).unwrap();
            assert_eq!(p.name, name);
            p.validate().unwrap();
        }
        assert_eq!(Preset::named(" Ember ").map(|p| p.name), Some("ember"));
    }

    #[test]
    fn unknown_name_is_a_config_error() {
        let err = "lava".parse::<Preset>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownPreset("lava".into()));
    }

    #[test]
    fn variants_keep_distinct_math() {
        let tide = Preset::tide();
        let ember = Preset::ember();
        let aurora = Preset::aurora();
        assert!(matches!(tide.warp.pull.falloff, Falloff::Exponential { .. }));
        assert!(matches!(ember.warp.pull.falloff, Falloff::Smoothstep { .. }));
        assert!(!tide.pointer.track_velocity);
        assert!(aurora.pointer.track_velocity);
        assert!(ember.color.detail.is_some() && tide.color.detail.is_none());
    }
}
