//! Fractal sum of noise octaves.

use crate::constants::MAX_OCTAVES;
use crate::error::{ensure_positive, ConfigError};
use crate::noise::ScalarField;
use glam::{Mat2, Vec2};

/// Octave layout for one fractal evaluation.
///
/// The octave loop always runs `octaves` times; there is no early exit, so two
/// configurations sharing constants produce identical output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FbmConfig {
    pub octaves: u32,
    /// Amplitude of the first octave.
    pub amplitude: f32,
    /// Per-octave amplitude multiplier; must lie in (0, 1) for the sum to converge.
    pub decay: f32,
    /// Sampling frequency of the first octave.
    pub frequency: f32,
    /// Per-octave frequency multiplier.
    pub growth: f32,
    /// Scale applied to the running coordinate between octaves.
    pub domain_scale: f32,
    /// Constant shift applied to the running coordinate between octaves.
    pub offset: Vec2,
    /// Per-octave rotation in radians (0 disables).
    pub rotation: f32,
}

impl Default for FbmConfig {
    fn default() -> Self {
        Self {
            octaves: 5,
            amplitude: 0.5,
            decay: 0.55,
            frequency: 1.5,
            growth: 1.7,
            domain_scale: 2.0,
            offset: Vec2::new(0.0, 1.0),
            rotation: 0.0,
        }
    }
}

impl FbmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.octaves == 0 || self.octaves > MAX_OCTAVES {
            return Err(ConfigError::Octaves(self.octaves));
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(ConfigError::Decay(self.decay));
        }
        ensure_positive("fbm amplitude", self.amplitude)?;
        ensure_positive("fbm frequency", self.frequency)?;
        ensure_positive("fbm growth", self.growth)?;
        ensure_positive("fbm domain scale", self.domain_scale)?;
        if !self.offset.is_finite() || !self.rotation.is_finite() {
            return Err(ConfigError::NonFinite("fbm offset/rotation"));
        }
        Ok(())
    }

    /// Upper bound of the sum for a field in `[0, 1)`: `a·(1 − dⁿ)/(1 − d)`.
    pub fn amplitude_sum(&self) -> f32 {
        let n = self.octaves as i32;
        self.amplitude * (1.0 - self.decay.powi(n)) / (1.0 - self.decay)
    }

    pub fn sample<F: ScalarField>(&self, field: &F, p: Vec2) -> f32 {
        let rot = Mat2::from_angle(self.rotation);
        let mut p = p;
        let mut value = 0.0;
        let mut amplitude = self.amplitude;
        let mut frequency = self.frequency;
        for _ in 0..self.octaves {
            value += amplitude * field.sample(p * frequency);
            p = rot * (p * self.domain_scale) + self.offset;
            amplitude *= self.decay;
            frequency *= self.growth;
        }
        value
    }

    /// Sum renormalized by [`Self::amplitude_sum`] and clamped to `[0, 1]`.
    pub fn sample_normalized<F: ScalarField>(&self, field: &F, p: Vec2) -> f32 {
        let bound = self.amplitude_sum();
        if bound > 0.0 {
            (self.sample(field, p) / bound).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[inline]
pub fn fbm<F: ScalarField>(p: Vec2, config: &FbmConfig, field: &F) -> f32 {
    config.sample(field, p)
}
