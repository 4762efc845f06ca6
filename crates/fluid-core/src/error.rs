//! Error taxonomy shared by the core and the frontends.
//!
//! Field math (noise, warp, color) never fails once the viewport is validated;
//! everything here concerns configuration, lifecycle and the rendering backend.

use crate::constants::MAX_OCTAVES;
use crate::scheduler::SchedulerState;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FluidError {
    /// The rendering backend became unusable (device reset, resource exhaustion).
    #[error("rendering context lost: {0}")]
    ContextLost(String),
    /// Zero, negative or non-finite viewport dimensions were reported.
    #[error("invalid viewport {width}x{height}; clamped to the minimum size")]
    InvalidViewport { width: f64, height: f64 },
    #[error("scheduler is {state:?}; cannot {action}")]
    InvalidState {
        state: SchedulerState,
        action: &'static str,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("octave count {0} outside 1..={max}", max = MAX_OCTAVES)]
    Octaves(u32),
    #[error("amplitude decay {0} must lie in (0, 1)")]
    Decay(f32),
    #[error("smoothing factor {0} must lie in (0, 1]")]
    Alpha(f32),
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("{0} must be finite")]
    NonFinite(&'static str),
    #[error("{name} must lie in [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f32 },
    #[error("{name} edges must satisfy lo < hi, got {lo} and {hi}")]
    Edges {
        name: &'static str,
        lo: f32,
        hi: f32,
    },
    #[error("unknown preset {0:?}")]
    UnknownPreset(String),
}

/// Outcome of a single failed draw.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DrawError {
    /// The context cannot be used again; the owner must rebuild the renderer.
    #[error("rendering context lost: {0}")]
    ContextLost(String),
    /// This frame could not be produced (surface outdated, timeout); try again next tick.
    #[error("frame skipped: {0}")]
    Skipped(String),
}

pub(crate) fn ensure_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

pub(crate) fn ensure_unit(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { name, value })
    }
}
