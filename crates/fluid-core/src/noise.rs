//! Lattice value noise.
//!
//! Each integer lattice corner gets a pseudo-random value from a stateless
//! hash; points inside a cell blend the four corners with a smoothed fraction
//! so the field is continuous across cell boundaries.

use glam::Vec2;

/// A pure 2D scalar field. Implementations hold configuration only, never
/// per-sample state, so the same point always yields the same value.
pub trait ScalarField {
    fn sample(&self, p: Vec2) -> f32;
}

/// Fade curve applied to the fractional cell position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// `3t² − 2t³`; C1 continuous.
    #[default]
    Cubic,
    /// `6t⁵ − 15t⁴ + 10t³`; C2 continuous, softer lattice artifacts.
    Quintic,
}

impl Interpolation {
    #[inline]
    pub fn fade(self, t: f32) -> f32 {
        match self {
            Self::Cubic => t * t * (3.0 - 2.0 * t),
            Self::Quintic => t * t * t * (t * (t * 6.0 - 15.0) + 10.0),
        }
    }

    /// Index used by the GPU program.
    pub fn gpu_index(self) -> f32 {
        match self {
            Self::Cubic => 0.0,
            Self::Quintic => 1.0,
        }
    }
}

const HASH_DIR: Vec2 = Vec2::new(12.9898, 78.233);
const HASH_GAIN: f32 = 43_758.547;

/// Corner hash in `[0, 1)`.
#[inline]
pub fn hash(cell: Vec2) -> f32 {
    fract01(cell.dot(HASH_DIR).sin() * HASH_GAIN)
}

#[inline]
fn fract01(x: f32) -> f32 {
    let f = x - x.floor();
    // tiny negative inputs round up to exactly 1.0
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ValueNoise {
    pub interpolation: Interpolation,
}

impl ValueNoise {
    pub const fn new(interpolation: Interpolation) -> Self {
        Self { interpolation }
    }

    /// Noise value in `[0, 1)`.
    pub fn value(&self, p: Vec2) -> f32 {
        let i = p.floor();
        let f = p - i;

        let a = hash(i);
        let b = hash(i + Vec2::X);
        let c = hash(i + Vec2::Y);
        let d = hash(i + Vec2::ONE);

        let ux = self.interpolation.fade(f.x);
        let uy = self.interpolation.fade(f.y);

        // bilinear blend written as the weighted corner sum
        let top = a + (b - a) * ux;
        let bottom = c + (d - c) * ux;
        let v = top + (bottom - top) * uy;
        // non-finite p leaves every corner NaN; max(0.0) maps that to 0
        v.max(0.0).min(a.max(b).max(c).max(d))
    }
}

impl ScalarField for ValueNoise {
    #[inline]
    fn sample(&self, p: Vec2) -> f32 {
        self.value(p)
    }
}

impl<F: ScalarField + ?Sized> ScalarField for &F {
    #[inline]
    fn sample(&self, p: Vec2) -> f32 {
        (**self).sample(p)
    }
}
