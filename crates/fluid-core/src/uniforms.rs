//! Per-frame values handed to a renderer, and their GPU layout.

use crate::color::{DetailPass, Highlight};
use crate::preset::Preset;
use glam::{UVec2, Vec2};

/// Values that change every tick. Preset constants travel separately.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderUniforms {
    /// Accumulated seconds since start, before the preset time scale.
    pub time: f32,
    /// Smoothed pointer in surface coordinates.
    pub pointer: Vec2,
    /// Smoothed pointer velocity; zero when the preset does not track it.
    pub velocity: Vec2,
    /// Shaded resolution in pixels.
    pub resolution: Vec2,
    pub frame: u64,
}

impl RenderUniforms {
    pub fn new(resolution: UVec2) -> Self {
        Self {
            time: 0.0,
            pointer: Vec2::splat(0.5),
            velocity: Vec2::ZERO,
            resolution: resolution.as_vec2(),
            frame: 0,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.resolution.y > 0.0 {
            self.resolution.x / self.resolution.y
        } else {
            1.0
        }
    }
}

/// Uniform block of `fluid.wgsl`. Every field is a `vec4<f32>` so the std140
/// layout matches the Rust layout without padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuUniforms {
    /// time, time_scale, zoom, interpolation
    pub frame: [f32; 4],
    /// pointer.xy, velocity.xy
    pub pointer: [f32; 4],
    /// width, height, aspect, -
    pub resolution: [f32; 4],
    /// octaves, amplitude, decay, frequency
    pub fbm_a: [f32; 4],
    /// growth, domain_scale, offset.xy
    pub fbm_b: [f32; 4],
    /// rotation, -, -, -
    pub fbm_c: [f32; 4],
    /// scale, strength, second_offset.xy
    pub warp: [f32; 4],
    /// falloff kind, p0, p1, cutoff
    pub pull: [f32; 4],
    /// pull strength, dual, -, -
    pub pull_b: [f32; 4],
    /// lo, hi, floor, ceiling
    pub shade: [f32; 4],
    /// global_blend, density_scale, density_drift, -
    pub shade_b: [f32; 4],
    /// inner, outer, weight, -
    pub halo: [f32; 4],
    /// scale, weight, enabled, -
    pub detail: [f32; 4],
    pub base: [f32; 4],
    pub mid: [f32; 4],
    pub accent: [f32; 4],
    /// tint.rgb, strength
    pub highlight: [f32; 4],
    /// velocity_gain, enabled, -, -
    pub highlight_b: [f32; 4],
}

fn flag(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}

impl GpuUniforms {
    pub fn pack(frame: &RenderUniforms, preset: &Preset) -> Self {
        let fbm = &preset.fbm;
        let warp = &preset.warp;
        let color = &preset.color;
        let [kind, p0, p1] = warp.pull.falloff.gpu_params();
        let detail = color.detail.unwrap_or(DetailPass {
            scale: 1.0,
            weight: 0.0,
        });
        let highlight = color.highlight.unwrap_or(Highlight {
            tint: glam::Vec3::ZERO,
            strength: 0.0,
            velocity_gain: 0.0,
        });

        Self {
            frame: [
                frame.time,
                preset.time_scale,
                preset.zoom,
                preset.interpolation.gpu_index(),
            ],
            pointer: [
                frame.pointer.x,
                frame.pointer.y,
                frame.velocity.x,
                frame.velocity.y,
            ],
            resolution: [
                frame.resolution.x,
                frame.resolution.y,
                frame.aspect(),
                0.0,
            ],
            fbm_a: [fbm.octaves as f32, fbm.amplitude, fbm.decay, fbm.frequency],
            fbm_b: [fbm.growth, fbm.domain_scale, fbm.offset.x, fbm.offset.y],
            fbm_c: [fbm.rotation, 0.0, 0.0, 0.0],
            warp: [
                warp.scale,
                warp.strength,
                warp.second_offset.x,
                warp.second_offset.y,
            ],
            pull: [kind, p0, p1, warp.pull.cutoff],
            pull_b: [warp.pull.strength, flag(warp.dual), 0.0, 0.0],
            shade: [color.lo, color.hi, color.floor, color.ceiling],
            shade_b: [color.global_blend, color.density_scale, color.density_drift, 0.0],
            halo: [color.halo.inner, color.halo.outer, color.halo.weight, 0.0],
            detail: [detail.scale, detail.weight, flag(color.detail.is_some()), 0.0],
            base: color.gradient.base.extend(1.0).to_array(),
            mid: color.gradient.mid.extend(1.0).to_array(),
            accent: color.gradient.accent.extend(1.0).to_array(),
            highlight: highlight.tint.extend(highlight.strength).to_array(),
            highlight_b: [
                highlight.velocity_gain,
                flag(color.highlight.is_some()),
                0.0,
                0.0,
            ],
        }
    }
}
