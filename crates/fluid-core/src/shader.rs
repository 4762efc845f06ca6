//! CPU evaluation of the fragment program.
//!
//! `fluid.wgsl` and [`FluidShader::shade`] compute the same color for the
//! same inputs. The CPU path backs headless rendering, benchmarks and tests.

use crate::color::to_rgba8;
use crate::error::DrawError;
use crate::noise::ValueNoise;
use crate::preset::Preset;
use crate::scheduler::Renderer;
use crate::uniforms::RenderUniforms;
use crate::warp::warp;
use glam::{UVec2, Vec2, Vec3};

#[derive(Clone, Debug)]
pub struct FluidShader {
    preset: Preset,
    noise: ValueNoise,
}

impl FluidShader {
    pub fn new(preset: Preset) -> Self {
        Self {
            noise: ValueNoise::new(preset.interpolation),
            preset,
        }
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    /// Density before color mapping at fragment coordinate `frag`
    /// (`[0, 1]²`, origin bottom-left). Also returns the pointer influence.
    pub fn density(&self, frag: Vec2, u: &RenderUniforms) -> (f32, f32) {
        let p = &self.preset;
        let t = u.time * p.time_scale;

        let warped = warp(frag, t, u.pointer, &p.warp, &p.fbm, &self.noise);
        let c = &p.color;
        let coord = warped.uv * c.density_scale;
        let drift = Vec2::splat(t * c.density_drift);
        let mut density = p.fbm.sample(&self.noise, coord + drift);
        if let Some(detail) = c.detail {
            let fine = p.fbm.sample(&self.noise, coord * detail.scale - drift);
            density += (fine - density) * detail.weight;
        }
        (density, warped.influence)
    }

    pub fn shade(&self, frag: Vec2, u: &RenderUniforms) -> Vec3 {
        let p = &self.preset;
        let centered = (frag - Vec2::splat(0.5)) * Vec2::new(u.aspect(), 1.0);
        let mask = p.color.halo.mask(centered);
        let (density, influence) = self.density(frag, u);
        p.color.compose(density, mask, influence, u.velocity.length())
    }
}

/// Tightly packed RGBA8 image, row 0 at the top.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    size: UVec2,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(size: UVec2) -> Self {
        let size = size.max(UVec2::ONE);
        Self {
            size,
            pixels: vec![0; (size.x * size.y * 4) as usize],
        }
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        let i = ((y * self.size.x + x) * 4) as usize;
        let mut px = [0; 4];
        px.copy_from_slice(&self.pixels[i..i + 4]);
        Some(px)
    }

    /// Shade every pixel at its center.
    pub fn fill(&mut self, shader: &FluidShader, u: &RenderUniforms) {
        let w = self.size.x as f32;
        let h = self.size.y as f32;
        for (i, px) in self.pixels.chunks_exact_mut(4).enumerate() {
            let x = (i as u32 % self.size.x) as f32;
            let y = (i as u32 / self.size.x) as f32;
            let frag = Vec2::new((x + 0.5) / w, 1.0 - (y + 0.5) / h);
            px.copy_from_slice(&to_rgba8(shader.shade(frag, u)));
        }
    }
}

/// Renderer that shades into a [`PixelBuffer`] on the CPU.
#[derive(Debug)]
pub struct SoftwareRenderer {
    shader: FluidShader,
    buffer: PixelBuffer,
    frames: u64,
}

impl SoftwareRenderer {
    pub fn new(preset: Preset, size: UVec2) -> Self {
        Self {
            shader: FluidShader::new(preset),
            buffer: PixelBuffer::new(size),
            frames: 0,
        }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for SoftwareRenderer {
    fn resize(&mut self, size: UVec2) {
        if size.max(UVec2::ONE) != self.buffer.size() {
            self.buffer = PixelBuffer::new(size);
        }
    }

    fn draw(&mut self, uniforms: &RenderUniforms) -> Result<(), DrawError> {
        let mut u = *uniforms;
        u.resolution = self.buffer.size().as_vec2();
        self.buffer.fill(&self.shader, &u);
        self.frames += 1;
        Ok(())
    }
}
