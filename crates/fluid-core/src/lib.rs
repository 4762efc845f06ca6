pub mod color;
pub mod constants;
pub mod error;
pub mod fbm;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod input;
pub mod noise;
pub mod pointer;
pub mod preset;
pub mod scheduler;
pub mod shader;
pub mod uniforms;
pub mod viewport;
pub mod warp;

pub static FLUID_WGSL: &str = include_str!("../shaders/fluid.wgsl");
pub static BLIT_WGSL: &str = include_str!("../shaders/blit.wgsl");

pub use color::{to_rgba8, ColorConfig};
pub use constants::*;
pub use error::{ConfigError, DrawError, FluidError};
pub use fbm::{fbm, FbmConfig};
pub use input::InputPort;
pub use noise::{Interpolation, ScalarField, ValueNoise};
pub use pointer::{PointerConfig, PointerState};
pub use preset::Preset;
pub use scheduler::{
    FrameHost, FrameScheduler, ManualHost, Renderer, SchedulerState, TickOutcome, TickRequest,
};
pub use shader::{FluidShader, PixelBuffer, SoftwareRenderer};
pub use uniforms::{GpuUniforms, RenderUniforms};
pub use viewport::ViewportState;
pub use warp::{warp, Falloff, WarpConfig, WarpSample};
