//! wgpu backend shared by the native and web hosts.

use crate::error::{DrawError, FluidError};
use crate::preset::Preset;
use crate::scheduler::Renderer;
use crate::uniforms::{GpuUniforms, RenderUniforms};
use glam::UVec2;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Fullscreen-triangle pipeline running `fluid.wgsl`.
pub struct FluidPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl FluidPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fluid_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::FLUID_WGSL.into()),
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fluid_uniforms"),
            size: std::mem::size_of::<GpuUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("fluid_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fluid_bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fluid_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("fluid_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_fullscreen"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });
        Self {
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, uniforms: &GpuUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("fluid_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}

/// Prefer a linear format: the gradient stops are already display values.
fn pick_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first().copied())
}

/// Size of the intermediate target, or `None` when the field can be shaded
/// straight into the swapchain image.
fn offscreen_size(render: UVec2, surface: UVec2) -> Option<UVec2> {
    let render = render.max(UVec2::ONE).min(surface);
    (render != surface).then_some(render)
}

/// Linear upscale of a texture onto the current render target.
struct BlitPipeline {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl BlitPipeline {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::BLIT_WGSL.into()),
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit_pl"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit_pipeline"),
            layout: Some(&pl),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_blit"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_blit"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            pipeline,
            layout,
            sampler,
        }
    }

    fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        source: &wgpu::BindGroup,
        view: &wgpu::TextureView,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("blit_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, source, &[]);
        rpass.draw(0..3, 0..1);
    }
}

/// Capped-resolution color target sampled by the blit pass.
struct Offscreen {
    size: UVec2,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

impl Offscreen {
    fn new(
        device: &wgpu::Device,
        blit: &BlitPipeline,
        format: wgpu::TextureFormat,
        size: UVec2,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("fluid_offscreen"),
            size: wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit_bg"),
            layout: &blit.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&blit.sampler),
                },
            ],
        });
        Self {
            size,
            view,
            bind_group,
        }
    }
}

/// Renders into a presentable surface (window or canvas).
///
/// The swapchain follows the surface size set by the host, while the field
/// is shaded at the size given to [`Renderer::resize`]. When the two differ
/// the field goes through an offscreen target and is stretched on present.
pub struct SurfaceRenderer<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: FluidPipeline,
    blit: BlitPipeline,
    offscreen: Option<Offscreen>,
    render_size: UVec2,
    preset: Preset,
    device_lost: Arc<AtomicBool>,
}

impl<'w> SurfaceRenderer<'w> {
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'w>,
        size: UVec2,
        preset: Preset,
    ) -> Result<Self, FluidError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| FluidError::ContextLost("no compatible GPU adapter".into()))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: Some("fluid_device"),
                },
                None,
            )
            .await
            .map_err(|e| FluidError::ContextLost(format!("request_device: {e}")))?;

        let device_lost = Arc::new(AtomicBool::new(false));
        let flag = device_lost.clone();
        device.set_device_lost_callback(move |reason, message| {
            log::error!("[gpu] device lost ({reason:?}): {message}");
            flag.store(true, Ordering::SeqCst);
        });

        let caps = surface.get_capabilities(&adapter);
        let format = pick_format(&caps.formats)
            .ok_or_else(|| FluidError::ContextLost("surface reports no formats".into()))?;
        let size = size.max(UVec2::ONE);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.x,
            height: size.y,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "[gpu] adapter={} format={format:?} size={}x{}",
            adapter.get_info().name,
            size.x,
            size.y
        );

        let pipeline = FluidPipeline::new(&device, format);
        let blit = BlitPipeline::new(&device, format);
        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            blit,
            offscreen: None,
            render_size: size,
            preset,
            device_lost,
        })
    }

    /// Swapchain size in physical pixels.
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.config.width, self.config.height)
    }

    /// Size the field is shaded at; never larger than [`Self::size`].
    pub fn render_size(&self) -> UVec2 {
        self.offscreen.as_ref().map_or(self.size(), |o| o.size)
    }

    pub fn resize_surface(&mut self, size: UVec2) {
        let size = size.max(UVec2::ONE);
        if size != self.size() {
            self.config.width = size.x;
            self.config.height = size.y;
            self.surface.configure(&self.device, &self.config);
        }
        self.sync_offscreen();
    }

    fn sync_offscreen(&mut self) {
        match offscreen_size(self.render_size, self.size()) {
            None => self.offscreen = None,
            Some(size) if self.offscreen.as_ref().is_some_and(|o| o.size == size) => {}
            Some(size) => {
                log::debug!("[gpu] offscreen target {}x{}", size.x, size.y);
                self.offscreen = Some(Offscreen::new(
                    &self.device,
                    &self.blit,
                    self.config.format,
                    size,
                ));
            }
        }
    }
}

impl Renderer for SurfaceRenderer<'_> {
    fn resize(&mut self, size: UVec2) {
        self.render_size = size.max(UVec2::ONE);
        self.sync_offscreen();
    }

    fn draw(&mut self, uniforms: &RenderUniforms) -> Result<(), DrawError> {
        if self.device_lost.load(Ordering::SeqCst) {
            return Err(DrawError::ContextLost("device lost".into()));
        }
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Err(DrawError::Skipped("surface reconfigured".into()));
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(DrawError::ContextLost("surface out of memory".into()));
            }
            Err(other) => return Err(DrawError::Skipped(other.to_string())),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // the fragment stage divides by the real target size
        let mut u = *uniforms;
        u.resolution = self.render_size().as_vec2();
        self.pipeline.write(&self.queue, &GpuUniforms::pack(&u, &self.preset));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("fluid_encoder"),
            });
        match &self.offscreen {
            Some(target) => {
                self.pipeline.encode(&mut encoder, &target.view);
                self.blit.encode(&mut encoder, &target.bind_group, &view);
            }
            None => self.pipeline.encode(&mut encoder, &view),
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_format_preferred() {
        let formats = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Bgra8Unorm,
        ];
        assert_eq!(pick_format(&formats), Some(wgpu::TextureFormat::Bgra8Unorm));
        assert_eq!(
            pick_format(&[wgpu::TextureFormat::Rgba8UnormSrgb]),
            Some(wgpu::TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(pick_format(&[]), None);
    }

    #[test]
    fn capped_render_size_goes_through_offscreen_target() {
        let window = UVec2::new(2560, 1440);
        // DPR 2 capped at 1.5
        assert_eq!(
            offscreen_size(UVec2::new(1920, 1080), window),
            Some(UVec2::new(1920, 1080))
        );
        assert_eq!(offscreen_size(window, window), None);
        // never larger than the swapchain, never empty
        assert_eq!(offscreen_size(UVec2::new(4000, 1440), window), None);
        assert_eq!(offscreen_size(UVec2::new(4000, 720), window), Some(UVec2::new(2560, 720)));
        assert_eq!(offscreen_size(UVec2::ZERO, window), Some(UVec2::ONE));
    }
}
