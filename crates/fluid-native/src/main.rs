use clap::Parser;
use fluid_core::gpu::SurfaceRenderer;
use fluid_core::{
    DrawError, FrameScheduler, Preset, RenderUniforms, Renderer, TickOutcome, ViewportState,
};
use glam::UVec2;
use winit::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::{Window, WindowBuilder},
};

mod bench;
mod host;

use host::{FrameClock, WindowHost};

#[derive(Parser, Debug, Clone)]
#[command(name = "fluid-native", version, about = "Pointer-reactive procedural noise field")]
struct Args {
    /// Visual preset: tide, ember or aurora.
    #[arg(long, env = "FLUID_PRESET", default_value = "tide")]
    preset: Preset,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Render this many frames headless on the CPU and report frames/second.
    #[arg(long)]
    bench: Option<u32>,
}

/// Surface renderer whose swapchain tracks the window while the field is
/// shaded at the DPR-capped size the scheduler hands to `resize`.
struct WindowRenderer<'w> {
    gpu: SurfaceRenderer<'w>,
    window: &'w Window,
}

impl<'w> WindowRenderer<'w> {
    async fn new(
        instance: &wgpu::Instance,
        window: &'w Window,
        preset: Preset,
    ) -> anyhow::Result<Self> {
        let surface = instance.create_surface(window)?;
        let size = window.inner_size();
        let gpu = SurfaceRenderer::new(
            instance,
            surface,
            UVec2::new(size.width, size.height),
            preset,
        )
        .await?;
        Ok(Self { gpu, window })
    }
}

impl Renderer for WindowRenderer<'_> {
    // swapchain at the window size, field shaded at the capped size
    fn resize(&mut self, size: UVec2) {
        let inner = self.window.inner_size();
        self.gpu.resize_surface(UVec2::new(inner.width, inner.height));
        self.gpu.resize(size);
    }

    fn draw(&mut self, uniforms: &RenderUniforms) -> Result<(), DrawError> {
        self.gpu.draw(uniforms)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let preset = args.preset;
    preset.validate()?;

    if let Some(frames) = args.bench {
        bench::run(preset, UVec2::new(args.width, args.height), frames)?;
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(format!("fluidfield ({})", preset.name))
        .with_inner_size(LogicalSize::new(args.width, args.height))
        .build(&event_loop)?;
    // the renderer and host borrow the window for the whole loop
    let window = &window;

    let instance = wgpu::Instance::default();
    let renderer = pollster::block_on(WindowRenderer::new(&instance, window, preset))?;
    let size = window.inner_size();
    let viewport = ViewportState::new(
        size.width as f64,
        size.height as f64,
        window.scale_factor() as f32,
        preset.dpr_cap,
    );
    let mut scheduler = FrameScheduler::new(preset, viewport, renderer, WindowHost::new(window))?;
    scheduler.start()?;
    let mut clock = FrameClock::default();

    event_loop.run(move |event, elwt| {
        let Event::WindowEvent { event, window_id } = event else {
            return;
        };
        if window_id != window.id() {
            return;
        }
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(port) = scheduler.host().listener() {
                    port.pointer_moved(position.x as f32, position.y as f32);
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(port) = scheduler.host().listener() {
                    port.resized(size.width as f64, size.height as f64);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(port) = scheduler.host().listener() {
                    port.scale_factor_changed(scale_factor as f32);
                }
            }
            WindowEvent::RedrawRequested => {
                if scheduler.host_mut().take_pending().is_none() {
                    return;
                }
                if scheduler.tick(clock.elapsed()) != TickOutcome::ContextLost {
                    return;
                }
                // rebuild against the same window and resume
                match pollster::block_on(WindowRenderer::new(&instance, window, preset)) {
                    Ok(fresh) => {
                        let resumed = scheduler.recover(fresh).and_then(|()| scheduler.start());
                        if let Err(err) = resumed {
                            log::error!("[native] cannot resume: {err}");
                            elwt.exit();
                        }
                        clock.reset();
                    }
                    Err(err) => {
                        log::error!("[native] renderer rebuild failed: {err:#}");
                        elwt.exit();
                    }
                }
            }
            WindowEvent::CloseRequested => {
                scheduler.dispose();
                elwt.exit();
            }
            _ => {}
        }
    })?;
    Ok(())
}
