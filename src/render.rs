use fluid_core::gpu::SurfaceRenderer;
use fluid_core::{DrawError, Preset, RenderUniforms, Renderer};
use glam::UVec2;
use web_sys as web;

/// WebGPU surface on a canvas whose backing store tracks the capped
/// render resolution; CSS stretches it over the element.
pub struct CanvasRenderer {
    canvas: web::HtmlCanvasElement,
    gpu: SurfaceRenderer<'static>,
}

impl CanvasRenderer {
    pub async fn new(
        canvas: web::HtmlCanvasElement,
        size: UVec2,
        preset: Preset,
    ) -> anyhow::Result<Self> {
        let size = size.max(UVec2::ONE);
        canvas.set_width(size.x);
        canvas.set_height(size.y);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let gpu = SurfaceRenderer::new(&instance, surface, size, preset).await?;
        Ok(Self { canvas, gpu })
    }
}

impl Renderer for CanvasRenderer {
    fn resize(&mut self, size: UVec2) {
        let size = size.max(UVec2::ONE);
        if self.canvas.width() != size.x || self.canvas.height() != size.y {
            self.canvas.set_width(size.x);
            self.canvas.set_height(size.y);
        }
        self.gpu.resize_surface(size);
        self.gpu.resize(size);
    }

    fn draw(&mut self, uniforms: &RenderUniforms) -> Result<(), DrawError> {
        self.gpu.draw(uniforms)
    }
}
