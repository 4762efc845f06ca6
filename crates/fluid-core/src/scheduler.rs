//! Frame scheduler: owns the render loop and its lifecycle.
//!
//! The scheduler never calls a refresh API itself. A [`FrameHost`] turns
//! tick requests into display callbacks (`requestAnimationFrame`, winit
//! redraws, or a manual loop) and calls [`FrameScheduler::tick`] with the
//! elapsed seconds. Exactly one draw is issued per tick.

use crate::constants::{MAX_TICK_DELTA_SEC, TIME_PRECISION_WARN_SEC};
use crate::error::{DrawError, FluidError};
use crate::input::InputPort;
use crate::pointer::PointerState;
use crate::preset::Preset;
use crate::uniforms::RenderUniforms;
use crate::viewport::ViewportState;
use glam::{UVec2, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    /// The rendering context failed; waiting for [`FrameScheduler::recover`].
    Lost,
    Disposed,
}

/// Drawing backend.
pub trait Renderer {
    /// Shaded resolution changed.
    fn resize(&mut self, size: UVec2);
    fn draw(&mut self, uniforms: &RenderUniforms) -> Result<(), DrawError>;
}

/// Handle to one outstanding display-refresh callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickRequest(pub u64);

/// Display-refresh and event plumbing of the embedding environment.
pub trait FrameHost {
    /// Schedule one callback for the next refresh. `None` if the host cannot.
    fn request_tick(&mut self) -> Option<TickRequest>;
    fn cancel_tick(&mut self, request: TickRequest);
    /// Register pointer and resize listeners that write into `port`.
    fn attach_listeners(&mut self, port: &InputPort);
    fn detach_listeners(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Drawn,
    /// The draw failed transiently; the next tick is already requested.
    Skipped,
    ContextLost,
    /// Not running; nothing happened.
    Inactive,
}

/// Clamp a reported frame delta: non-finite or negative becomes 0, long
/// stalls (tab in background, debugger) are capped.
pub fn sanitize_delta(elapsed: f64) -> f64 {
    if elapsed.is_finite() && elapsed > 0.0 {
        elapsed.min(MAX_TICK_DELTA_SEC)
    } else {
        0.0
    }
}

pub struct FrameScheduler<R: Renderer, H: FrameHost> {
    preset: Preset,
    state: SchedulerState,
    renderer: R,
    host: H,
    port: InputPort,
    viewport: ViewportState,
    pointer: PointerState,
    uniforms: RenderUniforms,
    time: f64,
    frame: u64,
    pending: Option<TickRequest>,
    listening: bool,
    loss_signaled: bool,
    precision_warned: bool,
    on_context_lost: Option<Box<dyn FnMut(&FluidError)>>,
}

impl<R: Renderer, H: FrameHost> FrameScheduler<R, H> {
    pub fn new(
        preset: Preset,
        viewport: ViewportState,
        renderer: R,
        host: H,
    ) -> Result<Self, FluidError> {
        preset.validate()?;
        let uniforms = RenderUniforms {
            pointer: preset.pointer.rest,
            ..RenderUniforms::new(viewport.render_resolution())
        };
        Ok(Self {
            pointer: PointerState::new(preset.pointer),
            preset,
            state: SchedulerState::Idle,
            renderer,
            host,
            port: InputPort::new(),
            viewport,
            uniforms,
            time: 0.0,
            frame: 0,
            pending: None,
            listening: false,
            loss_signaled: false,
            precision_warned: false,
            on_context_lost: None,
        })
    }

    /// Called once per loss, from inside the failing tick.
    pub fn on_context_lost(&mut self, callback: impl FnMut(&FluidError) + 'static) {
        self.on_context_lost = Some(Box::new(callback));
    }

    pub fn start(&mut self) -> Result<(), FluidError> {
        match self.state {
            SchedulerState::Running => return Ok(()),
            SchedulerState::Idle => {}
            state => {
                return Err(FluidError::InvalidState {
                    state,
                    action: "start",
                })
            }
        }
        if !self.listening {
            self.host.attach_listeners(&self.port);
            self.listening = true;
        }
        self.renderer.resize(self.viewport.render_resolution());
        self.state = SchedulerState::Running;
        self.request_next();
        log::info!(
            "[scheduler] running preset={} size={}x{}",
            self.preset.name,
            self.viewport.size().x,
            self.viewport.size().y
        );
        Ok(())
    }

    /// Pause; listeners stay attached so the latest input is kept.
    pub fn stop(&mut self) {
        if self.state != SchedulerState::Running {
            return;
        }
        self.cancel_pending();
        self.state = SchedulerState::Idle;
        log::info!("[scheduler] stopped at t={:.2}s", self.time);
    }

    /// Release everything. Safe to call any number of times.
    pub fn dispose(&mut self) {
        if self.state == SchedulerState::Disposed {
            return;
        }
        self.cancel_pending();
        if self.listening {
            self.host.detach_listeners();
            self.listening = false;
        }
        self.port.close();
        self.state = SchedulerState::Disposed;
        log::info!("[scheduler] disposed after {} frames", self.frame);
    }

    /// Swap in a rebuilt renderer after a context loss. Time and pointer
    /// state carry over; call [`Self::start`] to resume.
    pub fn recover(&mut self, renderer: R) -> Result<(), FluidError> {
        if self.state != SchedulerState::Lost {
            return Err(FluidError::InvalidState {
                state: self.state,
                action: "recover",
            });
        }
        self.renderer = renderer;
        self.renderer.resize(self.viewport.render_resolution());
        self.loss_signaled = false;
        self.state = SchedulerState::Idle;
        log::info!("[scheduler] renderer recovered");
        Ok(())
    }

    pub fn tick(&mut self, elapsed: f64) -> TickOutcome {
        if self.state != SchedulerState::Running {
            return TickOutcome::Inactive;
        }
        self.pending = None;

        let delta = sanitize_delta(elapsed);
        self.apply_viewport_input();

        self.time += delta;
        if !self.precision_warned && self.time > TIME_PRECISION_WARN_SEC {
            self.precision_warned = true;
            log::warn!(
                "[scheduler] {:.0}s elapsed; shader time resolution is now coarser than a frame",
                self.time
            );
        }

        if let Some(p) = self.port.take_pointer() {
            self.pointer.set_target_from_device(p.x, p.y, self.viewport.size());
        }
        self.pointer.step(delta as f32);

        self.frame += 1;
        self.uniforms = RenderUniforms {
            time: self.time as f32,
            pointer: self.pointer.smoothed(),
            velocity: self.pointer.velocity().unwrap_or(Vec2::ZERO),
            resolution: self.viewport.render_resolution().as_vec2(),
            frame: self.frame,
        };

        match self.renderer.draw(&self.uniforms) {
            Ok(()) => {
                self.request_next();
                TickOutcome::Drawn
            }
            Err(DrawError::Skipped(reason)) => {
                log::debug!("[scheduler] frame {} skipped: {reason}", self.frame);
                self.request_next();
                TickOutcome::Skipped
            }
            Err(DrawError::ContextLost(reason)) => {
                self.enter_lost(FluidError::ContextLost(reason));
                TickOutcome::ContextLost
            }
        }
    }

    fn apply_viewport_input(&mut self) {
        let mut changed = false;
        if let Some(dpr) = self.port.take_scale_factor() {
            self.viewport.set_device_pixel_ratio(dpr);
            changed = true;
        }
        if let Some((w, h)) = self.port.take_resize() {
            self.viewport.resize(w, h);
            changed = true;
        }
        if changed {
            self.renderer.resize(self.viewport.render_resolution());
        }
    }

    fn enter_lost(&mut self, err: FluidError) {
        self.state = SchedulerState::Lost;
        self.cancel_pending();
        if self.listening {
            self.host.detach_listeners();
            self.listening = false;
        }
        if !self.loss_signaled {
            self.loss_signaled = true;
            log::error!("[scheduler] {err}");
            if let Some(cb) = self.on_context_lost.as_mut() {
                cb(&err);
            }
        }
    }

    fn request_next(&mut self) {
        self.pending = self.host.request_tick();
        if self.pending.is_none() {
            log::warn!("[scheduler] host could not schedule the next frame");
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(req) = self.pending.take() {
            self.host.cancel_tick(req);
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Accumulated seconds since the first tick.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn pending(&self) -> Option<TickRequest> {
        self.pending
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn uniforms(&self) -> &RenderUniforms {
        &self.uniforms
    }

    /// A handle listeners can write into.
    pub fn input(&self) -> InputPort {
        self.port.clone()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

/// Host that records requests instead of talking to a display. The caller
/// drives ticks; an attached listener is modeled by keeping a port handle.
#[derive(Debug, Default)]
pub struct ManualHost {
    next_id: u64,
    pending: Option<TickRequest>,
    listener: Option<InputPort>,
    pub requests: u64,
    pub cancels: u64,
    pub attaches: u64,
    pub detaches: u64,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<TickRequest> {
        self.pending
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// The port as seen by the attached listeners.
    pub fn listener(&self) -> Option<&InputPort> {
        self.listener.as_ref()
    }
}

impl FrameHost for ManualHost {
    fn request_tick(&mut self) -> Option<TickRequest> {
        self.next_id += 1;
        self.requests += 1;
        let req = TickRequest(self.next_id);
        self.pending = Some(req);
        Some(req)
    }

    fn cancel_tick(&mut self, request: TickRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
        self.cancels += 1;
    }

    fn attach_listeners(&mut self, port: &InputPort) {
        self.attaches += 1;
        self.listener = Some(port.clone());
    }

    fn detach_listeners(&mut self) {
        self.detaches += 1;
        self.listener = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        draws: u32,
        sizes: Vec<UVec2>,
        fail_with: Option<DrawError>,
    }

    impl Renderer for Recording {
        fn resize(&mut self, size: UVec2) {
            self.sizes.push(size);
        }

        fn draw(&mut self, _u: &RenderUniforms) -> Result<(), DrawError> {
            self.draws += 1;
            match self.fail_with.clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    fn scheduler() -> FrameScheduler<Recording, ManualHost> {
        let vp = ViewportState::new(640.0, 480.0, 1.0, 1.5);
        FrameScheduler::new(Preset::tide(), vp, Recording::default(), ManualHost::new()).unwrap()
    }

    #[test]
    fn delta_sanitizing() {
        assert_eq!(sanitize_delta(f64::NAN), 0.0);
        assert_eq!(sanitize_delta(-1.0), 0.0);
        assert_eq!(sanitize_delta(f64::INFINITY), 0.0);
        assert_eq!(sanitize_delta(5.0), MAX_TICK_DELTA_SEC);
        assert_eq!(sanitize_delta(0.016), 0.016);
    }

    #[test]
    fn tick_before_start_is_inactive() {
        let mut s = scheduler();
        assert_eq!(s.tick(0.1), TickOutcome::Inactive);
        assert_eq!(s.time(), 0.0);
        assert_eq!(s.renderer().draws, 0);
    }

    #[test]
    fn start_is_idempotent_and_attaches_once() {
        let mut s = scheduler();
        s.start().unwrap();
        s.start().unwrap();
        assert_eq!(s.host().attaches, 1);
        assert_eq!(s.host().requests, 1);
        assert_eq!(s.renderer().sizes, vec![UVec2::new(640, 480)]);
    }

    #[test]
    fn one_draw_per_tick() {
        let mut s = scheduler();
        s.start().unwrap();
        for _ in 0..3 {
            assert_eq!(s.tick(1.0 / 60.0), TickOutcome::Drawn);
        }
        assert_eq!(s.renderer().draws, 3);
        assert_eq!(s.frame(), 3);
        assert!(s.pending().is_some());
    }

    #[test]
    fn skipped_frames_keep_running() {
        let mut s = scheduler();
        s.renderer_mut().fail_with = Some(DrawError::Skipped("outdated".into()));
        s.start().unwrap();
        assert_eq!(s.tick(0.01), TickOutcome::Skipped);
        assert!(s.is_running());
        assert!(s.pending().is_some());
    }

    #[test]
    fn recover_requires_lost_state() {
        let mut s = scheduler();
        let err = s.recover(Recording::default()).unwrap_err();
        assert_eq!(
            err,
            FluidError::InvalidState {
                state: SchedulerState::Idle,
                action: "recover"
            }
        );
        s.dispose();
        assert!(s.start().is_err());
    }

    #[test]
    fn resize_input_reaches_renderer() {
        let mut s = scheduler();
        s.start().unwrap();
        s.input().resized(0.0, 0.0);
        s.tick(0.01);
        assert_eq!(s.viewport().size(), UVec2::ONE);
        assert_eq!(s.renderer().sizes.last(), Some(&UVec2::ONE));
        assert!(s.uniforms().resolution.is_finite());
    }
}
