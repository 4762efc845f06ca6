// Lifecycle of the frame scheduler driven through ManualHost.

use fluid_core::*;
use glam::{UVec2, Vec2};
use std::cell::Cell;
use std::rc::Rc;

/// Renders into a pixel buffer and can be told to fail.
struct Flaky {
    inner: SoftwareRenderer,
    lose_context: bool,
}

impl Flaky {
    fn new() -> Self {
        Self {
            inner: SoftwareRenderer::new(Preset::tide(), UVec2::new(8, 6)),
            lose_context: false,
        }
    }
}

impl Renderer for Flaky {
    fn resize(&mut self, size: UVec2) {
        self.inner.resize(size);
    }

    fn draw(&mut self, uniforms: &RenderUniforms) -> Result<(), DrawError> {
        if self.lose_context {
            return Err(DrawError::ContextLost("device reset".into()));
        }
        self.inner.draw(uniforms)
    }
}

fn scheduler(preset: Preset) -> FrameScheduler<Flaky, ManualHost> {
    let viewport = ViewportState::new(16.0, 12.0, 1.0, preset.dpr_cap);
    FrameScheduler::new(preset, viewport, Flaky::new(), ManualHost::new()).unwrap()
}

#[test]
fn six_hundred_ticks_make_ten_seconds() {
    let mut s = scheduler(Preset::tide());
    s.start().unwrap();
    for _ in 0..600 {
        assert_eq!(s.tick(1.0 / 60.0), TickOutcome::Drawn);
    }
    assert!((s.time() - 10.0).abs() < 1e-9);
    assert!((s.uniforms().time - 10.0).abs() < 1e-4);
    assert_eq!(s.renderer().inner.frames(), 600);
    assert_eq!(s.frame(), 600);
}

#[test]
fn stalls_and_bad_deltas_are_sanitized() {
    let mut s = scheduler(Preset::tide());
    s.start().unwrap();
    s.tick(30.0);
    assert_eq!(s.time(), MAX_TICK_DELTA_SEC);
    s.tick(f64::NAN);
    s.tick(-2.0);
    assert_eq!(s.time(), MAX_TICK_DELTA_SEC);
    assert_eq!(s.frame(), 3);
}

#[test]
fn pointer_input_reaches_uniforms() {
    let mut s = scheduler(Preset::tide());
    s.start().unwrap();
    let listener = s.host().listener().cloned().unwrap();
    // top-left corner of a 16x12 surface
    assert!(listener.pointer_moved(0.0, 0.0));
    s.tick(1.0 / 60.0);
    assert_eq!(s.pointer().target(), Vec2::new(0.0, 1.0));
    let after_one = s.uniforms().pointer;
    assert!(after_one.x < 0.5 && after_one.y > 0.5);
    for _ in 0..200 {
        s.tick(1.0 / 60.0);
    }
    assert!((s.uniforms().pointer - Vec2::new(0.0, 1.0)).length() < 1e-3);
}

#[test]
fn velocity_is_exported_only_when_tracked() {
    let mut tide = scheduler(Preset::tide());
    tide.start().unwrap();
    tide.input().pointer_moved(16.0, 0.0);
    tide.tick(1.0 / 60.0);
    assert_eq!(tide.uniforms().velocity, Vec2::ZERO);

    let mut aurora = scheduler(Preset::aurora());
    aurora.start().unwrap();
    aurora.input().pointer_moved(16.0, 0.0);
    aurora.tick(1.0 / 60.0);
    assert!(aurora.uniforms().velocity.length() > 0.0);
}

#[test]
fn zero_resize_keeps_everything_finite() {
    let mut s = scheduler(Preset::tide());
    s.start().unwrap();
    s.input().resized(0.0, 0.0);
    assert_eq!(s.tick(1.0 / 60.0), TickOutcome::Drawn);
    assert_eq!(s.viewport().size(), UVec2::ONE);
    assert!(s.viewport().aspect().is_finite());
    assert_eq!(s.renderer().inner.buffer().size(), UVec2::ONE);
    let px = s.renderer().inner.buffer().pixel(0, 0).unwrap();
    assert_eq!(px[3], 255);
}

#[test]
fn scale_factor_above_cap_lowers_resolution() {
    let mut s = scheduler(Preset::tide());
    s.start().unwrap();
    s.input().resized(300.0, 200.0);
    s.input().scale_factor_changed(3.0);
    s.tick(1.0 / 60.0);
    assert_eq!(s.uniforms().resolution, Vec2::new(150.0, 100.0));
    assert_eq!(s.renderer().inner.buffer().size(), UVec2::new(150, 100));
}

#[test]
fn dispose_is_idempotent_and_silences_listeners() {
    let mut s = scheduler(Preset::tide());
    s.start().unwrap();
    s.tick(1.0 / 60.0);
    let listener = s.host().listener().cloned().unwrap();
    let before = *s.uniforms();

    s.dispose();
    s.dispose();
    assert_eq!(s.state(), SchedulerState::Disposed);
    assert_eq!(s.host().detaches, 1);
    assert_eq!(s.host().cancels, 1);
    assert!(s.host().pending().is_none());
    assert!(!s.host().is_listening());

    assert!(!listener.pointer_moved(3.0, 3.0));
    assert!(!listener.resized(100.0, 100.0));
    assert_eq!(s.tick(1.0 / 60.0), TickOutcome::Inactive);
    assert_eq!(*s.uniforms(), before);
    assert_eq!(s.renderer().inner.frames(), 1);
}

#[test]
fn stop_cancels_and_start_resumes() {
    let mut s = scheduler(Preset::tide());
    s.start().unwrap();
    let first = s.host().pending();
    assert!(first.is_some());
    s.stop();
    assert_eq!(s.state(), SchedulerState::Idle);
    assert!(s.host().pending().is_none());
    assert_eq!(s.host().cancels, 1);
    assert_eq!(s.tick(1.0 / 60.0), TickOutcome::Inactive);

    s.start().unwrap();
    // listeners were kept across the pause
    assert_eq!(s.host().attaches, 1);
    assert_eq!(s.tick(1.0 / 60.0), TickOutcome::Drawn);
}

#[test]
fn context_loss_signals_once_and_recovers() {
    let mut s = scheduler(Preset::tide());
    let signals = Rc::new(Cell::new(0));
    let seen = signals.clone();
    s.on_context_lost(move |err| {
        assert!(matches!(err, FluidError::ContextLost(_)));
        seen.set(seen.get() + 1);
    });
    s.start().unwrap();
    s.tick(1.0 / 60.0);

    s.renderer_mut().lose_context = true;
    let requests = s.host().requests;
    assert_eq!(s.tick(1.0 / 60.0), TickOutcome::ContextLost);
    assert_eq!(s.state(), SchedulerState::Lost);
    assert!(s.pending().is_none());
    assert_eq!(s.host().requests, requests);
    assert!(!s.host().is_listening());
    assert_eq!(s.tick(1.0 / 60.0), TickOutcome::Inactive);
    assert_eq!(signals.get(), 1);

    assert!(s.start().is_err());
    s.recover(Flaky::new()).unwrap();
    s.start().unwrap();
    assert_eq!(s.host().attaches, 2);
    assert_eq!(s.tick(1.0 / 60.0), TickOutcome::Drawn);

    s.renderer_mut().lose_context = true;
    s.tick(1.0 / 60.0);
    assert_eq!(signals.get(), 2);
}

#[test]
fn invalid_preset_is_refused() {
    let mut preset = Preset::tide();
    preset.fbm.decay = 1.2;
    let res = FrameScheduler::new(
        preset,
        ViewportState::default(),
        Flaky::new(),
        ManualHost::new(),
    );
    assert!(matches!(res, Err(FluidError::Config(ConfigError::Decay(_)))));
}
