// Host-side tests for the browser input helpers.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod input {
    include!("../src/input.rs");
}

use fluid_core::{ConfigError, InputPort, Preset, ViewportState};
use glam::{UVec2, Vec2};
use input::*;

fn rect() -> CanvasRect {
    CanvasRect {
        left: 10.0,
        top: 20.0,
        width: 400.0,
        height: 300.0,
    }
}

#[test]
fn pointer_is_offset_by_canvas_origin_and_scaled() {
    let p = rect().pointer_device_px(110.0, 70.0, 2.0).unwrap();
    assert_eq!(p, Vec2::new(200.0, 100.0));
}

#[test]
fn non_finite_pointer_is_dropped() {
    assert!(rect().pointer_device_px(f64::NAN, 0.0, 1.0).is_none());
    assert!(rect().pointer_device_px(0.0, f64::INFINITY, 1.0).is_none());
}

#[test]
fn bogus_pixel_ratio_counts_as_one() {
    assert_eq!(sanitize_dpr(0.0), 1.0);
    assert_eq!(sanitize_dpr(f64::NAN), 1.0);
    assert_eq!(sanitize_dpr(-2.0), 1.0);
    assert_eq!(rect().device_size(f64::NAN), (400.0, 300.0));
    assert_eq!(rect().device_size(1.5), (600.0, 450.0));
}

#[test]
fn hidden_canvas_reaches_viewport_as_one_pixel() {
    let hidden = CanvasRect {
        left: 0.0,
        top: 0.0,
        width: 0.0,
        height: 0.0,
    };
    let (w, h) = hidden.device_size(2.0);
    let vp = ViewportState::new(w, h, 2.0, 1.5);
    assert_eq!(vp.size(), UVec2::ONE);
    assert!(vp.aspect().is_finite());
}

#[test]
fn canvas_corner_maps_to_surface_top_left() {
    let r = rect();
    let dpr = 2.0;
    let (w, h) = r.device_size(dpr);
    let vp = ViewportState::new(w, h, dpr as f32, 1.5);
    let p = r.pointer_device_px(r.left, r.top, dpr).unwrap();
    let uv = fluid_core::pointer::device_to_normalized(p.x, p.y, vp.size());
    assert_eq!(uv, Vec2::new(0.0, 1.0));
}

#[test]
fn frame_clock_converts_milliseconds() {
    let mut clock = FrameClock::default();
    assert_eq!(clock.elapsed(1000.0), 0.0);
    assert!((clock.elapsed(1016.0) - 0.016).abs() < 1e-12);
    // timestamps going backwards never produce negative time
    assert_eq!(clock.elapsed(900.0), 0.0);
    clock.reset();
    assert_eq!(clock.elapsed(5000.0), 0.0);
    assert_eq!(clock.elapsed(f64::NAN), 0.0);
}

#[test]
fn preset_query_parsing() {
    assert_eq!(parse_preset_query("").unwrap().name, "tide");
    assert_eq!(parse_preset_query("?").unwrap().name, "tide");
    assert_eq!(parse_preset_query("?preset=ember").unwrap().name, "ember");
    assert_eq!(parse_preset_query("?debug=1&preset=aurora").unwrap().name, "aurora");
    assert_eq!(parse_preset_query("?preset=").unwrap(), Preset::tide());
    assert_eq!(
        parse_preset_query("?preset=lava"),
        Err(ConfigError::UnknownPreset("lava".into()))
    );
}

#[test]
fn listener_writes_stop_after_close() {
    let port = InputPort::new();
    let listener = port.clone();
    let p = rect().pointer_device_px(50.0, 50.0, 1.0).unwrap();
    assert!(listener.pointer_moved(p.x, p.y));
    port.close();
    assert!(!listener.pointer_moved(p.x, p.y));
    assert!(!port.has_pending());
}

#[test]
fn pointer_over_page_content_outside_canvas_clamps_to_edge() {
    let r = rect();
    let (w, h) = r.device_size(1.0);
    let vp = ViewportState::new(w, h, 1.0, 1.5);
    // moves reported by the window beyond the canvas bounds
    let right = r.pointer_device_px(r.left + r.width + 80.0, r.top + 150.0, 1.0).unwrap();
    let above = r.pointer_device_px(r.left + 200.0, r.top - 40.0, 1.0).unwrap();
    let right = fluid_core::pointer::device_to_normalized(right.x, right.y, vp.size());
    let above = fluid_core::pointer::device_to_normalized(above.x, above.y, vp.size());
    assert_eq!(right, Vec2::new(1.0, 0.5));
    assert_eq!(above, Vec2::new(0.5, 1.0));
}
