// Pointer smoothing scenarios.

use fluid_core::pointer::{device_to_normalized, ticks_to_settle};
use fluid_core::*;
use glam::{UVec2, Vec2};

const DT: f32 = 1.0 / TARGET_FPS;

#[test]
fn fifty_ticks_at_default_alpha() {
    let cfg = PointerConfig::default();
    assert_eq!(cfg.alpha, 0.08);
    let mut p = PointerState::with_position(cfg, Vec2::ZERO);
    p.set_target(Vec2::ONE);
    for _ in 0..50 {
        p.step(DT);
    }
    let expected = 1.0 - 0.92f32.powi(50);
    assert!((p.smoothed().x - expected).abs() < 1e-4);
    assert!((p.smoothed().x - 0.983).abs() < 5e-3);
    assert_eq!(p.smoothed().x, p.smoothed().y);
}

#[test]
fn converges_monotonically_within_settle_ticks() {
    for alpha in [0.05, 0.08, 0.12, 0.5] {
        let cfg = PointerConfig {
            alpha,
            ..PointerConfig::default()
        };
        let mut p = PointerState::with_position(cfg, Vec2::ZERO);
        let target = Vec2::new(0.8, 0.3);
        p.set_target(target);
        let start = target.length();
        let n = ticks_to_settle(alpha, POINTER_SETTLE_TOLERANCE);
        let mut prev = start;
        for _ in 0..n {
            p.step(DT);
            let d = (p.smoothed() - target).length();
            assert!(d <= prev, "alpha {alpha}: distance grew");
            prev = d;
        }
        assert!(prev <= start * POINTER_SETTLE_TOLERANCE + 1e-5, "alpha {alpha}: {prev}");
    }
}

#[test]
fn alpha_one_snaps() {
    let cfg = PointerConfig {
        alpha: 1.0,
        ..PointerConfig::default()
    };
    let mut p = PointerState::new(cfg);
    p.set_target(Vec2::new(0.1, 0.2));
    p.step(DT);
    assert!((p.smoothed() - Vec2::new(0.1, 0.2)).length() < 1e-6);
}

#[test]
fn device_events_map_into_surface_space() {
    let size = UVec2::new(1920, 1080);
    let mut p = PointerState::new(PointerConfig::default());
    p.set_target_from_device(960.0, 270.0, size);
    assert_eq!(p.target(), Vec2::new(0.5, 0.75));
    p.set_target_from_device(f32::NAN, 10.0, size);
    assert_eq!(p.target(), Vec2::new(0.5, 0.75));
    // degenerate sizes count as one pixel
    assert_eq!(device_to_normalized(5.0, 5.0, UVec2::ZERO), Vec2::new(1.0, 0.0));
}

#[test]
fn invalid_alpha_is_rejected() {
    for alpha in [0.0, -0.1, 1.5, f32::NAN] {
        let cfg = PointerConfig {
            alpha,
            ..PointerConfig::default()
        };
        assert!(cfg.validate().is_err(), "alpha {alpha}");
    }
}
