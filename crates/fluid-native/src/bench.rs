//! Headless run of the CPU shading path through the real scheduler.

use fluid_core::{
    FrameScheduler, ManualHost, Preset, SoftwareRenderer, TickOutcome, ViewportState, TARGET_FPS,
};
use glam::UVec2;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct BenchReport {
    pub frames: u32,
    pub drawn: u32,
    pub wall: Duration,
    pub sim_seconds: f64,
}

impl BenchReport {
    pub fn frames_per_second(&self) -> f64 {
        let secs = self.wall.as_secs_f64();
        if secs > 0.0 {
            self.drawn as f64 / secs
        } else {
            0.0
        }
    }
}

pub fn run(preset: Preset, size: UVec2, frames: u32) -> anyhow::Result<BenchReport> {
    let viewport = ViewportState::new(size.x as f64, size.y as f64, 1.0, preset.dpr_cap);
    let renderer = SoftwareRenderer::new(preset, viewport.render_resolution());
    let mut scheduler = FrameScheduler::new(preset, viewport, renderer, ManualHost::new())?;
    scheduler.start()?;

    // sweep the pointer across the surface so the pull term is exercised
    let port = scheduler.input();
    let dt = 1.0 / TARGET_FPS as f64;
    let started = Instant::now();
    let mut drawn = 0;
    for i in 0..frames {
        let t = i as f32 / frames.max(1) as f32;
        port.pointer_moved(t * size.x as f32, (1.0 - t) * size.y as f32);
        if scheduler.tick(dt) == TickOutcome::Drawn {
            drawn += 1;
        }
    }
    let report = BenchReport {
        frames,
        drawn,
        wall: started.elapsed(),
        sim_seconds: scheduler.time(),
    };
    scheduler.dispose();

    log::info!(
        "[bench] preset={} size={}x{} frames={} drawn={} wall={:.3}s fps={:.1}",
        preset.name,
        size.x,
        size.y,
        report.frames,
        report.drawn,
        report.wall.as_secs_f64(),
        report.frames_per_second()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_frame_is_drawn() {
        let report = run(Preset::aurora(), UVec2::new(12, 8), 30).unwrap();
        assert_eq!(report.drawn, 30);
        assert!((report.sim_seconds - 0.5).abs() < 1e-9);
    }
}
