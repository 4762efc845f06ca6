#![cfg(target_arch = "wasm32")]
use fluid_core::{FrameScheduler, Preset, TickOutcome, ViewportState};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod host;
mod input;
mod render;

use host::{canvas_rect, BrowserHost, TickSlot};
use input::FrameClock;
use render::CanvasRenderer;

type WebScheduler = FrameScheduler<CanvasRenderer, BrowserHost>;

const CANVAS_ID: &str = "fluid-canvas";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("fluid-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {e:#}");
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{CANVAS_ID}"))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("#{CANVAS_ID} is not a canvas: {e:?}"))?;

    let search = window.location().search().unwrap_or_default();
    let preset = input::parse_preset_query(&search).unwrap_or_else(|err| {
        log::warn!("{err}; falling back to tide");
        Preset::tide()
    });

    let dpr = window.device_pixel_ratio();
    let (width, height) = canvas_rect(&canvas).device_size(dpr);
    let viewport = ViewportState::new(width, height, dpr as f32, preset.dpr_cap);
    let renderer =
        CanvasRenderer::new(canvas.clone(), viewport.render_resolution(), preset).await?;

    let host = BrowserHost::new(window.clone(), canvas.clone());
    let tick_slot = host.tick_slot();
    let scheduler = Rc::new(RefCell::new(FrameScheduler::new(
        preset, viewport, renderer, host,
    )?));

    install_tick(&scheduler, &tick_slot, canvas, preset);
    wire_pagehide(&window, scheduler.clone());
    scheduler.borrow_mut().start()?;
    Ok(())
}

fn install_tick(
    scheduler: &Rc<RefCell<WebScheduler>>,
    slot: &TickSlot,
    canvas: web::HtmlCanvasElement,
    preset: Preset,
) {
    let weak = Rc::downgrade(scheduler);
    let mut clock = FrameClock::default();
    let closure = Closure::wrap(Box::new(move |now_ms: f64| {
        let Some(scheduler) = weak.upgrade() else {
            return;
        };
        let outcome = scheduler.borrow_mut().tick(clock.elapsed(now_ms));
        if outcome == TickOutcome::ContextLost {
            clock.reset();
            spawn_local(rebuild(weak.clone(), canvas.clone(), preset));
        }
    }) as Box<dyn FnMut(f64)>);
    *slot.borrow_mut() = Some(closure);
}

async fn rebuild(
    weak: Weak<RefCell<WebScheduler>>,
    canvas: web::HtmlCanvasElement,
    preset: Preset,
) {
    let Some(scheduler) = weak.upgrade() else {
        return;
    };
    let size = scheduler.borrow().viewport().render_resolution();
    drop(scheduler);

    let renderer = match CanvasRenderer::new(canvas, size, preset).await {
        Ok(r) => r,
        Err(e) => {
            log::error!("[web] renderer rebuild failed: {e:#}");
            return;
        }
    };
    let Some(scheduler) = weak.upgrade() else {
        return;
    };
    let mut scheduler = scheduler.borrow_mut();
    if let Err(e) = scheduler.recover(renderer).and_then(|()| scheduler.start()) {
        log::error!("[web] cannot resume: {e}");
    }
}

// The closure owns the scheduler for the lifetime of the page.
fn wire_pagehide(window: &web::Window, scheduler: Rc<RefCell<WebScheduler>>) {
    let closure = Closure::wrap(Box::new(move |_ev: web::Event| {
        scheduler.borrow_mut().dispose();
    }) as Box<dyn FnMut(web::Event)>);
    if let Err(e) =
        window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())
    {
        log::warn!("[web] cannot listen for pagehide: {e:?}");
    }
    closure.forget();
}
