use crate::input::CanvasRect;
use fluid_core::scheduler::{FrameHost, TickRequest};
use fluid_core::InputPort;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub type TickSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

type Listener = (web::EventTarget, &'static str, Closure<dyn FnMut(web::Event)>);

pub fn canvas_rect(canvas: &web::HtmlCanvasElement) -> CanvasRect {
    let r = canvas.get_bounding_client_rect();
    CanvasRect {
        left: r.left(),
        top: r.top(),
        width: r.width(),
        height: r.height(),
    }
}

/// requestAnimationFrame plus canvas/window listeners.
pub struct BrowserHost {
    window: web::Window,
    canvas: web::HtmlCanvasElement,
    tick: TickSlot,
    listeners: Vec<Listener>,
}

impl BrowserHost {
    pub fn new(window: web::Window, canvas: web::HtmlCanvasElement) -> Self {
        Self {
            window,
            canvas,
            tick: Rc::new(RefCell::new(None)),
            listeners: Vec::new(),
        }
    }

    /// Where the animation-frame callback is installed once the scheduler exists.
    pub fn tick_slot(&self) -> TickSlot {
        self.tick.clone()
    }

    fn listen(
        &mut self,
        target: web::EventTarget,
        kind: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        if let Err(e) = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        {
            log::warn!("[host] cannot listen for {kind}: {e:?}");
            return;
        }
        self.listeners.push((target, kind, closure));
    }
}

impl FrameHost for BrowserHost {
    fn request_tick(&mut self) -> Option<TickRequest> {
        let slot = self.tick.borrow();
        let callback = slot.as_ref()?;
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(handle) => Some(TickRequest(handle as u64)),
            Err(e) => {
                log::warn!("[host] requestAnimationFrame failed: {e:?}");
                None
            }
        }
    }

    fn cancel_tick(&mut self, request: TickRequest) {
        _ = self.window.cancel_animation_frame(request.0 as i32);
    }

    fn attach_listeners(&mut self, port: &InputPort) {
        // window level: page markup layered over the canvas must not block moves
        let pointer_port = port.clone();
        let pointer_canvas = self.canvas.clone();
        let pointer_window = self.window.clone();
        self.listen(self.window.clone().into(), "pointermove", move |ev| {
            let Some(mouse) = ev.dyn_ref::<web::MouseEvent>() else {
                return;
            };
            let rect = canvas_rect(&pointer_canvas);
            let dpr = pointer_window.device_pixel_ratio();
            if let Some(p) = rect.pointer_device_px(mouse.client_x() as f64, mouse.client_y() as f64, dpr)
            {
                pointer_port.pointer_moved(p.x, p.y);
            }
        });

        let resize_port = port.clone();
        let resize_canvas = self.canvas.clone();
        let resize_window = self.window.clone();
        self.listen(self.window.clone().into(), "resize", move |_ev| {
            let dpr = resize_window.device_pixel_ratio();
            let (w, h) = canvas_rect(&resize_canvas).device_size(dpr);
            resize_port.scale_factor_changed(dpr as f32);
            resize_port.resized(w, h);
        });
    }

    fn detach_listeners(&mut self) {
        for (target, kind, closure) in self.listeners.drain(..) {
            _ = target.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        }
    }
}
