use fluid_core::scheduler::{FrameHost, TickRequest};
use fluid_core::InputPort;
use std::time::Instant;
use winit::window::Window;

/// Turns tick requests into winit redraws. Window events are routed to the
/// input port only while listeners are attached.
pub struct WindowHost<'w> {
    window: &'w Window,
    next_id: u64,
    pending: Option<TickRequest>,
    listener: Option<InputPort>,
}

impl<'w> WindowHost<'w> {
    pub fn new(window: &'w Window) -> Self {
        Self {
            window,
            next_id: 0,
            pending: None,
            listener: None,
        }
    }

    /// Consume the outstanding request when its redraw arrives.
    pub fn take_pending(&mut self) -> Option<TickRequest> {
        self.pending.take()
    }

    pub fn listener(&self) -> Option<&InputPort> {
        self.listener.as_ref()
    }
}

impl FrameHost for WindowHost<'_> {
    fn request_tick(&mut self) -> Option<TickRequest> {
        self.next_id += 1;
        let req = TickRequest(self.next_id);
        self.pending = Some(req);
        self.window.request_redraw();
        Some(req)
    }

    fn cancel_tick(&mut self, request: TickRequest) {
        // a queued redraw cannot be withdrawn; it is ignored once unmatched
        if self.pending == Some(request) {
            self.pending = None;
        }
    }

    fn attach_listeners(&mut self, port: &InputPort) {
        self.listener = Some(port.clone());
    }

    fn detach_listeners(&mut self) {
        self.listener = None;
    }
}

/// Seconds between consecutive redraws; the first call yields 0.
#[derive(Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn elapsed(&mut self) -> f64 {
        let now = Instant::now();
        let dt = self
            .last
            .map(|prev| now.duration_since(prev).as_secs_f64())
            .unwrap_or(0.0);
        self.last = Some(now);
        dt
    }

    /// Forget the previous timestamp so a pause does not count as one long frame.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
