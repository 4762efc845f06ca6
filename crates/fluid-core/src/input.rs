//! Latest-value handoff between event listeners and the frame tick.
//!
//! Listeners write, the tick reads. Each slot keeps only the most recent
//! value, so bursts of pointer moves between two frames collapse into one.
//! Everything runs on one thread; `Cell` is enough.

use glam::Vec2;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug)]
struct Slots {
    open: Cell<bool>,
    pointer: Cell<Option<Vec2>>,
    resize: Cell<Option<(f64, f64)>>,
    scale_factor: Cell<Option<f32>>,
}

/// Cloneable handle given to listeners. Once closed, every write is dropped.
#[derive(Clone, Debug)]
pub struct InputPort {
    slots: Rc<Slots>,
}

impl Default for InputPort {
    fn default() -> Self {
        Self::new()
    }
}

impl InputPort {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(Slots {
                open: Cell::new(true),
                pointer: Cell::new(None),
                resize: Cell::new(None),
                scale_factor: Cell::new(None),
            }),
        }
    }

    /// Pointer position in device pixels, origin top-left.
    /// Returns `false` when the port is closed or the position is not finite.
    pub fn pointer_moved(&self, x: f32, y: f32) -> bool {
        if !self.is_open() || !x.is_finite() || !y.is_finite() {
            return false;
        }
        self.slots.pointer.set(Some(Vec2::new(x, y)));
        true
    }

    /// New surface size in device pixels. Validation happens in the viewport.
    pub fn resized(&self, width: f64, height: f64) -> bool {
        if !self.is_open() {
            return false;
        }
        self.slots.resize.set(Some((width, height)));
        true
    }

    pub fn scale_factor_changed(&self, device_pixel_ratio: f32) -> bool {
        if !self.is_open() {
            return false;
        }
        self.slots.scale_factor.set(Some(device_pixel_ratio));
        true
    }

    pub fn is_open(&self) -> bool {
        self.slots.open.get()
    }

    /// Close the port and drop anything not yet consumed.
    pub fn close(&self) {
        self.slots.open.set(false);
        self.slots.pointer.set(None);
        self.slots.resize.set(None);
        self.slots.scale_factor.set(None);
    }

    pub(crate) fn take_pointer(&self) -> Option<Vec2> {
        self.slots.pointer.take()
    }

    pub(crate) fn take_resize(&self) -> Option<(f64, f64)> {
        self.slots.resize.take()
    }

    pub(crate) fn take_scale_factor(&self) -> Option<f32> {
        self.slots.scale_factor.take()
    }

    pub fn has_pending(&self) -> bool {
        let pointer = self.slots.pointer.get().is_some();
        let resize = self.slots.resize.get().is_some();
        let scale = self.slots.scale_factor.get().is_some();
        pointer || resize || scale
    }
}
