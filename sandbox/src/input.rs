//! Per-frame guest input.
//!
//! `PointerState` collects pointer events between frames; the frame driver
//! snapshots it into a `GuestInput` and writes the 24-byte record at the
//! address the guest reports through `getGlobalInput`.

use glbridge_hostapi::{GuestInput, HostError, MouseButton};

use crate::memory;

/// Pointer state accumulated between two frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    x: f32,
    y: f32,
    wheel: i32,
    buttons: u32,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor moved to `(x, y)` in viewport pixels.
    pub fn on_move(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn on_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons |= button.bit();
        } else {
            self.buttons &= !button.bit();
        }
    }

    /// Wheel deltas add up until the next snapshot.
    pub fn on_wheel(&mut self, delta: i32) {
        self.wheel = self.wheel.saturating_add(delta);
    }

    /// Build this frame's record and reset the accumulated wheel delta.
    pub fn snapshot(&mut self, width: i32, height: i32) -> GuestInput {
        let input = GuestInput {
            width,
            height,
            cursor_x: self.x,
            cursor_y: self.y,
            wheel: self.wheel,
            buttons: self.buttons,
        };
        self.wheel = 0;
        input
    }
}

/// Write `input` into guest memory at `ptr`.
pub fn write_guest_input(mem: &mut [u8], ptr: u32, input: &GuestInput) -> Result<(), HostError> {
    memory::view_mut(mem, ptr, GuestInput::SIZE)?.copy_from_slice(&input.to_le_bytes());
    Ok(())
}
