//! Input signal collection.
//!
//! Window events are reduced to plain numeric signals here; the timeline
//! consumes them once per tick as an [`InputSample`]. The orbit
//! accumulator is the only mutable state shared between the event side and
//! the tick side — a single-writer/single-reader value, guarded by a mutex
//! so the contract survives if the embedding ever samples input off the
//! render thread.

use glam::Vec2;
use parking_lot::Mutex;

use crate::animation::InputSample;

/// Accumulates pointer movement between ticks.
#[derive(Debug, Default)]
pub struct OrbitSignal {
    delta: Mutex<Vec2>,
}

impl OrbitSignal {
    /// Event side: add a movement delta.
    pub fn push(&self, delta: Vec2) {
        *self.delta.lock() += delta;
    }

    /// Tick side: take everything accumulated since the last drain.
    pub fn drain(&self) -> Vec2 {
        std::mem::take(&mut *self.delta.lock())
    }
}

/// Tracks cursor state and turns window events into normalized signals.
#[derive(Debug)]
pub struct InputState {
    orbit: OrbitSignal,
    cursor: Option<Vec2>,
    canvas: Vec2,
}

impl InputState {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            orbit: OrbitSignal::default(),
            cursor: None,
            canvas: Vec2::new(width.max(1) as f32, height.max(1) as f32),
        }
    }

    pub fn handle_resize(&mut self, width: u32, height: u32) {
        self.canvas = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    /// Cursor movement in physical pixels; stored normalized to the canvas
    /// so orbit speed is resolution independent.
    pub fn handle_cursor_move(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        if let Some(previous) = self.cursor {
            self.orbit.push((position - previous) / self.canvas);
        }
        self.cursor = Some(position);
    }

    /// Device-orientation movement (gamma/beta degrees) from hosts that
    /// report it. Feeds the same orbit accumulator as the pointer; callers
    /// are expected to sample the sensor at display rate, not raw sensor
    /// rate.
    pub fn handle_orientation(&mut self, gamma: f32, beta: f32) {
        self.orbit.push(Vec2::new(gamma, beta) * ORIENTATION_SCALE);
    }

    /// Drains the accumulated signals into the sample handed to this tick.
    pub fn sample(&mut self) -> InputSample {
        InputSample {
            orbit_delta: self.orbit.drain(),
        }
    }
}

/// Degrees of device tilt are far coarser than normalized pointer travel.
const ORIENTATION_SCALE: f32 = 1.0 / 90.0;
