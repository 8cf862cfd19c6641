//! Tick scheduling policies.

const ONE_SECOND_MS: f32 = 1000.0;

/// How simulation ticks map onto display frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickPolicy {
    /// One tick per presented frame.
    PerDisplayFrame,
    /// Fixed-rate ticks decoupled from the display: a frame may run zero or
    /// several simulation steps.
    FixedStep { fps: f32 },
}

/// Converts frame deltas into a tick count according to the policy.
///
/// The fixed-step accumulator saturates at one second so a long stall
/// cannot trigger a runaway catch-up spiral.
#[derive(Debug)]
pub struct TickDriver {
    policy: TickPolicy,
    accumulated_ms: f32,
}

impl TickDriver {
    #[must_use]
    pub fn new(policy: TickPolicy) -> Self {
        Self {
            policy,
            accumulated_ms: 0.0,
        }
    }

    /// Feeds one frame's delta and returns how many ticks to run now.
    pub fn advance(&mut self, delta_ms: f32) -> u32 {
        match self.policy {
            TickPolicy::PerDisplayFrame => 1,
            TickPolicy::FixedStep { fps } => {
                let step_ms = ONE_SECOND_MS / fps;
                self.accumulated_ms = (self.accumulated_ms + delta_ms).min(ONE_SECOND_MS);
                let ticks = (self.accumulated_ms / step_ms).floor();
                self.accumulated_ms -= ticks * step_ms;
                ticks as u32
            }
        }
    }
}
