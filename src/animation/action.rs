use glam::Vec2;

use crate::animation::easing::elastic_in_out;

/// Phase value an intro animation starts from.
pub const INTRO_START_PHASE: f64 = 0.35;
/// Phase advance per tick for the intro animation.
///
/// The phase accumulates in f64 so the tick count to completion,
/// `ceil((1 - 0.35) / 0.002)` = 325, is exact.
pub const INTRO_PHASE_STEP: f64 = 0.002;

/// Input signals sampled once per tick and handed to every active action.
///
/// Actions that react to user input read from here instead of being mutated
/// from the outside; given the same sample sequence, an action's state is
/// fully reproducible.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSample {
    /// Orbit rotation input since the previous tick: pointer movement
    /// normalized to the canvas, or device orientation on hosts that
    /// provide it.
    pub orbit_delta: Vec2,
}

/// A named animation unit with a `tick`/`is_playing`/`reset` lifecycle.
///
/// Closed set of variants; every operation matches exhaustively so a new
/// variant cannot be added without the compiler pointing at every place
/// that must handle it.
#[derive(Debug, Clone)]
pub enum Action {
    Intro(IntroAction),
    Orbit(OrbitAction),
    Keyframe(KeyframeAction),
}

impl Action {
    /// Advances the action by one frame.
    pub fn tick(&mut self, input: &InputSample) {
        match self {
            Action::Intro(a) => a.tick(),
            Action::Orbit(a) => a.tick(input),
            Action::Keyframe(a) => a.tick(),
        }
    }

    /// Whether the action still wants to be ticked while active.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        match self {
            Action::Intro(a) => a.is_playing(),
            Action::Orbit(_) => true,
            Action::Keyframe(a) => a.is_playing(),
        }
    }

    /// Returns the action to its initial state.
    pub fn reset(&mut self) {
        match self {
            // The intro runs once and stays finished; replaying it is not a
            // behavior of the timeline.
            Action::Intro(_) => {}
            Action::Orbit(a) => a.reset(),
            Action::Keyframe(a) => a.reset(),
        }
    }

    #[must_use]
    pub fn as_intro(&self) -> Option<&IntroAction> {
        match self {
            Action::Intro(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_orbit(&self) -> Option<&OrbitAction> {
        match self {
            Action::Orbit(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_keyframe(&self) -> Option<&KeyframeAction> {
        match self {
            Action::Keyframe(a) => Some(a),
            _ => None,
        }
    }
}

/// One-shot entrance animation.
///
/// The phase starts at [`INTRO_START_PHASE`] and advances by a fixed
/// [`INTRO_PHASE_STEP`] per tick; playback ends once the phase passes 1.
/// The consumable output is [`IntroAction::eased`], an elastic-eased remap
/// of the phase used to interpolate meshes from an offset to rest.
#[derive(Debug, Clone)]
pub struct IntroAction {
    phase: f64,
}

impl IntroAction {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: INTRO_START_PHASE,
        }
    }

    fn tick(&mut self) {
        self.phase += INTRO_PHASE_STEP;
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.phase <= 1.0
    }

    /// Raw phase, monotonically increasing over ticks.
    #[must_use]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Eased progress in `[0, 1]`.
    #[must_use]
    pub fn eased(&self) -> f32 {
        elastic_in_out(self.phase.clamp(0.0, 1.0) as f32)
    }
}

impl Default for IntroAction {
    fn default() -> Self {
        Self::new()
    }
}

/// Persistent orbit interaction.
///
/// Accumulates a 2D rotation offset from the orbit delta carried by the
/// per-tick [`InputSample`]. Always playing; `reset` zeroes the offset.
#[derive(Debug, Clone, Default)]
pub struct OrbitAction {
    offset: Vec2,
}

impl OrbitAction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&mut self, input: &InputSample) {
        self.offset += input.orbit_delta;
    }

    /// Accumulated rotation offset (x = yaw input, y = pitch input).
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    fn reset(&mut self) {
        self.offset = Vec2::ZERO;
    }
}

/// Pre-baked scalar keyframe playback.
///
/// Duration equals the keyframe count. Each tick emits the keyframe at
/// `counter % duration` and advances the counter; playback counts as
/// finished once a full pass has run, while the emitted index keeps
/// wrapping with period `duration` if ticking continues.
#[derive(Debug, Clone)]
pub struct KeyframeAction {
    keyframes: Vec<f32>,
    counter: usize,
    value: f32,
}

impl KeyframeAction {
    /// `keyframes` must be non-empty; an empty sequence has no duration to
    /// play.
    #[must_use]
    pub fn new(keyframes: Vec<f32>) -> Self {
        debug_assert!(!keyframes.is_empty(), "keyframe sequence must be non-empty");
        Self {
            keyframes,
            counter: 0,
            value: 0.0,
        }
    }

    #[must_use]
    pub fn duration(&self) -> usize {
        self.keyframes.len()
    }

    /// Index into the keyframe sequence the next tick will emit.
    #[must_use]
    pub fn frame_index(&self) -> usize {
        self.counter % self.keyframes.len()
    }

    fn tick(&mut self) {
        self.value = self.keyframes[self.counter % self.keyframes.len()];
        self.counter += 1;
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.counter < self.keyframes.len()
    }

    /// Most recently emitted keyframe value; 0 after reset.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    fn reset(&mut self) {
        self.counter = 0;
        self.value = 0.0;
    }
}
