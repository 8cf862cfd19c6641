use rustc_hash::{FxHashMap, FxHashSet};

use crate::animation::action::{Action, InputSample};

/// Owns every named action and decides which of them advance on a frame.
///
/// Two kinds of membership:
/// - *persistent* actions tick every frame, unconditionally;
/// - *active* actions tick while their playing predicate holds, then get
///   `reset` exactly once and leave the active set.
///
/// An action ticks at most once per frame even if it is somehow both
/// persistent and active.
#[derive(Debug, Default)]
pub struct ActionManager {
    actions: FxHashMap<String, Action>,
    persistent: FxHashSet<String>,
    active: FxHashSet<String>,
    /// Scratch list for the deferred-removal pass. Finished names are
    /// collected first and subtracted after the tick pass completes, so a
    /// single tick always sees a consistent active-set snapshot.
    finished: Vec<String>,
}

impl ActionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transient action. It will not tick until [`play`]ed.
    ///
    /// [`play`]: ActionManager::play
    pub fn insert(&mut self, name: impl Into<String>, action: Action) {
        self.actions.insert(name.into(), action);
    }

    /// Registers a persistent action, ticked every frame from now on.
    pub fn insert_persistent(&mut self, name: impl Into<String>, action: Action) {
        let name = name.into();
        self.persistent.insert(name.clone());
        self.actions.insert(name, action);
    }

    /// Marks a registered action as active. Idempotent: playing an already
    /// active action neither resets nor double-advances it.
    pub fn play(&mut self, name: &str) {
        if !self.actions.contains_key(name) {
            log::warn!("play() on unknown action {name:?}");
            return;
        }
        self.active.insert(name.to_string());
    }

    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    #[must_use]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Action> {
        self.actions.get_mut(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Advances the timeline by one frame.
    ///
    /// Persistent actions tick first. Then every active action either ticks
    /// (still playing) or is reset and collected for removal; the removals
    /// apply only after the whole pass, so `reset` runs exactly once, on the
    /// same frame the playing predicate turns false.
    pub fn tick(&mut self, input: &InputSample) {
        for name in &self.persistent {
            if let Some(action) = self.actions.get_mut(name) {
                action.tick(input);
            }
        }

        if self.active.is_empty() {
            return;
        }

        self.finished.clear();
        for name in &self.active {
            if self.persistent.contains(name) {
                // Already ticked above; one tick per action per frame.
                continue;
            }
            let Some(action) = self.actions.get_mut(name) else {
                continue;
            };
            if action.is_playing() {
                action.tick(input);
            } else {
                action.reset();
                self.finished.push(name.clone());
            }
        }

        for name in &self.finished {
            self.active.remove(name);
        }
    }
}
