//! Animation Timeline Tests
//!
//! Tests for:
//! - IntroAction phase accumulation and terminal transition
//! - KeyframeAction playback, wrap-around, and reset
//! - OrbitAction input accumulation
//! - ActionManager persistent/active sequencing and deferred removal
//! - Elastic easing endpoints

use glam::Vec2;

use vitrine::animation::easing::elastic_in_out;
use vitrine::animation::{
    Action, ActionManager, InputSample, IntroAction, KeyframeAction, OrbitAction,
};

/// Ticks until the intro phase passes 1: `ceil((1 - 0.35) / 0.002)`.
const INTRO_TICKS: usize = 325;

fn tick(manager: &mut ActionManager) {
    manager.tick(&InputSample::default());
}

// ============================================================================
// IntroAction
// ============================================================================

#[test]
fn intro_finishes_after_fixed_tick_count() {
    let mut manager = ActionManager::new();
    manager.insert("intro", Action::Intro(IntroAction::new()));
    manager.play("intro");

    for i in 0..INTRO_TICKS {
        let action = manager.get("intro").unwrap();
        assert!(
            action.is_playing(),
            "intro stopped early at tick {i} (phase {:?})",
            action.as_intro().unwrap().phase()
        );
        tick(&mut manager);
    }

    let action = manager.get("intro").unwrap();
    assert!(!action.is_playing(), "intro still playing after {INTRO_TICKS} ticks");

    // Stays finished on subsequent ticks without further mutation.
    for _ in 0..10 {
        tick(&mut manager);
        assert!(!manager.get("intro").unwrap().is_playing());
    }
}

#[test]
fn intro_eased_output_hits_exact_endpoints() {
    assert_eq!(elastic_in_out(0.0), 0.0);
    assert_eq!(elastic_in_out(1.0), 1.0);

    let mut intro = Action::Intro(IntroAction::new());
    for _ in 0..INTRO_TICKS {
        intro.tick(&InputSample::default());
    }
    // Phase is past 1, so the clamped eased output is exactly 1.
    assert_eq!(intro.as_intro().unwrap().eased(), 1.0);
}

// ============================================================================
// KeyframeAction
// ============================================================================

#[test]
fn keyframe_emits_sequence_verbatim_then_stops() {
    let frames = vec![0.5, -1.0, 2.25, 7.0];
    let mut action = Action::Keyframe(KeyframeAction::new(frames.clone()));

    for expected in &frames {
        assert!(action.is_playing());
        action.tick(&InputSample::default());
        assert_eq!(action.as_keyframe().unwrap().value(), *expected);
    }
    assert!(!action.is_playing(), "still playing after one full pass");
}

#[test]
fn keyframe_index_wraps_with_period_independent_of_stop() {
    let frames = vec![1.0, 2.0, 3.0];
    let mut action = Action::Keyframe(KeyframeAction::new(frames.clone()));

    // Two full passes: the emitted values repeat with period 3 even though
    // playback already counts as finished after the first.
    for pass in 0..2 {
        for expected in &frames {
            action.tick(&InputSample::default());
            assert_eq!(action.as_keyframe().unwrap().value(), *expected, "pass {pass}");
        }
        assert!(!action.is_playing());
    }

    // frame_index itself keeps wrapping modulo the duration.
    for i in 0..7 {
        assert_eq!(action.as_keyframe().unwrap().frame_index(), i % frames.len());
        action.tick(&InputSample::default());
    }
}

#[test]
fn keyframe_reset_restarts_and_clears_value() {
    let mut action = Action::Keyframe(KeyframeAction::new(vec![4.0, 5.0]));
    action.tick(&InputSample::default());
    action.tick(&InputSample::default());
    assert!(!action.is_playing());

    action.reset();
    let keyframe = action.as_keyframe().unwrap();
    assert!(action.is_playing());
    assert_eq!(keyframe.value(), 0.0);
    assert_eq!(keyframe.frame_index(), 0);
}

// ============================================================================
// OrbitAction
// ============================================================================

#[test]
fn orbit_accumulates_input_and_never_stops() {
    let mut action = Action::Orbit(OrbitAction::new());
    assert!(action.is_playing());

    let sample = InputSample {
        orbit_delta: Vec2::new(0.25, -0.5),
    };
    action.tick(&sample);
    action.tick(&sample);
    assert_eq!(action.as_orbit().unwrap().offset(), Vec2::new(0.5, -1.0));
    assert!(action.is_playing());

    action.reset();
    assert_eq!(action.as_orbit().unwrap().offset(), Vec2::ZERO);
    assert!(action.is_playing());
}

// ============================================================================
// ActionManager sequencing
// ============================================================================

#[test]
fn persistent_actions_tick_without_being_played() {
    let mut manager = ActionManager::new();
    manager.insert_persistent("orbit", Action::Orbit(OrbitAction::new()));

    let sample = InputSample {
        orbit_delta: Vec2::X,
    };
    for _ in 0..3 {
        manager.tick(&sample);
    }
    let orbit = manager.get("orbit").unwrap().as_orbit().unwrap();
    assert_eq!(orbit.offset(), Vec2::new(3.0, 0.0));
}

#[test]
fn transient_action_resets_once_and_leaves_active_set() {
    let mut manager = ActionManager::new();
    manager.insert_persistent("orbit", Action::Orbit(OrbitAction::new()));
    manager.insert("anim", Action::Keyframe(KeyframeAction::new(vec![1.0, 2.0])));
    manager.play("anim");

    let sample = InputSample {
        orbit_delta: Vec2::X,
    };

    // Two playing ticks, then the third tick performs the reset + removal.
    manager.tick(&sample);
    manager.tick(&sample);
    assert!(!manager.get("anim").unwrap().is_playing());
    assert!(manager.is_active("anim"));

    manager.tick(&sample);
    assert!(!manager.is_active("anim"));
    // The reset ran exactly once: counter back to zero, value cleared.
    let anim = manager.get("anim").unwrap().as_keyframe().unwrap();
    assert_eq!(anim.frame_index(), 0);
    assert_eq!(anim.value(), 0.0);

    // The transient no longer ticks while the persistent action continues.
    manager.tick(&sample);
    let anim = manager.get("anim").unwrap().as_keyframe().unwrap();
    assert_eq!(anim.frame_index(), 0);
    let orbit = manager.get("orbit").unwrap().as_orbit().unwrap();
    assert_eq!(orbit.offset(), Vec2::new(4.0, 0.0));
}

#[test]
fn play_is_idempotent() {
    let mut manager = ActionManager::new();
    manager.insert("anim", Action::Keyframe(KeyframeAction::new(vec![1.0, 2.0, 3.0])));

    manager.play("anim");
    manager.play("anim");
    tick(&mut manager);

    // A single tick per frame per active action, not one per play() call.
    let anim = manager.get("anim").unwrap().as_keyframe().unwrap();
    assert_eq!(anim.frame_index(), 1);
    assert_eq!(anim.value(), 1.0);
}

#[test]
fn play_unknown_action_is_a_noop() {
    let mut manager = ActionManager::new();
    manager.play("missing");
    assert!(!manager.is_active("missing"));
    tick(&mut manager);
}

// ============================================================================
// End to end: intro drives the eased offset to its endpoint
// ============================================================================

#[test]
fn intro_timeline_reaches_rest_after_full_play() {
    let mut manager = ActionManager::new();
    manager.insert("intro", Action::Intro(IntroAction::new()));
    manager.insert_persistent("orbit", Action::Orbit(OrbitAction::new()));
    manager.insert("mesh.0", Action::Keyframe(KeyframeAction::new(vec![0.1, 0.2])));
    manager.play("intro");

    let mut previous_phase = manager
        .get("intro")
        .unwrap()
        .as_intro()
        .unwrap()
        .phase();
    for _ in 0..INTRO_TICKS {
        tick(&mut manager);
        let phase = manager.get("intro").unwrap().as_intro().unwrap().phase();
        assert!(phase > previous_phase, "phase must advance monotonically");
        previous_phase = phase;
    }

    let intro = manager.get("intro").unwrap().as_intro().unwrap();
    assert!(!intro.is_playing());
    assert_eq!(intro.eased(), 1.0);
    // Orbit kept ticking the whole time; the unplayed keyframe never moved.
    assert_eq!(
        manager.get("mesh.0").unwrap().as_keyframe().unwrap().frame_index(),
        0
    );
}
