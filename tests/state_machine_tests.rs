//! State Machine & Controller Tests
//!
//! Tests for:
//! - StateMachine state registration, explicit requests and gated transitions
//! - Trigger consumption and first-match ordering
//! - AnimationController playback control, modes and FSM-driven crossfades

use std::sync::Arc;

use glam::{Mat4, Vec3};

use armature::animation::{
    AnimationChannel, AnimationClip, AnimationController, AnimationState, AnimationTransition,
    PlaybackMode, StateMachine,
};
use armature::errors::ArmatureError;
use armature::settings::AnimationSettings;

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn clip(name: &str, to: Vec3) -> AnimationClip {
    let mut root = AnimationChannel::with_bone_index("Root", 0);
    root.add_position_key(0.0, Vec3::ZERO).add_position_key(1.0, to);
    AnimationClip::with_channels(name, vec![root])
}

fn machine() -> StateMachine {
    let mut fsm = StateMachine::new();
    fsm.add_state(AnimationState::new("Idle", Arc::new(clip("Idle", Vec3::Y))));
    fsm.add_state(AnimationState::new("Run", Arc::new(clip("Run", Vec3::X))));
    fsm.add_state(AnimationState::new("Jump", Arc::new(clip("Jump", Vec3::Z))));
    fsm
}

fn controller() -> AnimationController {
    let mut controller = AnimationController::new();
    controller.add_clip(clip("Idle", Vec3::Y));
    controller.add_clip(clip("Run", Vec3::X));
    controller.set_bone_count(1);
    controller
}

// ============================================================================
// StateMachine
// ============================================================================

#[test]
fn first_state_becomes_current() {
    let fsm = machine();
    assert_eq!(fsm.current_state(), Some("Idle"));
    assert!(fsm.has_state("Jump"));
}

#[test]
fn transition_to_unknown_state_is_an_error() {
    let mut fsm = machine();
    let result = fsm.transition_to("Swim");
    assert!(matches!(result, Err(ArmatureError::StateNotFound(name)) if name == "Swim"));
    assert_eq!(fsm.current_state(), Some("Idle"));
}

#[test]
fn transition_to_current_state_is_a_no_op() {
    let mut fsm = machine();
    fsm.add_transition(AnimationTransition::new("Idle", "Idle", 0.1));
    assert_eq!(fsm.transition_to("Idle").ok().flatten(), None);
}

#[test]
fn transition_to_without_authored_edge_is_ignored() {
    let mut fsm = machine();
    assert_eq!(fsm.transition_to("Run").ok().flatten(), None);
    assert_eq!(fsm.current_state(), Some("Idle"));
    assert_eq!(fsm.target_state(), None);
}

#[test]
fn transition_to_returns_authored_edge() {
    let mut fsm = machine();
    fsm.add_transition(AnimationTransition::new("Idle", "Run", 0.25));

    let transition = fsm.transition_to("Run").ok().flatten();
    assert_eq!(transition.as_ref().map(|t| t.duration), Some(0.25));
    assert_eq!(fsm.target_state(), Some("Run"));

    if let Some(t) = transition {
        fsm.begin(&t);
    }
    assert_eq!(fsm.current_state(), Some("Run"));
    assert_eq!(fsm.target_state(), None);
}

#[test]
fn trigger_fires_and_is_consumed() {
    let mut fsm = machine();
    fsm.add_transition(AnimationTransition::new("Idle", "Run", 0.2).with_trigger("Go"));

    assert!(fsm.check_transitions(0.0).is_none());

    fsm.set_trigger("Go");
    assert!(fsm.is_trigger_set("Go"));
    let fired = fsm.check_transitions(0.0);
    assert_eq!(fired.map(|t| t.to_state), Some("Run".to_string()));
    assert!(!fsm.is_trigger_set("Go"));
}

#[test]
fn exit_time_gates_transition() {
    let mut fsm = machine();
    fsm.add_transition(AnimationTransition::new("Idle", "Run", 0.2).with_exit_time(0.8));

    assert!(fsm.check_transitions(0.79).is_none());
    assert!(fsm.check_transitions(0.8).is_some());
}

#[test]
fn ungated_transition_never_fires_on_its_own() {
    let mut fsm = machine();
    fsm.add_transition(AnimationTransition::new("Idle", "Run", 0.2));
    assert!(fsm.check_transitions(1.0).is_none());
}

#[test]
fn first_matching_transition_wins() {
    let mut fsm = machine();
    fsm.add_transition(AnimationTransition::new("Idle", "Jump", 0.2).with_exit_time(0.5));
    fsm.add_transition(AnimationTransition::new("Idle", "Run", 0.2).with_exit_time(0.5));

    let fired = fsm.check_transitions(0.9);
    assert_eq!(fired.map(|t| t.to_state), Some("Jump".to_string()));
}

#[test]
fn transitions_from_other_states_are_ignored() {
    let mut fsm = machine();
    fsm.add_transition(AnimationTransition::new("Run", "Jump", 0.2).with_trigger("Go"));
    fsm.set_trigger("Go");

    assert!(fsm.check_transitions(0.0).is_none());
    // The trigger stays armed until a transition consumes it.
    assert!(fsm.is_trigger_set("Go"));
}

// ============================================================================
// AnimationController: Simple Playback
// ============================================================================

#[test]
fn play_unknown_clip_fails_and_keeps_state() {
    let mut controller = controller();
    controller.play("Idle", true, 1.0).unwrap();

    let result = controller.play("Missing", true, 1.0);
    assert!(matches!(result, Err(ArmatureError::ClipNotFound(_))));
    assert_eq!(controller.current_animation_name(), Some("Idle"));
}

#[test]
fn play_and_update_fills_bone_array() {
    let mut controller = controller();
    controller.play("Run", true, 1.0).unwrap();
    controller.update(0.5);

    assert!(controller.is_playing());
    assert!(approx(controller.current_time(), 0.5));
    assert!(approx(controller.normalized_time(), 0.5));
    let translation = controller.bone_transforms()[0].w_axis.truncate();
    assert!((translation - Vec3::new(0.5, 0.0, 0.0)).length() < EPSILON);
}

#[test]
fn pause_freezes_time_and_resume_continues() {
    let mut controller = controller();
    controller.play("Run", true, 1.0).unwrap();
    controller.update(0.25);

    controller.pause();
    assert!(controller.is_paused());
    controller.update(0.5);
    assert!(approx(controller.current_time(), 0.25));

    controller.resume();
    controller.update(0.25);
    assert!(approx(controller.current_time(), 0.5));
}

#[test]
fn pause_before_first_update_holds_state_machine() {
    let mut controller = controller();
    controller.add_state("Idle", "Idle", true, 1.0).unwrap();
    controller.pause();
    assert!(controller.is_paused());

    controller.update(0.1);
    assert!(controller.layers().is_empty());

    controller.resume();
    controller.update(0.1);
    assert_eq!(controller.current_animation_name(), Some("Idle"));
}

#[test]
fn play_does_not_clear_pause() {
    let mut controller = controller();
    controller.pause();
    controller.play("Run", true, 1.0).unwrap();
    assert!(controller.is_paused());

    controller.update(0.5);
    assert_eq!(controller.current_time(), 0.0);
}

#[test]
fn stop_clears_layers_and_resets_bones() {
    let mut controller = controller();
    controller.play("Run", true, 1.0).unwrap();
    controller.update(0.5);

    controller.stop();
    assert!(!controller.is_playing());
    assert!(controller.layers().is_empty());
    assert_eq!(controller.bone_transforms(), &[Mat4::IDENTITY]);
}

#[test]
fn cross_fade_default_uses_settings() {
    let settings = AnimationSettings {
        default_fade_duration: 0.5,
        ..Default::default()
    };
    let mut controller = AnimationController::with_settings(settings);
    controller.add_clip(clip("Idle", Vec3::Y));
    controller.add_clip(clip("Run", Vec3::X));

    controller.play("Idle", true, 1.0).unwrap();
    controller.cross_fade_default("Run").unwrap();
    assert!(approx(controller.layers()[1].blend_duration, 0.5));
}

#[test]
fn settings_feed_new_clips_and_default_transitions() {
    let settings = AnimationSettings {
        default_ticks_per_second: 30.0,
        default_transition_duration: 0.4,
        ..Default::default()
    };
    let mut controller = AnimationController::with_settings(settings);
    assert_eq!(controller.new_clip("Blank").ticks_per_second(), 30.0);

    controller.add_clip(clip("Idle", Vec3::Y));
    controller.add_clip(clip("Run", Vec3::X));
    controller.add_state("Idle", "Idle", true, 1.0).unwrap();
    controller.add_state("Run", "Run", true, 1.0).unwrap();
    controller.add_transition_default("Idle", "Run");

    let durations: Vec<f32> = controller
        .state_machine()
        .transitions_from("Idle")
        .map(|t| t.duration)
        .collect();
    assert_eq!(durations, vec![0.4]);
}

#[test]
fn parameters_default_to_zero() {
    let mut controller = controller();
    assert_eq!(controller.float("Speed"), 0.0);
    assert_eq!(controller.int("Lives"), 0);
    assert!(!controller.bool("Grounded"));

    controller.set_float("Speed", 2.5);
    controller.set_int("Lives", 3);
    controller.set_bool("Grounded", true);
    assert_eq!(controller.float("Speed"), 2.5);
    assert_eq!(controller.int("Lives"), 3);
    assert!(controller.bool("Grounded"));
}

// ============================================================================
// AnimationController: State Machine Mode
// ============================================================================

#[test]
fn add_state_requires_registered_clip() {
    let mut controller = controller();
    let result = controller.add_state("Swim", "Swim", true, 1.0);
    assert!(matches!(result, Err(ArmatureError::ClipNotFound(_))));
    assert_eq!(controller.mode(), PlaybackMode::SimplePlayback);
}

#[test]
fn state_machine_starts_current_state_on_update() {
    let mut controller = controller();
    controller.add_state("Idle", "Idle", true, 1.0).unwrap();
    assert_eq!(controller.mode(), PlaybackMode::StateMachine);

    controller.update(0.1);
    assert_eq!(controller.current_animation_name(), Some("Idle"));
    assert!(controller.is_playing());
}

#[test]
fn trigger_go_crossfades_to_run() {
    let mut controller = controller();
    controller.add_state("Idle", "Idle", true, 1.0).unwrap();
    controller.add_state("Run", "Run", true, 1.0).unwrap();
    controller
        .add_transition_with(AnimationTransition::new("Idle", "Run", 0.2).with_trigger("Go"));

    controller.update(0.1);
    assert_eq!(controller.current_state(), Some("Idle"));

    controller.set_trigger("Go");
    controller.update(0.1);

    assert_eq!(controller.current_state(), Some("Run"));
    assert!(!controller.state_machine().is_trigger_set("Go"));
    assert_eq!(controller.mode(), PlaybackMode::StateMachine);

    let layers = controller.layers();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[1].clip().name(), "Run");
    assert!(layers[1].is_blending);

    // Once the fade completes only Run remains.
    controller.update(0.3);
    assert_eq!(controller.layers().len(), 1);
    assert_eq!(controller.current_animation_name(), Some("Run"));
}

#[test]
fn exit_time_transition_fires_from_playback_progress() {
    let mut controller = controller();
    controller.add_state("Idle", "Idle", false, 1.0).unwrap();
    controller.add_state("Run", "Run", true, 1.0).unwrap();
    controller.add_transition_with(AnimationTransition::new("Idle", "Run", 0.2).with_exit_time(0.5));

    controller.update(0.3);
    assert_eq!(controller.current_state(), Some("Idle"));

    controller.update(0.3);
    assert_eq!(controller.current_state(), Some("Run"));
}

#[test]
fn exit_time_at_clip_end_fires_when_looping_state_wraps() {
    let mut controller = controller();
    controller.add_state("Idle", "Idle", true, 1.0).unwrap();
    controller.add_state("Run", "Run", true, 1.0).unwrap();
    controller.add_transition_with(AnimationTransition::new("Idle", "Run", 0.2).with_exit_time(1.0));

    controller.update(0.6);
    assert_eq!(controller.current_state(), Some("Idle"));

    controller.update(0.6);
    assert_eq!(controller.current_state(), Some("Run"));
}

#[test]
fn chained_transitions_drop_the_interrupted_state() {
    let mut controller = controller();
    controller.add_clip(clip("Jump", Vec3::Z));
    controller.add_state("Idle", "Idle", true, 1.0).unwrap();
    controller.add_state("Run", "Run", true, 1.0).unwrap();
    controller.add_state("Jump", "Jump", true, 1.0).unwrap();
    controller.add_transition_with(AnimationTransition::new("Idle", "Run", 0.3).with_trigger("Go"));
    controller.add_transition_with(AnimationTransition::new("Run", "Jump", 0.3).with_trigger("Hop"));

    controller.update(0.1);
    controller.set_trigger("Go");
    controller.update(0.1);
    controller.set_trigger("Hop");
    controller.update(0.1);
    assert_eq!(controller.current_state(), Some("Jump"));

    for _ in 0..200 {
        controller.update(1.0 / 60.0);
    }
    let names: Vec<&str> = controller.layers().iter().map(|l| l.clip().name()).collect();
    assert_eq!(names, vec!["Jump"]);
}

#[test]
fn transition_to_state_follows_authored_edge() {
    let mut controller = controller();
    controller.add_state("Idle", "Idle", true, 1.0).unwrap();
    controller.add_state("Run", "Run", true, 1.0).unwrap();
    controller.add_transition("Idle", "Run", 0.2);
    controller.update(0.1);

    controller.transition_to_state("Run").unwrap();
    assert_eq!(controller.current_state(), Some("Run"));
    assert_eq!(controller.layers().len(), 2);
}

#[test]
fn transition_to_state_without_edge_is_ignored() {
    let mut controller = controller();
    controller.add_state("Idle", "Idle", true, 1.0).unwrap();
    controller.add_state("Run", "Run", true, 1.0).unwrap();
    controller.update(0.1);

    assert!(controller.transition_to_state("Run").is_ok());
    assert_eq!(controller.current_state(), Some("Idle"));
    assert_eq!(controller.layers().len(), 1);
}

#[test]
fn transition_to_unknown_state_reports_error() {
    let mut controller = controller();
    controller.add_state("Idle", "Idle", true, 1.0).unwrap();
    assert!(matches!(
        controller.transition_to_state("Swim"),
        Err(ArmatureError::StateNotFound(_))
    ));
}

#[test]
fn simple_playback_call_leaves_state_machine_mode() {
    let mut controller = controller();
    controller.add_state("Idle", "Idle", true, 1.0).unwrap();
    controller.play("Run", true, 1.0).unwrap();
    assert_eq!(controller.mode(), PlaybackMode::SimplePlayback);
}
