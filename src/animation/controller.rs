use std::any::Any;
use std::sync::Arc;

use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::animation::blend::BlendEngine;
use crate::animation::clip::AnimationClip;
use crate::animation::layer::PlayingAnimation;
use crate::animation::parameters::AnimatorParameters;
use crate::animation::state_machine::{AnimationState, AnimationTransition, StateMachine};
use crate::errors::{ArmatureError, Result};
use crate::scene::component::{Component, ComponentContext};
use crate::settings::AnimationSettings;

/// Which driver owns the layer stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    /// Layers are driven directly by `play` / `cross_fade` / `add_layer`.
    #[default]
    SimplePlayback,
    /// Layers follow the state machine's current state and transitions.
    StateMachine,
}

/// Skeletal animation component.
///
/// Owns a registry of shared clips, a [`BlendEngine`] and a [`StateMachine`],
/// and produces one bone matrix per skeleton bone every frame.
///
/// # Per-frame pipeline
///
/// 1. In state-machine mode, start the current state's clip if nothing plays
/// 2. Advance every layer's clock and weight ramp
/// 3. In state-machine mode, evaluate transitions and crossfade on a match
/// 4. Blend all layers into [`bone_transforms`](Self::bone_transforms)
/// 5. Drop layers that have faded out
///
/// Lookups by name fail softly: the error is logged and returned, and the
/// controller keeps playing whatever it played before.
#[derive(Debug)]
pub struct AnimationController {
    clips: FxHashMap<String, Arc<AnimationClip>>,

    engine: BlendEngine,
    state_machine: StateMachine,
    parameters: AnimatorParameters,
    mode: PlaybackMode,

    playing: bool,
    paused: bool,
    enabled: bool,

    bone_transforms: Vec<Mat4>,
    settings: AnimationSettings,
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationController {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(AnimationSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: AnimationSettings) -> Self {
        Self {
            clips: FxHashMap::default(),
            engine: BlendEngine::new(),
            state_machine: StateMachine::new(),
            parameters: AnimatorParameters::new(),
            mode: PlaybackMode::default(),
            playing: false,
            paused: false,
            enabled: true,
            bone_transforms: vec![Mat4::IDENTITY; settings.default_bone_count],
            settings,
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    // ========================================================================
    // Clip registry
    // ========================================================================

    /// Registers a clip under its own name, replacing any previous clip of
    /// that name. Returns the shared handle.
    pub fn add_clip(&mut self, clip: impl Into<Arc<AnimationClip>>) -> Arc<AnimationClip> {
        let clip = clip.into();
        if !clip.is_valid() {
            log::warn!("Registering animation clip '{}' that failed validation", clip.name());
        }
        log::debug!("Animation clip added: {}", clip.name());
        self.clips.insert(clip.name().to_string(), Arc::clone(&clip));
        clip
    }

    #[must_use]
    pub fn clip(&self, name: &str) -> Option<&Arc<AnimationClip>> {
        self.clips.get(name)
    }

    /// Unregisters a clip. Layers and states already holding it keep playing.
    pub fn remove_clip(&mut self, name: &str) -> Option<Arc<AnimationClip>> {
        self.clips.remove(name)
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(String::as_str)
    }

    /// Empty clip using the configured tick rate, ready to be filled and
    /// passed to [`add_clip`](Self::add_clip).
    #[must_use]
    pub fn new_clip(&self, name: impl Into<String>) -> AnimationClip {
        let mut clip = AnimationClip::new(name);
        clip.set_ticks_per_second(self.settings.default_ticks_per_second);
        clip
    }

    fn find_clip(&self, name: &str) -> Result<Arc<AnimationClip>> {
        self.clips.get(name).cloned().ok_or_else(|| {
            log::error!("Animation clip not found: {name}");
            ArmatureError::ClipNotFound(name.to_string())
        })
    }

    // ========================================================================
    // Simple playback
    // ========================================================================

    /// Replaces everything that plays with `name` at full weight.
    pub fn play(&mut self, name: &str, looping: bool, speed: f32) -> Result<()> {
        let clip = self.find_clip(name)?;
        self.engine.play(clip, looping, speed);
        self.playing = true;
        self.mode = PlaybackMode::SimplePlayback;
        log::debug!("Playing animation: {name}");
        Ok(())
    }

    /// Clears every layer and resets the bone array to identity.
    pub fn stop(&mut self) {
        self.engine.clear();
        self.playing = false;
        self.paused = false;
        self.bone_transforms.fill(Mat4::IDENTITY);
    }

    /// Freezes clocks and blending until [`resume`](Self::resume). Also holds
    /// back the state machine's first state when called before any update.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn cross_fade(
        &mut self,
        name: &str,
        fade_duration: f32,
        looping: bool,
        speed: f32,
    ) -> Result<()> {
        let clip = self.find_clip(name)?;
        self.engine.cross_fade(clip, fade_duration, looping, speed);
        self.playing = true;
        self.mode = PlaybackMode::SimplePlayback;
        log::debug!("Cross-fading to animation: {name} ({fade_duration}s)");
        Ok(())
    }

    /// [`cross_fade`](Self::cross_fade) with the configured default fade,
    /// looping at normal speed.
    pub fn cross_fade_default(&mut self, name: &str) -> Result<()> {
        let duration = self.settings.default_fade_duration;
        self.cross_fade(name, duration, true, 1.0)
    }

    pub fn add_layer(&mut self, name: &str, weight: f32, looping: bool, speed: f32) -> Result<()> {
        let clip = self.find_clip(name)?;
        self.engine.add_layer(clip, weight, looping, speed);
        self.playing = true;
        self.mode = PlaybackMode::SimplePlayback;
        Ok(())
    }

    pub fn remove_layer(&mut self, index: usize) -> Option<PlayingAnimation> {
        self.engine.remove_layer(index)
    }

    pub fn set_layer_weight(&mut self, index: usize, weight: f32) {
        self.engine.set_layer_weight(index, weight);
    }

    #[inline]
    #[must_use]
    pub fn layers(&self) -> &[PlayingAnimation] {
        self.engine.layers()
    }

    // ========================================================================
    // State machine
    // ========================================================================

    /// Adds a state bound to a registered clip and switches to state-machine
    /// mode. The first state added becomes the current one.
    pub fn add_state(&mut self, name: &str, clip_name: &str, looping: bool, speed: f32) -> Result<()> {
        let clip = self.find_clip(clip_name)?;
        let mut state = AnimationState::new(name, clip);
        state.looping = looping;
        state.speed = speed;
        state.blend_in_time = self.settings.default_fade_duration;
        state.blend_out_time = self.settings.default_fade_duration;

        self.state_machine.add_state(state);
        self.mode = PlaybackMode::StateMachine;
        Ok(())
    }

    /// Adds an ungated transition; it only fires through
    /// [`transition_to_state`](Self::transition_to_state).
    pub fn add_transition(&mut self, from: &str, to: &str, duration: f32) {
        let mut transition = AnimationTransition::new(from, to, duration);
        transition.exit_time = self.settings.default_exit_time;
        self.state_machine.add_transition(transition);
    }

    /// [`add_transition`](Self::add_transition) with the configured default
    /// duration.
    pub fn add_transition_default(&mut self, from: &str, to: &str) {
        let duration = self.settings.default_transition_duration;
        self.add_transition(from, to, duration);
    }

    pub fn add_transition_with(&mut self, transition: AnimationTransition) {
        self.state_machine.add_transition(transition);
    }

    pub fn set_trigger(&mut self, name: &str) {
        self.state_machine.set_trigger(name);
    }

    pub fn reset_trigger(&mut self, name: &str) {
        self.state_machine.reset_trigger(name);
    }

    /// Requests a move to `name` along an authored transition.
    ///
    /// Without such a transition the request is ignored.
    pub fn transition_to_state(&mut self, name: &str) -> Result<()> {
        let transition = self.state_machine.transition_to(name)?;
        self.mode = PlaybackMode::StateMachine;
        if let Some(transition) = transition {
            self.start_transition(&transition);
        }
        Ok(())
    }

    #[must_use]
    pub fn current_state(&self) -> Option<&str> {
        self.state_machine.current_state()
    }

    #[inline]
    #[must_use]
    pub fn state_machine(&self) -> &StateMachine {
        &self.state_machine
    }

    fn start_transition(&mut self, transition: &AnimationTransition) {
        let Some(target) = self.state_machine.state(&transition.to_state) else {
            log::error!("Animation state not found: {}", transition.to_state);
            return;
        };
        let (clip, looping, speed) = (Arc::clone(&target.clip), target.looping, target.speed);

        self.engine
            .cross_fade(clip, transition.duration, looping, speed);
        self.state_machine.begin(transition);
        self.playing = true;
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.parameters.set_float(name, value);
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.parameters.set_int(name, value);
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.parameters.set_bool(name, value);
    }

    #[must_use]
    pub fn float(&self, name: &str) -> f32 {
        self.parameters.float(name)
    }

    #[must_use]
    pub fn int(&self, name: &str) -> i32 {
        self.parameters.int(name)
    }

    #[must_use]
    pub fn bool(&self, name: &str) -> bool {
        self.parameters.bool(name)
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &AnimatorParameters {
        &self.parameters
    }

    // ========================================================================
    // Info
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[inline]
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Playback time of the first layer, 0 when nothing plays.
    #[must_use]
    pub fn current_time(&self) -> f32 {
        self.engine.layer(0).map_or(0.0, |l| l.current_time)
    }

    #[must_use]
    pub fn normalized_time(&self) -> f32 {
        self.engine
            .layer(0)
            .map_or(0.0, PlayingAnimation::normalized_time)
    }

    #[must_use]
    pub fn current_animation_name(&self) -> Option<&str> {
        self.engine.layer(0).map(|l| l.clip().name())
    }

    /// Blended bone matrices, index `i` for bone `i`.
    #[inline]
    #[must_use]
    pub fn bone_transforms(&self) -> &[Mat4] {
        &self.bone_transforms
    }

    /// Resizes the bone array and resets every slot to identity.
    pub fn set_bone_count(&mut self, count: usize) {
        self.bone_transforms.clear();
        self.bone_transforms.resize(count, Mat4::IDENTITY);
    }

    fn state_progress(&self) -> f32 {
        self.engine
            .layers()
            .last()
            .map_or(0.0, PlayingAnimation::normalized_time)
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    pub fn update(&mut self, dt: f32) {
        if !self.enabled || self.paused {
            return;
        }

        if self.mode == PlaybackMode::StateMachine
            && self.engine.is_empty()
            && let Some(state) = self.state_machine.current()
        {
            log::debug!("Entering animation state: {}", state.name);
            self.engine
                .play(Arc::clone(&state.clip), state.looping, state.speed);
            self.playing = true;
        }

        // The most recent layer belongs to the current state.
        let before = self.state_progress();
        self.engine.update(dt);

        if self.mode == PlaybackMode::StateMachine {
            let mut normalized = self.state_progress();
            // A looping state that wrapped this frame has passed every exit time.
            if normalized < before
                && self.engine.layers().last().is_some_and(|l| l.looping)
            {
                normalized = 1.0;
            }
            if let Some(transition) = self.state_machine.check_transitions(normalized) {
                self.start_transition(&transition);
            }
        }

        if !self.bone_transforms.is_empty() {
            self.engine.blend(&mut self.bone_transforms);
        }
        self.engine.cleanup();
    }
}

impl Component for AnimationController {
    fn type_name(&self) -> &'static str {
        "AnimationController"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.on_enabled();
        } else {
            self.on_disabled();
        }
    }

    fn on_update(&mut self, _ctx: &ComponentContext<'_>, dt: f32) {
        self.update(dt);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
