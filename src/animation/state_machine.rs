use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::animation::clip::AnimationClip;
use crate::errors::{ArmatureError, Result};

/// A named node of the state graph, bound to exactly one clip.
#[derive(Debug, Clone)]
pub struct AnimationState {
    pub name: String,
    pub clip: Arc<AnimationClip>,
    pub looping: bool,
    pub speed: f32,
    pub blend_in_time: f32,
    pub blend_out_time: f32,
}

impl AnimationState {
    #[must_use]
    pub fn new(name: impl Into<String>, clip: Arc<AnimationClip>) -> Self {
        Self {
            name: name.into(),
            clip,
            looping: true,
            speed: 1.0,
            blend_in_time: 0.3,
            blend_out_time: 0.3,
        }
    }
}

/// A directed, gated edge between two states.
///
/// A transition fires when its trigger is set, or when it has an exit time and
/// the source state's normalized playback time has reached it. An edge with
/// neither gate only fires on an explicit request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTransition {
    pub from_state: String,
    pub to_state: String,
    /// Crossfade length in seconds.
    pub duration: f32,
    pub has_exit_time: bool,
    /// Normalized time in `[0, 1]` of the source state.
    pub exit_time: f32,
    pub trigger: Option<String>,
}

impl AnimationTransition {
    #[must_use]
    pub fn new(from_state: impl Into<String>, to_state: impl Into<String>, duration: f32) -> Self {
        Self {
            from_state: from_state.into(),
            to_state: to_state.into(),
            duration,
            has_exit_time: false,
            exit_time: 0.9,
            trigger: None,
        }
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    /// Gates the edge on the source state's normalized time. For looping
    /// states, wrapping around the end of the clip counts as reaching any
    /// exit time, so `1.0` fires once per loop.
    #[must_use]
    pub fn with_exit_time(mut self, exit_time: f32) -> Self {
        self.has_exit_time = true;
        self.exit_time = exit_time.clamp(0.0, 1.0);
        self
    }
}

/// Named states, gated transitions and trigger flags.
///
/// The machine only decides. Whoever owns it applies the returned transition
/// (usually by crossfading) and then calls [`StateMachine::begin`].
#[derive(Debug, Default)]
pub struct StateMachine {
    states: FxHashMap<String, AnimationState>,
    transitions: Vec<AnimationTransition>,
    triggers: FxHashMap<String, bool>,

    current_state: Option<String>,
    target_state: Option<String>,
}

impl StateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a state, replacing any state of the same name. The first
    /// state added becomes current.
    pub fn add_state(&mut self, state: AnimationState) {
        if self.current_state.is_none() {
            self.current_state = Some(state.name.clone());
        }
        log::debug!("Animation state added: {}", state.name);
        self.states.insert(state.name.clone(), state);
    }

    pub fn add_transition(&mut self, transition: AnimationTransition) {
        log::debug!(
            "Animation transition added: {} -> {}",
            transition.from_state,
            transition.to_state
        );
        self.transitions.push(transition);
    }

    pub fn set_trigger(&mut self, name: impl Into<String>) {
        let name = name.into();
        log::debug!("Animation trigger set: {name}");
        self.triggers.insert(name, true);
    }

    pub fn reset_trigger(&mut self, name: &str) {
        if let Some(flag) = self.triggers.get_mut(name) {
            *flag = false;
        }
    }

    #[must_use]
    pub fn is_trigger_set(&self, name: &str) -> bool {
        self.triggers.get(name).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn state(&self, name: &str) -> Option<&AnimationState> {
        self.states.get(name)
    }

    #[must_use]
    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    #[must_use]
    pub fn current_state(&self) -> Option<&str> {
        self.current_state.as_deref()
    }

    #[must_use]
    pub fn current(&self) -> Option<&AnimationState> {
        self.current_state.as_deref().and_then(|n| self.states.get(n))
    }

    /// State an explicit request is heading for, if one is pending.
    #[must_use]
    pub fn target_state(&self) -> Option<&str> {
        self.target_state.as_deref()
    }

    #[must_use]
    pub fn transitions(&self) -> &[AnimationTransition] {
        &self.transitions
    }

    /// Outgoing edges of `state`, in insertion order.
    pub fn transitions_from<'a>(
        &'a self,
        state: &'a str,
    ) -> impl Iterator<Item = &'a AnimationTransition> + 'a {
        self.transitions.iter().filter(move |t| t.from_state == state)
    }

    /// Resolves an explicit request to move to `name`.
    ///
    /// Only authored edges are followed: without a transition from the current
    /// state to `name` the request is dropped and `Ok(None)` is returned.
    pub fn transition_to(&mut self, name: &str) -> Result<Option<AnimationTransition>> {
        if !self.states.contains_key(name) {
            log::error!("Animation state not found: {name}");
            return Err(ArmatureError::StateNotFound(name.to_string()));
        }

        let Some(current) = self.current_state.as_deref() else {
            return Ok(None);
        };
        if current == name {
            return Ok(None);
        }

        self.target_state = Some(name.to_string());
        let found = self
            .transitions_from(current)
            .find(|t| t.to_state == name)
            .cloned();

        if found.is_none() {
            log::debug!("No transition authored from '{current}' to '{name}', request ignored");
            self.target_state = None;
        }
        Ok(found)
    }

    /// Evaluates the current state's outgoing edges against the frame's
    /// conditions. First match wins; a trigger that fires is consumed.
    pub fn check_transitions(&mut self, normalized_time: f32) -> Option<AnimationTransition> {
        let current = self.current_state.as_deref()?;

        let mut fired: Option<(usize, bool)> = None;
        for (i, transition) in self.transitions.iter().enumerate() {
            if transition.from_state != current {
                continue;
            }

            let triggered = transition
                .trigger
                .as_deref()
                .is_some_and(|name| self.triggers.get(name).copied().unwrap_or(false));
            let exit_reached = transition.has_exit_time && normalized_time >= transition.exit_time;

            if triggered || exit_reached {
                fired = Some((i, triggered));
                break;
            }
        }

        let (index, consume_trigger) = fired?;
        let transition = self.transitions[index].clone();
        if consume_trigger && let Some(name) = transition.trigger.as_deref() {
            self.reset_trigger(name);
        }
        Some(transition)
    }

    /// Commits a transition that the owner has started playing.
    pub fn begin(&mut self, transition: &AnimationTransition) {
        log::debug!("Started transition to state: {}", transition.to_state);
        self.current_state = Some(transition.to_state.clone());
        self.target_state = None;
    }
}
