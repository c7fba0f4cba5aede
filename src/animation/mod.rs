mod values;
pub mod keyframe;
pub mod channel;
pub mod clip;
pub mod layer;
pub mod blend;
pub mod state_machine;
pub mod parameters;
pub mod controller;

pub use values::Interpolatable;
pub use keyframe::{Keyframe, KeyframeTrack};
pub use channel::AnimationChannel;
pub use clip::{AnimationClip, DEFAULT_TICKS_PER_SECOND};
pub use layer::{Fade, PlayingAnimation};
pub use blend::BlendEngine;
pub use state_machine::{AnimationState, AnimationTransition, StateMachine};
pub use parameters::AnimatorParameters;
pub use controller::{AnimationController, PlaybackMode};
