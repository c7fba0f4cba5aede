#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::float_cmp)]

//! CPU-side core of a real-time 3D engine: an entity-component scene graph
//! with a cached transform hierarchy, and skeletal animation playback driven
//! by a blend engine and a state machine.
//!
//! Rendering is out of scope. The core produces world matrices and bone
//! arrays and hands them to a host-provided [`render::Renderer`].

pub mod animation;
pub mod errors;
pub mod render;
pub mod scene;
pub mod settings;

pub use animation::{
    AnimationChannel, AnimationClip, AnimationController, AnimationState, AnimationTransition,
    BlendEngine, PlaybackMode, PlayingAnimation, StateMachine,
};
pub use errors::{ArmatureError, ClipError, Result};
pub use render::{BoneMap, BoneNames, Mesh, Renderer, bone_bytes};
pub use scene::{
    Component, ComponentContext, Entity, EntityId, LightComponent, MeshRenderer, Scene,
    SceneHandle, SceneManager, Transform,
};
pub use settings::AnimationSettings;
