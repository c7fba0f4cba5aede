//! Error Types
//!
//! This module defines the error types used throughout the engine core.
//!
//! # Overview
//!
//! The main error type [`ArmatureError`] covers the failure modes of the
//! animation and scene layers:
//! - Missing references (clip, state or entity looked up by name/handle)
//! - Structural problems in animation clips
//! - Invalid hierarchy edits
//! - Settings parsing
//!
//! None of these abort a frame. Operations that fail leave their target
//! untouched and report the problem through `log` as well as the returned
//! error, so callers that do not care can simply ignore the result.
//!
//! ```rust,ignore
//! use armature::errors::Result;
//!
//! fn setup(controller: &mut AnimationController) -> Result<()> {
//!     controller.play("Idle", true, 1.0)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::scene::EntityId;

/// The main error type for the engine core.
#[derive(Error, Debug)]
pub enum ArmatureError {
    // ========================================================================
    // Missing references
    // ========================================================================
    /// No clip is registered under the given name.
    #[error("Animation clip not found: {0}")]
    ClipNotFound(String),

    /// No state with the given name exists in the state machine.
    #[error("Animation state not found: {0}")]
    StateNotFound(String),

    /// The entity handle is stale or was never issued by this scene.
    #[error("Entity not found: {0:?}")]
    EntityNotFound(EntityId),

    // ========================================================================
    // Structural errors
    // ========================================================================
    /// The requested parent/child relation would break the tree.
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// A clip failed structural validation.
    #[error("Invalid animation clip: {0}")]
    InvalidClip(#[from] ClipError),

    // ========================================================================
    // Configuration
    // ========================================================================
    /// Settings could not be parsed.
    #[error("Settings parse error: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Structural validation failures of an [`AnimationClip`](crate::animation::AnimationClip).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClipError {
    #[error("clip has an empty name")]
    EmptyName,

    #[error("clip '{name}' has non-positive duration {duration}")]
    NonPositiveDuration { name: String, duration: f32 },

    #[error("clip '{0}' has no channels")]
    NoChannels(String),

    #[error("channel #{channel} of clip '{clip}' has neither a bone name nor a bone index")]
    UnboundChannel { clip: String, channel: usize },

    #[error("channel '{bone}' of clip '{clip}' has no keyframes")]
    EmptyChannel { clip: String, bone: String },
}

/// Alias for `Result<T, ArmatureError>`.
pub type Result<T> = std::result::Result<T, ArmatureError>;
