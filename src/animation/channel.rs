use glam::{Mat4, Quat, Vec3};

use crate::animation::keyframe::KeyframeTrack;

/// Keyframes driving one bone: independent position, rotation and scale tracks.
///
/// Any track may be empty, in which case sampling yields the identity value for
/// that component (origin, identity rotation, unit scale).
#[derive(Debug, Clone, Default)]
pub struct AnimationChannel {
    pub bone_name: String,
    /// Slot in the output bone array. `None` while the channel is not bound to
    /// a skeleton.
    pub bone_index: Option<usize>,

    pub position_keys: KeyframeTrack<Vec3>,
    pub rotation_keys: KeyframeTrack<Quat>,
    pub scale_keys: KeyframeTrack<Vec3>,
}

impl AnimationChannel {
    #[must_use]
    pub fn new(bone_name: impl Into<String>) -> Self {
        Self {
            bone_name: bone_name.into(),
            ..Self::default()
        }
    }

    /// Creates a channel already bound to a bone slot.
    #[must_use]
    pub fn with_bone_index(bone_name: impl Into<String>, bone_index: usize) -> Self {
        Self {
            bone_name: bone_name.into(),
            bone_index: Some(bone_index),
            ..Self::default()
        }
    }

    pub fn add_position_key(&mut self, time: f32, position: Vec3) -> &mut Self {
        self.position_keys.insert(time, position);
        self
    }

    /// Rotation keys are normalized on insertion.
    pub fn add_rotation_key(&mut self, time: f32, rotation: Quat) -> &mut Self {
        self.rotation_keys.insert(time, rotation.normalize());
        self
    }

    pub fn add_scale_key(&mut self, time: f32, scale: Vec3) -> &mut Self {
        self.scale_keys.insert(time, scale);
        self
    }

    #[must_use]
    pub fn sample_position(&self, time: f32) -> Vec3 {
        self.position_keys.sample(time, Vec3::ZERO)
    }

    #[must_use]
    pub fn sample_rotation(&self, time: f32) -> Quat {
        self.rotation_keys.sample(time, Quat::IDENTITY)
    }

    #[must_use]
    pub fn sample_scale(&self, time: f32) -> Vec3 {
        self.scale_keys.sample(time, Vec3::ONE)
    }

    /// Local bone transform at `time`: points are scaled, then rotated, then
    /// translated.
    #[must_use]
    pub fn sample_transform(&self, time: f32) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.sample_scale(time),
            self.sample_rotation(time),
            self.sample_position(time),
        )
    }

    /// Latest key time across all three tracks.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.position_keys
            .end_time()
            .max(self.rotation_keys.end_time())
            .max(self.scale_keys.end_time())
    }

    #[must_use]
    pub fn has_keyframes(&self) -> bool {
        !(self.position_keys.is_empty()
            && self.rotation_keys.is_empty()
            && self.scale_keys.is_empty())
    }

    /// A channel can be routed to a bone if it carries a name or an index.
    #[must_use]
    pub fn has_bone_identity(&self) -> bool {
        !self.bone_name.is_empty() || self.bone_index.is_some()
    }
}
