use std::cell::Cell;

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Local TRS of a scene entity plus its cached local and world matrices.
///
/// The caches live in `Cell`s so that reading a matrix only needs `&self`,
/// even when the cache has to be rebuilt first. Writes through the setters
/// only invalidate this node; invalidating descendants is the job of
/// [`transform_system`](crate::scene::transform_system), which is why an
/// entity's transform is only mutable through the [`Scene`](crate::scene::Scene).
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,

    local_matrix: Cell<Mat4>,
    world_matrix: Cell<Mat4>,
    local_dirty: Cell<bool>,
    world_dirty: Cell<bool>,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,

            local_matrix: Cell::new(Mat4::IDENTITY),
            world_matrix: Cell::new(Mat4::IDENTITY),
            local_dirty: Cell::new(true),
            world_dirty: Cell::new(true),
        }
    }

    #[must_use]
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let mut transform = Self::new();
        transform.position = position;
        transform.rotation = rotation.normalize();
        transform.scale = scale;
        transform
    }

    // ========================================================================
    // Local TRS
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.mark_local_dirty();
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
        self.mark_local_dirty();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.mark_local_dirty();
    }

    /// Local rotation as Euler angles in degrees: `x` pitch, `y` yaw, `z` roll,
    /// applied yaw → pitch → roll.
    #[must_use]
    pub fn euler_degrees(&self) -> Vec3 {
        let (yaw, pitch, roll) = self.rotation.to_euler(EulerRot::YXZ);
        Vec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees())
    }

    pub fn set_euler_degrees(&mut self, degrees: Vec3) {
        self.set_rotation(euler_degrees_to_quat(degrees));
    }

    // ========================================================================
    // Matrix caches
    // ========================================================================

    /// Local matrix (scale, then rotate, then translate). Rebuilt on demand.
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        if self.local_dirty.get() {
            self.local_matrix.set(Mat4::from_scale_rotation_translation(
                self.scale,
                self.rotation,
                self.position,
            ));
            self.local_dirty.set(false);
        }
        self.local_matrix.get()
    }

    #[inline]
    #[must_use]
    pub fn is_local_dirty(&self) -> bool {
        self.local_dirty.get()
    }

    #[inline]
    #[must_use]
    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty.get()
    }

    /// Last world matrix stored by the hierarchy. Stale while
    /// [`is_world_dirty`](Self::is_world_dirty) is true.
    #[inline]
    #[must_use]
    pub(crate) fn cached_world_matrix(&self) -> Mat4 {
        self.world_matrix.get()
    }

    pub(crate) fn store_world_matrix(&self, world: Mat4) {
        self.world_matrix.set(world);
        self.world_dirty.set(false);
    }

    pub(crate) fn mark_world_dirty(&self) {
        self.world_dirty.set(true);
    }

    fn mark_local_dirty(&mut self) {
        self.local_dirty.set(true);
        self.world_dirty.set(true);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Pitch/yaw/roll in degrees (`x`, `y`, `z`) to a quaternion, yaw applied first.
#[must_use]
pub fn euler_degrees_to_quat(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        degrees.y.to_radians(),
        degrees.x.to_radians(),
        degrees.z.to_radians(),
    )
}
