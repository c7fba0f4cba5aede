use glam::{Quat, Vec3};

/// A value that can be interpolated between two keyframes.
pub trait Interpolatable: Copy + Sized {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Interpolatable for Quat {
    /// Spherical interpolation. The result is renormalized to stop drift from
    /// accumulating over long playback.
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t).normalize()
    }
}
