use std::any::Any;

use glam::Vec3;

use crate::scene::component::{Component, ComponentContext};

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowConfig {
    pub bias: f32,
    pub normal_bias: f32,
    pub map_size: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            bias: 0.005,
            normal_bias: 0.02,
            map_size: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub cascade_count: u32,
    /// Distance from the camera covered by the shadow cascades.
    pub shadow_distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub range: f32,
    /// Constant, linear and quadratic falloff terms.
    pub attenuation: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    pub range: f32,
    /// Cone half-angles in degrees.
    pub inner_cone: f32,
    pub outer_cone: f32,
    pub attenuation: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

/// Light source attached to an entity.
///
/// Position and direction are not authored on the light: they follow the
/// entity's world transform and are refreshed in `on_start` / `on_update`.
/// Lights shine along the entity's forward axis (`-Z`).
#[derive(Debug, Clone)]
pub struct LightComponent {
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,

    pub cast_shadows: bool,
    pub shadow: ShadowConfig,

    position: Vec3,
    direction: Vec3,
    enabled: bool,
}

impl LightComponent {
    fn with_kind(color: Vec3, intensity: f32, kind: LightKind) -> Self {
        Self {
            color,
            intensity,
            kind,
            cast_shadows: false,
            shadow: ShadowConfig::default(),
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            enabled: true,
        }
    }

    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self::with_kind(
            color,
            intensity,
            LightKind::Directional(DirectionalLight {
                cascade_count: 4,
                shadow_distance: 100.0,
            }),
        )
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self::with_kind(
            color,
            intensity,
            LightKind::Point(PointLight {
                range,
                attenuation: Vec3::new(1.0, 0.09, 0.032),
            }),
        )
    }

    #[must_use]
    pub fn new_spot(
        color: Vec3,
        intensity: f32,
        range: f32,
        inner_cone: f32,
        outer_cone: f32,
    ) -> Self {
        Self::with_kind(
            color,
            intensity,
            LightKind::Spot(SpotLight {
                range,
                inner_cone,
                outer_cone: outer_cone.max(inner_cone),
                attenuation: Vec3::new(1.0, 0.09, 0.032),
            }),
        )
    }

    /// World-space position, as of the last update.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// World-space unit direction, as of the last update.
    #[inline]
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    fn sync_transform(&mut self, ctx: &ComponentContext<'_>) {
        let world = ctx.world_matrix;
        self.position = world.w_axis.truncate();
        let forward = (-world.z_axis.truncate()).normalize_or_zero();
        if forward != Vec3::ZERO {
            self.direction = forward;
        }
    }
}

impl Component for LightComponent {
    fn type_name(&self) -> &'static str {
        "LightComponent"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            if enabled {
                self.on_enabled();
            } else {
                self.on_disabled();
            }
        }
    }

    fn on_start(&mut self, ctx: &ComponentContext<'_>) {
        self.sync_transform(ctx);
    }

    fn on_update(&mut self, ctx: &ComponentContext<'_>, _dt: f32) {
        self.sync_transform(ctx);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
