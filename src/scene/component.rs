//! Component trait
//!
//! Behaviour is attached to entities as boxed trait objects. The scene drives
//! the lifecycle:
//!
//! 1. `on_start` once, on the first update after the entity was created
//! 2. `on_update` every frame while the component is enabled and its entity
//!    is active in the hierarchy
//! 3. `on_destroy` when the entity is removed or the component is detached
//!
//! Typed access goes through [`Component::as_any`] downcasts, see
//! [`Scene::component`](crate::scene::Scene::component).

use std::any::Any;

use glam::Mat4;

use crate::scene::EntityId;

/// Read-only view of the owning entity handed to lifecycle hooks.
#[derive(Debug, Clone, Copy)]
pub struct ComponentContext<'a> {
    pub entity: EntityId,
    pub name: &'a str,
    /// World matrix of the entity at the time of the call.
    pub world_matrix: Mat4,
}

pub trait Component: Any + Send {
    fn type_name(&self) -> &'static str;

    fn is_enabled(&self) -> bool;

    /// Implementations call [`on_enabled`](Self::on_enabled) /
    /// [`on_disabled`](Self::on_disabled) when the flag actually changes.
    fn set_enabled(&mut self, enabled: bool);

    fn on_start(&mut self, _ctx: &ComponentContext<'_>) {}

    fn on_update(&mut self, _ctx: &ComponentContext<'_>, _dt: f32) {}

    fn on_destroy(&mut self) {}

    fn on_enabled(&mut self) {}

    fn on_disabled(&mut self) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Component {
    /// Downcast helper.
    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }
}
