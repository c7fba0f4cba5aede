//! Scene graph
//!
//! Entity-component scene with a cached transform hierarchy:
//! - [`Entity`]: named node holding a [`Transform`], hierarchy links and components
//! - [`Transform`]: local TRS with lazily rebuilt local/world matrices
//! - [`transform_system`]: hierarchy-aware transform operations
//! - [`Component`]: behaviour attached to entities
//! - [`Scene`]: entity arena and frame lifecycle
//! - [`SceneManager`]: named scenes, one of them active

pub mod component;
pub mod entity;
pub mod light;
pub mod manager;
pub mod mesh_renderer;
pub mod scene;
pub mod transform;
pub mod transform_system;

pub use component::{Component, ComponentContext};
pub use entity::Entity;
pub use light::{LightComponent, LightKind, ShadowConfig};
pub use manager::{SceneHandle, SceneManager};
pub use mesh_renderer::MeshRenderer;
pub use scene::Scene;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    /// Handle of an entity inside its [`Scene`].
    pub struct EntityId;
}
