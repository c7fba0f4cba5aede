use std::any::Any;
use std::sync::Arc;

use glam::Mat4;

use crate::render::{Mesh, Renderer};
use crate::scene::component::Component;

/// Draws a shared mesh at its entity's world transform.
///
/// Skinning data is not owned here: the scene hands the bone array of an
/// [`AnimationController`](crate::animation::AnimationController) on the same
/// entity to the renderer before calling [`MeshRenderer::render`].
#[derive(Clone)]
pub struct MeshRenderer {
    mesh: Option<Arc<dyn Mesh>>,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    enabled: bool,
}

impl MeshRenderer {
    #[must_use]
    pub fn new(mesh: Arc<dyn Mesh>) -> Self {
        Self {
            mesh: Some(mesh),
            cast_shadows: true,
            receive_shadows: true,
            enabled: true,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            mesh: None,
            cast_shadows: true,
            receive_shadows: true,
            enabled: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self) -> Option<&Arc<dyn Mesh>> {
        self.mesh.as_ref()
    }

    pub fn set_mesh(&mut self, mesh: Option<Arc<dyn Mesh>>) {
        self.mesh = mesh;
    }

    pub fn render(&self, renderer: &mut dyn Renderer, world: &Mat4) {
        if let Some(mesh) = &self.mesh {
            mesh.render(renderer, world);
        }
    }
}

impl std::fmt::Debug for MeshRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshRenderer")
            .field("mesh", &self.mesh.as_ref().map(|m| m.name().to_string()))
            .field("cast_shadows", &self.cast_shadows)
            .field("receive_shadows", &self.receive_shadows)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl Component for MeshRenderer {
    fn type_name(&self) -> &'static str {
        "MeshRenderer"
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

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
