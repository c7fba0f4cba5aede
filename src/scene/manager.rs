use slotmap::{SlotMap, new_key_type};

use crate::render::Renderer;
use crate::scene::Scene;

new_key_type! {
    pub struct SceneHandle;
}

/// Owns named scenes and tracks which one is active.
///
/// Only the active scene is updated and rendered. The manager is a plain
/// value owned by the host; there is no global instance.
pub struct SceneManager {
    scenes: SlotMap<SceneHandle, Scene>,
    active_scene: Option<SceneHandle>,
}

impl SceneManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scenes: SlotMap::with_key(),
            active_scene: None,
        }
    }

    /// Creates an empty scene. Names are not required to be unique;
    /// lookups by name return the first match.
    pub fn create_scene(&mut self, name: impl Into<String>) -> SceneHandle {
        self.scenes.insert(Scene::new(name))
    }

    /// Takes ownership of an already built scene.
    pub fn load_scene(&mut self, scene: Scene) -> SceneHandle {
        log::debug!("Scene loaded: {}", scene.name());
        self.scenes.insert(scene)
    }

    /// Removes a scene and returns it. Unloading the active scene leaves the
    /// manager without one.
    pub fn unload_scene(&mut self, handle: SceneHandle) -> Option<Scene> {
        if self.active_scene == Some(handle) {
            self.active_scene = None;
            log::warn!("Active scene was unloaded, nothing will update or render");
        }
        self.scenes.remove(handle)
    }

    pub fn unload_all(&mut self) {
        self.active_scene = None;
        self.scenes.clear();
    }

    /// Returns `false` and keeps the current scene when `handle` is unknown.
    pub fn set_active_scene(&mut self, handle: SceneHandle) -> bool {
        if self.scenes.contains_key(handle) {
            self.active_scene = Some(handle);
            true
        } else {
            log::error!("Attempted to activate an unknown scene handle");
            false
        }
    }

    /// Creates a scene, makes it active and returns it.
    pub fn create_active(&mut self, name: impl Into<String>) -> (SceneHandle, &mut Scene) {
        let handle = self.create_scene(name);
        self.active_scene = Some(handle);
        (handle, &mut self.scenes[handle])
    }

    #[must_use]
    pub fn active_handle(&self) -> Option<SceneHandle> {
        self.active_scene
    }

    #[must_use]
    pub fn scene(&self, handle: SceneHandle) -> Option<&Scene> {
        self.scenes.get(handle)
    }

    pub fn scene_mut(&mut self, handle: SceneHandle) -> Option<&mut Scene> {
        self.scenes.get_mut(handle)
    }

    #[must_use]
    pub fn active_scene(&self) -> Option<&Scene> {
        self.active_scene.and_then(|h| self.scenes.get(h))
    }

    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.active_scene.and_then(|h| self.scenes.get_mut(h))
    }

    #[must_use]
    pub fn find_scene(&self, name: &str) -> Option<SceneHandle> {
        self.scenes
            .iter()
            .find(|(_, scene)| scene.name() == name)
            .map(|(handle, _)| handle)
    }

    #[must_use]
    pub fn scene_names(&self) -> Vec<&str> {
        self.scenes.values().map(Scene::name).collect()
    }

    #[must_use]
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    pub fn update(&mut self, dt: f32) {
        if let Some(scene) = self.active_scene_mut() {
            scene.update(dt);
        }
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        if let Some(scene) = self.active_scene() {
            scene.render(renderer);
        }
    }

    /// Live entities across all loaded scenes.
    #[must_use]
    pub fn total_entity_count(&self) -> usize {
        self.scenes.values().map(Scene::entity_count).sum()
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}
