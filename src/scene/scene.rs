use glam::{Mat4, Quat, Vec3};
use slotmap::SlotMap;

use crate::animation::AnimationController;
use crate::errors::{ArmatureError, Result};
use crate::render::Renderer;
use crate::scene::EntityId;
use crate::scene::component::{Component, ComponentContext};
use crate::scene::entity::Entity;
use crate::scene::light::LightComponent;
use crate::scene::mesh_renderer::MeshRenderer;
use crate::scene::transform_system;

/// A forest of entities with their components.
///
/// Entities live in a `SlotMap` arena and refer to each other through
/// [`EntityId`] handles. Iteration (update, render, queries) follows creation
/// order.
///
/// Destruction is deferred: [`destroy_entity`](Self::destroy_entity) only
/// marks the entity and its subtree, and they are removed at the start of the
/// next [`update`](Self::update). Marked entities are skipped by every query
/// and edit; only [`entity`](Self::entity) still returns them.
pub struct Scene {
    name: String,
    active: bool,

    entities: SlotMap<EntityId, Entity>,
    order: Vec<EntityId>,
    pending_destroy: Vec<EntityId>,
}

impl Scene {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        log::debug!("Scene created: {name}");
        Self {
            name,
            active: true,
            entities: SlotMap::with_key(),
            order: Vec::new(),
            pending_destroy: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inactive scenes neither update nor render.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_scene_active(&mut self, active: bool) {
        self.active = active;
    }

    // ========================================================================
    // Entity lifecycle
    // ========================================================================

    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        let name = name.into();
        let id = self
            .entities
            .insert_with_key(|id| Entity::new(id, name));
        self.order.push(id);
        log::debug!("Entity created: {:?}", self.entities[id].name);
        id
    }

    /// Marks `id` and its whole subtree for removal.
    pub fn destroy_entity(&mut self, id: EntityId) -> Result<()> {
        if !self.entities.contains_key(id) {
            log::error!("destroy_entity: entity {id:?} not found");
            return Err(ArmatureError::EntityNotFound(id));
        }

        let mut stack = vec![id];
        while let Some(handle) = stack.pop() {
            let Some(entity) = self.entities.get_mut(handle) else {
                continue;
            };
            if entity.destroyed {
                continue;
            }
            entity.destroyed = true;
            self.pending_destroy.push(handle);
            stack.extend_from_slice(&entity.children);
            log::debug!("Entity marked for destruction: {}", entity.name);
        }
        Ok(())
    }

    /// Removes every entity immediately, running `on_destroy` hooks.
    pub fn destroy_all_entities(&mut self) {
        for entity in self.entities.values_mut() {
            for component in &mut entity.components {
                component.on_destroy();
            }
        }
        self.entities.clear();
        self.order.clear();
        self.pending_destroy.clear();
        log::debug!("All entities destroyed in scene: {}", self.name);
    }

    fn process_pending_destroy(&mut self) {
        if self.pending_destroy.is_empty() {
            return;
        }

        for id in std::mem::take(&mut self.pending_destroy) {
            let Some(mut entity) = self.entities.remove(id) else {
                continue;
            };
            for component in &mut entity.components {
                component.on_destroy();
            }
            if let Some(parent) = entity.parent.and_then(|p| self.entities.get_mut(p)) {
                parent.children.retain(|&c| c != id);
            }
            log::debug!("Entity removed from scene: {}", entity.name);
        }
        let entities = &self.entities;
        self.order.retain(|id| entities.contains_key(*id));
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Also returns entities marked for destruction until they are removed,
    /// so [`Entity::is_destroyed`] stays observable.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Mutable access for names and components of live entities. Transforms
    /// and hierarchy are edited through the scene so caches stay consistent.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id).filter(|e| !e.destroyed)
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.live(id).is_some()
    }

    fn live(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id).filter(|e| !e.destroyed)
    }

    /// Live entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|&id| self.live(id))
    }

    #[must_use]
    pub fn find_entity_by_name(&self, name: &str) -> Option<EntityId> {
        self.iter().find(|e| e.name == name).map(Entity::id)
    }

    #[must_use]
    pub fn find_entities_by_name(&self, name: &str) -> Vec<EntityId> {
        self.iter()
            .filter(|e| e.name == name)
            .map(Entity::id)
            .collect()
    }

    #[must_use]
    pub fn find_entities_with_component<T: Component>(&self) -> Vec<EntityId> {
        self.iter()
            .filter(|e| e.has_component::<T>())
            .map(Entity::id)
            .collect()
    }

    #[must_use]
    pub fn root_entities(&self) -> Vec<EntityId> {
        self.iter()
            .filter(|e| e.parent.is_none())
            .map(Entity::id)
            .collect()
    }

    /// Live entities, including those not active in the hierarchy.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn active_entity_count(&self) -> usize {
        self.iter()
            .filter(|e| self.is_active_in_hierarchy(e.id))
            .count()
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Re-parents `child` under `parent` (or makes it a root with `None`).
    ///
    /// The child keeps its local transform, so its world transform follows the
    /// new parent. Self-parenting and cycles are rejected.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> Result<()> {
        let Some(current) = self.live(child) else {
            log::error!("set_parent: entity {child:?} not found");
            return Err(ArmatureError::EntityNotFound(child));
        };
        let old_parent = current.parent;
        if old_parent == parent {
            return Ok(());
        }

        if let Some(parent) = parent {
            if self.live(parent).is_none() {
                log::error!("set_parent: parent {parent:?} not found");
                return Err(ArmatureError::EntityNotFound(parent));
            }
            if parent == child {
                log::warn!("Cannot parent an entity to itself");
                return Err(ArmatureError::InvalidHierarchy(
                    "entity cannot be its own parent".to_string(),
                ));
            }
            if self.is_ancestor(child, parent) {
                log::warn!("set_parent: {child:?} is an ancestor of {parent:?}, refusing cycle");
                return Err(ArmatureError::InvalidHierarchy(
                    "re-parenting would create a cycle".to_string(),
                ));
            }
        }

        if let Some(old) = old_parent.and_then(|p| self.entities.get_mut(p)) {
            old.children.retain(|&c| c != child);
        }
        if let Some(new) = parent.and_then(|p| self.entities.get_mut(p)) {
            new.children.push(child);
        }
        if let Some(entity) = self.entities.get_mut(child) {
            entity.parent = parent;
        }
        transform_system::mark_world_dirty(&self.entities, child);
        Ok(())
    }

    /// Whether `ancestor` appears on the parent chain of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut current = self.entities.get(id).and_then(|e| e.parent);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.entities.get(handle).and_then(|e| e.parent);
        }
        false
    }

    /// Direct child of `id` with the given name.
    #[must_use]
    pub fn find_child(&self, id: EntityId, name: &str) -> Option<EntityId> {
        self.live(id)?
            .children
            .iter()
            .copied()
            .find(|&c| self.live(c).is_some_and(|e| e.name == name))
    }

    /// Searches direct children first, then each child's subtree in order.
    #[must_use]
    pub fn find_child_recursive(&self, id: EntityId, name: &str) -> Option<EntityId> {
        if let Some(found) = self.find_child(id, name) {
            return Some(found);
        }
        self.live(id)?
            .children
            .iter()
            .find_map(|&c| self.find_child_recursive(c, name))
    }

    /// All descendants of `id`, depth-first, each child before its own children.
    #[must_use]
    pub fn children_recursive(&self, id: EntityId) -> Vec<EntityId> {
        let mut result = Vec::new();
        let Some(entity) = self.live(id) else {
            return result;
        };

        let mut stack: Vec<EntityId> = entity.children.iter().rev().copied().collect();
        while let Some(handle) = stack.pop() {
            let Some(node) = self.live(handle) else {
                continue;
            };
            result.push(handle);
            stack.extend(node.children.iter().rev().copied());
        }
        result
    }

    pub fn set_active(&mut self, id: EntityId, active: bool) -> Result<()> {
        let Some(entity) = self.entities.get_mut(id).filter(|e| !e.destroyed) else {
            log::error!("set_active: entity {id:?} not found");
            return Err(ArmatureError::EntityNotFound(id));
        };
        entity.active = active;
        Ok(())
    }

    /// Active when the entity and every ancestor are active and not destroyed.
    #[must_use]
    pub fn is_active_in_hierarchy(&self, id: EntityId) -> bool {
        let mut current = Some(id);
        while let Some(handle) = current {
            match self.live(handle) {
                Some(entity) if entity.active => current = entity.parent,
                _ => return false,
            }
        }
        true
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Attaches a component. On an entity that has already started, the
    /// component's `on_start` runs immediately.
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> Result<()> {
        if self.live(id).is_none() {
            log::error!("add_component: entity {id:?} not found");
            return Err(ArmatureError::EntityNotFound(id));
        }
        let world_matrix = transform_system::world_matrix(&self.entities, id);

        let Some(entity) = self.entities.get_mut(id) else {
            return Err(ArmatureError::EntityNotFound(id));
        };
        let mut component: Box<dyn Component> = Box::new(component);
        if entity.started && component.is_enabled() {
            let ctx = ComponentContext {
                entity: id,
                name: &entity.name,
                world_matrix,
            };
            component.on_start(&ctx);
        }
        log::debug!("Component {} added to {}", component.type_name(), entity.name);
        entity.components.push(component);
        Ok(())
    }

    #[must_use]
    pub fn component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.live(id)?.component::<T>()
    }

    pub fn component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities
            .get_mut(id)
            .filter(|e| !e.destroyed)?
            .component_mut::<T>()
    }

    #[must_use]
    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.live(id).is_some_and(Entity::has_component::<T>)
    }

    /// Every component of type `T` on the entity, in attachment order.
    #[must_use]
    pub fn components<T: Component>(&self, id: EntityId) -> Vec<&T> {
        self.live(id).map_or_else(Vec::new, |e| {
            e.components
                .iter()
                .filter_map(|c| c.downcast_ref::<T>())
                .collect()
        })
    }

    /// Detaches the first component of type `T`, running its `on_destroy`.
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entities.get_mut(id).filter(|e| !e.destroyed) else {
            return false;
        };
        let Some(index) = entity.components.iter().position(|c| c.is::<T>()) else {
            return false;
        };
        let mut component = entity.components.remove(index);
        component.on_destroy();
        true
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Runs one frame of the component lifecycle.
    ///
    /// Pending destructions are applied first. Entities active in the
    /// hierarchy then start their components (first frame only) and update
    /// every enabled component.
    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.process_pending_destroy();

        for index in 0..self.order.len() {
            let id = self.order[index];
            if !self.is_active_in_hierarchy(id) {
                continue;
            }

            let world_matrix = transform_system::world_matrix(&self.entities, id);
            let Some(entity) = self.entities.get_mut(id) else {
                continue;
            };

            // Components are taken out so hooks can run while the entity's
            // name is borrowed for the context.
            let mut components = std::mem::take(&mut entity.components);
            let first_frame = !entity.started;
            entity.started = true;

            let ctx = ComponentContext {
                entity: id,
                name: &entity.name,
                world_matrix,
            };
            if first_frame {
                for component in components.iter_mut().filter(|c| c.is_enabled()) {
                    component.on_start(&ctx);
                }
            }
            for component in components.iter_mut().filter(|c| c.is_enabled()) {
                component.on_update(&ctx, dt);
            }

            entity.components = components;
        }
    }

    /// Draws every enabled [`MeshRenderer`] of entities active in the
    /// hierarchy.
    ///
    /// When the entity also carries an enabled [`AnimationController`] with a
    /// non-empty bone array, that array is bound before the draw.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        if !self.active {
            return;
        }

        for entity in self.iter() {
            if !self.is_active_in_hierarchy(entity.id) {
                continue;
            }
            let mut mesh_renderers = entity
                .components
                .iter()
                .filter(|c| c.is_enabled())
                .filter_map(|c| c.downcast_ref::<MeshRenderer>())
                .peekable();
            if mesh_renderers.peek().is_none() {
                continue;
            }

            let world = transform_system::world_matrix(&self.entities, entity.id);
            let bones = entity
                .components
                .iter()
                .filter(|c| c.is_enabled())
                .find_map(|c| c.downcast_ref::<AnimationController>())
                .map(AnimationController::bone_transforms)
                .filter(|bones| !bones.is_empty());

            for mesh_renderer in mesh_renderers {
                if let Some(bones) = bones {
                    renderer.set_bone_transforms(bones);
                }
                mesh_renderer.render(renderer, &world);
            }
        }
    }

    /// Enabled lights of entities active in the hierarchy.
    #[must_use]
    pub fn lights(&self) -> Vec<&LightComponent> {
        self.iter()
            .filter(|e| self.is_active_in_hierarchy(e.id))
            .flat_map(|e| {
                e.components
                    .iter()
                    .filter(|c| c.is_enabled())
                    .filter_map(|c| c.downcast_ref::<LightComponent>())
            })
            .collect()
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    fn edited(&self, id: EntityId, found: bool) -> Result<()> {
        if found {
            Ok(())
        } else {
            log::error!("Transform edit on unknown entity {id:?} in scene '{}'", self.name);
            Err(ArmatureError::EntityNotFound(id))
        }
    }

    pub fn set_local_position(&mut self, id: EntityId, position: Vec3) -> Result<()> {
        let found = transform_system::set_local_position(&mut self.entities, id, position);
        self.edited(id, found)
    }

    pub fn set_local_rotation(&mut self, id: EntityId, rotation: Quat) -> Result<()> {
        let found = transform_system::set_local_rotation(&mut self.entities, id, rotation);
        self.edited(id, found)
    }

    pub fn set_local_scale(&mut self, id: EntityId, scale: Vec3) -> Result<()> {
        let found = transform_system::set_local_scale(&mut self.entities, id, scale);
        self.edited(id, found)
    }

    /// Pitch/yaw/roll in degrees.
    pub fn set_local_euler_degrees(&mut self, id: EntityId, degrees: Vec3) -> Result<()> {
        let found = transform_system::set_local_euler_degrees(&mut self.entities, id, degrees);
        self.edited(id, found)
    }

    pub fn set_world_position(&mut self, id: EntityId, position: Vec3) -> Result<()> {
        let found = transform_system::set_world_position(&mut self.entities, id, position);
        self.edited(id, found)
    }

    pub fn set_world_rotation(&mut self, id: EntityId, rotation: Quat) -> Result<()> {
        let found = transform_system::set_world_rotation(&mut self.entities, id, rotation);
        self.edited(id, found)
    }

    pub fn set_world_scale(&mut self, id: EntityId, scale: Vec3) -> Result<()> {
        let found = transform_system::set_world_scale(&mut self.entities, id, scale);
        self.edited(id, found)
    }

    pub fn translate(&mut self, id: EntityId, delta: Vec3) -> Result<()> {
        let found = transform_system::translate(&mut self.entities, id, delta);
        self.edited(id, found)
    }

    pub fn rotate(&mut self, id: EntityId, degrees: Vec3) -> Result<()> {
        let found = transform_system::rotate(&mut self.entities, id, degrees);
        self.edited(id, found)
    }

    pub fn scale_by(&mut self, id: EntityId, factor: Vec3) -> Result<()> {
        let found = transform_system::scale_by(&mut self.entities, id, factor);
        self.edited(id, found)
    }

    pub fn look_at(&mut self, id: EntityId, target: Vec3, up: Vec3) -> Result<()> {
        let found = transform_system::look_at(&mut self.entities, id, target, up);
        self.edited(id, found)
    }

    pub fn look_direction(&mut self, id: EntityId, direction: Vec3, up: Vec3) -> Result<()> {
        let found = transform_system::look_direction(&mut self.entities, id, direction, up);
        self.edited(id, found)
    }

    #[must_use]
    pub fn local_matrix(&self, id: EntityId) -> Mat4 {
        transform_system::local_matrix(&self.entities, id)
    }

    /// World matrix of `id`; identity for unknown handles.
    #[must_use]
    pub fn world_matrix(&self, id: EntityId) -> Mat4 {
        transform_system::world_matrix(&self.entities, id)
    }

    #[must_use]
    pub fn inverse_world_matrix(&self, id: EntityId) -> Mat4 {
        transform_system::inverse_world_matrix(&self.entities, id)
    }

    #[must_use]
    pub fn world_position(&self, id: EntityId) -> Vec3 {
        transform_system::world_position(&self.entities, id)
    }

    #[must_use]
    pub fn world_rotation(&self, id: EntityId) -> Quat {
        transform_system::world_rotation(&self.entities, id)
    }

    #[must_use]
    pub fn world_scale(&self, id: EntityId) -> Vec3 {
        transform_system::world_scale(&self.entities, id)
    }

    #[must_use]
    pub fn forward(&self, id: EntityId) -> Vec3 {
        transform_system::forward(&self.entities, id)
    }

    #[must_use]
    pub fn right(&self, id: EntityId) -> Vec3 {
        transform_system::right(&self.entities, id)
    }

    #[must_use]
    pub fn up(&self, id: EntityId) -> Vec3 {
        transform_system::up(&self.entities, id)
    }

    #[must_use]
    pub fn transform_point(&self, id: EntityId, point: Vec3) -> Vec3 {
        transform_system::transform_point(&self.entities, id, point)
    }

    #[must_use]
    pub fn transform_direction(&self, id: EntityId, direction: Vec3) -> Vec3 {
        transform_system::transform_direction(&self.entities, id, direction)
    }

    #[must_use]
    pub fn inverse_transform_point(&self, id: EntityId, point: Vec3) -> Vec3 {
        transform_system::inverse_transform_point(&self.entities, id, point)
    }

    #[must_use]
    pub fn inverse_transform_direction(&self, id: EntityId, direction: Vec3) -> Vec3 {
        transform_system::inverse_transform_direction(&self.entities, id, direction)
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        if !self.entities.is_empty() {
            self.destroy_all_entities();
        }
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("active", &self.active)
            .field("entities", &self.entities.len())
            .field("pending_destroy", &self.pending_destroy.len())
            .finish()
    }
}
