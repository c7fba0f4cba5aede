use crate::scene::EntityId;
use crate::scene::component::Component;
use crate::scene::transform::Transform;

/// A named object in a [`Scene`](crate::scene::Scene).
///
/// # Hierarchy
///
/// Entities form a forest through handles into the scene's arena:
/// - `parent`: `None` for root entities
/// - `children`: child handles in attachment order
///
/// Both sides are kept in sync by [`Scene::set_parent`](crate::scene::Scene::set_parent);
/// they are read-only from outside the scene module.
///
/// # Components
///
/// Behaviour is stored as `Box<dyn Component>` in insertion order. Several
/// components of the same type may coexist.
pub struct Entity {
    pub(crate) id: EntityId,
    pub(crate) name: String,

    pub(crate) active: bool,
    pub(crate) destroyed: bool,
    pub(crate) started: bool,

    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,

    pub(crate) transform: Transform,
    pub(crate) components: Vec<Box<dyn Component>>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, name: String) -> Self {
        Self {
            id,
            name,
            active: true,
            destroyed: false,
            started: false,
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            components: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The entity's own flag. See
    /// [`Scene::is_active_in_hierarchy`](crate::scene::Scene::is_active_in_hierarchy)
    /// for the effective state.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Marked for removal at the start of the next scene update.
    #[inline]
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[inline]
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn components(&self) -> impl Iterator<Item = &(dyn Component + 'static)> {
        self.components.iter().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn component<T: Component>(&self) -> Option<&T> {
        self.components.iter().find_map(|c| c.downcast_ref::<T>())
    }

    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .iter_mut()
            .find_map(|c| c.downcast_mut::<T>())
    }

    #[must_use]
    pub fn has_component<T: Component>(&self) -> bool {
        self.components.iter().any(|c| c.is::<T>())
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("active", &self.active)
            .field("destroyed", &self.destroyed)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field(
                "components",
                &self
                    .components
                    .iter()
                    .map(|c| c.type_name())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
