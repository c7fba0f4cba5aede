//! Transform System
//!
//! Hierarchy-aware transform operations over the entity arena. Kept apart
//! from [`Scene`](crate::scene::Scene) so that they only borrow the
//! `SlotMap` and not the whole scene.
//!
//! # Dirty propagation
//!
//! Writes are eager: changing a local TRS marks the node and its whole
//! subtree world-dirty right away. Reads are lazy: [`world_matrix`] walks up
//! from the node while ancestors are dirty and rebuilds exactly that stale
//! chain, top-down. A dirty node therefore always has dirty descendants,
//! which lets the invalidation walk stop at subtrees that are already dirty.
//!
//! Matrices follow `glam`'s column-vector convention:
//! `world = parent_world * local`.

use glam::{Mat3, Mat4, Quat, Vec3};
use slotmap::SlotMap;

use crate::scene::EntityId;
use crate::scene::entity::Entity;
use crate::scene::transform::{Transform, euler_degrees_to_quat};

/// Marks `id` and every descendant world-dirty. Iterative, so deep
/// hierarchies cannot overflow the stack.
pub fn mark_world_dirty(entities: &SlotMap<EntityId, Entity>, id: EntityId) {
    let Some(entity) = entities.get(id) else {
        return;
    };
    entity.transform.mark_world_dirty();

    let mut stack: Vec<EntityId> = entity.children.clone();
    while let Some(handle) = stack.pop() {
        let Some(node) = entities.get(handle) else {
            continue;
        };
        // Subtree already invalidated.
        if node.transform.is_world_dirty() {
            continue;
        }
        node.transform.mark_world_dirty();
        stack.extend_from_slice(&node.children);
    }
}

/// Returns the world matrix of `id`, rebuilding stale caches on the way.
///
/// Unknown handles yield identity.
pub fn world_matrix(entities: &SlotMap<EntityId, Entity>, id: EntityId) -> Mat4 {
    let Some(entity) = entities.get(id) else {
        return Mat4::IDENTITY;
    };
    if !entity.transform.is_world_dirty() {
        return entity.transform.cached_world_matrix();
    }

    // Collect the dirty chain, nearest first.
    let mut chain: Vec<&Entity> = Vec::with_capacity(8);
    let mut parent_world = Mat4::IDENTITY;
    let mut current = entity;
    loop {
        chain.push(current);
        match current.parent.and_then(|p| entities.get(p)) {
            Some(parent) if parent.transform.is_world_dirty() => current = parent,
            Some(parent) => {
                parent_world = parent.transform.cached_world_matrix();
                break;
            }
            None => break,
        }
    }

    for node in chain.iter().rev() {
        parent_world *= node.transform.local_matrix();
        node.transform.store_world_matrix(parent_world);
    }
    parent_world
}

/// World matrix of the parent of `id`, identity at a root.
pub fn parent_world_matrix(entities: &SlotMap<EntityId, Entity>, id: EntityId) -> Mat4 {
    entities
        .get(id)
        .and_then(|e| e.parent)
        .map_or(Mat4::IDENTITY, |p| world_matrix(entities, p))
}

#[must_use]
pub fn local_matrix(entities: &SlotMap<EntityId, Entity>, id: EntityId) -> Mat4 {
    entities
        .get(id)
        .map_or(Mat4::IDENTITY, |e| e.transform.local_matrix())
}

#[must_use]
pub fn inverse_world_matrix(entities: &SlotMap<EntityId, Entity>, id: EntityId) -> Mat4 {
    world_matrix(entities, id).inverse()
}

// ============================================================================
// Local setters
// ============================================================================

/// Edits only apply to entities not marked for destruction.
fn is_live(entities: &SlotMap<EntityId, Entity>, id: EntityId) -> bool {
    entities.get(id).is_some_and(|e| !e.destroyed)
}

/// Applies `edit` to the local transform of `id` and invalidates its subtree.
/// Returns `false` when the handle is unknown.
fn edit_local(
    entities: &mut SlotMap<EntityId, Entity>,
    id: EntityId,
    edit: impl FnOnce(&mut Transform),
) -> bool {
    let Some(entity) = entities.get_mut(id).filter(|e| !e.destroyed) else {
        return false;
    };
    edit(&mut entity.transform);
    mark_world_dirty(entities, id);
    true
}

pub fn set_local_position(
    entities: &mut SlotMap<EntityId, Entity>,
    id: EntityId,
    position: Vec3,
) -> bool {
    edit_local(entities, id, |t| t.set_position(position))
}

pub fn set_local_rotation(
    entities: &mut SlotMap<EntityId, Entity>,
    id: EntityId,
    rotation: Quat,
) -> bool {
    edit_local(entities, id, |t| t.set_rotation(rotation))
}

pub fn set_local_scale(entities: &mut SlotMap<EntityId, Entity>, id: EntityId, scale: Vec3) -> bool {
    edit_local(entities, id, |t| t.set_scale(scale))
}

pub fn set_local_euler_degrees(
    entities: &mut SlotMap<EntityId, Entity>,
    id: EntityId,
    degrees: Vec3,
) -> bool {
    edit_local(entities, id, |t| t.set_euler_degrees(degrees))
}

/// Adds `delta` to the local position.
pub fn translate(entities: &mut SlotMap<EntityId, Entity>, id: EntityId, delta: Vec3) -> bool {
    edit_local(entities, id, |t| t.set_position(t.position() + delta))
}

/// Applies an extra pitch/yaw/roll (degrees) in local space.
pub fn rotate(entities: &mut SlotMap<EntityId, Entity>, id: EntityId, degrees: Vec3) -> bool {
    let delta = euler_degrees_to_quat(degrees);
    edit_local(entities, id, |t| t.set_rotation(t.rotation() * delta))
}

/// Multiplies the local scale component-wise.
pub fn scale_by(entities: &mut SlotMap<EntityId, Entity>, id: EntityId, factor: Vec3) -> bool {
    edit_local(entities, id, |t| t.set_scale(t.scale() * factor))
}

// ============================================================================
// World-space setters
// ============================================================================

/// Parent world matrix of `id` when it can be inverted. A collapsed parent
/// (zero scale on some axis) has no inverse; the edit is then dropped.
fn invertible_parent_world(entities: &SlotMap<EntityId, Entity>, id: EntityId) -> Option<Mat4> {
    let parent_world = parent_world_matrix(entities, id);
    if parent_world.determinant().abs() > f32::EPSILON {
        Some(parent_world)
    } else {
        log::warn!("World-space edit of {id:?} under a singular parent transform, local value unchanged");
        None
    }
}

pub fn set_world_position(
    entities: &mut SlotMap<EntityId, Entity>,
    id: EntityId,
    position: Vec3,
) -> bool {
    if !is_live(entities, id) {
        return false;
    }
    let Some(parent_world) = invertible_parent_world(entities, id) else {
        return true;
    };
    let local = parent_world.inverse().transform_point3(position);
    set_local_position(entities, id, local)
}

pub fn set_world_rotation(
    entities: &mut SlotMap<EntityId, Entity>,
    id: EntityId,
    rotation: Quat,
) -> bool {
    if !is_live(entities, id) {
        return false;
    }
    let Some(parent_world) = invertible_parent_world(entities, id) else {
        return true;
    };
    let (_, parent_rotation, _) = parent_world.to_scale_rotation_translation();
    set_local_rotation(entities, id, parent_rotation.inverse() * rotation)
}

/// Sets the local scale so that the lossy world scale equals `scale`.
/// Parent axes with zero scale leave the corresponding component unchanged.
pub fn set_world_scale(entities: &mut SlotMap<EntityId, Entity>, id: EntityId, scale: Vec3) -> bool {
    let (parent_scale, _, _) = parent_world_matrix(entities, id).to_scale_rotation_translation();
    let Some(current) = entities
        .get(id)
        .filter(|e| !e.destroyed)
        .map(|e| e.transform.scale())
    else {
        return false;
    };

    let divide = |target: f32, parent: f32, fallback: f32| {
        if parent.abs() > f32::EPSILON { target / parent } else { fallback }
    };
    let local = Vec3::new(
        divide(scale.x, parent_scale.x, current.x),
        divide(scale.y, parent_scale.y, current.y),
        divide(scale.z, parent_scale.z, current.z),
    );
    set_local_scale(entities, id, local)
}

/// Rotates `id` so that its forward axis (`-Z`) points along the world-space
/// `direction`. A zero direction, or `up` parallel to it, leaves the rotation
/// unchanged.
pub fn look_direction(
    entities: &mut SlotMap<EntityId, Entity>,
    id: EntityId,
    direction: Vec3,
    up: Vec3,
) -> bool {
    if !is_live(entities, id) {
        return false;
    }

    let forward = direction.normalize_or_zero();
    if forward == Vec3::ZERO || forward.cross(up).length_squared() < 1e-6 {
        log::debug!("look_direction: degenerate direction, rotation unchanged");
        return true;
    }

    let right = forward.cross(up).normalize();
    let new_up = right.cross(forward).normalize();
    let rotation = Quat::from_mat3(&Mat3::from_cols(right, new_up, -forward));
    set_world_rotation(entities, id, rotation)
}

/// Rotates `id` so that its forward axis points at the world-space `target`.
pub fn look_at(
    entities: &mut SlotMap<EntityId, Entity>,
    id: EntityId,
    target: Vec3,
    up: Vec3,
) -> bool {
    if !is_live(entities, id) {
        return false;
    }
    let eye = world_position(entities, id);
    look_direction(entities, id, target - eye, up)
}

// ============================================================================
// World-space queries
// ============================================================================

#[must_use]
pub fn world_position(entities: &SlotMap<EntityId, Entity>, id: EntityId) -> Vec3 {
    world_matrix(entities, id).w_axis.truncate()
}

#[must_use]
pub fn world_rotation(entities: &SlotMap<EntityId, Entity>, id: EntityId) -> Quat {
    world_matrix(entities, id).to_scale_rotation_translation().1
}

/// Lengths of the world matrix basis vectors.
#[must_use]
pub fn world_scale(entities: &SlotMap<EntityId, Entity>, id: EntityId) -> Vec3 {
    let m = world_matrix(entities, id);
    Vec3::new(
        m.x_axis.truncate().length(),
        m.y_axis.truncate().length(),
        m.z_axis.truncate().length(),
    )
}

/// World-space `-Z`.
#[must_use]
pub fn forward(entities: &SlotMap<EntityId, Entity>, id: EntityId) -> Vec3 {
    (-world_matrix(entities, id).z_axis.truncate()).normalize_or_zero()
}

#[must_use]
pub fn right(entities: &SlotMap<EntityId, Entity>, id: EntityId) -> Vec3 {
    world_matrix(entities, id)
        .x_axis
        .truncate()
        .normalize_or_zero()
}

#[must_use]
pub fn up(entities: &SlotMap<EntityId, Entity>, id: EntityId) -> Vec3 {
    world_matrix(entities, id)
        .y_axis
        .truncate()
        .normalize_or_zero()
}

#[must_use]
pub fn transform_point(entities: &SlotMap<EntityId, Entity>, id: EntityId, point: Vec3) -> Vec3 {
    world_matrix(entities, id).transform_point3(point)
}

#[must_use]
pub fn transform_direction(
    entities: &SlotMap<EntityId, Entity>,
    id: EntityId,
    direction: Vec3,
) -> Vec3 {
    world_matrix(entities, id).transform_vector3(direction)
}

#[must_use]
pub fn inverse_transform_point(
    entities: &SlotMap<EntityId, Entity>,
    id: EntityId,
    point: Vec3,
) -> Vec3 {
    inverse_world_matrix(entities, id).transform_point3(point)
}

#[must_use]
pub fn inverse_transform_direction(
    entities: &SlotMap<EntityId, Entity>,
    id: EntityId,
    direction: Vec3,
) -> Vec3 {
    inverse_world_matrix(entities, id).transform_vector3(direction)
}
