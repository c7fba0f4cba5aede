//! Scene Graph Tests
//!
//! Tests for:
//! - Entity creation, lookup and deferred destruction
//! - Hierarchy edits (cycles, re-parenting) and recursive queries
//! - Component storage, typed lookup and lifecycle hooks
//! - Active flags, scene render pass and lights
//! - SceneManager scene switching

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use glam::{Mat4, Vec3};

use armature::animation::{AnimationChannel, AnimationClip, AnimationController};
use armature::errors::ArmatureError;
use armature::render::{BoneMap, Mesh, Renderer};
use armature::scene::{
    Component, ComponentContext, LightComponent, MeshRenderer, Scene, SceneManager,
};

const EPSILON: f32 = 1e-5;

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Default)]
struct Counters {
    started: AtomicUsize,
    updated: AtomicUsize,
    destroyed: AtomicUsize,
}

/// Counts lifecycle calls into shared counters.
struct Tracker {
    counters: Arc<Counters>,
    enabled: bool,
    last_world: Mat4,
}

impl Tracker {
    fn new(counters: &Arc<Counters>) -> Self {
        Self {
            counters: Arc::clone(counters),
            enabled: true,
            last_world: Mat4::IDENTITY,
        }
    }
}

impl Component for Tracker {
    fn type_name(&self) -> &'static str {
        "Tracker"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn on_start(&mut self, _ctx: &ComponentContext<'_>) {
        self.counters.started.fetch_add(1, Ordering::Relaxed);
    }

    fn on_update(&mut self, ctx: &ComponentContext<'_>, _dt: f32) {
        self.counters.updated.fetch_add(1, Ordering::Relaxed);
        self.last_world = ctx.world_matrix;
    }

    fn on_destroy(&mut self) {
        self.counters.destroyed.fetch_add(1, Ordering::Relaxed);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Quad {
    bones: usize,
}

impl BoneMap for Quad {
    fn bone_index(&self, name: &str) -> Option<usize> {
        (name == "Root" && self.bones > 0).then_some(0)
    }

    fn bone_count(&self) -> usize {
        self.bones
    }
}

impl Mesh for Quad {
    fn name(&self) -> &str {
        "Quad"
    }

    fn render(&self, renderer: &mut dyn Renderer, world: &Mat4) {
        renderer.draw(world);
    }
}

#[derive(Default)]
struct RecordingRenderer {
    bone_uploads: Vec<Vec<Mat4>>,
    draws: Vec<Mat4>,
}

impl Renderer for RecordingRenderer {
    fn set_bone_transforms(&mut self, bones: &[Mat4]) {
        self.bone_uploads.push(bones.to_vec());
    }

    fn draw(&mut self, world: &Mat4) {
        self.draws.push(*world);
    }
}

// ============================================================================
// Entities
// ============================================================================

#[test]
fn create_and_find_entities() {
    let mut scene = Scene::new("Test");
    let a = scene.create_entity("Enemy");
    let b = scene.create_entity("Enemy");
    let c = scene.create_entity("Player");

    assert_eq!(scene.entity_count(), 3);
    assert_eq!(scene.find_entity_by_name("Enemy"), Some(a));
    assert_eq!(scene.find_entities_by_name("Enemy"), vec![a, b]);
    assert_eq!(scene.find_entity_by_name("Player"), Some(c));
    assert_eq!(scene.find_entity_by_name("Nobody"), None);
    assert_eq!(scene.root_entities(), vec![a, b, c]);
}

#[test]
fn destroy_is_deferred_until_update() {
    let mut scene = Scene::new("Test");
    let e = scene.create_entity("E");

    scene.destroy_entity(e).unwrap();
    assert!(scene.entity(e).is_some_and(|e| e.is_destroyed()));
    assert_eq!(scene.find_entity_by_name("E"), None);
    assert_eq!(scene.entity_count(), 0);

    scene.update(0.016);
    assert!(scene.entity(e).is_none());
}

#[test]
fn destroy_takes_the_subtree_and_detaches_from_parent() {
    let mut scene = Scene::new("Test");
    let root = scene.create_entity("Root");
    let arm = scene.create_entity("Arm");
    let hand = scene.create_entity("Hand");
    scene.set_parent(arm, Some(root)).unwrap();
    scene.set_parent(hand, Some(arm)).unwrap();

    scene.destroy_entity(arm).unwrap();
    scene.update(0.016);

    assert!(scene.entity(arm).is_none());
    assert!(scene.entity(hand).is_none());
    assert!(scene.entity(root).is_some_and(|e| e.children().is_empty()));
    assert_eq!(scene.entity_count(), 1);
}

#[test]
fn entity_marked_for_destruction_rejects_edits() {
    let mut scene = Scene::new("Test");
    let counters = Arc::new(Counters::default());
    let e = scene.create_entity("E");
    scene.add_component(e, Tracker::new(&counters)).unwrap();
    scene.destroy_entity(e).unwrap();

    assert!(scene.entity_mut(e).is_none());
    assert!(!scene.remove_component::<Tracker>(e));
    assert!(scene.add_component(e, Tracker::new(&counters)).is_err());
    assert!(matches!(
        scene.set_active(e, false),
        Err(ArmatureError::EntityNotFound(_))
    ));
    assert!(scene.entity(e).is_some_and(|e| e.is_active()));

    scene.update(0.016);
    assert_eq!(counters.destroyed.load(Ordering::Relaxed), 1);
}

#[test]
fn destroy_unknown_entity_is_an_error() {
    let mut scene = Scene::new("Test");
    let e = scene.create_entity("E");
    scene.destroy_entity(e).unwrap();
    scene.update(0.0);

    assert!(matches!(
        scene.destroy_entity(e),
        Err(ArmatureError::EntityNotFound(_))
    ));
}

#[test]
fn destroy_all_runs_destroy_hooks() {
    let counters = Arc::new(Counters::default());
    let mut scene = Scene::new("Test");
    let a = scene.create_entity("A");
    let b = scene.create_entity("B");
    scene.add_component(a, Tracker::new(&counters)).unwrap();
    scene.add_component(b, Tracker::new(&counters)).unwrap();

    scene.destroy_all_entities();
    assert_eq!(scene.entity_count(), 0);
    assert_eq!(counters.destroyed.load(Ordering::Relaxed), 2);
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn set_parent_rejects_self_and_cycles() {
    let mut scene = Scene::new("Test");
    let a = scene.create_entity("A");
    let b = scene.create_entity("B");
    let c = scene.create_entity("C");
    scene.set_parent(b, Some(a)).unwrap();
    scene.set_parent(c, Some(b)).unwrap();

    assert!(matches!(
        scene.set_parent(a, Some(a)),
        Err(ArmatureError::InvalidHierarchy(_))
    ));
    assert!(matches!(
        scene.set_parent(a, Some(c)),
        Err(ArmatureError::InvalidHierarchy(_))
    ));
    assert_eq!(scene.entity(a).and_then(|e| e.parent()), None);
}

#[test]
fn set_parent_keeps_both_sides_in_sync() {
    let mut scene = Scene::new("Test");
    let first = scene.create_entity("First");
    let second = scene.create_entity("Second");
    let child = scene.create_entity("Child");

    scene.set_parent(child, Some(first)).unwrap();
    scene.set_parent(child, Some(second)).unwrap();

    assert!(scene.entity(first).is_some_and(|e| e.children().is_empty()));
    assert_eq!(scene.entity(second).map(|e| e.children().to_vec()), Some(vec![child]));
    assert_eq!(scene.entity(child).and_then(|e| e.parent()), Some(second));
    assert_eq!(scene.root_entities(), vec![first, second]);
}

#[test]
fn child_queries() {
    let mut scene = Scene::new("Test");
    let body = scene.create_entity("Body");
    let arm = scene.create_entity("Arm");
    let hand = scene.create_entity("Hand");
    let leg = scene.create_entity("Leg");
    scene.set_parent(arm, Some(body)).unwrap();
    scene.set_parent(hand, Some(arm)).unwrap();
    scene.set_parent(leg, Some(body)).unwrap();

    assert_eq!(scene.find_child(body, "Arm"), Some(arm));
    assert_eq!(scene.find_child(body, "Hand"), None);
    assert_eq!(scene.find_child_recursive(body, "Hand"), Some(hand));
    assert_eq!(scene.children_recursive(body), vec![arm, hand, leg]);
}

#[test]
fn inactive_parent_deactivates_subtree() {
    let mut scene = Scene::new("Test");
    let parent = scene.create_entity("Parent");
    let child = scene.create_entity("Child");
    scene.set_parent(child, Some(parent)).unwrap();

    scene.set_active(parent, false).unwrap();
    assert!(!scene.is_active_in_hierarchy(child));
    assert!(scene.entity(child).is_some_and(|e| e.is_active()));
    assert_eq!(scene.active_entity_count(), 0);

    scene.set_active(parent, true).unwrap();
    assert!(scene.is_active_in_hierarchy(child));
    assert_eq!(scene.active_entity_count(), 2);
}

// ============================================================================
// Components
// ============================================================================

#[test]
fn typed_component_lookup() {
    let counters = Arc::new(Counters::default());
    let mut scene = Scene::new("Test");
    let e = scene.create_entity("E");
    let other = scene.create_entity("Other");
    scene.add_component(e, Tracker::new(&counters)).unwrap();
    scene.add_component(e, Tracker::new(&counters)).unwrap();
    scene
        .add_component(e, LightComponent::new_point(Vec3::ONE, 1.0, 10.0))
        .unwrap();

    assert!(scene.has_component::<Tracker>(e));
    assert!(!scene.has_component::<Tracker>(other));
    assert_eq!(scene.components::<Tracker>(e).len(), 2);
    assert_eq!(scene.find_entities_with_component::<LightComponent>(), vec![e]);

    if let Some(light) = scene.component_mut::<LightComponent>(e) {
        light.intensity = 4.0;
    }
    assert_eq!(scene.component::<LightComponent>(e).map(|l| l.intensity), Some(4.0));

    assert!(scene.remove_component::<Tracker>(e));
    assert_eq!(scene.components::<Tracker>(e).len(), 1);
    assert_eq!(counters.destroyed.load(Ordering::Relaxed), 1);
}

#[test]
fn add_component_to_unknown_entity_fails() {
    let mut scene = Scene::new("Test");
    let e = scene.create_entity("E");
    scene.destroy_entity(e).unwrap();

    let counters = Arc::new(Counters::default());
    assert!(scene.add_component(e, Tracker::new(&counters)).is_err());
}

#[test]
fn lifecycle_start_once_then_update_every_frame() {
    let counters = Arc::new(Counters::default());
    let mut scene = Scene::new("Test");
    let e = scene.create_entity("E");
    scene.add_component(e, Tracker::new(&counters)).unwrap();

    scene.update(0.016);
    scene.update(0.016);
    scene.update(0.016);

    assert_eq!(counters.started.load(Ordering::Relaxed), 1);
    assert_eq!(counters.updated.load(Ordering::Relaxed), 3);
    assert!(scene.entity(e).is_some_and(|e| e.is_started()));
}

#[test]
fn component_added_after_start_is_started_immediately() {
    let counters = Arc::new(Counters::default());
    let mut scene = Scene::new("Test");
    let e = scene.create_entity("E");
    scene.update(0.016);

    scene.add_component(e, Tracker::new(&counters)).unwrap();
    assert_eq!(counters.started.load(Ordering::Relaxed), 1);
}

#[test]
fn disabled_components_and_inactive_entities_are_skipped() {
    let counters = Arc::new(Counters::default());
    let mut scene = Scene::new("Test");
    let a = scene.create_entity("A");
    let b = scene.create_entity("B");
    scene.add_component(a, Tracker::new(&counters)).unwrap();
    scene.add_component(b, Tracker::new(&counters)).unwrap();

    if let Some(tracker) = scene.component_mut::<Tracker>(a) {
        tracker.set_enabled(false);
    }
    scene.set_active(b, false).unwrap();
    scene.update(0.016);

    assert_eq!(counters.updated.load(Ordering::Relaxed), 0);
}

#[test]
fn components_see_the_entity_world_matrix() {
    let counters = Arc::new(Counters::default());
    let mut scene = Scene::new("Test");
    let parent = scene.create_entity("Parent");
    let child = scene.create_entity("Child");
    scene.set_parent(child, Some(parent)).unwrap();
    scene.set_local_position(parent, Vec3::new(0.0, 2.0, 0.0)).unwrap();
    scene.add_component(child, Tracker::new(&counters)).unwrap();

    scene.update(0.016);
    let world = scene.component::<Tracker>(child).map(|p| p.last_world);
    assert_eq!(world, Some(Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0))));
}

#[test]
fn destroyed_entity_components_get_on_destroy() {
    let counters = Arc::new(Counters::default());
    let mut scene = Scene::new("Test");
    let e = scene.create_entity("E");
    scene.add_component(e, Tracker::new(&counters)).unwrap();

    scene.destroy_entity(e).unwrap();
    assert_eq!(counters.destroyed.load(Ordering::Relaxed), 0);
    scene.update(0.016);
    assert_eq!(counters.destroyed.load(Ordering::Relaxed), 1);
    assert_eq!(counters.updated.load(Ordering::Relaxed), 0);
}

// ============================================================================
// Lights
// ============================================================================

#[test]
fn light_follows_entity_transform() {
    let mut scene = Scene::new("Test");
    let lamp = scene.create_entity("Lamp");
    scene.set_local_position(lamp, Vec3::new(1.0, 4.0, 0.0)).unwrap();
    scene.look_at(lamp, Vec3::new(1.0, 4.0, -10.0), Vec3::Y).unwrap();
    scene
        .add_component(lamp, LightComponent::new_spot(Vec3::ONE, 2.0, 20.0, 15.0, 30.0))
        .unwrap();

    scene.update(0.016);
    let lights = scene.lights();
    assert_eq!(lights.len(), 1);
    assert!(approx_vec3(lights[0].position(), Vec3::new(1.0, 4.0, 0.0)));
    assert!(approx_vec3(lights[0].direction(), Vec3::NEG_Z));
}

#[test]
fn lights_skip_disabled_and_inactive() {
    let mut scene = Scene::new("Test");
    let sun = scene.create_entity("Sun");
    let bulb = scene.create_entity("Bulb");
    scene
        .add_component(sun, LightComponent::new_directional(Vec3::ONE, 1.0))
        .unwrap();
    scene
        .add_component(bulb, LightComponent::new_point(Vec3::ONE, 1.0, 5.0))
        .unwrap();

    scene.set_active(bulb, false).unwrap();
    assert_eq!(scene.lights().len(), 1);

    if let Some(light) = scene.component_mut::<LightComponent>(sun) {
        light.set_enabled(false);
    }
    assert!(scene.lights().is_empty());
}

// ============================================================================
// Render Pass
// ============================================================================

#[test]
fn static_mesh_is_drawn_with_world_matrix() {
    let mut scene = Scene::new("Test");
    let e = scene.create_entity("Crate");
    scene.set_local_position(e, Vec3::new(3.0, 0.0, 0.0)).unwrap();
    scene
        .add_component(e, MeshRenderer::new(Arc::new(Quad { bones: 0 })))
        .unwrap();

    let mut renderer = RecordingRenderer::default();
    scene.render(&mut renderer);

    assert!(renderer.bone_uploads.is_empty());
    assert_eq!(renderer.draws, vec![Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0))]);
}

#[test]
fn skinned_mesh_gets_bone_array_before_draw() {
    let mut root = AnimationChannel::with_bone_index("Root", 0);
    root.add_position_key(0.0, Vec3::ZERO)
        .add_position_key(1.0, Vec3::new(1.0, 0.0, 0.0));
    let walk = AnimationClip::with_channels("Walk", vec![root]);

    let mut controller = AnimationController::new();
    controller.add_clip(walk);
    controller.set_bone_count(1);
    controller.play("Walk", true, 1.0).unwrap();

    let mut scene = Scene::new("Test");
    let hero = scene.create_entity("Hero");
    scene.add_component(hero, controller).unwrap();
    scene
        .add_component(hero, MeshRenderer::new(Arc::new(Quad { bones: 1 })))
        .unwrap();

    scene.update(0.5);
    let mut renderer = RecordingRenderer::default();
    scene.render(&mut renderer);

    assert_eq!(renderer.bone_uploads.len(), 1);
    assert_eq!(renderer.draws.len(), 1);
    let bone = renderer.bone_uploads[0][0].w_axis.truncate();
    assert!(approx_vec3(bone, Vec3::new(0.5, 0.0, 0.0)));
}

#[test]
fn inactive_entities_are_not_drawn() {
    let mut scene = Scene::new("Test");
    let e = scene.create_entity("Crate");
    scene
        .add_component(e, MeshRenderer::new(Arc::new(Quad { bones: 0 })))
        .unwrap();
    scene.set_active(e, false).unwrap();

    let mut renderer = RecordingRenderer::default();
    scene.render(&mut renderer);
    assert!(renderer.draws.is_empty());
}

// ============================================================================
// SceneManager
// ============================================================================

#[test]
fn manager_updates_only_the_active_scene() {
    let counters = Arc::new(Counters::default());
    let mut manager = SceneManager::new();
    let menu = manager.create_scene("Menu");
    let level = manager.create_scene("Level");

    for handle in [menu, level] {
        if let Some(scene) = manager.scene_mut(handle) {
            let e = scene.create_entity("E");
            scene.add_component(e, Tracker::new(&counters)).unwrap();
        }
    }

    manager.update(0.016);
    assert_eq!(counters.updated.load(Ordering::Relaxed), 0);

    assert!(manager.set_active_scene(level));
    manager.update(0.016);
    assert_eq!(counters.updated.load(Ordering::Relaxed), 1);
    assert_eq!(manager.active_scene().map(Scene::name), Some("Level"));
    assert_eq!(manager.total_entity_count(), 2);
}

#[test]
fn manager_find_and_unload() {
    let mut manager = SceneManager::new();
    let (level, _) = manager.create_active("Level");
    manager.load_scene(Scene::new("Credits"));

    assert_eq!(manager.find_scene("Level"), Some(level));
    assert_eq!(manager.scene_count(), 2);
    let mut names = manager.scene_names();
    names.sort_unstable();
    assert_eq!(names, vec!["Credits", "Level"]);

    let unloaded = manager.unload_scene(level);
    assert_eq!(unloaded.map(|s| s.name().to_string()), Some("Level".to_string()));
    assert!(manager.active_scene().is_none());

    manager.unload_all();
    assert_eq!(manager.scene_count(), 0);
}

#[test]
fn manager_rejects_unknown_active_scene() {
    let mut manager = SceneManager::new();
    let handle = manager.create_scene("Temp");
    manager.unload_scene(handle);
    assert!(!manager.set_active_scene(handle));
}
