//! Headless Skinning Example
//!
//! Builds a two-bone character, drives it with an Idle → Walk state machine
//! and runs a fixed number of frames through a renderer that only logs what
//! it receives.
//!
//! Run with `RUST_LOG=debug` to see scene and state machine activity.

use std::sync::Arc;

use anyhow::Context;
use glam::{Mat4, Quat, Vec3};

use armature::animation::{AnimationChannel, AnimationClip, AnimationController, AnimationTransition};
use armature::render::{BoneMap, BoneNames, Mesh, Renderer, bone_bytes};
use armature::scene::{LightComponent, MeshRenderer, SceneManager};
use armature::settings::AnimationSettings;

const FRAME_DT: f32 = 1.0 / 30.0;
const FRAME_COUNT: usize = 90;

struct Character {
    skeleton: BoneNames,
}

impl BoneMap for Character {
    fn bone_index(&self, name: &str) -> Option<usize> {
        self.skeleton.bone_index(name)
    }

    fn bone_count(&self) -> usize {
        self.skeleton.bone_count()
    }
}

impl Mesh for Character {
    fn name(&self) -> &str {
        "Character"
    }

    fn render(&self, renderer: &mut dyn Renderer, world: &Mat4) {
        renderer.draw(world);
    }
}

/// Counts uploads and draws, logging the first few.
#[derive(Default)]
struct LogRenderer {
    uploaded_bytes: usize,
    draws: usize,
}

impl Renderer for LogRenderer {
    fn set_bone_transforms(&mut self, bones: &[Mat4]) {
        self.uploaded_bytes += bone_bytes(bones).len();
        if let Some(hips) = bones.first() {
            log::trace!("hips at {:?}", hips.w_axis.truncate());
        }
    }

    fn draw(&mut self, world: &Mat4) {
        self.draws += 1;
        log::trace!("draw at {:?}", world.w_axis.truncate());
    }
}

fn idle_clip() -> AnimationClip {
    let mut hips = AnimationChannel::new("Hips");
    hips.add_position_key(0.0, Vec3::new(0.0, 1.0, 0.0))
        .add_position_key(0.5, Vec3::new(0.0, 1.02, 0.0))
        .add_position_key(1.0, Vec3::new(0.0, 1.0, 0.0));
    AnimationClip::with_channels("Idle", vec![hips])
}

fn walk_clip() -> AnimationClip {
    let mut hips = AnimationChannel::new("Hips");
    hips.add_position_key(0.0, Vec3::new(0.0, 1.0, 0.0))
        .add_position_key(0.8, Vec3::new(0.0, 1.0, 0.8));

    let mut spine = AnimationChannel::new("Spine");
    spine
        .add_rotation_key(0.0, Quat::from_rotation_y(-0.1))
        .add_rotation_key(0.4, Quat::from_rotation_y(0.1))
        .add_rotation_key(0.8, Quat::from_rotation_y(-0.1));

    AnimationClip::with_channels("Walk", vec![hips, spine])
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = AnimationSettings::from_json(r#"{ "default_fade_duration": 0.25 }"#)
        .context("parsing animation settings")?;

    let mesh = Arc::new(Character {
        skeleton: BoneNames::new(["Hips", "Spine"]),
    });

    let mut idle = idle_clip();
    let mut walk = walk_clip();
    idle.bind_bones(mesh.as_ref());
    walk.bind_bones(mesh.as_ref());

    let mut controller = AnimationController::with_settings(settings);
    controller.add_clip(idle);
    controller.add_clip(walk);
    controller.set_bone_count(mesh.bone_count());
    controller.add_state("Idle", "Idle", true, 1.0)?;
    controller.add_state("Walk", "Walk", true, 1.0)?;
    controller.add_transition_with(AnimationTransition::new("Idle", "Walk", 0.25).with_trigger("Go"));

    let mut manager = SceneManager::new();
    let (_, scene) = manager.create_active("Demo");

    let sun = scene.create_entity("Sun");
    scene.look_at(sun, Vec3::new(-1.0, -1.0, -1.0), Vec3::Y)?;
    scene.add_component(sun, LightComponent::new_directional(Vec3::ONE, 3.0))?;

    let hero = scene.create_entity("Hero");
    scene.set_local_position(hero, Vec3::new(0.0, 0.0, -2.0))?;
    scene.add_component(hero, controller)?;
    scene.add_component(hero, MeshRenderer::new(mesh))?;

    let mut renderer = LogRenderer::default();
    for frame in 0..FRAME_COUNT {
        if frame == FRAME_COUNT / 3
            && let Some(scene) = manager.active_scene_mut()
            && let Some(controller) = scene.component_mut::<AnimationController>(hero)
        {
            log::info!("frame {frame}: trigger Go");
            controller.set_trigger("Go");
        }

        manager.update(FRAME_DT);
        manager.render(&mut renderer);
    }

    let scene = manager.active_scene().context("active scene")?;
    let state = scene
        .component::<AnimationController>(hero)
        .and_then(AnimationController::current_state)
        .unwrap_or("<none>");
    for light in scene.lights() {
        log::info!("light direction {:?}", light.direction());
    }
    log::info!(
        "{FRAME_COUNT} frames, {} draws, {} bone bytes uploaded, final state {state}",
        renderer.draws,
        renderer.uploaded_bytes
    );
    Ok(())
}
