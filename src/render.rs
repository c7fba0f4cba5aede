//! Rendering collaborators
//!
//! The core never talks to a graphics API. It hands its per-frame results to
//! implementations of the traits below, which live in the host renderer:
//!
//! - [`Renderer`]: receives the flat bone-matrix array before a skinned draw,
//!   and a world matrix for every draw.
//! - [`Mesh`]: something drawable that also knows its skeleton's bone names.
//! - [`BoneMap`]: the bone name → index mapping used to bind animation
//!   channels to bone slots.

use glam::Mat4;

/// Bone name → bone slot mapping of a skeleton.
pub trait BoneMap {
    fn bone_index(&self, name: &str) -> Option<usize>;

    fn bone_count(&self) -> usize;
}

/// GPU-facing sink for the data the core produces each frame.
pub trait Renderer {
    /// Uploads and binds the bone array for the next skinned draw.
    /// Index `i` holds the transform of bone `i`.
    fn set_bone_transforms(&mut self, bones: &[Mat4]);

    /// Issues a draw of the currently bound geometry with `world` as its
    /// model matrix.
    fn draw(&mut self, world: &Mat4);
}

/// Drawable geometry with an optional skeleton.
pub trait Mesh: BoneMap + Send + Sync {
    fn name(&self) -> &str;

    /// Binds the mesh's buffers and draws it through `renderer`.
    fn render(&self, renderer: &mut dyn Renderer, world: &Mat4);

    #[inline]
    fn is_skinned(&self) -> bool {
        self.bone_count() > 0
    }
}

/// Byte view of a bone array, ready for a uniform/storage buffer upload.
#[inline]
#[must_use]
pub fn bone_bytes(bones: &[Mat4]) -> &[u8] {
    bytemuck::cast_slice(bones)
}

/// Plain bone map backed by a name list, where a bone's index is its position.
#[derive(Debug, Clone, Default)]
pub struct BoneNames {
    names: Vec<String>,
    lookup: rustc_hash::FxHashMap<String, usize>,
}

impl BoneNames {
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let lookup = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self { names, lookup }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl BoneMap for BoneNames {
    fn bone_index(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    fn bone_count(&self) -> usize {
        self.names.len()
    }
}
