use std::sync::Arc;

use glam::Mat4;

use crate::animation::clip::AnimationClip;
use crate::animation::layer::{Fade, PlayingAnimation};

/// Plays any number of clips at once and folds them into a single bone array.
///
/// Layers are blended in list order: each layer is mixed on top of everything
/// before it, so later layers win when weights are equal.
#[derive(Debug, Default)]
pub struct BlendEngine {
    layers: Vec<PlayingAnimation>,
    // Reused per layer during blending to avoid a per-frame allocation.
    scratch: Vec<Mat4>,
}

impl BlendEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Layer management
    // ========================================================================

    /// Replaces every layer with `clip` at full weight.
    pub fn play(&mut self, clip: Arc<AnimationClip>, looping: bool, speed: f32) {
        self.layers.clear();
        self.layers
            .push(PlayingAnimation::new(clip, 1.0, looping, speed));
    }

    /// Fades every other layer out and `clip` in over `fade_duration`.
    ///
    /// Layers still fading in turn around and fade out from their current
    /// weight. Layers already fading out keep their current ramp.
    pub fn cross_fade(
        &mut self,
        clip: Arc<AnimationClip>,
        fade_duration: f32,
        looping: bool,
        speed: f32,
    ) {
        for layer in self
            .layers
            .iter_mut()
            .filter(|l| l.fade() != Some(Fade::Out))
        {
            layer.begin_fade(Fade::Out, fade_duration);
        }

        let mut incoming = PlayingAnimation::new(clip, 0.0, looping, speed);
        incoming.begin_fade(Fade::In, fade_duration);
        self.layers.push(incoming);
    }

    /// Appends a layer without touching the others.
    pub fn add_layer(&mut self, clip: Arc<AnimationClip>, weight: f32, looping: bool, speed: f32) {
        self.layers
            .push(PlayingAnimation::new(clip, weight, looping, speed));
    }

    pub fn remove_layer(&mut self, index: usize) -> Option<PlayingAnimation> {
        if index < self.layers.len() {
            Some(self.layers.remove(index))
        } else {
            log::debug!("remove_layer: index {index} out of range ({} layers)", self.layers.len());
            None
        }
    }

    pub fn set_layer_weight(&mut self, index: usize, weight: f32) {
        match self.layers.get_mut(index) {
            Some(layer) => layer.weight = weight,
            None => log::debug!(
                "set_layer_weight: index {index} out of range ({} layers)",
                self.layers.len()
            ),
        }
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    #[inline]
    #[must_use]
    pub fn layers(&self) -> &[PlayingAnimation] {
        &self.layers
    }

    #[inline]
    #[must_use]
    pub fn layer(&self, index: usize) -> Option<&PlayingAnimation> {
        self.layers.get(index)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    #[must_use]
    pub fn total_weight(&self) -> f32 {
        self.layers.iter().map(|l| l.weight).sum()
    }

    // ========================================================================
    // Per-frame pipeline: update -> blend -> cleanup
    // ========================================================================

    /// Advances every layer's clock and weight ramp.
    pub fn update(&mut self, dt: f32) {
        for layer in &mut self.layers {
            layer.advance(dt);
        }
    }

    /// Scales weights down so they sum to 1 when they exceed it. Sums at or
    /// below 1 are left alone.
    pub fn normalize_weights(&mut self) {
        let total = self.total_weight();
        if total > 1.0 {
            let scale = 1.0 / total;
            for layer in &mut self.layers {
                layer.weight *= scale;
            }
        }
    }

    /// Samples every weighted layer and accumulates the result into `out`.
    ///
    /// A layer at full weight replaces everything accumulated so far. Partial
    /// weights are mixed as `acc * (1 - w) + sample * w` on the raw matrices,
    /// which is only an approximation of proper SRT blending.
    pub fn blend(&mut self, out: &mut [Mat4]) {
        if self.layers.is_empty() || out.is_empty() {
            return;
        }

        self.normalize_weights();
        out.fill(Mat4::IDENTITY);

        self.scratch.resize(out.len(), Mat4::IDENTITY);
        for layer in self.layers.iter().filter(|l| l.weight > 0.0) {
            self.scratch.fill(Mat4::IDENTITY);
            layer
                .clip()
                .sample_animation(layer.current_time, &mut self.scratch);

            let w = layer.weight;
            if w >= 1.0 {
                out.copy_from_slice(&self.scratch);
            } else {
                for (acc, sample) in out.iter_mut().zip(&self.scratch) {
                    *acc = *acc * (1.0 - w) + *sample * w;
                }
            }
        }
    }

    /// Drops layers that have faded out completely.
    pub fn cleanup(&mut self) {
        let before = self.layers.len();
        self.layers.retain(|l| !l.is_finished());
        let removed = before - self.layers.len();
        if removed > 0 {
            log::debug!("Removed {removed} finished animation layer(s)");
        }
    }
}
