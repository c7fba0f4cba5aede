use std::sync::Arc;

use crate::animation::clip::AnimationClip;

/// Direction of an in-progress weight ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fade {
    In,
    Out,
}

/// One clip instance playing on a controller, with its own clock and weight.
#[derive(Debug, Clone)]
pub struct PlayingAnimation {
    clip: Arc<AnimationClip>,

    pub current_time: f32,
    pub speed: f32,
    pub weight: f32,
    pub looping: bool,

    pub is_blending: bool,
    pub blend_time: f32,
    pub blend_duration: f32,

    fade: Fade,
    blend_start_weight: f32,
}

impl PlayingAnimation {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>, weight: f32, looping: bool, speed: f32) -> Self {
        Self {
            clip,
            current_time: 0.0,
            speed,
            weight,
            looping,
            is_blending: false,
            blend_time: 0.0,
            blend_duration: 0.0,
            fade: Fade::In,
            blend_start_weight: weight,
        }
    }

    #[inline]
    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[inline]
    #[must_use]
    pub fn fade(&self) -> Option<Fade> {
        self.is_blending.then_some(self.fade)
    }

    /// Starts a weight ramp from the current weight towards 0 or 1.
    pub fn begin_fade(&mut self, fade: Fade, duration: f32) {
        self.is_blending = true;
        self.fade = fade;
        self.blend_time = 0.0;
        self.blend_duration = duration.max(0.0);
        self.blend_start_weight = self.weight;
    }

    /// Playback position in `[0, 1]` of the clip's duration.
    #[must_use]
    pub fn normalized_time(&self) -> f32 {
        let duration = self.clip.duration();
        if duration > 0.0 {
            (self.current_time / duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Advances the clock and the weight ramp by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.current_time += dt * self.speed;
        self.current_time = if self.looping {
            self.clip.loop_time(self.current_time)
        } else {
            self.clip.normalize_time(self.current_time)
        };

        if !self.is_blending {
            return;
        }

        self.blend_time += dt;
        if self.blend_time >= self.blend_duration {
            self.is_blending = false;
            self.weight = match self.fade {
                Fade::In => 1.0,
                Fade::Out => 0.0,
            };
            return;
        }

        let t = (self.blend_time / self.blend_duration).clamp(0.0, 1.0);
        self.weight = match self.fade {
            Fade::Out => self.blend_start_weight * (1.0 - t),
            Fade::In => self.blend_start_weight + (1.0 - self.blend_start_weight) * t,
        };
    }

    /// A layer is finished once it has faded to nothing.
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.weight <= 0.0 && !self.is_blending
    }
}
