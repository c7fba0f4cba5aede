use glam::Mat4;

use crate::animation::channel::AnimationChannel;
use crate::errors::ClipError;
use crate::render::BoneMap;

pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// A named animation: one channel per animated bone.
///
/// Clips are built once at import time and then shared read-only (usually as
/// `Arc<AnimationClip>`) by every controller that plays them.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    duration: f32,
    ticks_per_second: f32,
    channels: Vec<AnimationChannel>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: 0.0,
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            channels: Vec::new(),
        }
    }

    /// Builds a clip from a set of channels; duration is derived from the keys.
    #[must_use]
    pub fn with_channels(name: impl Into<String>, channels: Vec<AnimationChannel>) -> Self {
        let mut clip = Self::new(name);
        for channel in channels {
            clip.add_channel(channel);
        }
        clip
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration;
    }

    #[inline]
    #[must_use]
    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    pub fn set_ticks_per_second(&mut self, ticks_per_second: f32) {
        self.ticks_per_second = ticks_per_second;
    }

    #[inline]
    #[must_use]
    pub fn channels(&self) -> &[AnimationChannel] {
        &self.channels
    }

    /// Appends a channel. Duration only ever grows.
    pub fn add_channel(&mut self, channel: AnimationChannel) {
        self.duration = self.duration.max(channel.end_time());
        self.channels.push(channel);
    }

    #[must_use]
    pub fn find_channel(&self, bone_name: &str) -> Option<&AnimationChannel> {
        self.channels.iter().find(|c| c.bone_name == bone_name)
    }

    pub fn find_channel_mut(&mut self, bone_name: &str) -> Option<&mut AnimationChannel> {
        self.channels.iter_mut().find(|c| c.bone_name == bone_name)
    }

    #[must_use]
    pub fn find_channel_by_index(&self, bone_index: usize) -> Option<&AnimationChannel> {
        self.channels
            .iter()
            .find(|c| c.bone_index == Some(bone_index))
    }

    /// Resolves each channel's bone slot through the skeleton's name map.
    ///
    /// Channels whose bone is missing from the skeleton are left unbound.
    /// Returns the number of bound channels.
    pub fn bind_bones(&mut self, bones: &dyn BoneMap) -> usize {
        let mut bound = 0;
        for channel in &mut self.channels {
            channel.bone_index = bones.bone_index(&channel.bone_name);
            if channel.bone_index.is_some() {
                bound += 1;
            } else {
                log::warn!(
                    "Clip '{}': bone '{}' not present in skeleton, channel left unbound",
                    self.name,
                    channel.bone_name
                );
            }
        }
        bound
    }

    /// Writes every bound channel's transform at `time` into its bone slot.
    ///
    /// Slots without a channel keep whatever the caller put there, so callers
    /// pre-fill with identity. Channels pointing past the end of the slice are
    /// skipped.
    pub fn sample_animation(&self, time: f32, bone_transforms: &mut [Mat4]) {
        if bone_transforms.is_empty() {
            log::warn!("Clip '{}' sampled into an empty bone array", self.name);
            return;
        }

        let time = self.normalize_time(time);
        for channel in &self.channels {
            if let Some(slot) = channel
                .bone_index
                .and_then(|i| bone_transforms.get_mut(i))
            {
                *slot = channel.sample_transform(time);
            }
        }
    }

    /// Clamps `time` to `[0, duration]`.
    #[must_use]
    pub fn normalize_time(&self, time: f32) -> f32 {
        time.min(self.duration).max(0.0)
    }

    /// Wraps `time` into `[0, duration)`. Negative times wrap forward.
    /// Returns 0 for a clip without positive duration.
    #[must_use]
    pub fn loop_time(&self, time: f32) -> f32 {
        if self.duration <= 0.0 || !time.is_finite() {
            return 0.0;
        }

        let wrapped = time.rem_euclid(self.duration);
        // rem_euclid can round up to exactly `duration` for tiny negative inputs.
        if wrapped >= self.duration { 0.0 } else { wrapped }
    }

    /// Structural check, strict: every channel must be routable and carry keys.
    pub fn validate(&self) -> Result<(), ClipError> {
        if self.name.is_empty() {
            return Err(ClipError::EmptyName);
        }
        if self.duration <= 0.0 {
            return Err(ClipError::NonPositiveDuration {
                name: self.name.clone(),
                duration: self.duration,
            });
        }
        if self.channels.is_empty() {
            return Err(ClipError::NoChannels(self.name.clone()));
        }

        let mut first_error = None;
        for (i, channel) in self.channels.iter().enumerate() {
            let error = if !channel.has_bone_identity() {
                Some(ClipError::UnboundChannel {
                    clip: self.name.clone(),
                    channel: i,
                })
            } else if !channel.has_keyframes() {
                Some(ClipError::EmptyChannel {
                    clip: self.name.clone(),
                    bone: channel.bone_name.clone(),
                })
            } else {
                None
            };

            if let Some(error) = error {
                log::warn!("{error}");
                first_error.get_or_insert(error);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
