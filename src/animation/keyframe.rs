use crate::animation::values::Interpolatable;

/// A single sample of a channel: a value pinned to a time in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    #[must_use]
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Sparse, time-ordered keyframes of one transform component.
///
/// Keys are kept sorted by strictly increasing time. Keys cannot be edited in
/// place once inserted; re-inserting at an existing time replaces the value.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    keys: Vec<Keyframe<T>>,
}

impl<T: Interpolatable> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a track from arbitrary keys, sorting them and collapsing
    /// duplicate times (the last key at a given time wins).
    #[must_use]
    pub fn from_keys(keys: impl IntoIterator<Item = Keyframe<T>>) -> Self {
        let mut track = Self::new();
        for key in keys {
            track.insert(key.time, key.value);
        }
        track
    }

    /// Inserts a key at its sorted position.
    pub fn insert(&mut self, time: f32, value: T) {
        let time = if time < 0.0 || !time.is_finite() {
            log::warn!("Keyframe time {time} is outside [0, inf), clamping to 0");
            0.0
        } else {
            time
        };

        let idx = self.keys.partition_point(|k| k.time < time);
        match self.keys.get_mut(idx) {
            Some(existing) if existing.time == time => existing.value = value,
            _ => self.keys.insert(idx, Keyframe::new(time, value)),
        }
    }

    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Time of the last key, or 0 for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.keys.last().map_or(0.0, |k| k.time)
    }

    /// Index `i` of the bracketing pair `[i, i + 1]` for `time`.
    ///
    /// Lower-bound search: the first key with `key.time >= time` is found and
    /// the pair starts one before it. Times at or before the first key map to
    /// pair 0; times past the last key map to the last index.
    #[must_use]
    pub fn find_key(&self, time: f32) -> usize {
        let lower = self.keys.partition_point(|k| k.time < time);
        lower.saturating_sub(1)
    }

    /// Samples the track at `time`. `default` is returned for an empty track.
    #[must_use]
    pub fn sample(&self, time: f32, default: T) -> T {
        let len = self.keys.len();
        match len {
            0 => return default,
            1 => return self.keys[0].value,
            _ => {}
        }

        let last = &self.keys[len - 1];
        if time >= last.time {
            return last.value;
        }

        let index = self.find_key(time);
        let k0 = &self.keys[index];
        let k1 = &self.keys[index + 1];

        let dt = k1.time - k0.time;
        if dt <= 0.0 {
            return k0.value;
        }

        // Exact key hits must not go through interpolation rounding.
        let t = ((time - k0.time) / dt).clamp(0.0, 1.0);
        if t <= 0.0 {
            return k0.value;
        }
        if t >= 1.0 {
            return k1.value;
        }
        T::interpolate_linear(k0.value, k1.value, t)
    }
}
