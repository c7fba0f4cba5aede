use rustc_hash::FxHashMap;

/// Named float/int/bool values an animator exposes to gameplay code.
/// Unknown names read as zero / false.
#[derive(Debug, Clone, Default)]
pub struct AnimatorParameters {
    floats: FxHashMap<String, f32>,
    ints: FxHashMap<String, i32>,
    bools: FxHashMap<String, bool>,
}

impl AnimatorParameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_float(&mut self, name: impl Into<String>, value: f32) {
        self.floats.insert(name.into(), value);
    }

    pub fn set_int(&mut self, name: impl Into<String>, value: i32) {
        self.ints.insert(name.into(), value);
    }

    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) {
        self.bools.insert(name.into(), value);
    }

    #[must_use]
    pub fn float(&self, name: &str) -> f32 {
        self.floats.get(name).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn int(&self, name: &str) -> i32 {
        self.ints.get(name).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn bool(&self, name: &str) -> bool {
        self.bools.get(name).copied().unwrap_or(false)
    }
}
