use super::{Pattern, Sample};
use crate::layout::Surface;

/// Same brightness everywhere, at every timestep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantPattern {
    level: f32,
}

impl ConstantPattern {
    pub const fn new(level: f32) -> Self {
        Self { level }
    }
}

impl Pattern for ConstantPattern {
    fn brightness(&self, _surface: &Surface, _sample: Sample) -> f32 {
        self.level
    }
}
