//! Traveling wave that invites a person into the space
//!
//! A bright band sweeps across the columns once per cycle while the whole
//! surface breathes. Sweep direction comes from the surface.

use core::f32::consts::PI;

use super::{Pattern, Sample, breath, column_increment, over_base};
use crate::layout::{Surface, Sweep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComeInPattern {
    timesteps_per_cycle: usize,
}

impl ComeInPattern {
    pub const fn new(timesteps_per_cycle: usize) -> Self {
        Self {
            timesteps_per_cycle,
        }
    }
}

impl Pattern for ComeInPattern {
    const SHADOWED: bool = true;

    fn brightness(&self, surface: &Surface, sample: Sample) -> f32 {
        let cols = surface.cols() as f32;
        let step = (sample.timestep % self.timesteps_per_cycle) as f32;
        let shift = column_increment(surface.cols(), self.timesteps_per_cycle) * step;

        let position = match surface.sweep() {
            Sweep::Forward => sample.col as f32 + shift,
            Sweep::Backward => sample.col as f32 - shift,
        };

        let wave = libm::fabsf(libm::sinf(PI * position / cols));
        over_base(wave * breath(sample.timestep, self.timesteps_per_cycle))
    }
}
