//! Sensor diagnostic: a band that tracks the measured position
//!
//! The band sits at the column matching the distance bucket, so walking from
//! exit to entrance moves it across every surface. While either proximity
//! sensor fires, the whole surface pulses as well.

use super::{Pattern, Sample, breath};
use crate::buffer::DISTANCE_BUCKETS;
use crate::layout::Surface;

const FLOOR: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowPattern {
    timesteps_per_cycle: usize,
}

impl FollowPattern {
    pub const fn new(timesteps_per_cycle: usize) -> Self {
        Self {
            timesteps_per_cycle,
        }
    }
}

impl Pattern for FollowPattern {
    fn brightness(&self, surface: &Surface, sample: Sample) -> f32 {
        let last_col = surface.cols().saturating_sub(1) as f32;
        let position = sample.distance as f32 / (DISTANCE_BUCKETS - 1) as f32;
        let center = position * last_col;

        let half_width = (surface.cols() as f32 / 4.0).max(1.0);
        let band = (1.0 - libm::fabsf(sample.col as f32 - center) / half_width).clamp(0.0, 1.0);

        let pulse = if sample.proximity == 0 {
            0.0
        } else {
            breath(sample.timestep, self.timesteps_per_cycle)
        };

        FLOOR + (1.0 - FLOOR) * band.max(pulse)
    }
}
