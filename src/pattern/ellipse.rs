//! Superellipse glow drifting across a surface

use super::{Pattern, Sample, breath, column_increment, over_base};
use crate::layout::{Surface, Sweep};

/// Exponent of the Lᵖ norm; 4 gives a rounded rectangle
const STEEPNESS: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EllipsePattern {
    timesteps_per_cycle: usize,
}

impl EllipsePattern {
    pub const fn new(timesteps_per_cycle: usize) -> Self {
        Self {
            timesteps_per_cycle,
        }
    }
}

fn lp_norm(dx: f32, dy: f32) -> f32 {
    let sum = libm::powf(libm::fabsf(dx), STEEPNESS) + libm::powf(libm::fabsf(dy), STEEPNESS);
    libm::powf(sum, 1.0 / STEEPNESS)
}

impl Pattern for EllipsePattern {
    const SHADOWED: bool = true;

    fn brightness(&self, surface: &Surface, sample: Sample) -> f32 {
        let row_focus = (surface.rows() / 2) as f32;
        let col_focus = (surface.cols() / 2) as f32;

        let step = (sample.timestep % self.timesteps_per_cycle) as f32;
        let travel = column_increment(surface.cols(), self.timesteps_per_cycle) * step;
        // Same direction as the come_in band on this surface
        let center_col = match surface.sweep() {
            Sweep::Forward => surface.cols() as f32 - travel,
            Sweep::Backward => travel,
        };

        let reach = lp_norm(row_focus, col_focus);
        let falloff = if reach > 0.0 {
            let distance = lp_norm(row_focus - sample.row as f32, center_col - sample.col as f32);
            (1.0 - distance / reach).clamp(0.0, 1.0)
        } else {
            1.0
        };

        over_base(falloff * breath(sample.timestep, self.timesteps_per_cycle))
    }
}
