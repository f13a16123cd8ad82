//! Raw distance to normalized position
//!
//! Each channel gets a straight line fitted by least squares through its
//! Center calibration readings, so that Entrance maps to 1.0, Midway to 0.5
//! and, when calibrated, Exit to 0.0.

use crate::calibration::{CalibrationData, Depth, Lateral};
use crate::sensor::{DistanceReadings, MAX_DISTANCE_CHANNELS};

/// `normalized = intercept + slope * raw`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizerParams {
    pub slope: f32,
    pub intercept: f32,
}

impl NormalizerParams {
    /// Ordinary least squares line through `(raw, target)` points
    ///
    /// `None` with fewer than two points or when all raw values coincide.
    pub fn fit(points: &[(f32, f32)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|&(x, _)| f64::from(x)).sum::<f64>() / n;
        let mean_y = points.iter().map(|&(_, y)| f64::from(y)).sum::<f64>() / n;

        let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), &(x, y)| {
            let dx = f64::from(x) - mean_x;
            (sxx + dx * dx, sxy + dx * (f64::from(y) - mean_y))
        });
        if sxx <= f64::EPSILON {
            return None;
        }

        let slope = sxy / sxx;
        #[allow(clippy::cast_possible_truncation)]
        Some(Self {
            slope: slope as f32,
            intercept: (mean_y - slope * mean_x) as f32,
        })
    }

    pub fn apply(&self, raw: f32) -> f32 {
        self.intercept + self.slope * raw
    }
}

/// Per-channel distance normalizer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceNormalizer {
    channels: Vec<Option<NormalizerParams>>,
}

impl DistanceNormalizer {
    pub fn new(channels: Vec<Option<NormalizerParams>>) -> Self {
        Self { channels }
    }

    /// Fit every channel from the Center readings
    ///
    /// The Right and Left readings are recorded but not used.
    pub fn fit(calibration: &CalibrationData) -> Self {
        let channels = (0..calibration.channels())
            .map(|channel| {
                let points: Vec<(f32, f32)> = Depth::ALL
                    .iter()
                    .filter_map(|&depth| {
                        calibration
                            .reading(depth, Lateral::Center, channel)
                            .map(|raw| (raw, depth.target()))
                    })
                    .collect();
                NormalizerParams::fit(&points)
            })
            .collect();
        Self { channels }
    }

    pub fn channels(&self) -> &[Option<NormalizerParams>] {
        &self.channels
    }

    /// Normalize one channel; absent in, absent out
    pub fn normalize_channel(&self, channel: usize, raw: Option<f32>) -> Option<f32> {
        let params = self.channels.get(channel).copied().flatten()?;
        raw.map(|raw| params.apply(raw))
    }

    /// Normalize every channel of a reading
    pub fn normalize(&self, raw: &[Option<f32>]) -> DistanceReadings {
        raw.iter()
            .enumerate()
            .take(MAX_DISTANCE_CHANNELS)
            .map(|(channel, &value)| self.normalize_channel(channel, value))
            .collect()
    }
}
