use std::path::{Path, PathBuf};

use log::info;

use crate::buffer::{DISTANCE_BUCKETS, Frame, FrameIndex, PatternBuffer};
use crate::cache::{self, CacheOutcome};
use crate::config::{Installation, Scenario};
use crate::error::{Error, Result};
use crate::sensor::Proximity;
use crate::sink::RenderSink;

/// Normalized distance assumed when no channel has a reading
pub const NO_READING_DISTANCE: f32 = 1.0;

/// The scenario currently on display
#[derive(Debug, Clone)]
struct Active {
    scenario: Scenario,
    timesteps_per_cycle: usize,
    buffer: PatternBuffer,
}

/// Summary of a completed activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub scenario: String,
    pub timesteps_per_cycle: usize,
    pub outcome: CacheOutcome,
}

/// Scenario Engine - owns the active scenario and pushes its frames to a sink
///
/// Activation loads or builds the full pattern buffer before swapping it in,
/// so a render never sees a partial buffer. Rendering itself is a lookup.
pub struct ScenarioEngine<K> {
    installation: Installation,
    cache_dir: PathBuf,
    sink: K,
    active: Option<Active>,
}

impl<K: RenderSink> ScenarioEngine<K> {
    pub fn new(installation: Installation, cache_dir: impl Into<PathBuf>, sink: K) -> Self {
        Self {
            installation,
            cache_dir: cache_dir.into(),
            sink,
            active: None,
        }
    }

    /// Make a scenario the active one
    ///
    /// Blocks while the buffer is generated on a cache miss. On error the
    /// previously active scenario stays active.
    pub fn activate(&mut self, name: &str) -> Result<Activation> {
        let scenario = self.installation.scenario(name)?.clone();
        let (buffer, outcome) = cache::load_or_generate(&self.cache_dir, &self.installation, &scenario)?;
        let timesteps_per_cycle = buffer.key().timesteps_per_cycle;

        info!(
            "Activated scenario `{}` ({}, {} timesteps per cycle, {:?})",
            scenario.name, scenario.pattern, timesteps_per_cycle, outcome
        );

        let activation = Activation {
            scenario: scenario.name.clone(),
            timesteps_per_cycle,
            outcome,
        };
        self.active = Some(Active {
            scenario,
            timesteps_per_cycle,
            buffer,
        });
        Ok(activation)
    }

    /// Look up the frame for the given state without pushing it
    pub fn frame(&self, timestep: usize, distance: &[Option<f32>], proximity: Proximity) -> Result<Frame<'_>> {
        let active = self.active.as_ref().ok_or(Error::NotActive)?;
        let index = frame_index(active.timesteps_per_cycle, timestep, distance, proximity);
        Ok(active.buffer.frame(&self.installation.layout, index))
    }

    /// Look up the frame for the given state and push it to the sink
    ///
    /// `distance` holds normalized per-channel readings.
    pub fn render(&mut self, timestep: usize, distance: &[Option<f32>], proximity: Proximity) -> Result<()> {
        let active = self.active.as_ref().ok_or(Error::NotActive)?;
        let index = frame_index(active.timesteps_per_cycle, timestep, distance, proximity);
        let frame = active.buffer.frame(&self.installation.layout, index);
        self.sink.set_all(&frame);
        Ok(())
    }

    pub fn installation(&self) -> &Installation {
        &self.installation
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn active_scenario(&self) -> Option<&Scenario> {
        self.active.as_ref().map(|a| &a.scenario)
    }

    pub fn timesteps_per_cycle(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.timesteps_per_cycle)
    }

    pub fn active_buffer(&self) -> Option<&PatternBuffer> {
        self.active.as_ref().map(|a| &a.buffer)
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }
}

fn frame_index(
    timesteps_per_cycle: usize,
    timestep: usize,
    distance: &[Option<f32>],
    proximity: Proximity,
) -> FrameIndex {
    FrameIndex {
        proximity: proximity_index(proximity),
        distance: distance_index(combined_distance(distance)),
        timestep: timestep % timesteps_per_cycle.max(1),
    }
}

/// Two bit proximity encoding: bit 0 entrance, bit 1 exit
pub fn proximity_index(proximity: Proximity) -> usize {
    usize::from(proximity.entrance) | (usize::from(proximity.exit) << 1)
}

/// Average of the channels that have a reading, each clipped to `[0, 1]`
///
/// Without any reading the room is treated as empty.
pub fn combined_distance(distance: &[Option<f32>]) -> f32 {
    let (sum, count) = distance
        .iter()
        .flatten()
        .filter(|d| !d.is_nan())
        .fold((0.0f32, 0usize), |(sum, count), d| (sum + d.clamp(0.0, 1.0), count + 1));

    if count == 0 {
        NO_READING_DISTANCE
    } else {
        sum / count as f32
    }
}

/// Distance bucket of a normalized distance, halves round to even
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn distance_index(distance: f32) -> usize {
    let last = (DISTANCE_BUCKETS - 1) as f32;
    let scaled = (distance.clamp(0.0, 1.0) * last).round_ties_even();
    (scaled as usize).min(DISTANCE_BUCKETS - 1)
}
