//! Precomputed pattern buffers
//!
//! A buffer holds the packed color of every LED for every discretized sensor
//! state and animation timestep, so rendering is a slice lookup.

use crate::color::{Compositor, PackedRgb, Rgb};
use crate::config::{Installation, Scenario};
use crate::error::Result;
use crate::layout::{Layout, Surface};
use crate::pattern::{PatternId, PatternSlot, Sample};

/// Number of proximity states: entrance and exit sensors, one bit each
pub const PROXIMITY_STATES: usize = 4;

/// Number of normalized distance buckets
pub const DISTANCE_BUCKETS: usize = 10;

/// Everything a buffer's contents depend on
///
/// Two buffers generated from equal keys are identical, which is what the
/// cache compares against.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferKey {
    pub pattern: PatternId,
    pub color: Rgb,
    pub brightness_scale: f32,
    pub timesteps_per_cycle: usize,
    pub timesteps: usize,
    pub range_top_border_row: usize,
    /// `(rows, cols)` of each surface in layout order
    pub shapes: Vec<(usize, usize)>,
}

impl BufferKey {
    pub fn new(installation: &Installation, scenario: &Scenario) -> Result<Self> {
        let profile = installation.color_profile(&scenario.color_profile)?;
        let timesteps = installation.buffer_timesteps();
        let params = installation.pattern_params(scenario);

        Ok(Self {
            pattern: scenario.pattern,
            color: profile.rgb,
            brightness_scale: scenario.brightness_scale,
            timesteps_per_cycle: params.timesteps_per_cycle.min(timesteps),
            timesteps,
            range_top_border_row: params.range_top_border_row,
            shapes: installation
                .layout
                .iter()
                .map(|s| (s.rows(), s.cols()))
                .collect(),
        })
    }

    /// Values stored for one surface of the given shape
    pub const fn surface_len(&self, rows: usize, cols: usize) -> usize {
        PROXIMITY_STATES * DISTANCE_BUCKETS * self.timesteps * rows * cols
    }
}

/// Index of one frame inside a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameIndex {
    pub proximity: usize,
    pub distance: usize,
    pub timestep: usize,
}

/// Frames of one surface, laid out as
/// `[proximity][distance][timestep][row][col]`
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceFrames {
    rows: usize,
    cols: usize,
    timesteps: usize,
    data: Vec<PackedRgb>,
}

impl SurfaceFrames {
    /// Wrap raw data, `None` if its length does not match the shape
    pub fn from_raw(rows: usize, cols: usize, timesteps: usize, data: Vec<PackedRgb>) -> Option<Self> {
        let expected = PROXIMITY_STATES * DISTANCE_BUCKETS * timesteps * rows * cols;
        (data.len() == expected).then_some(Self {
            rows,
            cols,
            timesteps,
            data,
        })
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major colors of one frame
    ///
    /// Indices past the end of a dimension are clamped to its last entry.
    pub fn frame(&self, index: FrameIndex) -> &[PackedRgb] {
        let cells = self.rows * self.cols;
        let proximity = index.proximity.min(PROXIMITY_STATES - 1);
        let distance = index.distance.min(DISTANCE_BUCKETS - 1);
        let timestep = index.timestep.min(self.timesteps.saturating_sub(1));

        let frame = (proximity * DISTANCE_BUCKETS + distance) * self.timesteps + timestep;
        let start = frame * cells;
        &self.data[start..start + cells]
    }

    pub fn data(&self) -> &[PackedRgb] {
        &self.data
    }
}

/// Frames of every surface for one scenario
#[derive(Debug, Clone, PartialEq)]
pub struct PatternBuffer {
    key: BufferKey,
    surfaces: Vec<SurfaceFrames>,
}

impl PatternBuffer {
    /// Assemble a buffer from decoded parts
    ///
    /// Returns `None` if the surfaces do not match the key's shapes.
    pub fn from_parts(key: BufferKey, surfaces: Vec<SurfaceFrames>) -> Option<Self> {
        let matches = surfaces.len() == key.shapes.len()
            && surfaces.iter().zip(&key.shapes).all(|(frames, &(rows, cols))| {
                frames.rows == rows && frames.cols == cols && frames.timesteps == key.timesteps
            });
        matches.then_some(Self { key, surfaces })
    }

    /// Evaluate the scenario's pattern over the whole state space
    pub fn generate(installation: &Installation, scenario: &Scenario) -> Result<Self> {
        let key = BufferKey::new(installation, scenario)?;
        let slot = scenario.pattern.to_slot(installation.pattern_params(scenario));
        let compositor = Compositor::new(key.color, key.brightness_scale);

        let surfaces = installation
            .layout
            .iter()
            .map(|surface| render_surface(surface, &slot, &compositor, key.timesteps))
            .collect();

        Ok(Self { key, surfaces })
    }

    pub fn key(&self) -> &BufferKey {
        &self.key
    }

    pub fn timesteps(&self) -> usize {
        self.key.timesteps
    }

    pub fn surfaces(&self) -> &[SurfaceFrames] {
        &self.surfaces
    }

    /// Borrow one frame of every surface
    pub fn frame<'a>(&'a self, layout: &'a Layout, index: FrameIndex) -> Frame<'a> {
        Frame {
            layout,
            buffer: self,
            index,
        }
    }
}

fn render_surface(
    surface: &Surface,
    slot: &PatternSlot,
    compositor: &Compositor,
    timesteps: usize,
) -> SurfaceFrames {
    let (rows, cols) = (surface.rows(), surface.cols());
    let mut data = Vec::with_capacity(PROXIMITY_STATES * DISTANCE_BUCKETS * timesteps * rows * cols);

    for proximity in 0..PROXIMITY_STATES {
        for distance in 0..DISTANCE_BUCKETS {
            for timestep in 0..timesteps {
                for row in 0..rows {
                    for col in 0..cols {
                        let sample = Sample {
                            row,
                            col,
                            timestep,
                            distance,
                            proximity,
                        };
                        data.push(compositor.packed(slot.brightness(surface, sample)));
                    }
                }
            }
        }
    }

    SurfaceFrames {
        rows,
        cols,
        timesteps,
        data,
    }
}

/// One frame of every surface, paired with the layout it is drawn on
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    layout: &'a Layout,
    buffer: &'a PatternBuffer,
    index: FrameIndex,
}

impl<'a> Frame<'a> {
    pub const fn index(&self) -> FrameIndex {
        self.index
    }

    pub const fn layout(&self) -> &'a Layout {
        self.layout
    }

    /// Each surface with its row-major colors
    pub fn surfaces(&self) -> impl Iterator<Item = (&'a Surface, &'a [PackedRgb])> + 'a {
        let index = self.index;
        self.layout
            .iter()
            .zip(self.buffer.surfaces.iter())
            .map(move |(surface, frames)| (surface, frames.frame(index)))
    }

    /// Color of one cell, `None` for unknown surfaces or cells off the grid
    pub fn color_at(&self, surface: &str, row: usize, col: usize) -> Option<PackedRgb> {
        let (surface, colors) = self.surfaces().find(|(s, _)| s.name() == surface)?;
        if row >= surface.rows() || col >= surface.cols() {
            return None;
        }
        colors.get(row * surface.cols() + col).copied()
    }
}
