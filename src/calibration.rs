//! Distance sensor calibration data and procedure
//!
//! Calibration records raw distances with a person standing at nine marked
//! positions, plus a baseline with nobody present. The file holds one
//! comma-separated row per step, one field per distance channel.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::sensor::SensorAdapter;

/// Position along the walk from entrance to exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth {
    Entrance,
    Midway,
    Exit,
}

impl Depth {
    pub const ALL: [Self; 3] = [Self::Entrance, Self::Midway, Self::Exit];

    /// Normalized distance this position maps to
    pub const fn target(self) -> f32 {
        match self {
            Self::Entrance => 1.0,
            Self::Midway => 0.5,
            Self::Exit => 0.0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entrance => "Entrance",
            Self::Midway => "Midway",
            Self::Exit => "Exit",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Position across the enclosure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lateral {
    Right,
    Center,
    Left,
}

impl Lateral {
    pub const ALL: [Self; 3] = [Self::Right, Self::Center, Self::Left];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Right => "Right",
            Self::Center => "Center",
            Self::Left => "Left",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Raw readings of every channel at one step, in cm
pub type ChannelReadings = Vec<Option<f32>>;

/// Prompts shown to whoever runs the installation
pub trait Operator {
    /// Ask a yes/no question; `true` means go ahead
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Let the operator choose one of `names`, `None` to cancel
    fn pick_scenario(&mut self, names: &[&str]) -> Option<String>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationData {
    /// Readings with nobody present
    pub baseline: ChannelReadings,
    positions: [[ChannelReadings; 3]; 3],
}

impl CalibrationData {
    pub fn new(baseline: ChannelReadings) -> Self {
        Self {
            baseline,
            positions: Default::default(),
        }
    }

    pub fn set(&mut self, depth: Depth, lateral: Lateral, readings: ChannelReadings) {
        self.positions[depth.index()][lateral.index()] = readings;
    }

    #[must_use]
    pub fn with(mut self, depth: Depth, lateral: Lateral, readings: ChannelReadings) -> Self {
        self.set(depth, lateral, readings);
        self
    }

    pub fn get(&self, depth: Depth, lateral: Lateral) -> &[Option<f32>] {
        &self.positions[depth.index()][lateral.index()]
    }

    /// One channel's reading at a position, `None` if absent
    pub fn reading(&self, depth: Depth, lateral: Lateral, channel: usize) -> Option<f32> {
        self.get(depth, lateral).get(channel).copied().flatten()
    }

    /// Number of channels seen in any row
    pub fn channels(&self) -> usize {
        self.positions
            .iter()
            .flatten()
            .map(Vec::len)
            .chain(std::iter::once(self.baseline.len()))
            .max()
            .unwrap_or(0)
    }

    /// Steps in file order: baseline first, then depth by lateral
    fn rows(&self) -> impl Iterator<Item = &ChannelReadings> {
        std::iter::once(&self.baseline).chain(self.positions.iter().flatten())
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for row in self.rows() {
            for (i, value) in row.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if let Some(value) = value {
                    let _ = write!(out, "{value}");
                }
            }
            out.push('\n');
        }
        out
    }

    /// Parse the file format; empty or non-numeric fields become `None`
    pub fn parse(source: &str) -> Option<Self> {
        let mut rows = source.lines().map(parse_row);

        let mut data = Self::new(rows.next()?);
        for depth in Depth::ALL {
            for lateral in Lateral::ALL {
                data.set(depth, lateral, rows.next()?);
            }
        }
        Some(data)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let corrupt = |reason: String| Error::CalibrationFileMissingOrCorrupt {
            path: path.to_owned(),
            reason,
        };

        let source = fs::read_to_string(path).map_err(|e| corrupt(e.to_string()))?;
        let data = Self::parse(&source).ok_or_else(|| corrupt("fewer than 10 rows".into()))?;
        info!("Loaded distance calibration from {}", path.display());
        Ok(data)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_csv()).map_err(|source| Error::CalibrationWrite {
            path: path.to_owned(),
            source,
        })?;
        info!("Saved distance calibration to {}", path.display());
        Ok(())
    }
}

fn read<S: SensorAdapter + ?Sized>(sensors: &mut S) -> ChannelReadings {
    sensors.read_distance().into_iter().collect()
}

fn parse_row(line: &str) -> ChannelReadings {
    if line.trim().is_empty() {
        return ChannelReadings::new();
    }
    line.split(',')
        .map(|field| field.trim().parse::<f32>().ok().filter(|v| v.is_finite()))
        .collect()
}

/// Walk the operator through the ten calibration steps
///
/// A step the operator declines is left without readings. The result is saved
/// to `path` if the operator agrees at the end.
pub fn run_calibration<S, O>(sensors: &mut S, operator: &mut O, path: &Path) -> Result<CalibrationData>
where
    S: SensorAdapter + ?Sized,
    O: Operator + ?Sized,
{
    info!("Distance calibration starting");

    info!("Step 1 of 10: baseline distance");
    let baseline = if operator.confirm("Remove all objects from near the model, then continue") {
        read(sensors)
    } else {
        ChannelReadings::new()
    };

    let mut data = CalibrationData::new(baseline);
    let mut step = 2;
    for depth in Depth::ALL {
        for lateral in Lateral::ALL {
            info!("Step {step} of 10: {} {}", depth.as_str(), lateral.as_str());
            let prompt = format!(
                "Place the person at {} {}, then continue",
                depth.as_str(),
                lateral.as_str()
            );
            if operator.confirm(&prompt) {
                data.set(depth, lateral, read(sensors));
            }
            step += 1;
        }
    }

    if operator.confirm("Save the calibration?") {
        data.save(path)?;
    }
    info!("Distance calibration completed");
    Ok(data)
}

/// Load the calibration file, running the procedure if asked to or if the
/// file cannot be used
pub fn load_or_calibrate<S, O>(
    path: &Path,
    recalibrate: bool,
    sensors: &mut S,
    operator: &mut O,
) -> Result<CalibrationData>
where
    S: SensorAdapter + ?Sized,
    O: Operator + ?Sized,
{
    if !recalibrate {
        match CalibrationData::load(path) {
            Ok(data) => return Ok(data),
            Err(e @ Error::CalibrationFileMissingOrCorrupt { .. }) => warn!("{e}, recalibrating"),
            Err(e) => return Err(e),
        }
    }
    run_calibration(sensors, operator, path)
}
