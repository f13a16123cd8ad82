//! Installation configuration
//!
//! Everything the engine needs to know about the enclosure is collected in one
//! immutable [`Installation`] value, built once at startup (from the built-in
//! defaults or a TOML file) and handed to the engine.

use std::path::Path;

use embassy_time::Duration;
use serde::Deserialize;

use crate::color::{ColorProfile, default_profiles};
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::pattern::{DEFAULT_TOP_BORDER_ROW, PatternId, PatternParams};

/// Buffer lengths are rounded up to a multiple of this many timesteps
const TIMESTEP_ROUNDING: usize = 10;

/// Float slack when dividing cycle times into timesteps
const STEP_EPSILON: f64 = 1e-6;

/// A named bundle of pattern, color and timing
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub pattern: PatternId,
    pub color_profile: String,
    #[serde(default = "default_brightness_scale")]
    pub brightness_scale: f32,
    /// Seconds for one full animation period
    pub cycle_time: f32,
}

const fn default_brightness_scale() -> f32 {
    1.0
}

impl Scenario {
    pub fn new(name: &str, pattern: PatternId, color_profile: &str, brightness_scale: f32, cycle_time: f32) -> Self {
        Self {
            name: name.to_owned(),
            pattern,
            color_profile: color_profile.to_owned(),
            brightness_scale,
            cycle_time,
        }
    }
}

/// Control loop timing, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Interval between LED frames; also the length of one pattern timestep
    pub led_timestep_sec: f32,
    /// Interval between sensor polls, key processing and diagnostic reports
    pub report_interval_sec: f32,
    /// How long a distance sensor may stay silent before it is disabled
    pub sensor_timeout_sec: f32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            led_timestep_sec: 0.05,
            report_interval_sec: 0.5,
            sensor_timeout_sec: 5.0,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn seconds(value: f32) -> Duration {
    Duration::from_micros((f64::from(value.max(0.0)) * 1e6) as u64)
}

impl Timing {
    pub fn led_interval(&self) -> Duration {
        seconds(self.led_timestep_sec)
    }

    pub fn report_interval(&self) -> Duration {
        seconds(self.report_interval_sec)
    }

    pub fn sensor_timeout(&self) -> Duration {
        seconds(self.sensor_timeout_sec)
    }

    /// Timesteps in one cycle of the given length, at least one
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn timesteps_per_cycle(&self, cycle_time: f32) -> usize {
        let steps = f64::from(cycle_time) / f64::from(self.led_timestep_sec);
        (libm::round(steps) as usize).max(1)
    }

    /// Timesteps needed to hold a full cycle of the given length, rounded up
    /// to a multiple of ten
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn buffer_timesteps(&self, longest_cycle: f32) -> usize {
        let steps = f64::from(longest_cycle) / f64::from(self.led_timestep_sec);
        let steps = (libm::ceil(steps - STEP_EPSILON) as usize).max(1);
        steps.div_ceil(TIMESTEP_ROUNDING) * TIMESTEP_ROUNDING
    }
}

/// The whole installation: enclosure, light sources, scenarios and timing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Installation {
    pub layout: Layout,
    pub color_profiles: Vec<ColorProfile>,
    pub scenarios: Vec<Scenario>,
    pub timing: Timing,
    /// Row the range diagnostic draws as its top border
    pub range_top_border_row: usize,
}

impl Default for Installation {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            color_profiles: default_profiles(),
            scenarios: default_scenarios(),
            timing: Timing::default(),
            range_top_border_row: DEFAULT_TOP_BORDER_ROW,
        }
    }
}

/// Built-in scenarios
pub fn default_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("Idle", PatternId::Ellipse, "40W Tungsten", 0.6, 4.0),
        Scenario::new("Standard", PatternId::ComeIn, "High Noon Sun", 0.8, 3.0),
        Scenario::new("Energy", PatternId::ComeIn, "Direct Sunlight", 1.0, 2.0),
        Scenario::new("Off", PatternId::AllOff, "Direct Sunlight", 1.0, 1.0),
        Scenario::new("Brightness Range", PatternId::Range, "Direct Sunlight", 1.0, 1.0),
        Scenario::new("Calibrate Distance", PatternId::AllOn, "Direct Sunlight", 1.0, 1.0),
        Scenario::new("diag_come_in", PatternId::ComeIn, "Direct Sunlight", 1.0, 2.0),
        Scenario::new("diag_ellipse", PatternId::Ellipse, "Direct Sunlight", 1.0, 2.0),
        Scenario::new("diag_follow", PatternId::Follow, "Direct Sunlight", 1.0, 2.0),
        Scenario::new("diag_all_on", PatternId::AllOn, "Direct Sunlight", 1.0, 1.0),
    ]
}

impl Installation {
    /// Parse and validate a TOML configuration
    ///
    /// Sections left out of the file keep their built-in defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let installation: Self = toml::from_str(source).map_err(|e| Error::Config(e.to_string()))?;
        installation.validate()?;
        Ok(installation)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;

        if !(self.timing.led_timestep_sec > 0.0) {
            return Err(Error::Config(format!(
                "led_timestep_sec must be positive, got {}",
                self.timing.led_timestep_sec
            )));
        }

        for (i, scenario) in self.scenarios.iter().enumerate() {
            if self.scenarios[..i].iter().any(|s| s.name == scenario.name) {
                return Err(Error::Config(format!("duplicate scenario `{}`", scenario.name)));
            }
            if !(scenario.cycle_time > 0.0 && scenario.cycle_time.is_finite()) {
                return Err(Error::InvalidCycleTime {
                    name: scenario.name.clone(),
                    cycle_time: scenario.cycle_time,
                });
            }
            if !(scenario.brightness_scale >= 0.0 && scenario.brightness_scale.is_finite()) {
                return Err(Error::Config(format!(
                    "scenario `{}` has invalid brightness scale {}",
                    scenario.name, scenario.brightness_scale
                )));
            }
            self.color_profile(&scenario.color_profile)?;
        }
        Ok(())
    }

    pub fn scenario(&self, name: &str) -> Result<&Scenario> {
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::UnknownScenario(name.to_owned()))
    }

    pub fn color_profile(&self, name: &str) -> Result<&ColorProfile> {
        self.color_profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::UnknownColorProfile(name.to_owned()))
    }

    pub fn scenario_names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.iter().map(|s| s.name.as_str())
    }

    /// Length of every pattern buffer, sized for the slowest scenario
    pub fn buffer_timesteps(&self) -> usize {
        let longest = self
            .scenarios
            .iter()
            .map(|s| s.cycle_time)
            .fold(self.timing.led_timestep_sec, f32::max);
        self.timing.buffer_timesteps(longest)
    }

    pub fn pattern_params(&self, scenario: &Scenario) -> PatternParams {
        PatternParams {
            timesteps_per_cycle: self.timing.timesteps_per_cycle(scenario.cycle_time),
            range_top_border_row: self.range_top_border_row,
        }
    }
}
