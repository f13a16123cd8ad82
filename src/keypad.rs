//! Keypad command surface
//!
//! The keypad has four keys, `1` to `4`. Chords select diagnostics and
//! housekeeping; single keys switch between the three everyday scenarios.

use crate::sensor::KeySet;

pub const SCENARIO_IDLE: &str = "Idle";
pub const SCENARIO_STANDARD: &str = "Standard";
pub const SCENARIO_ENERGY: &str = "Energy";
pub const SCENARIO_OFF: &str = "Off";
pub const SCENARIO_BRIGHTNESS_RANGE: &str = "Brightness Range";
pub const SCENARIO_CALIBRATE: &str = "Calibrate Distance";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Turn the lights off and leave the control loop
    Exit,
    /// Ask the operator for a scenario by name
    PickScenario,
    /// Show the brightness range diagnostic
    BrightnessRange,
    /// Run the distance calibration procedure
    Calibrate,
    /// Switch to a scenario
    Activate(&'static str),
}

impl Command {
    /// Command for a set of held keys
    ///
    /// Chords must match exactly. Otherwise the highest of keys 3, 2 and 1
    /// picks Energy, Standard or Idle.
    pub fn decode(keys: &KeySet) -> Option<Self> {
        match keys.as_slice() {
            [] => None,
            [1, 2, 3, 4] => Some(Self::Exit),
            [3, 4] => Some(Self::PickScenario),
            [2, 4] => Some(Self::BrightnessRange),
            [1, 4] => Some(Self::Calibrate),
            _ if keys.contains(3) => Some(Self::Activate(SCENARIO_ENERGY)),
            _ if keys.contains(2) => Some(Self::Activate(SCENARIO_STANDARD)),
            _ if keys.contains(1) => Some(Self::Activate(SCENARIO_IDLE)),
            _ => None,
        }
    }
}
