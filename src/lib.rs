pub mod buffer;
pub mod cache;
pub mod calibration;
pub mod clock;
pub mod color;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod keypad;
pub mod layout;
pub mod normalizer;
pub mod pattern;
pub mod sensor;
pub mod sink;

pub use buffer::{DISTANCE_BUCKETS, Frame, FrameIndex, PROXIMITY_STATES, PatternBuffer};
pub use cache::CacheOutcome;
pub use calibration::{CalibrationData, Depth, Lateral, Operator};
pub use clock::{Clock, SystemClock};
pub use config::{Installation, Scenario, Timing};
pub use controller::{Controller, LoopMetrics};
pub use engine::{Activation, ScenarioEngine, distance_index, proximity_index};
pub use error::{Error, Result};
pub use keypad::Command;
pub use layout::{Layout, Surface};
pub use normalizer::{DistanceNormalizer, NormalizerParams};
pub use pattern::{PatternId, PatternSlot};
pub use sensor::{EchoLine, KeySet, Proximity, SensorAdapter, UltrasonicChannel};
pub use sink::{RasterSink, RenderSink, StripSink};

pub use color::Rgb;
pub use embassy_time::{Duration, Instant};
