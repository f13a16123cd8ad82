//! Sensor adapter interfaces
//!
//! The control loop reads distance, proximity and keypad state through
//! [`SensorAdapter`]. Ultrasonic distance channels are built from a raw echo
//! line and a clock, and disable themselves after a timeout.

use embassy_time::Duration;
use heapless::Vec;
use log::warn;

use crate::clock::Clock;

/// Most distance channels an adapter reports
pub const MAX_DISTANCE_CHANNELS: usize = 4;

/// Most keys held at once
pub const MAX_KEYS: usize = 4;

/// Speed of sound in cm/s
const SPEED_OF_SOUND_CM_S: f32 = 34_300.0;

/// Raw distance of each channel in cm, `None` when a channel has no reading
pub type DistanceReadings = Vec<Option<f32>, MAX_DISTANCE_CHANNELS>;

/// Presence at the two ends of the enclosure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Proximity {
    pub entrance: bool,
    pub exit: bool,
}

impl Proximity {
    pub const fn new(entrance: bool, exit: bool) -> Self {
        Self { entrance, exit }
    }

    pub const fn any(&self) -> bool {
        self.entrance || self.exit
    }
}

/// Sorted set of pressed key ids
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeySet(Vec<u8, MAX_KEYS>);

impl KeySet {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from pressed keys in any order; duplicates are dropped and keys
    /// beyond capacity are ignored
    pub fn from_keys(keys: &[u8]) -> Self {
        let mut set = Self::new();
        for &key in keys {
            set.insert(key);
        }
        set
    }

    /// Returns `false` if the set is full
    pub fn insert(&mut self, key: u8) -> bool {
        match self.0.binary_search(&key) {
            Ok(_) => true,
            Err(at) => self.0.insert(at, key).is_ok(),
        }
    }

    pub fn contains(&self, key: u8) -> bool {
        self.0.binary_search(&key).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

/// Everything the control loop reads from the outside world
pub trait SensorAdapter {
    fn read_distance(&mut self) -> DistanceReadings;

    fn read_proximity(&mut self) -> Proximity;

    fn read_keys(&mut self) -> KeySet;
}

/// Trigger and echo pins of an ultrasonic ranger
pub trait EchoLine {
    /// Send the trigger pulse
    fn trigger(&mut self);

    /// Current level of the echo pin
    fn is_high(&mut self) -> bool;
}

/// One ultrasonic distance channel
///
/// After a read times out the channel is non-functional for the rest of the
/// process and every later read returns `None` without touching the line.
pub struct UltrasonicChannel<E, C> {
    name: &'static str,
    line: E,
    clock: C,
    timeout: Duration,
    functional: bool,
}

impl<E: EchoLine, C: Clock> UltrasonicChannel<E, C> {
    pub fn new(name: &'static str, line: E, clock: C, timeout: Duration) -> Self {
        Self {
            name,
            line,
            clock,
            timeout,
            functional: true,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn is_functional(&self) -> bool {
        self.functional
    }

    /// Measure once, in cm
    pub fn read(&mut self) -> Option<f32> {
        if !self.functional {
            return None;
        }

        self.line.trigger();

        let wait_start = self.clock.now();
        while !self.line.is_high() {
            if self.clock.now().duration_since(wait_start) > self.timeout {
                self.disable();
                return None;
            }
        }

        let pulse_start = self.clock.now();
        while self.line.is_high() {
            if self.clock.now().duration_since(pulse_start) > self.timeout {
                self.disable();
                return None;
            }
        }

        let elapsed = self.clock.now().duration_since(pulse_start);
        let seconds = elapsed.as_micros() as f32 / 1_000_000.0;
        Some(seconds * SPEED_OF_SOUND_CM_S / 2.0)
    }

    fn disable(&mut self) {
        self.functional = false;
        warn!(
            "Distance sensor `{}` timed out after {} ms, disabling it",
            self.name,
            self.timeout.as_millis()
        );
    }

    pub fn into_inner(self) -> (E, C) {
        (self.line, self.clock)
    }
}
