//! Single-threaded control loop
//!
//! Portable pacing without async or platform timers: the caller passes the
//! current time to [`Controller::tick`] and sleeps for
//! [`Controller::sleep_duration`] in between.
//!
//! # Usage
//!
//! ```ignore
//! let mut controller = Controller::new(engine, sensors, operator, &timing);
//! controller.start("Idle", clock.now())?;
//!
//! while controller.tick(clock.now()).is_continue() {
//!     let wait = controller.sleep_duration(clock.now());
//!     std::thread::sleep(std::time::Duration::from_micros(wait.as_micros()));
//! }
//! ```

use core::ops::ControlFlow;
use std::path::PathBuf;

use embassy_time::{Duration, Instant};
use log::{debug, error, info};

use crate::calibration::{Operator, run_calibration};
use crate::config::Timing;
use crate::engine::ScenarioEngine;
use crate::error::Result;
use crate::keypad::{Command, SCENARIO_BRIGHTNESS_RANGE, SCENARIO_CALIBRATE, SCENARIO_OFF};
use crate::normalizer::DistanceNormalizer;
use crate::sensor::{DistanceReadings, KeySet, Proximity, SensorAdapter};
use crate::sink::RenderSink;

/// The LED timestep counter restarts after this many frames
pub const TIMESTEP_WRAP: usize = 1_000_000;

/// Default calibration file name
pub const DEFAULT_CALIBRATION_FILE: &str = "calibration_params.csv";

/// Time between consecutive loop iterations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopMetrics {
    pub last: Duration,
    pub min: Option<Duration>,
    pub max: Duration,
    pub sum: Duration,
    pub count: u64,
}

impl Default for LoopMetrics {
    fn default() -> Self {
        Self {
            last: Duration::from_ticks(0),
            min: None,
            max: Duration::from_ticks(0),
            sum: Duration::from_ticks(0),
            count: 0,
        }
    }
}

impl LoopMetrics {
    pub fn record(&mut self, elapsed: Duration) {
        self.last = elapsed;
        self.min = Some(self.min.map_or(elapsed, |min| min.min(elapsed)));
        self.max = self.max.max(elapsed);
        self.sum += elapsed;
        self.count += 1;
    }

    /// Mean iteration time, zero before any iteration was recorded
    pub fn average(&self) -> Duration {
        if self.count == 0 {
            return Duration::from_ticks(0);
        }
        Duration::from_ticks(self.sum.as_ticks() / self.count)
    }
}

/// Drives the engine from sensors and keypad
pub struct Controller<K, S, O> {
    engine: ScenarioEngine<K>,
    sensors: S,
    operator: O,
    normalizer: DistanceNormalizer,
    calibration_path: PathBuf,

    led_interval: Duration,
    report_interval: Duration,

    timestep: usize,
    last_led: Instant,
    last_report: Instant,
    last_tick: Option<Instant>,

    raw_distance: DistanceReadings,
    distance: DistanceReadings,
    proximity: Proximity,
    retained_keys: Option<KeySet>,
    metrics: LoopMetrics,
}

impl<K, S, O> Controller<K, S, O>
where
    K: RenderSink,
    S: SensorAdapter,
    O: Operator,
{
    pub fn new(engine: ScenarioEngine<K>, sensors: S, operator: O, timing: &Timing) -> Self {
        Self {
            engine,
            sensors,
            operator,
            normalizer: DistanceNormalizer::default(),
            calibration_path: PathBuf::from(DEFAULT_CALIBRATION_FILE),
            led_interval: timing.led_interval(),
            report_interval: timing.report_interval(),
            timestep: 0,
            last_led: Instant::from_ticks(0),
            last_report: Instant::from_ticks(0),
            last_tick: None,
            raw_distance: DistanceReadings::new(),
            distance: DistanceReadings::new(),
            proximity: Proximity::default(),
            retained_keys: None,
            metrics: LoopMetrics::default(),
        }
    }

    #[must_use]
    pub fn with_normalizer(mut self, normalizer: DistanceNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    #[must_use]
    pub fn with_calibration_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.calibration_path = path.into();
        self
    }

    /// Activate the first scenario and start the clocks
    pub fn start(&mut self, scenario: &str, now: Instant) -> Result<()> {
        self.engine.activate(scenario)?;
        self.last_led = now;
        self.last_report = now;
        self.last_tick = None;
        Ok(())
    }

    /// Run one loop iteration
    ///
    /// Renders when an LED interval has passed, polls the keypad, and every
    /// report interval handles retained keys, reads the sensors and logs a
    /// report. Breaks when the exit chord was pressed.
    pub fn tick(&mut self, now: Instant) -> ControlFlow<()> {
        if let Some(prev) = self.last_tick {
            self.metrics.record(now.saturating_duration_since(prev));
        }
        self.last_tick = Some(now);

        if now.saturating_duration_since(self.last_led) >= self.led_interval {
            self.last_led = now;
            self.timestep = (self.timestep + 1) % TIMESTEP_WRAP;
            self.render();
        }

        let keys = self.sensors.read_keys();
        if !keys.is_empty() {
            self.retained_keys = Some(keys);
        }

        if now.saturating_duration_since(self.last_report) >= self.report_interval {
            self.last_report = now;

            if let Some(keys) = self.retained_keys.take() {
                info!("Pressed keys: {:?}", keys.as_slice());
                if let Some(command) = Command::decode(&keys) {
                    if self.execute(command).is_break() {
                        return ControlFlow::Break(());
                    }
                }
            }

            self.poll_sensors();
            self.report();
        }

        ControlFlow::Continue(())
    }

    /// Time until the next LED frame is due
    pub fn sleep_duration(&self, now: Instant) -> Duration {
        let next = self.last_led + self.led_interval;
        next.checked_duration_since(now).unwrap_or(Duration::from_ticks(0))
    }

    fn render(&mut self) {
        if let Err(e) = self.engine.render(self.timestep, &self.distance, self.proximity) {
            error!("Render failed: {e}");
        }
    }

    fn activate(&mut self, scenario: &str) {
        if let Err(e) = self.engine.activate(scenario) {
            error!("Cannot activate `{scenario}`: {e}");
        }
    }

    fn execute(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Exit => {
                info!("Exit requested, turning the lights off");
                self.activate(SCENARIO_OFF);
                self.render();
                return ControlFlow::Break(());
            }
            Command::PickScenario => {
                let names: Vec<&str> = self.engine.installation().scenario_names().collect();
                if let Some(name) = self.operator.pick_scenario(&names) {
                    self.activate(&name);
                }
            }
            Command::BrightnessRange => self.activate(SCENARIO_BRIGHTNESS_RANGE),
            Command::Calibrate => {
                self.activate(SCENARIO_CALIBRATE);
                self.render();
                match run_calibration(&mut self.sensors, &mut self.operator, &self.calibration_path) {
                    Ok(calibration) => self.normalizer = DistanceNormalizer::fit(&calibration),
                    Err(e) => error!("Calibration failed: {e}"),
                }
                self.activate(SCENARIO_OFF);
            }
            Command::Activate(scenario) => self.activate(scenario),
        }
        ControlFlow::Continue(())
    }

    fn poll_sensors(&mut self) {
        self.raw_distance = self.sensors.read_distance();
        self.distance = self.normalizer.normalize(&self.raw_distance);
        self.proximity = self.sensors.read_proximity();
    }

    fn report(&self) {
        debug!(
            "Distance: {:?} normalized {:?}, proximity entrance {} exit {}",
            self.raw_distance.as_slice(),
            self.distance.as_slice(),
            self.proximity.entrance,
            self.proximity.exit
        );

        let metrics = &self.metrics;
        info!(
            "Loop time avg {:.3} ms, min {:.3} ms, max {:.3} ms, {} iterations",
            millis(metrics.average()),
            millis(metrics.min.unwrap_or(Duration::from_ticks(0))),
            millis(metrics.max),
            metrics.count
        );
    }

    pub fn engine(&self) -> &ScenarioEngine<K> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ScenarioEngine<K> {
        &mut self.engine
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }

    pub fn operator_mut(&mut self) -> &mut O {
        &mut self.operator
    }

    pub fn normalizer(&self) -> &DistanceNormalizer {
        &self.normalizer
    }

    pub const fn timestep(&self) -> usize {
        self.timestep
    }

    /// Latest normalized distance per channel
    pub fn distance(&self) -> &[Option<f32>] {
        &self.distance
    }

    pub const fn proximity(&self) -> Proximity {
        self.proximity
    }

    pub const fn metrics(&self) -> &LoopMetrics {
        &self.metrics
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_micros() as f64 / 1000.0
}
