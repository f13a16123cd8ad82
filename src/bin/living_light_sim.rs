//! Desktop simulation of the installation
//!
//! A simulated visitor walks between entrance and exit in front of two
//! simulated ultrasonic sensors. Frames are painted onto a raster image that
//! can be saved as PNG, and keypad presses are replayed from a script.
#![allow(clippy::print_stdout)]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};

use living_light::calibration::load_or_calibrate;
use living_light::sensor::DistanceReadings;
use living_light::{
    Clock, Controller, DistanceNormalizer, Duration, EchoLine, Installation, Instant, KeySet, Operator, Proximity,
    RasterSink, ScenarioEngine, SensorAdapter, SystemClock, UltrasonicChannel,
};

/// Distance reported with the visitor at the entrance, in cm
const ENTRANCE_CM: f32 = 40.0;
/// Distance reported with the visitor at the exit, in cm
const EXIT_CM: f32 = 160.0;
/// Seconds for one walk from entrance to exit and back
const WALK_PERIOD_SEC: f32 = 20.0;
/// Delay between trigger and echo start
const ECHO_DELAY: Duration = Duration::from_micros(100);

#[derive(Parser, Debug)]
#[command(version, about = "Simulated living light installation")]
struct Args {
    /// Installation file (TOML); built-in enclosure when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for pattern buffer caches
    #[arg(long, default_value = "pattern_cache")]
    cache_dir: PathBuf,

    /// Distance calibration file
    #[arg(long, default_value = living_light::controller::DEFAULT_CALIBRATION_FILE)]
    calibration: PathBuf,

    /// Run the calibration procedure even if the file exists
    #[arg(long)]
    recalibrate: bool,

    /// Answer every operator prompt with yes
    #[arg(long)]
    yes: bool,

    /// Scenario shown at startup
    #[arg(long, default_value = "Idle")]
    scenario: String,

    /// Keypad presses as `SECONDS=KEYS`, e.g. `5=3` or `30=1234`
    #[arg(long = "press", value_parser = parse_press)]
    presses: Vec<Press>,

    /// Simulate a failed sensor on this channel
    #[arg(long)]
    dead_channel: Option<usize>,

    /// Save the raster to this PNG after every report
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<f32>,
}

/// Keys held at a point of simulated time
#[derive(Debug, Clone)]
struct Press {
    at: f32,
    keys: KeySet,
}

fn parse_press(value: &str) -> Result<Press> {
    let Some((at, keys)) = value.split_once('=') else {
        bail!("expected SECONDS=KEYS, got `{value}`");
    };
    let at: f32 = at.trim().parse().context("invalid press time")?;
    let mut set = KeySet::new();
    for key in keys.trim().chars() {
        let Some(digit) = key.to_digit(10).filter(|d| (1..=4).contains(d)) else {
            bail!("keys are 1 to 4, got `{key}`");
        };
        set.insert(u8::try_from(digit)?);
    }
    Ok(Press { at, keys: set })
}

fn seconds_since(start: Instant, now: Instant) -> f32 {
    now.saturating_duration_since(start).as_micros() as f32 / 1_000_000.0
}

/// The simulated visitor
struct Walker {
    start: Instant,
}

impl Walker {
    /// Normalized position, 1 at the entrance and 0 at the exit
    fn position(&self, now: Instant) -> f32 {
        let phase = (seconds_since(self.start, now) / WALK_PERIOD_SEC).fract();
        (1.0 - 2.0 * phase).abs()
    }

    fn distance_cm(&self, now: Instant) -> f32 {
        EXIT_CM + (ENTRANCE_CM - EXIT_CM) * self.position(now)
    }
}

/// Echo pin driven by the walker's distance
struct SimEcho {
    walker: Rc<Walker>,
    offset_cm: f32,
    dead: bool,
    pulse: Option<(Instant, Instant)>,
}

impl EchoLine for SimEcho {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn trigger(&mut self) {
        if self.dead {
            return;
        }
        let now = Instant::now();
        let distance = self.walker.distance_cm(now) + self.offset_cm;
        let round_trip = Duration::from_micros((distance * 2.0 / 34_300.0 * 1_000_000.0) as u64);
        let start = now + ECHO_DELAY;
        self.pulse = Some((start, start + round_trip));
    }

    fn is_high(&mut self) -> bool {
        let now = Instant::now();
        self.pulse.is_some_and(|(start, end)| now >= start && now < end)
    }
}

struct SimSensors {
    walker: Rc<Walker>,
    channels: Vec<UltrasonicChannel<SimEcho, SystemClock>>,
    presses: Vec<Press>,
}

impl SensorAdapter for SimSensors {
    fn read_distance(&mut self) -> DistanceReadings {
        self.channels.iter_mut().map(UltrasonicChannel::read).collect()
    }

    fn read_proximity(&mut self) -> Proximity {
        let position = self.walker.position(SystemClock.now());
        Proximity::new(position > 0.9, position < 0.1)
    }

    fn read_keys(&mut self) -> KeySet {
        let elapsed = seconds_since(self.walker.start, SystemClock.now());
        match self.presses.first() {
            Some(press) if press.at <= elapsed => self.presses.remove(0).keys,
            _ => KeySet::new(),
        }
    }
}

/// Prompts on the terminal
struct ConsoleOperator {
    assume_yes: bool,
}

impl ConsoleOperator {
    fn ask(&self, prompt: &str) -> Option<String> {
        print!("==> {prompt} ");
        io::stdout().flush().ok()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        Some(line.trim().to_owned())
    }
}

impl Operator for ConsoleOperator {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            info!("{prompt}: yes");
            return true;
        }
        self.ask(&format!("{prompt} [y]/n"))
            .is_some_and(|answer| !answer.eq_ignore_ascii_case("n"))
    }

    fn pick_scenario(&mut self, names: &[&str]) -> Option<String> {
        if self.assume_yes {
            return None;
        }
        for (i, name) in names.iter().enumerate() {
            println!("{i:>3}: {name}");
        }
        let answer = self.ask("Scenario number (empty to cancel):")?;
        let index: usize = answer.parse().ok()?;
        names.get(index).map(|name| (*name).to_owned())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let installation = match &args.config {
        Some(path) => Installation::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Installation::default(),
    };

    let walker = Rc::new(Walker {
        start: SystemClock.now(),
    });
    let timeout = installation.timing.sensor_timeout();
    let channels = ["Left", "Right"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let echo = SimEcho {
                walker: Rc::clone(&walker),
                offset_cm: i as f32 * 2.5,
                dead: args.dead_channel == Some(i),
                pulse: None,
            };
            UltrasonicChannel::new(name, echo, SystemClock, timeout)
        })
        .collect();

    let mut presses = args.presses.clone();
    presses.sort_by(|a, b| a.at.total_cmp(&b.at));
    let mut sensors = SimSensors {
        walker: Rc::clone(&walker),
        channels,
        presses,
    };
    let mut operator = ConsoleOperator { assume_yes: args.yes };

    let calibration = load_or_calibrate(&args.calibration, args.recalibrate, &mut sensors, &mut operator)?;
    let normalizer = DistanceNormalizer::fit(&calibration);
    if normalizer.channels().iter().all(Option::is_none) {
        warn!("No distance channel could be calibrated, every reading counts as far");
    }

    let sink = RasterSink::new(&installation.layout);
    let timing = installation.timing;
    let engine = ScenarioEngine::new(installation, &args.cache_dir, sink);
    let mut controller = Controller::new(engine, sensors, operator, &timing)
        .with_normalizer(normalizer)
        .with_calibration_path(&args.calibration);
    controller
        .start(&args.scenario, SystemClock.now())
        .with_context(|| format!("starting scenario `{}`", args.scenario))?;

    let started = SystemClock.now();
    let mut last_snapshot = started;
    loop {
        let now = SystemClock.now();
        if controller.tick(now).is_break() {
            break;
        }

        if let Some(path) = &args.snapshot {
            if now.saturating_duration_since(last_snapshot) >= timing.report_interval() {
                last_snapshot = now;
                controller.engine().sink().save_png(path).context("saving snapshot")?;
            }
        }

        if args.duration.is_some_and(|limit| seconds_since(started, now) >= limit) {
            info!("Simulation time is up");
            break;
        }

        let wait = controller.sleep_duration(SystemClock.now());
        std::thread::sleep(std::time::Duration::from_micros(wait.as_micros()));
    }

    if let Some(path) = &args.snapshot {
        controller.engine().sink().save_png(path).context("saving snapshot")?;
    }
    Ok(())
}
