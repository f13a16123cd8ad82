//! Brightness patterns with compile-time known variants
//!
//! Every pattern is a pure function of an LED's grid position, the animation
//! timestep and the discretized sensor state. Patterns are stored in an enum
//! and dispatched with `match`, so the set is closed and checked at compile
//! time.

mod come_in;
mod constant;
mod ellipse;
mod follow;
mod range;

use core::f32::consts::PI;

use serde::Deserialize;

pub use come_in::ComeInPattern;
pub use constant::ConstantPattern;
pub use ellipse::EllipsePattern;
pub use follow::FollowPattern;
pub use range::{DEFAULT_TOP_BORDER_ROW, RangePattern};

use crate::error::Error;
use crate::layout::Surface;

const PATTERN_NAME_COME_IN: &str = "come_in";
const PATTERN_NAME_ELLIPSE: &str = "ellipse";
const PATTERN_NAME_RANGE: &str = "range";
const PATTERN_NAME_ALL_ON: &str = "all_on";
const PATTERN_NAME_ALL_OFF: &str = "all_off";
const PATTERN_NAME_FOLLOW: &str = "follow";

const PATTERN_ID_COME_IN: u8 = 0;
const PATTERN_ID_ELLIPSE: u8 = 1;
const PATTERN_ID_RANGE: u8 = 2;
const PATTERN_ID_ALL_ON: u8 = 3;
const PATTERN_ID_ALL_OFF: u8 = 4;
const PATTERN_ID_FOLLOW: u8 = 5;

/// Base brightness the animated patterns never drop below
pub const BASE_BRIGHTNESS: f32 = 0.3;

/// Position in the discretized state space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub row: usize,
    pub col: usize,
    pub timestep: usize,
    /// Distance bucket, 0 = exit end, 9 = entrance end
    pub distance: usize,
    /// Proximity index, bit0 = entrance, bit1 = exit
    pub proximity: usize,
}

pub trait Pattern {
    /// Whether the surface's shadow rules override this pattern
    const SHADOWED: bool = false;

    /// Brightness in `[0, 1]` of one LED
    fn brightness(&self, surface: &Surface, sample: Sample) -> f32;
}

/// Parameters shared by all patterns of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternParams {
    /// Timesteps in one animation cycle
    pub timesteps_per_cycle: usize,
    /// Row drawn as the top border by the range diagnostic
    pub range_top_border_row: usize,
}

/// Pattern slot - enum containing all possible patterns
#[derive(Debug, Clone, Copy)]
pub enum PatternSlot {
    /// Traveling wave with breath
    ComeIn(ComeInPattern),
    /// Superellipse glow drifting with the sweep
    Ellipse(EllipsePattern),
    /// Brightness ramp diagnostic with lit borders
    Range(RangePattern),
    /// Fixed brightness, used for all on and all off
    Constant(ConstantPattern),
    /// Band following the distance bucket
    Follow(FollowPattern),
}

/// Known pattern ids that scenarios can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
#[repr(u8)]
pub enum PatternId {
    ComeIn = PATTERN_ID_COME_IN,
    Ellipse = PATTERN_ID_ELLIPSE,
    Range = PATTERN_ID_RANGE,
    AllOn = PATTERN_ID_ALL_ON,
    AllOff = PATTERN_ID_ALL_OFF,
    Follow = PATTERN_ID_FOLLOW,
}

impl PatternId {
    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            PATTERN_ID_COME_IN => Self::ComeIn,
            PATTERN_ID_ELLIPSE => Self::Ellipse,
            PATTERN_ID_RANGE => Self::Range,
            PATTERN_ID_ALL_ON => Self::AllOn,
            PATTERN_ID_ALL_OFF => Self::AllOff,
            PATTERN_ID_FOLLOW => Self::Follow,
            _ => return None,
        })
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ComeIn => PATTERN_NAME_COME_IN,
            Self::Ellipse => PATTERN_NAME_ELLIPSE,
            Self::Range => PATTERN_NAME_RANGE,
            Self::AllOn => PATTERN_NAME_ALL_ON,
            Self::AllOff => PATTERN_NAME_ALL_OFF,
            Self::Follow => PATTERN_NAME_FOLLOW,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            PATTERN_NAME_COME_IN => Some(Self::ComeIn),
            PATTERN_NAME_ELLIPSE => Some(Self::Ellipse),
            PATTERN_NAME_RANGE => Some(Self::Range),
            PATTERN_NAME_ALL_ON => Some(Self::AllOn),
            PATTERN_NAME_ALL_OFF => Some(Self::AllOff),
            PATTERN_NAME_FOLLOW => Some(Self::Follow),
            _ => None,
        }
    }

    pub fn to_slot(self, params: PatternParams) -> PatternSlot {
        let cycle = params.timesteps_per_cycle.max(1);
        match self {
            Self::ComeIn => PatternSlot::ComeIn(ComeInPattern::new(cycle)),
            Self::Ellipse => PatternSlot::Ellipse(EllipsePattern::new(cycle)),
            Self::Range => PatternSlot::Range(RangePattern::new(params.range_top_border_row)),
            Self::AllOn => PatternSlot::Constant(ConstantPattern::new(1.0)),
            Self::AllOff => PatternSlot::Constant(ConstantPattern::new(0.0)),
            Self::Follow => PatternSlot::Follow(FollowPattern::new(cycle)),
        }
    }
}

impl core::str::FromStr for PatternId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_from_str(s).ok_or_else(|| Error::UnknownPattern(s.to_owned()))
    }
}

impl TryFrom<String> for PatternId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl core::fmt::Display for PatternId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PatternSlot {
    /// Brightness of one LED, with shadow rules applied first
    pub fn brightness(&self, surface: &Surface, sample: Sample) -> f32 {
        if self.is_shadowed() {
            if let Some(level) = surface.shadow_at(sample.row, sample.col) {
                return level;
            }
        }

        let value = match self {
            Self::ComeIn(pattern) => pattern.brightness(surface, sample),
            Self::Ellipse(pattern) => pattern.brightness(surface, sample),
            Self::Range(pattern) => pattern.brightness(surface, sample),
            Self::Constant(pattern) => pattern.brightness(surface, sample),
            Self::Follow(pattern) => pattern.brightness(surface, sample),
        };
        value.clamp(0.0, 1.0)
    }

    /// Derived from each pattern's `Pattern::SHADOWED` constant.
    pub const fn is_shadowed(&self) -> bool {
        match self {
            Self::ComeIn(_) => ComeInPattern::SHADOWED,
            Self::Ellipse(_) => EllipsePattern::SHADOWED,
            Self::Range(_) => RangePattern::SHADOWED,
            Self::Constant(_) => ConstantPattern::SHADOWED,
            Self::Follow(_) => FollowPattern::SHADOWED,
        }
    }
}

/// Slow single-sine pulse with a period of one animation cycle
#[inline]
pub fn breath(timestep: usize, timesteps_per_cycle: usize) -> f32 {
    let cycle = timesteps_per_cycle.max(1);
    let phase = (timestep % cycle) as f32 / cycle as f32;
    libm::fabsf(libm::sinf(PI * phase))
}

/// Columns advanced per timestep so one sweep takes exactly one cycle
#[inline]
pub(crate) fn column_increment(cols: usize, timesteps_per_cycle: usize) -> f32 {
    cols as f32 / timesteps_per_cycle.max(1) as f32
}

/// Mix the animated part on top of the base brightness
#[inline]
pub(crate) fn over_base(adjust: f32) -> f32 {
    BASE_BRIGHTNESS + (1.0 - BASE_BRIGHTNESS) * adjust
}
