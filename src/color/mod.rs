mod hls;
mod kelvin;
mod profile;
mod utils;

use smart_leds::RGB8;

pub use hls::{Compositor, Hls};
pub use kelvin::kelvin_to_rgb;
pub use profile::{ColorProfile, default_profiles};
pub use utils::{rgb_from_u32, rgb_to_u32};

pub type Rgb = RGB8;

/// Packed `0xRRGGBB` color
pub type PackedRgb = u32;
