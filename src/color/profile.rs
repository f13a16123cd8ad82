//! Named light sources
//!
//! Base colors follow the usual photography reference table of common light
//! sources and their color temperatures.

use serde::Deserialize;

use super::{Rgb, kelvin_to_rgb};
use crate::error::{Error, Result};

/// A named light source with its base color
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ColorProfileDef")]
pub struct ColorProfile {
    pub name: String,
    pub rgb: Rgb,
    /// Nominal color temperature, informational only
    pub kelvin: Option<u16>,
}

#[derive(Deserialize)]
struct ColorProfileDef {
    name: String,
    rgb: Option<[u8; 3]>,
    kelvin: Option<u16>,
}

impl TryFrom<ColorProfileDef> for ColorProfile {
    type Error = Error;

    fn try_from(def: ColorProfileDef) -> Result<Self> {
        let rgb = match (def.rgb, def.kelvin) {
            (Some([r, g, b]), _) => Rgb { r, g, b },
            (None, Some(kelvin)) => kelvin_to_rgb(kelvin),
            (None, None) => {
                return Err(Error::Config(format!(
                    "color profile `{}` needs `rgb` or `kelvin`",
                    def.name
                )));
            }
        };
        Ok(Self {
            name: def.name,
            rgb,
            kelvin: def.kelvin,
        })
    }
}

impl ColorProfile {
    pub fn new(name: &str, rgb: (u8, u8, u8), kelvin: Option<u16>) -> Self {
        Self {
            name: name.to_owned(),
            rgb: Rgb {
                r: rgb.0,
                g: rgb.1,
                b: rgb.2,
            },
            kelvin,
        }
    }
}

/// Built-in light sources
pub fn default_profiles() -> Vec<ColorProfile> {
    vec![
        ColorProfile::new("Candle", (255, 147, 41), Some(1900)),
        ColorProfile::new("40W Tungsten", (255, 197, 143), Some(2600)),
        ColorProfile::new("100W Tungsten", (255, 214, 170), Some(2850)),
        ColorProfile::new("Halogen", (255, 241, 224), Some(3200)),
        ColorProfile::new("Carbon Arc", (255, 250, 244), Some(5200)),
        ColorProfile::new("High Noon Sun", (255, 255, 251), Some(5400)),
        ColorProfile::new("Direct Sunlight", (255, 255, 255), Some(6000)),
        ColorProfile::new("Overcast Sky", (201, 226, 255), Some(7000)),
        ColorProfile::new("Clear Blue Sky", (64, 156, 255), Some(20000)),
    ]
}
