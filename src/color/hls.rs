//! Hue/Lightness/Saturation conversion and brightness compositing
//!
//! Brightness is applied on the lightness axis only. Hue and saturation of the
//! color profile stay fixed, so a dimmed LED keeps the tint of its light source
//! instead of drifting toward grey the way per-channel RGB scaling does.

use super::Rgb;
use super::utils::{rgb_to_u32, unit_to_u8};

const ONE_THIRD: f32 = 1.0 / 3.0;
const ONE_SIXTH: f32 = 1.0 / 6.0;
const TWO_THIRDS: f32 = 2.0 / 3.0;

/// Color in HLS space, all components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hls {
    pub hue: f32,
    pub lightness: f32,
    pub saturation: f32,
}

impl Hls {
    #[allow(clippy::float_cmp)]
    pub fn from_rgb(rgb: Rgb) -> Self {
        let r = f32::from(rgb.r) / 255.0;
        let g = f32::from(rgb.g) / 255.0;
        let b = f32::from(rgb.b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let lightness = (max + min) / 2.0;

        if max == min {
            return Self {
                hue: 0.0,
                lightness,
                saturation: 0.0,
            };
        }

        let delta = max - min;
        let saturation = if lightness <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };

        let rc = (max - r) / delta;
        let gc = (max - g) / delta;
        let bc = (max - b) / delta;

        let hue = if r == max {
            bc - gc
        } else if g == max {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };

        Self {
            hue: (hue / 6.0).rem_euclid(1.0),
            lightness,
            saturation,
        }
    }

    #[allow(clippy::float_cmp)]
    pub fn to_rgb(self) -> Rgb {
        if self.saturation == 0.0 {
            let v = unit_to_u8(self.lightness);
            return Rgb { r: v, g: v, b: v };
        }

        let m2 = if self.lightness <= 0.5 {
            self.lightness * (1.0 + self.saturation)
        } else {
            self.lightness + self.saturation - self.lightness * self.saturation
        };
        let m1 = 2.0 * self.lightness - m2;

        Rgb {
            r: unit_to_u8(hue_channel(m1, m2, self.hue + ONE_THIRD)),
            g: unit_to_u8(hue_channel(m1, m2, self.hue)),
            b: unit_to_u8(hue_channel(m1, m2, self.hue - ONE_THIRD)),
        }
    }

    /// Same hue and saturation with a different lightness
    #[must_use]
    pub fn with_lightness(self, lightness: f32) -> Self {
        Self {
            lightness: lightness.clamp(0.0, 1.0),
            ..self
        }
    }
}

fn hue_channel(m1: f32, m2: f32, hue: f32) -> f32 {
    let hue = hue.rem_euclid(1.0);
    if hue < ONE_SIXTH {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < TWO_THIRDS {
        m1 + (m2 - m1) * (TWO_THIRDS - hue) * 6.0
    } else {
        m1
    }
}

/// Maps brightness values to packed colors of one color profile
///
/// The profile is converted to HLS once; each brightness then only rescales
/// the lightness.
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    base: Hls,
    brightness_scale: f32,
}

impl Compositor {
    pub fn new(base: Rgb, brightness_scale: f32) -> Self {
        Self {
            base: Hls::from_rgb(base),
            brightness_scale,
        }
    }

    /// Color for a brightness in `[0, 1]`
    pub fn rgb(&self, brightness: f32) -> Rgb {
        let lightness = brightness * self.brightness_scale * self.base.lightness;
        self.base.with_lightness(lightness).to_rgb()
    }

    /// Color for a brightness in `[0, 1]`, packed as `0xRRGGBB`
    pub fn packed(&self, brightness: f32) -> u32 {
        rgb_to_u32(self.rgb(brightness))
    }
}
