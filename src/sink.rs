//! Render sinks
//!
//! A sink receives one complete frame at a time. Unaddressed grid cells have
//! no LED behind them and are never written.

use std::path::Path;

use image::{Rgb as Pixel, RgbImage};
use smart_leds::SmartLedsWrite;

use crate::buffer::Frame;
use crate::color::{Rgb, rgb_from_u32};
use crate::layout::{Bbox, Layout};

/// Anything that can display a frame
pub trait RenderSink {
    fn set_all(&mut self, frame: &Frame<'_>);
}

/// Flattens surfaces onto one addressable strip
///
/// The strip is pushed through any `smart_leds` driver. Strip positions no
/// surface maps to stay dark.
pub struct StripSink<W> {
    writer: W,
    pixels: Vec<Rgb>,
}

impl<W> StripSink<W>
where
    W: SmartLedsWrite<Color = Rgb>,
{
    pub fn new(writer: W, strip_len: usize) -> Self {
        Self {
            writer,
            pixels: vec![Rgb::default(); strip_len],
        }
    }

    /// Colors last sent to the strip
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W> RenderSink for StripSink<W>
where
    W: SmartLedsWrite<Color = Rgb>,
{
    fn set_all(&mut self, frame: &Frame<'_>) {
        for (surface, colors) in frame.surfaces() {
            for (address, &color) in surface.addresses().iter().zip(colors) {
                let Some(address) = address else {
                    continue;
                };
                if let Some(pixel) = self.pixels.get_mut(usize::from(*address)) {
                    *pixel = rgb_from_u32(color);
                }
            }
        }

        if self.writer.write(self.pixels.iter().copied()).is_err() {
            log::warn!("LED strip write failed");
        }
    }
}

/// Draws each LED as a block on an image of the unfolded enclosure
///
/// Cells without an LED keep the background color.
pub struct RasterSink {
    image: RgbImage,
}

impl RasterSink {
    /// Size the image to cover every surface's placement rectangle
    pub fn new(layout: &Layout) -> Self {
        let width = layout.iter().map(|s| s.bbox().x1).max().unwrap_or(1).max(1);
        let height = layout.iter().map(|s| s.bbox().y1).max().unwrap_or(1).max(1);
        Self {
            image: RgbImage::from_pixel(width, height, Pixel([0, 0, 0])),
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn save_png(&self, path: &Path) -> image::ImageResult<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)
    }

    fn fill(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Pixel<u8>) {
        let (width, height) = self.image.dimensions();
        for y in y0..y1.min(height) {
            for x in x0..x1.min(width) {
                self.image.put_pixel(x, y, color);
            }
        }
    }
}

/// Pixel rectangle of grid cell `(row, col)` inside `bbox`
#[allow(clippy::cast_possible_truncation)]
fn cell_rect(bbox: Bbox, rows: usize, cols: usize, row: usize, col: usize) -> (u32, u32, u32, u32) {
    let (rows, cols) = (rows.max(1) as u32, cols.max(1) as u32);
    let (row, col) = (row as u32, col as u32);
    let x0 = bbox.x0 + bbox.width() * col / cols;
    let x1 = bbox.x0 + bbox.width() * (col + 1) / cols;
    let y0 = bbox.y0 + bbox.height() * row / rows;
    let y1 = bbox.y0 + bbox.height() * (row + 1) / rows;
    (x0, y0, x1, y1)
}

impl RenderSink for RasterSink {
    fn set_all(&mut self, frame: &Frame<'_>) {
        for (surface, colors) in frame.surfaces() {
            let (rows, cols) = (surface.rows(), surface.cols());
            for (cell, (&color, address)) in colors.iter().zip(surface.addresses()).enumerate() {
                if address.is_none() {
                    continue;
                }
                let (row, col) = (cell / cols, cell % cols);
                let (x0, y0, x1, y1) = cell_rect(surface.bbox(), rows, cols, row, col);
                let rgb = rgb_from_u32(color);
                self.fill(x0, y0, x1, y1, Pixel([rgb.r, rgb.g, rgb.b]));
            }
        }
    }
}
