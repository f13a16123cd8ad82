//! Static diagnostic showing the full brightness range
//!
//! Brightness ramps bilinearly from the first LED to the last, and the border
//! is lit so the outline of each surface is visible.

use super::{Pattern, Sample};
use crate::layout::Surface;

/// Row treated as the top border by default.
///
/// Row 0 of the ceiling is partly unaddressed on the installed enclosure, so
/// the border is drawn one row in.
pub const DEFAULT_TOP_BORDER_ROW: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangePattern {
    top_border_row: usize,
}

impl RangePattern {
    pub const fn new(top_border_row: usize) -> Self {
        Self { top_border_row }
    }

    /// The bilinear ramp alone, without the border
    pub fn ramp(row: usize, col: usize, rows: usize, cols: usize) -> f32 {
        fraction(row, rows) * fraction(col, cols)
    }

    fn is_border(&self, row: usize, col: usize, rows: usize, cols: usize) -> bool {
        row == self.top_border_row || row + 1 == rows || col == 0 || col + 1 == cols
    }
}

fn fraction(index: usize, len: usize) -> f32 {
    if len > 1 {
        index as f32 / (len - 1) as f32
    } else {
        1.0
    }
}

impl Pattern for RangePattern {
    const SHADOWED: bool = true;

    fn brightness(&self, surface: &Surface, sample: Sample) -> f32 {
        let (rows, cols) = (surface.rows(), surface.cols());
        if self.is_border(sample.row, sample.col, rows, cols) {
            return 1.0;
        }
        Self::ramp(sample.row, sample.col, rows, cols)
    }
}
