//! Surfaces of the enclosure and the LEDs mounted on them
//!
//! Each surface is a rectangular grid. A grid cell either holds the physical
//! strip address of the LED mounted there or is unaddressed. Unaddressed cells
//! are never drawn or written.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Physical index of an LED on the strip
pub type LedAddress = u16;

/// Direction traveling patterns move across a surface's columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sweep {
    /// Toward column 0
    #[default]
    Forward,
    /// Toward the last column
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowAxis {
    Row,
    Col,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowLevel {
    Full,
    Dark,
}

impl ShadowLevel {
    pub const fn brightness(self) -> f32 {
        match self {
            Self::Full => 1.0,
            Self::Dark => 0.0,
        }
    }
}

/// Forces a whole row or column to a fixed brightness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ShadowRule {
    pub axis: ShadowAxis,
    pub index: usize,
    pub level: ShadowLevel,
}

/// Placement of a surface on the simulated raster, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "[u32; 4]")]
pub struct Bbox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl From<[u32; 4]> for Bbox {
    fn from([x0, y0, x1, y1]: [u32; 4]) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

impl Bbox {
    pub const fn width(self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub const fn height(self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }
}

/// One physical face of the enclosure
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "SurfaceDef")]
pub struct Surface {
    name: String,
    rows: usize,
    cols: usize,
    /// Row-major address grid
    addresses: Vec<Option<LedAddress>>,
    sweep: Sweep,
    shadows: Vec<ShadowRule>,
    bbox: Bbox,
}

/// Surface as written in configuration files.
///
/// TOML has no null, so a negative address marks an unaddressed cell.
#[derive(Deserialize)]
struct SurfaceDef {
    name: String,
    addresses: Vec<Vec<i32>>,
    #[serde(default)]
    sweep: Sweep,
    #[serde(default)]
    shadows: Vec<ShadowRule>,
    #[serde(default)]
    bbox: Bbox,
}

impl TryFrom<SurfaceDef> for Surface {
    type Error = Error;

    fn try_from(def: SurfaceDef) -> Result<Self> {
        let grid = def
            .addresses
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|address| {
                        if address < 0 {
                            Ok(None)
                        } else {
                            LedAddress::try_from(address).map(Some).map_err(|_| {
                                Error::InvalidLayout(format!(
                                    "surface `{}`: address {address} out of range",
                                    def.name
                                ))
                            })
                        }
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Surface::new(&def.name, grid)?
            .with_sweep(def.sweep)
            .with_shadows(def.shadows)
            .with_bbox(def.bbox))
    }
}

impl Surface {
    /// Create a surface from a grid of rows
    ///
    /// Fails if the grid is empty or not rectangular.
    pub fn new(name: &str, grid: Vec<Vec<Option<LedAddress>>>) -> Result<Self> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidLayout(format!("surface `{name}` is empty")));
        }
        if let Some(bad) = grid.iter().position(|row| row.len() != cols) {
            return Err(Error::InvalidLayout(format!(
                "surface `{name}`: row {bad} has {} cells, expected {cols}",
                grid[bad].len()
            )));
        }

        Ok(Self {
            name: name.to_owned(),
            rows,
            cols,
            addresses: grid.into_iter().flatten().collect(),
            sweep: Sweep::Forward,
            shadows: Vec::new(),
            bbox: Bbox::default(),
        })
    }

    #[must_use]
    pub fn with_sweep(mut self, sweep: Sweep) -> Self {
        self.sweep = sweep;
        self
    }

    #[must_use]
    pub fn with_shadows(mut self, shadows: Vec<ShadowRule>) -> Self {
        self.shadows = shadows;
        self
    }

    #[must_use]
    pub fn with_bbox(mut self, bbox: Bbox) -> Self {
        self.bbox = bbox;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Number of grid cells, addressed or not
    pub const fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub const fn sweep(&self) -> Sweep {
        self.sweep
    }

    pub const fn bbox(&self) -> Bbox {
        self.bbox
    }

    pub fn shadows(&self) -> &[ShadowRule] {
        &self.shadows
    }

    /// Strip address at a grid cell, `None` when nothing is mounted there
    pub fn address(&self, row: usize, col: usize) -> Option<LedAddress> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.addresses[row * self.cols + col]
    }

    /// Row-major address grid
    pub fn addresses(&self) -> &[Option<LedAddress>] {
        &self.addresses
    }

    /// Fixed brightness a shadow rule imposes on a cell, if any
    ///
    /// The first matching rule wins.
    pub fn shadow_at(&self, row: usize, col: usize) -> Option<f32> {
        self.shadows
            .iter()
            .find(|rule| match rule.axis {
                ShadowAxis::Row => rule.index == row,
                ShadowAxis::Col => rule.index == col,
            })
            .map(|rule| rule.level.brightness())
    }
}

/// All surfaces of the enclosure and the strip they are wired to
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Layout {
    pub strip_len: usize,
    pub surfaces: Vec<Surface>,
}

impl Layout {
    pub fn surface(&self, name: &str) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.name == name)
    }

    /// Grid shape of a surface as `(rows, cols)`
    pub fn shape(&self, name: &str) -> Option<(usize, usize)> {
        self.surface(name).map(|s| (s.rows, s.cols))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter()
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Check that names are unique and every address fits the strip once
    pub fn validate(&self) -> Result<()> {
        if self.surfaces.is_empty() {
            return Err(Error::InvalidLayout("no surfaces".into()));
        }

        let mut used = vec![false; self.strip_len];
        for (i, surface) in self.surfaces.iter().enumerate() {
            if self.surfaces[..i].iter().any(|s| s.name == surface.name) {
                return Err(Error::InvalidLayout(format!(
                    "duplicate surface `{}`",
                    surface.name
                )));
            }
            for address in surface.addresses.iter().flatten() {
                let slot = used.get_mut(usize::from(*address)).ok_or_else(|| {
                    Error::InvalidLayout(format!(
                        "surface `{}`: address {address} beyond strip of {}",
                        surface.name, self.strip_len
                    ))
                })?;
                if *slot {
                    return Err(Error::InvalidLayout(format!(
                        "surface `{}`: address {address} used twice",
                        surface.name
                    )));
                }
                *slot = true;
            }
        }
        Ok(())
    }
}

/// Column-major serpentine run of addresses, as the strip is laid on the
/// side walls: even columns run up, odd columns run down.
fn serpentine(rows: usize, starts: &[u16], gaps: &[(usize, usize)]) -> Vec<Vec<Option<LedAddress>>> {
    let mut grid = vec![vec![None; starts.len()]; rows];
    for (col, &start) in starts.iter().enumerate() {
        for (row, line) in grid.iter_mut().enumerate() {
            let offset = if col % 2 == 0 { rows - 1 - row } else { row };
            #[allow(clippy::cast_possible_truncation)]
            let address = start + offset as u16;
            line[col] = Some(address);
        }
    }
    for &(row, col) in gaps {
        grid[row][col] = None;
    }
    grid
}

impl Default for Layout {
    /// The enclosure the installation was built for: two walls and a ceiling
    /// wired to one 300 LED strip.
    fn default() -> Self {
        // Walls: bottom LED of each even column has the lowest address.
        // Cells listed as gaps were skipped when the strip was mounted.
        let left = serpentine(
            10,
            &[198, 210, 221, 234, 246, 258, 269],
            &[(9, 1), (0, 4), (9, 5)],
        );
        let right = serpentine(
            10,
            &[19, 32, 43, 55, 66, 78, 90, 101, 113],
            &[(9, 1), (9, 3)],
        );

        let mut top: Vec<Vec<Option<LedAddress>>> = Vec::with_capacity(3);
        top.push((172..=188).rev().map(Some).collect());
        top.push(
            core::iter::once(None)
                .chain((153..=168).map(Some))
                .collect(),
        );
        top.push(
            core::iter::once(None)
                .chain((134..=149).rev().map(Some))
                .collect(),
        );

        let surfaces = [
            Surface::new("Left", left).map(|s| {
                s.with_sweep(Sweep::Backward)
                    .with_bbox(Bbox::from([0, 600, 600, 1000]))
            }),
            Surface::new("Top", top).map(|s| {
                s.with_shadows(vec![ShadowRule {
                    axis: ShadowAxis::Col,
                    index: 8,
                    level: ShadowLevel::Dark,
                }])
                .with_bbox(Bbox::from([600, 0, 1000, 600]))
            }),
            Surface::new("Right", right).map(|s| s.with_bbox(Bbox::from([1000, 600, 1600, 1000]))),
        ];

        Self {
            strip_len: 300,
            // Static grids above are rectangular and non-empty
            surfaces: surfaces.into_iter().filter_map(Result::ok).collect(),
        }
    }
}
