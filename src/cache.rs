//! Per-scenario pattern buffer cache files
//!
//! A cache file is a little endian header describing the parameters the
//! buffer was generated from, followed by the packed colors of each surface.
//! A file whose header does not match the current scenario is stale and gets
//! regenerated.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{info, warn};

use crate::buffer::{BufferKey, PatternBuffer, SurfaceFrames};
use crate::color::Rgb;
use crate::config::{Installation, Scenario};
use crate::error::{Error, Result};
use crate::pattern::PatternId;

const MAGIC: &[u8; 4] = b"LPAT";
const FORMAT_VERSION: u16 = 1;

/// File extension of cache files
pub const CACHE_EXTENSION: &str = "ledpat";

/// Where an activated buffer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Read from an up to date cache file
    Loaded,
    /// No cache file existed; generated and written
    Generated,
    /// The cache file was stale or unreadable; generated and overwritten
    Regenerated,
}

/// Lower-cased scenario name with spaces replaced by underscores
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Cache file path of a scenario inside `dir`
pub fn cache_path(dir: &Path, scenario_name: &str) -> PathBuf {
    dir.join(format!("{}.{CACHE_EXTENSION}", normalize_name(scenario_name)))
}

/// Result of looking at a cache file
enum Probe {
    Missing,
    Stale(String),
    Fresh(PatternBuffer),
}

/// Load the scenario's buffer from `dir`, generating and storing it when the
/// file is missing or stale
pub fn load_or_generate(
    dir: &Path,
    installation: &Installation,
    scenario: &Scenario,
) -> Result<(PatternBuffer, CacheOutcome)> {
    let key = BufferKey::new(installation, scenario)?;
    let path = cache_path(dir, &scenario.name);

    let outcome = match probe(&path, &key)? {
        Probe::Fresh(buffer) => {
            info!("Loaded pattern buffer for `{}` from {}", scenario.name, path.display());
            return Ok((buffer, CacheOutcome::Loaded));
        }
        Probe::Missing => CacheOutcome::Generated,
        Probe::Stale(reason) => {
            warn!("Discarding cache {}: {reason}", path.display());
            CacheOutcome::Regenerated
        }
    };

    info!("Generating pattern buffer for `{}`", scenario.name);
    let buffer = PatternBuffer::generate(installation, scenario)?;
    store(&path, &buffer)?;
    Ok((buffer, outcome))
}

fn probe(path: &Path, key: &BufferKey) -> Result<Probe> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Probe::Missing),
        Err(source) => {
            return Err(Error::Cache {
                path: path.to_owned(),
                source,
            });
        }
    };

    let mut reader = BufReader::new(file);
    match read_key(&mut reader) {
        Ok(Some(found)) if found == *key => {}
        Ok(Some(_)) => return Ok(Probe::Stale("generated from different parameters".into())),
        Ok(None) => return Ok(Probe::Stale("not a pattern cache".into())),
        Err(e) => return Ok(Probe::Stale(e.to_string())),
    }

    match read_surfaces(&mut reader, key) {
        Ok(surfaces) => Ok(PatternBuffer::from_parts(key.clone(), surfaces)
            .map_or_else(|| Probe::Stale("surface data does not match".into()), Probe::Fresh)),
        Err(e) => Ok(Probe::Stale(e.to_string())),
    }
}

/// Read a cached buffer, `None` if it is missing, stale or corrupt
pub fn load(path: &Path, key: &BufferKey) -> Result<Option<PatternBuffer>> {
    Ok(match probe(path, key)? {
        Probe::Fresh(buffer) => Some(buffer),
        Probe::Missing | Probe::Stale(_) => None,
    })
}

/// Write a buffer to `path`
///
/// Data goes to a sibling temporary file first, which is then renamed over
/// the target.
pub fn store(path: &Path, buffer: &PatternBuffer) -> Result<()> {
    let cache_error = |source| Error::Cache {
        path: path.to_owned(),
        source,
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(cache_error)?;
    }

    let tmp = path.with_extension(format!("{CACHE_EXTENSION}.tmp"));
    let written = File::create(&tmp).and_then(|file| {
        let mut writer = BufWriter::new(file);
        write_buffer(&mut writer, buffer)?;
        writer.flush()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(cache_error(e));
    }

    fs::rename(&tmp, path).map_err(cache_error)
}

fn to_u32(value: usize) -> io::Result<u32> {
    u32::try_from(value).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "dimension too large"))
}

fn write_buffer<W: Write>(writer: &mut W, buffer: &PatternBuffer) -> io::Result<()> {
    let key = buffer.key();

    writer.write_all(MAGIC)?;
    writer.write_u16::<LittleEndian>(FORMAT_VERSION)?;
    writer.write_u8(key.pattern.as_raw())?;
    writer.write_all(&[key.color.r, key.color.g, key.color.b])?;
    writer.write_f32::<LittleEndian>(key.brightness_scale)?;
    writer.write_u32::<LittleEndian>(to_u32(key.timesteps_per_cycle)?)?;
    writer.write_u32::<LittleEndian>(to_u32(key.timesteps)?)?;
    writer.write_u32::<LittleEndian>(to_u32(key.range_top_border_row)?)?;
    writer.write_u32::<LittleEndian>(to_u32(key.shapes.len())?)?;
    for &(rows, cols) in &key.shapes {
        writer.write_u32::<LittleEndian>(to_u32(rows)?)?;
        writer.write_u32::<LittleEndian>(to_u32(cols)?)?;
    }

    for surface in buffer.surfaces() {
        for &color in surface.data() {
            writer.write_u32::<LittleEndian>(color)?;
        }
    }
    Ok(())
}

/// Decode the header, `None` if the magic or version is wrong
fn read_key<R: Read>(reader: &mut R) -> io::Result<Option<BufferKey>> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC || reader.read_u16::<LittleEndian>()? != FORMAT_VERSION {
        return Ok(None);
    }

    let Some(pattern) = PatternId::from_raw(reader.read_u8()?) else {
        return Ok(None);
    };
    let mut rgb = [0u8; 3];
    reader.read_exact(&mut rgb)?;
    let brightness_scale = reader.read_f32::<LittleEndian>()?;
    let timesteps_per_cycle = reader.read_u32::<LittleEndian>()? as usize;
    let timesteps = reader.read_u32::<LittleEndian>()? as usize;
    let range_top_border_row = reader.read_u32::<LittleEndian>()? as usize;

    let count = reader.read_u32::<LittleEndian>()?;
    let mut shapes = Vec::new();
    for _ in 0..count {
        let rows = reader.read_u32::<LittleEndian>()? as usize;
        let cols = reader.read_u32::<LittleEndian>()? as usize;
        shapes.push((rows, cols));
    }

    Ok(Some(BufferKey {
        pattern,
        color: Rgb::new(rgb[0], rgb[1], rgb[2]),
        brightness_scale,
        timesteps_per_cycle,
        timesteps,
        range_top_border_row,
        shapes,
    }))
}

fn read_surfaces<R: Read>(reader: &mut R, key: &BufferKey) -> io::Result<Vec<SurfaceFrames>> {
    let mut surfaces = Vec::with_capacity(key.shapes.len());
    for &(rows, cols) in &key.shapes {
        let mut data = vec![0u32; key.surface_len(rows, cols)];
        reader.read_u32_into::<LittleEndian>(&mut data)?;
        let frames = SurfaceFrames::from_raw(rows, cols, key.timesteps, data)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "surface length mismatch"))?;
        surfaces.push(frames);
    }

    let mut trailing = [0u8; 1];
    if reader.read(&mut trailing)? != 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "trailing bytes"));
    }
    Ok(surfaces)
}
