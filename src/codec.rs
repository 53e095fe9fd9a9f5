//! Reading and writing nail positions.
//!
//! Two on-disk forms carry the same `[[x, y, priority], ...]` array:
//! a `.placements.json` sidecar next to the image (the canonical export), and a
//! `.stringartpng` file that stores the array in a `pins` PNG text chunk
//! alongside the pixels.

use crate::config::{MIN_PLACEMENTS, PATTERN_EXTENSION, PINS_KEY, SIDECAR_SUFFIX};
use crate::error::PlacementError;
use crate::placement::{Placement, PlacementStore};
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Serialized form of a single nail.
#[derive(Debug, Serialize)]
struct PinRecord(u32, u32, u8);

/// Result of a format-detecting load.
pub enum LoadedPlacements {
    Sidecar(Vec<Placement>),
    Embedded {
        placements: Vec<Placement>,
        image: DynamicImage,
    },
}

fn ensure_enough(found: usize) -> Result<(), PlacementError> {
    if found < MIN_PLACEMENTS {
        log::warn!("Not enough placements: {} (need {})", found, MIN_PLACEMENTS);
        return Err(PlacementError::NotEnoughPoints {
            required: MIN_PLACEMENTS,
            found,
        });
    }
    Ok(())
}

fn records(store: &PlacementStore, descale_factor: f32) -> Result<Vec<PinRecord>, PlacementError> {
    ensure_enough(store.len())?;
    Ok(store
        .iter()
        .map(|p| {
            PinRecord(
                (p.x as f32 * descale_factor).round() as u32,
                (p.y as f32 * descale_factor).round() as u32,
                u8::from(p.priority),
            )
        })
        .collect())
}

/// Encodes the store as a JSON array of `[x, y, priority]`.
///
/// Coordinates are already in image space, so `descale_factor` is 1 for
/// every current caller.
pub fn export(store: &PlacementStore, descale_factor: f32) -> Result<Value, PlacementError> {
    Ok(serde_json::to_value(records(store, descale_factor)?)?)
}

pub fn export_string(store: &PlacementStore) -> Result<String, PlacementError> {
    Ok(export(store, 1.0)?.to_string())
}

fn load_error(msg: String) -> PlacementError {
    log::warn!("Error loading placements, {}", msg);
    PlacementError::Load(msg)
}

fn coordinate(value: &Value, entry: usize) -> Result<u32, PlacementError> {
    match value.as_u64() {
        Some(v) => u32::try_from(v)
            .map_err(|_| load_error(format!("entry {} has an out of range coordinate", entry))),
        None if value.is_i64() => {
            Err(load_error(format!("entry {} has a negative coordinate", entry)))
        }
        None => Err(load_error(format!("entry {} has a non-integer coordinate", entry))),
    }
}

fn priority_flag(value: &Value, entry: usize) -> Result<bool, PlacementError> {
    if let Some(flag) = value.as_bool() {
        return Ok(flag);
    }
    match value.as_i64() {
        Some(v) => Ok(v != 0),
        None if value.is_u64() => Ok(true),
        None => Err(load_error(format!("entry {} has a non-integer priority", entry))),
    }
}

/// Validates and decodes a JSON array of `[x, y, priority]` entries.
pub fn import(value: &Value) -> Result<Vec<Placement>, PlacementError> {
    let entries = value
        .as_array()
        .ok_or_else(|| load_error("data is not a list".to_string()))?;

    let mut placements = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let fields = entry
            .as_array()
            .ok_or_else(|| load_error(format!("entry {} is not a list", i)))?;
        if fields.len() != 3 {
            return Err(load_error(format!(
                "entry {} has {} values, expected 3",
                i,
                fields.len()
            )));
        }
        let x = coordinate(&fields[0], i)?;
        let y = coordinate(&fields[1], i)?;
        let priority = priority_flag(&fields[2], i)?;
        placements.push(Placement::new(x, y, priority));
    }

    ensure_enough(placements.len())?;
    Ok(placements)
}

pub fn import_str(text: &str) -> Result<Vec<Placement>, PlacementError> {
    let value: Value = serde_json::from_str(text)?;
    import(&value)
}

/// `<image-path>.placements.json`
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    let mut name = OsString::from(image_path.as_os_str());
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}

/// Inverse of [`sidecar_path`], if `path` follows the sidecar naming.
pub fn image_path_for_sidecar(path: &Path) -> Option<PathBuf> {
    path.to_str()?
        .strip_suffix(SIDECAR_SUFFIX)
        .filter(|image| !image.is_empty())
        .map(PathBuf::from)
}

pub fn pattern_path(image_path: &Path) -> PathBuf {
    image_path.with_extension(PATTERN_EXTENSION)
}

pub fn write_sidecar(path: &Path, store: &PlacementStore) -> Result<(), PlacementError> {
    let text = export_string(store)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Writes `image` as an RGBA PNG with the nails in a `pins` text chunk.
pub fn write_pattern(
    path: &Path,
    image: &DynamicImage,
    store: &PlacementStore,
) -> Result<(), PlacementError> {
    let text = export_string(store)?;
    let rgba = image.to_rgba8();

    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), rgba.width(), rgba.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder
        .add_text_chunk(PINS_KEY.to_string(), text)
        .map_err(|e| PlacementError::Png(format!("text chunk error: {}", e)))?;

    let mut writer = encoder
        .write_header()
        .map_err(|e| PlacementError::Png(format!("header write error: {}", e)))?;
    writer
        .write_image_data(rgba.as_raw())
        .map_err(|e| PlacementError::Png(format!("image write error: {}", e)))?;
    writer
        .finish()
        .map_err(|e| PlacementError::Png(format!("finish error: {}", e)))?;
    Ok(())
}

/// Looks for the `pins` text chunk in PNG bytes.
fn read_pins(bytes: &[u8]) -> Result<Option<String>, PlacementError> {
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let reader = decoder
        .read_info()
        .map_err(|e| PlacementError::Png(format!("failed to read PNG info: {}", e)))?;
    let info = reader.info();

    if let Some(chunk) = info
        .uncompressed_latin1_text
        .iter()
        .find(|c| c.keyword == PINS_KEY)
    {
        return Ok(Some(chunk.text.clone()));
    }
    if let Some(chunk) = info
        .compressed_latin1_text
        .iter()
        .find(|c| c.keyword == PINS_KEY)
    {
        return chunk
            .get_text()
            .map(Some)
            .map_err(|e| PlacementError::Png(format!("bad zTXt chunk: {}", e)));
    }
    if let Some(chunk) = info.utf8_text.iter().find(|c| c.keyword == PINS_KEY) {
        return chunk
            .get_text()
            .map(Some)
            .map_err(|e| PlacementError::Png(format!("bad iTXt chunk: {}", e)));
    }
    Ok(None)
}

/// Decodes placements from raw file contents, detecting the form from the
/// data rather than the file name.
pub fn decode(bytes: &[u8]) -> Result<LoadedPlacements, PlacementError> {
    if bytes.starts_with(&PNG_SIGNATURE) {
        let pins = read_pins(bytes)?.ok_or_else(|| {
            load_error(format!("image has no '{}' metadata", PINS_KEY))
        })?;
        let placements = import_str(&pins)?;
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        log::debug!("Detected embedded pattern with {} nails", placements.len());
        return Ok(LoadedPlacements::Embedded { placements, image });
    }

    let value: Value = serde_json::from_slice(bytes)?;
    let placements = import(&value)?;
    log::debug!("Detected sidecar with {} nails", placements.len());
    Ok(LoadedPlacements::Sidecar(placements))
}

pub fn load(path: &Path) -> Result<LoadedPlacements, PlacementError> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}
