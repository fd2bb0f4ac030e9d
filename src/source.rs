//! Loading photos into bitmaps and writing the finished long image.
//!
//! Decoded files are plain pixel rasters, so every bitmap produced here has
//! density 1: whatever scale a photo was captured at is already part of its
//! width and height.

use std::path::{Path, PathBuf};

use image::{buffer::ConvertBuffer, DynamicImage, ImageDecoder, ImageReader, RgbImage};
use log::debug;

use crate::{
    error::{Error, Result},
    Bitmap,
};

fn load_err(path: &Path, reason: impl ToString) -> Error{
    Error::Load{ path: path.to_path_buf(), reason: reason.to_string() }
}

/// Decodes `path` and applies its EXIF orientation.
pub fn load(path: &Path) -> Result<Bitmap>{
    let mut decoder = ImageReader::open(path)
        .map_err(|e| load_err(path, e))?
        .with_guessed_format()
        .map_err(|e| load_err(path, e))?
        .into_decoder()
        .map_err(|e| load_err(path, e))?;
    let orientation = decoder.orientation().map_err(|e| load_err(path, e))?;
    let mut img = DynamicImage::from_decoder(decoder).map_err(|e| load_err(path, e))?;
    img.apply_orientation(orientation);
    debug!("{}: {}x{}, {:?}", path.display(), img.width(), img.height(), orientation);
    Ok(img.into_rgba8())
}

/// Loads every path in order, stopping at the first one that fails.
pub fn load_all(paths: &[PathBuf]) -> Result<Vec<Bitmap>>{
    paths.iter().map(|p| load(p)).collect()
}

/// Writes `bitmap` to `path`; the extension picks the format. The
/// alpha channel is dropped first.
pub fn save(bitmap: &Bitmap, path: &Path) -> Result<()>{
    let flat: RgbImage = bitmap.convert();
    flat.save(path)
        .map_err(|e| Error::Save{ path: path.to_path_buf(), reason: e.to_string() })
}
