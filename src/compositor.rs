//! Vertical stitching of bitmaps into one long image.
//!
//! Inputs are downsampled so no side exceeds [`MAX_DIMENSION`], normalized to a
//! common width and stacked top to bottom on a white canvas. The canvas never
//! exceeds `MAX_DIMENSION` in width nor `MAX_ASPECT` times its width in height;
//! when the stack is taller, every image is compressed by the same ratio.

use std::borrow::Cow;

use clap::ValueEnum;
use image::imageops::{self, FilterType};
use log::{debug, info};
use serde::Deserialize;

use crate::{
    error::Result,
    layout::{downsampled_dims, LayoutPlan},
    raster::{Canvas, BYTES_PER_PIXEL},
    Bitmap,
};

pub use crate::layout::{MAX_ASPECT, MAX_DIMENSION};

/// Estimates above this are considered unsafe to composite.
pub const MEMORY_LIMIT: u64 = 500 * 1024 * 1024;

/// Resampling filter used whenever an image is resized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter{
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos,
}

impl From<Filter> for FilterType{
    fn from(filter: Filter) -> Self{
        match filter {
            Filter::Nearest => FilterType::Nearest,
            Filter::Triangle => FilterType::Triangle,
            Filter::CatmullRom => FilterType::CatmullRom,
            Filter::Gaussian => FilterType::Gaussian,
            Filter::Lanczos => FilterType::Lanczos3,
        }
    }
}

/// Decoded RGBA bytes needed to hold rasters of the given sizes.
pub fn estimate_memory_for(dims: &[(u32, u32)]) -> u64{
    dims.iter()
        .map(|&(w, h)| (w as u64 * h as u64).saturating_mul(BYTES_PER_PIXEL))
        .fold(0, u64::saturating_add)
}

/// Decoded RGBA bytes held by `images`.
///
/// Bitmaps carry density 1 (see [`crate::source`]), so this is simply four bytes
/// per pixel.
pub fn estimate_memory(images: &[Bitmap]) -> u64{
    estimate_memory_for(&dims_of(images))
}

pub fn within_memory_limit(bytes: u64) -> bool{
    bytes < MEMORY_LIMIT
}

/// Admission check callers run before [`Compositor::composite`]. The
/// compositor does not enforce it.
pub fn can_safely_composite(images: &[Bitmap]) -> bool{
    within_memory_limit(estimate_memory(images))
}

fn dims_of(images: &[Bitmap]) -> Vec<(u32, u32)>{
    images.iter().map(|i| i.dimensions()).collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Compositor{
    filter: Filter,
}

impl Compositor{
    pub fn new(filter: Filter) -> Self{
        Self{ filter }
    }

    /// Shrinks `image` so its longest side is at most [`MAX_DIMENSION`],
    /// preserving aspect ratio. Images already small enough are borrowed as-is.
    pub fn downsample_if_needed<'a>(&self, image: &'a Bitmap) -> Cow<'a, Bitmap>{
        let (w, h) = image.dimensions();
        let (nw, nh) = downsampled_dims(w, h);
        if (nw, nh) == (w, h) {
            return Cow::Borrowed(image);
        }
        debug!("downsampling {w}x{h} to {nw}x{nh}");
        Cow::Owned(imageops::resize(image, nw, nh, self.filter.into()))
    }

    /// Geometry `composite` would use for `images`, without touching pixels.
    pub fn plan(&self, images: &[Bitmap], target_width: Option<u32>) -> Result<LayoutPlan>{
        let dims: Vec<(u32, u32)> = images
            .iter()
            .map(|i| {
                let (w, h) = i.dimensions();
                downsampled_dims(w, h)
            })
            .collect();
        LayoutPlan::new(&dims, target_width)
    }

    /// Stacks `images` top to bottom into one opaque bitmap.
    ///
    /// `target_width` defaults to the widest (downsampled) input. Fails on an
    /// empty list, a zero width, an empty stack, or when the canvas cannot be
    /// allocated.
    pub fn composite(&self, images: &[Bitmap], target_width: Option<u32>) -> Result<Bitmap>{
        let sources: Vec<Cow<'_, Bitmap>> =
            images.iter().map(|i| self.downsample_if_needed(i)).collect();
        let dims: Vec<(u32, u32)> = sources.iter().map(|s| s.dimensions()).collect();
        let plan = LayoutPlan::new(&dims, target_width)?;

        let mut canvas = Canvas::white(plan.width, plan.height)?;
        for seg in &plan.segments {
            if !seg.is_drawn() {
                debug!("image {} is off-canvas, skipped", seg.index);
                continue;
            }
            let src = &sources[seg.index];
            debug!(
                "image {} ({}x{}) -> rows {}..{}",
                seg.index,
                src.width(),
                src.height(),
                seg.top,
                seg.top + seg.rows,
            );
            let fitted = if src.dimensions() == (plan.width, seg.rows) {
                Cow::Borrowed(&**src)
            } else {
                Cow::Owned(imageops::resize(&**src, plan.width, seg.rows, self.filter.into()))
            };
            canvas.blit(&fitted, 0, seg.top as i64);
        }

        info!(
            "composited {} images into {}x{}",
            images.len(),
            canvas.width(),
            canvas.height()
        );
        Ok(canvas.into_image())
    }
}
