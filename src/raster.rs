use image::{Rgba, RgbaImage};

use crate::error::{Error, Result};

pub const BYTES_PER_PIXEL: u64 = 4;

/// Opaque row-major RGBA buffer the compositor draws into.
pub struct Canvas{
    pixels: RgbaImage,
}

impl Canvas{
    /// Allocates a white canvas, reporting allocation failure instead of aborting.
    pub fn white(width: u32, height: u32) -> Result<Self>{
        let err = || Error::Allocation{ width, height };
        let bytes = (width as u64)
            .checked_mul(height as u64)
            .and_then(|px| px.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(err)?;
        let len = usize::try_from(bytes).map_err(|_| err())?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(len).map_err(|_| err())?;
        buf.resize(len, u8::MAX);
        let pixels = RgbaImage::from_raw(width, height, buf).ok_or_else(err)?;
        Ok(Self{ pixels })
    }

    pub fn width(&self) -> u32 { self.pixels.width() }
    pub fn height(&self) -> u32 { self.pixels.height() }

    /// Draws `src` with its top-left corner at `(dst_x, dst_y)`, blending over
    /// the canvas. Parts of `src` that fall outside the canvas are clipped.
    pub fn blit(&mut self, src: &RgbaImage, dst_x: i64, dst_y: i64){
        let cw = self.width() as i64;
        let ch = self.height() as i64;
        let x0 = dst_x.max(0);
        let x1 = (dst_x + src.width() as i64).min(cw);
        if x0 >= x1 { return; }
        for sy in 0..src.height() {
            let gy = dst_y + sy as i64;
            if gy < 0 { continue; }
            if gy >= ch { break; }
            for gx in x0..x1 {
                let sx = (gx - dst_x) as u32;
                let px = src.get_pixel(sx, sy);
                let dst = self.pixels.get_pixel_mut(gx as u32, gy as u32);
                *dst = over(*px, *dst);
            }
        }
    }

    pub fn into_image(self) -> RgbaImage{
        self.pixels
    }
}

/// Source-over onto an opaque destination; the result stays opaque.
fn over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8>{
    let a = src[3] as u32;
    match a {
        255 => src,
        0 => dst,
        _ => {
            let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8;
            Rgba([mix(src[0], dst[0]), mix(src[1], dst[1]), mix(src[2], dst[2]), u8::MAX])
        },
    }
}
