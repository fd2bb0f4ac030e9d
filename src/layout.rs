//! Canvas geometry for a vertical stack.
//!
//! Everything here works on dimensions only. A [`LayoutPlan`] is fully resolved
//! (canvas size and the pixel rows of every segment) before the renderer
//! touches a single pixel.

use log::debug;

use crate::error::{Error, Result};

/// Largest side any input or the output canvas may have.
pub const MAX_DIMENSION: u32 = 4096;

/// Output height is capped at this multiple of the output width.
pub const MAX_ASPECT: u32 = 4;

/// Size of an input after `downsample_if_needed`.
pub fn downsampled_dims(width: u32, height: u32) -> (u32, u32){
    let longest = width.max(height);
    if longest <= MAX_DIMENSION {
        return (width, height);
    }
    let scale = MAX_DIMENSION as f64 / longest as f64;
    let fit = |side: u32| {
        if side == 0 {
            0
        } else {
            ((side as f64 * scale).round() as u32).clamp(1, MAX_DIMENSION)
        }
    };
    (fit(width), fit(height))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment{
    /// Position of the source image in the input list.
    pub index: usize,
    /// Height after normalizing to the target width.
    pub scaled_height: f64,
    /// First canvas row covered by this image.
    pub top: u32,
    /// Number of canvas rows; zero when the segment is off-canvas.
    pub rows: u32,
}

impl Segment{
    pub fn is_drawn(&self) -> bool{
        self.rows > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan{
    pub target_width: u32,
    pub total_height: f64,
    pub width_scale: f64,
    pub height_scale: f64,
    pub width: u32,
    pub height: u32,
    pub segments: Vec<Segment>,
}

impl LayoutPlan{
    /// Lays out images of the given `(width, height)` top to bottom.
    ///
    /// `target_width` defaults to the widest input. The canvas is
    /// `min(target, MAX_DIMENSION)` wide and at most `MAX_ASPECT` times as tall;
    /// when the stack is taller than that every segment is compressed by the
    /// same ratio, so all images stay visible.
    pub fn new(dims: &[(u32, u32)], target_width: Option<u32>) -> Result<Self>{
        if dims.is_empty() {
            return Err(Error::NoImages);
        }

        let target_width = target_width
            .or_else(|| dims.iter().map(|(w, _)| *w).max())
            .unwrap_or(0);
        if target_width == 0 {
            return Err(Error::InvalidWidth);
        }
        let target = target_width as f64;

        let scaled: Vec<f64> = dims
            .iter()
            .map(|&(w, h)| if w == 0 { 0.0 } else { h as f64 * target / w as f64 })
            .collect();
        let total_height: f64 = scaled.iter().sum();

        let width = target_width.min(MAX_DIMENSION);
        let width_scale = width as f64 / target;
        let stacked = total_height * width_scale;
        if stacked <= 0.0 {
            return Err(Error::EmptyCanvas);
        }
        let height = (stacked.min((MAX_ASPECT * width) as f64).round() as u32).max(1);
        let final_height = height as f64;
        // Taken against the unscaled total, so when the width is capped the
        // stack ends `width_scale` of the way down and the rest stays white.
        let height_scale = final_height / total_height;

        debug!(
            "layout: target {target_width}, stacked {total_height:.1}, canvas {width}x{height}, \
             width scale {width_scale:.4}, height scale {height_scale:.4}",
        );

        let mut segments = Vec::with_capacity(scaled.len());
        let mut y_offset = 0.0;
        for (index, scaled_height) in scaled.into_iter().enumerate() {
            let draw_height = scaled_height * width_scale * height_scale;
            let (top, rows) = if y_offset >= final_height {
                (height, 0)
            } else {
                let bottom = (y_offset + draw_height.min(final_height - y_offset)).round() as u32;
                let top = (y_offset.round() as u32).min(height);
                (top, bottom.min(height).saturating_sub(top))
            };
            segments.push(Segment{ index, scaled_height, top, rows });
            y_offset += draw_height;
        }

        Ok(Self{
            target_width,
            total_height,
            width_scale,
            height_scale,
            width,
            height,
            segments,
        })
    }
}

#[cfg(test)]
mod tests{

    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_downsampled_dims(){
        assert_eq!(downsampled_dims(100, 50), (100, 50));
        assert_eq!(downsampled_dims(4096, 4096), (4096, 4096));
        assert_eq!(downsampled_dims(10000, 10000), (4096, 4096));
        assert_eq!(downsampled_dims(8192, 2048), (4096, 1024));
        assert_eq!(downsampled_dims(2000, 20000), (410, 4096));
        assert_eq!(downsampled_dims(1, 100000), (1, 4096));
    }

    #[test]
    fn test_two_images_default_width(){
        let plan = LayoutPlan::new(&[(1000, 500), (1000, 1000)], None).unwrap();
        assert_eq!(plan.target_width, 1000);
        assert_eq!(plan.total_height, 1500.0);
        assert_eq!((plan.width, plan.height), (1000, 1500));
        assert_eq!((plan.segments[0].top, plan.segments[0].rows), (0, 500));
        assert_eq!((plan.segments[1].top, plan.segments[1].rows), (500, 1000));
    }

    #[test]
    fn test_tall_stack_compressed(){
        let plan = LayoutPlan::new(&[(2000, 20000); 3], None).unwrap();
        assert_eq!(plan.total_height, 60000.0);
        assert_eq!((plan.width, plan.height), (2000, 8000));
        assert!(plan.segments.iter().all(Segment::is_drawn));
        let rows: Vec<u32> = plan.segments.iter().map(|s| s.rows).collect();
        assert_eq!(rows, vec![2667, 2666, 2667]);
        assert_eq!(rows.iter().sum::<u32>(), 8000);
    }

    #[test]
    fn test_width_cap(){
        let plan = LayoutPlan::new(&[(1000, 1000)], Some(8192)).unwrap();
        assert_eq!(plan.width, 4096);
        assert_eq!(plan.width_scale, 0.5);
        assert_eq!(plan.height, 4096);
        assert_eq!(plan.height_scale, 0.5);
        assert_eq!((plan.segments[0].top, plan.segments[0].rows), (0, 2048));
    }

    #[test]
    fn test_width_cap_two_images(){
        let plan = LayoutPlan::new(&[(1000, 500), (1000, 1500)], Some(8192)).unwrap();
        assert_eq!((plan.width, plan.height), (4096, 8192));
        assert_eq!((plan.segments[0].top, plan.segments[0].rows), (0, 1024));
        assert_eq!((plan.segments[1].top, plan.segments[1].rows), (1024, 3072));
    }

    #[test]
    fn test_mixed_widths_normalized(){
        let plan = LayoutPlan::new(&[(500, 500), (1000, 250)], None).unwrap();
        assert_eq!(plan.target_width, 1000);
        assert_eq!(plan.height, 1250);
        assert_eq!((plan.segments[0].top, plan.segments[0].rows), (0, 1000));
        assert_eq!((plan.segments[1].top, plan.segments[1].rows), (1000, 250));
    }

    #[test]
    fn test_failures(){
        assert!(matches!(LayoutPlan::new(&[], None), Err(Error::NoImages)));
        assert!(matches!(LayoutPlan::new(&[(10, 10)], Some(0)), Err(Error::InvalidWidth)));
        assert!(matches!(LayoutPlan::new(&[(0, 10)], None), Err(Error::InvalidWidth)));
        assert!(matches!(LayoutPlan::new(&[(10, 0), (20, 0)], None), Err(Error::EmptyCanvas)));
    }

    #[test]
    fn test_zero_width_input_is_empty_segment(){
        let plan = LayoutPlan::new(&[(100, 100), (0, 50)], None).unwrap();
        assert_eq!(plan.height, 100);
        assert!(!plan.segments[1].is_drawn());
    }

    fn dim_list() -> impl Strategy<Value = Vec<(u32, u32)>>{
        prop::collection::vec((1u32..20000, 1u32..20000), 1..8)
    }

    proptest! {
        #[test]
        fn canvas_width_is_capped_target(dims in dim_list(), target in prop::option::of(1u32..10000)){
            let plan = LayoutPlan::new(&dims, target).unwrap();
            let resolved = target.unwrap_or_else(|| dims.iter().map(|d| d.0).max().unwrap());
            prop_assert_eq!(plan.width, resolved.min(MAX_DIMENSION));
        }

        #[test]
        fn canvas_height_respects_aspect(dims in dim_list(), target in prop::option::of(1u32..10000)){
            let plan = LayoutPlan::new(&dims, target).unwrap();
            prop_assert!(plan.height <= MAX_ASPECT * plan.width);
        }

        #[test]
        fn segments_tile_the_canvas(dims in dim_list()){
            let plan = LayoutPlan::new(&dims, None).unwrap();
            let mut next = 0;
            for s in plan.segments.iter().filter(|s| s.is_drawn()) {
                prop_assert_eq!(s.top, next);
                next = s.top + s.rows;
            }
            prop_assert!(next <= plan.height);
            let filled = plan.height as f64 * plan.width_scale;
            prop_assert!((next as f64 - filled).abs() <= 1.0);
        }

        #[test]
        fn downsampling_is_idempotent(w in 0u32..50000, h in 0u32..50000){
            let once = downsampled_dims(w, h);
            prop_assert_eq!(downsampled_dims(once.0, once.1), once);
            prop_assert!(once.0.max(once.1) <= MAX_DIMENSION);
        }
    }
}
