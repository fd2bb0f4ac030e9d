//! Stitch photos into one vertical long image.
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use longimg::{compositor::Compositor, source};
//! # fn main() -> longimg::error::Result<()> {
//! let paths = vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")];
//! let images = source::load_all(&paths)?;
//! if longimg::compositor::can_safely_composite(&images) {
//!     let long = Compositor::default().composite(&images, None)?;
//!     source::save(&long, Path::new("long.png"))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod compositor;
pub mod config;
pub mod error;
pub mod layout;
pub mod raster;
pub mod source;
pub mod timer;
#[cfg(feature = "preview")]
pub mod window;

/// Row-major RGBA8 raster at density 1.
pub type Bitmap = image::RgbaImage;

pub use compositor::{can_safely_composite, estimate_memory, Compositor, Filter};
pub use error::{Error, Result};
