//! Error types for compositing and the file boundary around it

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for longimg operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error{
    /// Composite was called with an empty list
    #[error("no images to composite")]
    NoImages,

    /// The resolved target width was zero
    #[error("target width must be positive")]
    InvalidWidth,

    /// Every input had zero height after width normalization
    #[error("composite would have zero height")]
    EmptyCanvas,

    /// The output canvas could not be allocated
    #[error("could not allocate a {width}x{height} canvas")]
    Allocation{ width: u32, height: u32 },

    #[error("could not load {}: {reason}", path.display())]
    Load{ path: PathBuf, reason: String },

    #[error("could not save {}: {reason}", path.display())]
    Save{ path: PathBuf, reason: String },

    #[error("invalid config {}: {reason}", path.display())]
    Config{ path: PathBuf, reason: String },
}
