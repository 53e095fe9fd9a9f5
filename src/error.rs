use std::io;
use thiserror::Error;

/// Broad class of a failure, used by the UI to decide how loudly to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed persisted data; the import is rejected.
    Validation,
    /// Fewer nails than a pattern needs.
    NotEnoughData,
    /// A click that hit nothing; ignored silently.
    NoTarget,
    /// Missing or unreadable files.
    Resource,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("no background image is loaded")]
    NoImage,
    #[error("({x}, {y}) is not on the image")]
    OutOfBounds { x: i32, y: i32 },
    #[error("there are no nails")]
    NoNails,
    #[error("closest nail is {distance:.2}px away")]
    OutsideSafeZone { distance: f32 },
}

impl EditError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::NoTarget
    }
}

#[derive(Error, Debug)]
pub enum PlacementError {
    #[error("Invalid placement data: {0}")]
    Load(String),
    #[error("Need at least {required} nail positions, found {found}")]
    NotEnoughPoints { required: usize, found: usize },
    #[error("No background image to attach the nails to")]
    NoBackground,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("PNG error: {0}")]
    Png(String),
}

impl PlacementError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlacementError::Load(_) | PlacementError::Json(_) => ErrorKind::Validation,
            PlacementError::NotEnoughPoints { .. } => ErrorKind::NotEnoughData,
            PlacementError::NoBackground
            | PlacementError::Io(_)
            | PlacementError::Image(_)
            | PlacementError::Png(_) => ErrorKind::Resource,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CropError {
    #[error("Nothing to crop: {found} nail(s) cannot enclose an area")]
    NothingToCrop { found: usize },
    #[error("No background image to crop")]
    NoBackground,
}

impl CropError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CropError::NothingToCrop { .. } => ErrorKind::NotEnoughData,
            CropError::NoBackground => ErrorKind::Resource,
        }
    }
}
