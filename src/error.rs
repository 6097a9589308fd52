use simple_error::SimpleError;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Refusing to extract {0} outside of the destination directory")]
    ZipSlip(String),

    #[error("Unsupported archive format: {0}")]
    UnsupportedArchive(String),

    #[error("ROMSet {0} has no ROMs")]
    EmptyRomSet(String),

    #[error("All files in ROMSet are missing: {}", .0.join(", "))]
    AllFilesMissing(Vec<String>),

    #[error("No games provided for bundling")]
    NoGamesProvided,

    #[error("No games have available ROMs")]
    NoAvailableRoms,

    #[error("All game files are missing: {}", .0.join(", "))]
    AllGamesMissing(Vec<String>),

    #[error("Invalid merge: {0}")]
    InvalidMerge(String),

    #[error(transparent)]
    Simple(#[from] SimpleError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
