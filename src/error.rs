use thiserror::Error;

/// Errors surfaced by the display and the catalog
#[derive(Error, Debug)]
pub enum Error {
    /// A catalog operation was attempted without an open connection
    #[error("catalog is not connected")]
    NotConnected,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
