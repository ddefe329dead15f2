//! Keyboard interface error types

use thiserror::Error;
use vial_transport::TransportError;

/// Errors from turning a definition payload into a [`crate::Definition`]
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// Payload is neither empty nor an XZ stream
    #[error("Unknown definition container (magic {magic:02X?})")]
    UnknownContainer { magic: Vec<u8> },

    #[error("XZ decompression failed: {0}")]
    Decompress(String),

    #[error("Definition is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Definition is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read definition file: {0}")]
    Io(#[from] std::io::Error),

    /// Keymap retrieval needs the matrix size
    #[error("Definition has no matrix size")]
    MissingMatrix,
}

/// Errors from keyboard operations
#[derive(Error, Debug)]
pub enum KeyboardError {
    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Definition could not be decoded
    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    /// Device returned unexpected response
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Keymap requested before the matrix size is known
    #[error("Matrix size unknown: load the definition first")]
    DefinitionNotLoaded,

    /// Keymap does not fit the 16-bit buffer offset
    #[error("Keymap of {size} bytes exceeds the addressable buffer")]
    KeymapTooLarge { size: usize },
}
