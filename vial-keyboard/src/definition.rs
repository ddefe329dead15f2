//! Keyboard definition (the Vial-embedded `vial.json`)
//!
//! The firmware stores the definition XZ-compressed. Only the matrix size and
//! the KLE layout rows are interpreted here; everything else is kept verbatim
//! in [`Definition::extra`].

use std::io::Cursor;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::DefinitionError;

/// XZ stream magic
pub const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];

/// Switch matrix dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Matrix {
    pub rows: u8,
    pub cols: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Layouts {
    /// KLE rows; kept as JSON since rows mix strings and property objects
    #[serde(default)]
    pub keymap: Vec<Value>,
    /// Layout option labels (VIA `layouts.labels`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Definition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Matrix>,
    #[serde(default)]
    pub layouts: Layouts,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Definition {
    /// Parse a definition from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a payload as fetched from the keyboard
    pub fn decode(payload: &[u8]) -> Result<Self, DefinitionError> {
        Self::from_json_str(&decompress(payload)?)
    }

    /// Load a saved definition: plain JSON or the raw XZ payload
    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let bytes = std::fs::read(path)?;
        if bytes.starts_with(&XZ_MAGIC) {
            Self::decode(&bytes)
        } else {
            Self::from_json_str(&String::from_utf8(bytes)?)
        }
    }

    pub fn rows(&self) -> Option<u8> {
        self.matrix.map(|m| m.rows)
    }

    pub fn cols(&self) -> Option<u8> {
        self.matrix.map(|m| m.cols)
    }

    /// Display name, falling back to `"keyboard"`
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("keyboard")
    }
}

/// Decompress a definition payload into JSON text
///
/// An empty payload skips decompression and yields empty text, which the
/// JSON stage then rejects.
pub fn decompress(payload: &[u8]) -> Result<String, DefinitionError> {
    if payload.is_empty() {
        return Ok(String::new());
    }
    if !payload.starts_with(&XZ_MAGIC) {
        return Err(DefinitionError::UnknownContainer {
            magic: payload[..payload.len().min(XZ_MAGIC.len())].to_vec(),
        });
    }

    let mut out = Vec::new();
    lzma_rs::xz_decompress(&mut Cursor::new(payload), &mut out)
        .map_err(|e| DefinitionError::Decompress(e.to_string()))?;
    debug!("Decompressed definition: {} -> {} bytes", payload.len(), out.len());
    Ok(String::from_utf8(out)?)
}
