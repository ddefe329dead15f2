//! Lookup tables consumed by the decoder

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::builtin;

#[derive(Error, Debug)]
pub enum KeycodeTableError {
    #[error("Failed to read keycode file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid keycode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid keycode key '{0}' (expected decimal or 0x-prefixed hex)")]
    InvalidCode(String),
}

/// One entry of a keycode table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeycodeEntry {
    pub label: String,
    #[serde(default)]
    pub printable: Option<String>,
    #[serde(default)]
    pub tooltip: Option<String>,
}

impl KeycodeEntry {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            printable: None,
            tooltip: None,
        }
    }
}

/// Raw code → label table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeycodeTable {
    entries: HashMap<u16, KeycodeEntry>,
}

fn parse_code(key: &str) -> Result<u16, KeycodeTableError> {
    super::parse_code(key).ok_or_else(|| KeycodeTableError::InvalidCode(key.to_string()))
}

impl KeycodeTable {
    /// Table covering the QMK basic range
    pub fn builtin() -> Self {
        builtin::BASIC
            .iter()
            .map(|&(code, label)| (code, KeycodeEntry::new(label)))
            .collect()
    }

    /// Parse a keycode export: `{"<code>": {"label": ..., "printable": ..., "tooltip": ...}}`
    pub fn from_json_str(json: &str) -> Result<Self, KeycodeTableError> {
        let raw: HashMap<String, KeycodeEntry> = serde_json::from_str(json)?;
        raw.into_iter()
            .map(|(key, entry)| Ok((parse_code(&key)?, entry)))
            .collect::<Result<HashMap<_, _>, _>>()
            .map(|entries| Self { entries })
    }

    /// Load a keycode export from disk
    pub fn load(path: &Path) -> Result<Self, KeycodeTableError> {
        let json = std::fs::read_to_string(path).map_err(|source| KeycodeTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_json_str(&json)?;
        debug!("Loaded {} keycodes from {}", table.len(), path.display());
        Ok(table)
    }

    /// Overlay `other` on top of this table; its entries win
    pub fn merged(mut self, other: KeycodeTable) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn get(&self, code: u16) -> Option<&KeycodeEntry> {
        self.entries.get(&code)
    }

    pub fn contains(&self, code: u16) -> bool {
        self.entries.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(u16, KeycodeEntry)> for KeycodeTable {
    fn from_iter<I: IntoIterator<Item = (u16, KeycodeEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Everything the decoder looks up, passed explicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderTables {
    pub keycodes: KeycodeTable,
    pub shifted: HashMap<char, char>,
    pub lighting: HashMap<u16, String>,
    pub rgb: Vec<String>,
}

impl Default for DecoderTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DecoderTables {
    pub fn builtin() -> Self {
        Self::with_keycodes(KeycodeTable::builtin())
    }

    /// Built-in symbol, lighting and RGB tables around a custom keycode table
    pub fn with_keycodes(keycodes: KeycodeTable) -> Self {
        Self {
            keycodes,
            shifted: builtin::SHIFTED.iter().copied().collect(),
            lighting: builtin::LIGHTING_OVERRIDES
                .iter()
                .map(|&(code, label)| (code, label.to_string()))
                .collect(),
            rgb: builtin::RGB_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Table label, stacked over its shifted symbol when it is a single
    /// character with a shifted form (`"1"` → `"!\n1"`)
    pub fn rich_label(&self, code: u16) -> Option<String> {
        let label = &self.keycodes.get(code)?.label;
        let mut chars = label.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(shifted) = self.shifted.get(&c) {
                return Some(format!("{}\n{}", shifted, c));
            }
        }
        Some(label.clone())
    }
}
