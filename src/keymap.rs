//! Per-key label resolution against a keymap buffer.
//!
//! Joins the positioned keys from [`crate::layout`] with the raw keymap
//! fetched from the keyboard and the decoder in [`crate::keycode`].

use std::collections::BTreeSet;

use vial_keyboard::KeymapBuffer;

use crate::keycode::{self, DecoderTables};
use crate::layout::Key;

/// Keycode under `key` on `layer`, if the key has a matrix position inside
/// the buffer. `layer` is clamped into `0..layers`.
pub fn key_code(key: &Key, buffer: &KeymapBuffer, layer: usize) -> Option<u16> {
    let (row, col) = key.matrix()?;
    buffer.keycode(buffer.clamp_layer(layer), row as usize, col as usize)
}

/// Decoded label for `key` on `layer`; empty when the key has no matrix
/// position or its offset falls outside the buffer
pub fn key_label(key: &Key, buffer: &KeymapBuffer, layer: usize, tables: &DecoderTables) -> String {
    key_code(key, buffer, layer)
        .map(|code| keycode::decode(code, tables))
        .unwrap_or_default()
}

/// Whether `key` should be drawn at all
///
/// Decals and ghosts never are. Keys without a matrix position always are.
/// Matrix keys are hidden when out of range or unassigned (`KC_NO`) on
/// layer 0.
pub fn is_visible(key: &Key, buffer: &KeymapBuffer) -> bool {
    if key.decal || key.ghost {
        return false;
    }
    let Some((row, col)) = key.matrix() else {
        return true;
    };
    matches!(buffer.keycode(0, row as usize, col as usize), Some(code) if code != 0)
}

/// Raw KLE legend, unless it is only a matrix coordinate
fn fallback_label(key: &Key) -> &str {
    let coordinate_only = key
        .label
        .chars()
        .all(|c| c.is_ascii_digit() || c == ',' || c.is_whitespace());
    if coordinate_only {
        ""
    } else {
        &key.label
    }
}

/// Text to show on `key` for `layer`
///
/// Prefers the decoded label and falls back to the raw legend. With
/// `hide_hex` set, bare `0x..` fallbacks are blanked.
pub fn display_label(
    key: &Key,
    buffer: &KeymapBuffer,
    layer: usize,
    tables: &DecoderTables,
    hide_hex: bool,
) -> String {
    let decoded = key_label(key, buffer, layer, tables);
    if decoded.is_empty() {
        return fallback_label(key).to_string();
    }
    if hide_hex && keycode::is_hex_label(&decoded) {
        return String::new();
    }
    decoded
}

/// Positions removed from the visible key sequence of a particular layout
///
/// Indices refer to the sequence *after* the visibility filter. Some boards
/// carry duplicate layout-option keys that survive it; listing them here
/// drops them from the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(BTreeSet<usize>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<usize> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Keys to emit, in layout order: visible keys minus the excluded positions
pub fn visible_keys<'a>(
    keys: &'a [Key],
    buffer: &KeymapBuffer,
    exclusions: &ExclusionSet,
) -> Vec<&'a Key> {
    keys.iter()
        .filter(|key| is_visible(key, buffer))
        .enumerate()
        .filter(|(i, _)| !exclusions.contains(*i))
        .map(|(_, key)| key)
        .collect()
}
