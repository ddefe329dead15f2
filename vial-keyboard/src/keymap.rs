//! Raw dynamic keymap buffer

use std::sync::Arc;

/// Immutable snapshot of the keyboard's dynamic keymap
///
/// Layout is layer-major, then row, then column; each entry is a big-endian
/// 16-bit keycode. The bytes are shared, so clones are cheap and a reload
/// always produces a fresh buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapBuffer {
    data: Arc<[u8]>,
    layers: u8,
    rows: u8,
    cols: u8,
}

impl KeymapBuffer {
    pub fn new(data: Vec<u8>, layers: u8, rows: u8, cols: u8) -> Self {
        Self {
            data: data.into(),
            layers,
            rows,
            cols,
        }
    }

    /// Size in bytes of a full buffer for the given dimensions
    pub fn expected_len(layers: u8, rows: u8, cols: u8) -> usize {
        layers as usize * rows as usize * cols as usize * 2
    }

    /// Byte offset of the keycode at `(layer, row, col)`
    pub fn offset(&self, layer: usize, row: usize, col: usize) -> usize {
        let rows = self.rows as usize;
        let cols = self.cols as usize;
        layer * rows * cols * 2 + row * cols * 2 + col * 2
    }

    /// Keycode at `(layer, row, col)`, `None` when the offset falls outside
    /// the buffer
    ///
    /// Only the byte offset is checked, matching how the firmware addresses
    /// the buffer.
    pub fn keycode(&self, layer: usize, row: usize, col: usize) -> Option<u16> {
        let offset = self.offset(layer, row, col);
        let hi = *self.data.get(offset)?;
        let lo = *self.data.get(offset + 1)?;
        Some(u16::from_be_bytes([hi, lo]))
    }

    /// Clamp a requested layer into `0..layers`
    pub fn clamp_layer(&self, layer: usize) -> usize {
        layer.min((self.layers as usize).saturating_sub(1))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn layers(&self) -> u8 {
        self.layers
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }
}
