//! Protocol session state accumulated while talking to a keyboard

use serde::Serialize;

/// Values reported by the keyboard, filled in as the load sequence runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProtocolState {
    /// VIA protocol version (command `0x01`)
    pub via_protocol: u16,
    /// Vial protocol version (`0xFE 0x00`)
    pub vial_protocol: u32,
    /// 64-bit Vial keyboard id
    pub keyboard_id: u64,
    /// Dynamic keymap layers (command `0x11`)
    pub layers: u8,
    /// Matrix rows from the definition
    pub rows: Option<u8>,
    /// Matrix columns from the definition
    pub cols: Option<u8>,
}

impl ProtocolState {
    /// Matrix size once the definition is loaded
    pub fn matrix(&self) -> Option<(u8, u8)> {
        Some((self.rows?, self.cols?))
    }
}
