//! Protocol constants and utilities for VIA/Vial raw HID communication

use crate::error::TransportError;

/// Size of every outbound and inbound raw HID frame (excluding report ID)
pub const MSG_LEN: usize = 32;

/// Report ID prepended on write; the raw HID interface has no numbered reports
pub const REPORT_ID: u8 = 0x00;

/// Maximum payload bytes requested per keymap buffer chunk
pub const BUFFER_FETCH_CHUNK: u8 = 28;

/// Keymap buffer responses echo `cmd, offset_hi, offset_lo, size` before the payload
pub const KEYMAP_RESPONSE_HEADER: usize = 4;

/// VIA commands (first byte of a frame)
pub mod cmd {
    pub const GET_PROTOCOL_VERSION: u8 = 0x01;
    pub const GET_LAYER_COUNT: u8 = 0x11;
    pub const KEYMAP_GET_BUFFER: u8 = 0x12;
    /// Prefix byte for Vial extension commands; the second byte is a [`super::vial`] command
    pub const VIAL_PREFIX: u8 = 0xFE;

    /// Get command name for debugging
    pub fn name(cmd: u8) -> &'static str {
        match cmd {
            GET_PROTOCOL_VERSION => "GET_PROTOCOL_VERSION",
            GET_LAYER_COUNT => "GET_LAYER_COUNT",
            KEYMAP_GET_BUFFER => "KEYMAP_GET_BUFFER",
            VIAL_PREFIX => "VIAL",
            _ => "UNKNOWN",
        }
    }
}

/// Vial extension commands (second byte after [`cmd::VIAL_PREFIX`])
pub mod vial {
    pub const GET_KEYBOARD_ID: u8 = 0x00;
    pub const GET_SIZE: u8 = 0x01;
    pub const GET_DEFINITION: u8 = 0x02;

    /// Get Vial sub-command name for debugging
    pub fn name(subcmd: u8) -> &'static str {
        match subcmd {
            GET_KEYBOARD_ID => "GET_KEYBOARD_ID",
            GET_SIZE => "GET_SIZE",
            GET_DEFINITION => "GET_DEFINITION",
            _ => "UNKNOWN",
        }
    }
}

/// Raw HID interface identification
pub mod device {
    /// Vendor-defined usage page of the VIA raw HID interface
    pub const USAGE_PAGE: u16 = 0xFF60;
    /// Usage of the VIA raw HID interface
    pub const USAGE: u16 = 0x61;
}

pub mod timing {
    /// Default per-request response deadline (ms)
    pub const DEFAULT_TIMEOUT_MS: u64 = 1000;
    /// Upper bound on late frames drained before a request is written
    pub const MAX_STALE_FRAMES: usize = 16;
    /// Pending requests the session worker accepts before callers wait
    pub const REQUEST_QUEUE_SIZE: usize = 1;
}

/// Human readable name of a frame, looking through the Vial prefix
pub fn frame_name(frame: &[u8]) -> &'static str {
    match frame {
        [cmd::VIAL_PREFIX, sub, ..] => vial::name(*sub),
        [c, ..] => cmd::name(*c),
        [] => "EMPTY",
    }
}

/// Right-pad `data` with zeros to a full frame
///
/// Payloads longer than [`MSG_LEN`] are rejected instead of truncated.
pub fn build_frame(data: &[u8]) -> Result<[u8; MSG_LEN], TransportError> {
    if data.len() > MSG_LEN {
        return Err(TransportError::FrameTooLong {
            len: data.len(),
            max: MSG_LEN,
        });
    }
    let mut frame = [0u8; MSG_LEN];
    frame[..data.len()].copy_from_slice(data);
    Ok(frame)
}
