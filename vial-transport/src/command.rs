//! Type-safe VIA/Vial command builders and response parsers
//!
//! Byte ordering is a protocol quirk worth isolating: VIA fields are
//! big-endian while the Vial extension uses little-endian. The wire layouts
//! below encode that once so callers only see host integers.

use std::fmt;

use zerocopy::byteorder::{big_endian, little_endian};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::TransportError;
use crate::protocol::{self, cmd, vial, KEYMAP_RESPONSE_HEADER, MSG_LEN};

// =============================================================================
// Core Traits
// =============================================================================

/// A command that can be serialized into a raw HID frame
pub trait HidCommand: Sized {
    /// Leading bytes identifying the command (`[cmd]` or `[0xFE, sub]`)
    const HEADER: &'static [u8];

    /// Serialize the argument bytes that follow the header
    fn to_data(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Build the complete zero-padded frame
    fn build(&self) -> Result<[u8; MSG_LEN], TransportError> {
        let mut buf = Self::HEADER.to_vec();
        buf.extend_from_slice(&self.to_data());
        protocol::build_frame(&buf)
    }
}

/// A response that can be parsed from an inbound frame
pub trait HidResponse: Sized {
    /// Expected command echo in byte 0; Vial responses carry no echo
    const CMD_ECHO: Option<u8>;

    /// Minimum response length required
    const MIN_LEN: usize;

    /// Parse from response bytes (starting at the first frame byte)
    fn from_data(data: &[u8]) -> Result<Self, ParseError>;

    /// Parse with validation
    fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < Self::MIN_LEN {
            return Err(ParseError::TooShort {
                expected: Self::MIN_LEN,
                got: data.len(),
            });
        }
        if let Some(echo) = Self::CMD_ECHO {
            if data[0] != echo {
                return Err(ParseError::CommandMismatch {
                    expected: echo,
                    got: data[0],
                });
            }
        }
        Self::from_data(data)
    }
}

/// Parse error for responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    TooShort { expected: usize, got: usize },
    CommandMismatch { expected: u8, got: u8 },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { expected, got } => {
                write!(
                    f,
                    "Response too short: expected {} bytes, got {}",
                    expected, got
                )
            }
            Self::CommandMismatch { expected, got } => {
                write!(
                    f,
                    "Command mismatch: expected 0x{:02X}, got 0x{:02X}",
                    expected, got
                )
            }
        }
    }
}

impl std::error::Error for ParseError {}

fn too_short(expected: usize, got: usize) -> ParseError {
    ParseError::TooShort { expected, got }
}

// =============================================================================
// Wire layouts
// =============================================================================

/// `0x01` response body: protocol version at offset 1
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct ProtocolVersionData {
    _echo: u8,
    version: big_endian::U16,
}

/// `0xFE 0x00` response body
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct KeyboardIdData {
    vial_protocol: little_endian::U32,
    keyboard_id: little_endian::U64,
}

/// `0xFE 0x02` request arguments
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct DefinitionBlockArgs {
    block: little_endian::U32,
}

/// `0x12` request arguments, echoed back ahead of the payload
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct KeymapBufferArgs {
    offset: big_endian::U16,
    size: u8,
}

// =============================================================================
// VIA: protocol version
// =============================================================================

/// Query the VIA protocol version (`0x01`)
#[derive(Debug, Clone, Copy, Default)]
pub struct GetProtocolVersion;

impl HidCommand for GetProtocolVersion {
    const HEADER: &'static [u8] = &[cmd::GET_PROTOCOL_VERSION];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersionResponse {
    pub version: u16,
}

impl HidResponse for ProtocolVersionResponse {
    const CMD_ECHO: Option<u8> = Some(cmd::GET_PROTOCOL_VERSION);
    const MIN_LEN: usize = 3;

    fn from_data(data: &[u8]) -> Result<Self, ParseError> {
        let (raw, _) = ProtocolVersionData::read_from_prefix(data)
            .map_err(|_| too_short(Self::MIN_LEN, data.len()))?;
        Ok(Self {
            version: raw.version.get(),
        })
    }
}

// =============================================================================
// Vial: keyboard id
// =============================================================================

/// Query the Vial protocol version and 64-bit keyboard id (`0xFE 0x00`)
#[derive(Debug, Clone, Copy, Default)]
pub struct GetKeyboardId;

impl HidCommand for GetKeyboardId {
    const HEADER: &'static [u8] = &[cmd::VIAL_PREFIX, vial::GET_KEYBOARD_ID];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardIdResponse {
    pub vial_protocol: u32,
    pub keyboard_id: u64,
}

impl HidResponse for KeyboardIdResponse {
    const CMD_ECHO: Option<u8> = None;
    const MIN_LEN: usize = 12;

    fn from_data(data: &[u8]) -> Result<Self, ParseError> {
        let (raw, _) = KeyboardIdData::read_from_prefix(data)
            .map_err(|_| too_short(Self::MIN_LEN, data.len()))?;
        Ok(Self {
            vial_protocol: raw.vial_protocol.get(),
            keyboard_id: raw.keyboard_id.get(),
        })
    }
}

// =============================================================================
// Vial: definition size and blocks
// =============================================================================

/// Query the compressed definition size in bytes (`0xFE 0x01`)
#[derive(Debug, Clone, Copy, Default)]
pub struct GetDefinitionSize;

impl HidCommand for GetDefinitionSize {
    const HEADER: &'static [u8] = &[cmd::VIAL_PREFIX, vial::GET_SIZE];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefinitionSizeResponse {
    pub size: u32,
}

impl HidResponse for DefinitionSizeResponse {
    const CMD_ECHO: Option<u8> = None;
    const MIN_LEN: usize = 4;

    fn from_data(data: &[u8]) -> Result<Self, ParseError> {
        let (size, _) = little_endian::U32::read_from_prefix(data)
            .map_err(|_| too_short(Self::MIN_LEN, data.len()))?;
        Ok(Self { size: size.get() })
    }
}

/// Fetch one 32-byte block of the compressed definition (`0xFE 0x02 <block>`)
#[derive(Debug, Clone, Copy)]
pub struct GetDefinitionBlock {
    pub block: u32,
}

impl HidCommand for GetDefinitionBlock {
    const HEADER: &'static [u8] = &[cmd::VIAL_PREFIX, vial::GET_DEFINITION];

    fn to_data(&self) -> Vec<u8> {
        DefinitionBlockArgs {
            block: little_endian::U32::new(self.block),
        }
        .as_bytes()
        .to_vec()
    }
}

/// Raw definition block; the whole frame is payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionBlock {
    pub data: Vec<u8>,
}

impl HidResponse for DefinitionBlock {
    const CMD_ECHO: Option<u8> = None;
    const MIN_LEN: usize = MSG_LEN;

    fn from_data(data: &[u8]) -> Result<Self, ParseError> {
        Ok(Self {
            data: data[..MSG_LEN].to_vec(),
        })
    }
}

// =============================================================================
// VIA: layers and keymap buffer
// =============================================================================

/// Query the number of dynamic keymap layers (`0x11`)
#[derive(Debug, Clone, Copy, Default)]
pub struct GetLayerCount;

impl HidCommand for GetLayerCount {
    const HEADER: &'static [u8] = &[cmd::GET_LAYER_COUNT];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerCountResponse {
    pub count: u8,
}

impl HidResponse for LayerCountResponse {
    const CMD_ECHO: Option<u8> = Some(cmd::GET_LAYER_COUNT);
    const MIN_LEN: usize = 2;

    fn from_data(data: &[u8]) -> Result<Self, ParseError> {
        Ok(Self { count: data[1] })
    }
}

/// Fetch `size` bytes of the keymap buffer starting at `offset` (`0x12`)
#[derive(Debug, Clone, Copy)]
pub struct GetKeymapBuffer {
    pub offset: u16,
    pub size: u8,
}

impl HidCommand for GetKeymapBuffer {
    const HEADER: &'static [u8] = &[cmd::KEYMAP_GET_BUFFER];

    fn to_data(&self) -> Vec<u8> {
        KeymapBufferArgs {
            offset: big_endian::U16::new(self.offset),
            size: self.size,
        }
        .as_bytes()
        .to_vec()
    }
}

/// Keymap buffer chunk; `data` holds the bytes after the 4-byte header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapChunk {
    /// Offset echoed by the firmware
    pub offset: u16,
    pub data: Vec<u8>,
}

impl KeymapChunk {
    /// Payload trimmed to the requested length
    pub fn take(&self, size: usize) -> Result<&[u8], ParseError> {
        self.data.get(..size).ok_or(ParseError::TooShort {
            expected: KEYMAP_RESPONSE_HEADER + size,
            got: KEYMAP_RESPONSE_HEADER + self.data.len(),
        })
    }
}

impl HidResponse for KeymapChunk {
    const CMD_ECHO: Option<u8> = Some(cmd::KEYMAP_GET_BUFFER);
    const MIN_LEN: usize = KEYMAP_RESPONSE_HEADER;

    fn from_data(data: &[u8]) -> Result<Self, ParseError> {
        let args = KeymapBufferArgs::read_from_bytes(&data[1..KEYMAP_RESPONSE_HEADER])
            .map_err(|_| too_short(Self::MIN_LEN, data.len()))?;
        Ok(Self {
            offset: args.offset.get(),
            data: data[KEYMAP_RESPONSE_HEADER..].to_vec(),
        })
    }
}
