//! Transport abstraction layer for Vial keyboard communication
//!
//! Keyboards speaking the VIA/Vial protocol expose a vendor raw HID
//! interface (usage page `0xFF60`, usage `0x61`) exchanging fixed 32-byte
//! frames. This crate provides:
//!
//! - [`Transport`]: raw frame I/O implemented by backends ([`HidTransport`])
//! - [`HidDiscovery`]: enumeration of raw HID interfaces
//! - [`Session`]: request/response correlation with at most one request in
//!   flight, deadlines and stale-frame handling
//! - [`command`]: typed command builders and response parsers

pub mod command;
pub mod error;
pub mod protocol;
pub mod types;

mod discovery;
mod hid;
mod session;

pub use command::{
    DefinitionBlock, DefinitionSizeResponse, GetDefinitionBlock, GetDefinitionSize,
    GetKeyboardId, GetKeymapBuffer, GetLayerCount, GetProtocolVersion, HidCommand, HidResponse,
    KeyboardIdResponse, KeymapChunk, LayerCountResponse, ParseError, ProtocolVersionResponse,
};
pub use discovery::{DeviceDiscovery, HidDiscovery};
pub use error::TransportError;
pub use hid::HidTransport;
pub use protocol::MSG_LEN;
pub use session::Session;
pub use types::{DiscoveredDevice, TransportDeviceInfo};

use std::time::Duration;

use async_trait::async_trait;

/// The core transport trait - all backends implement this
///
/// Backends only move whole frames; correlation of requests and responses
/// lives in [`Session`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the underlying channel. Calling this on an open transport is a no-op.
    async fn open(&self) -> Result<(), TransportError>;

    /// Write one full frame
    async fn write_frame(&self, frame: &[u8; MSG_LEN]) -> Result<(), TransportError>;

    /// Read the next inbound frame
    ///
    /// # Arguments
    /// * `timeout` - How long to wait; `Duration::ZERO` polls without blocking
    ///
    /// # Returns
    /// `None` if nothing arrived in time, `Some(frame)` otherwise
    async fn read_frame(&self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError>;

    /// Get device information
    fn device_info(&self) -> &TransportDeviceInfo;

    /// Check if the channel is open
    async fn is_connected(&self) -> bool;

    /// Close the transport
    async fn close(&self) -> Result<(), TransportError>;
}
