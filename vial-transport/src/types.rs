//! Shared transport types

use serde::Serialize;

/// Information about an opened or discoverable device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransportDeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// Platform device path (hidraw node on Linux)
    pub device_path: String,
    /// Serial number if available
    pub serial: Option<String>,
    /// Manufacturer string if available
    pub manufacturer: Option<String>,
    /// Product name if available
    pub product_name: Option<String>,
    /// HID usage page of the opened interface
    pub usage_page: u16,
    /// HID usage of the opened interface
    pub usage: u16,
}

impl TransportDeviceInfo {
    /// Short human readable description, `VID:PID name`
    pub fn describe(&self) -> String {
        format!(
            "{:04X}:{:04X} {}",
            self.vid,
            self.pid,
            self.product_name.as_deref().unwrap_or("(unnamed)")
        )
    }
}

/// A device found during discovery
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredDevice {
    /// Device information
    pub info: TransportDeviceInfo,
}
