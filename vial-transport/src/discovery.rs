//! Device discovery for Vial keyboards

use std::sync::Arc;

use async_trait::async_trait;
use hidapi::HidApi;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::hid::HidTransport;
use crate::protocol::device;
use crate::types::{DiscoveredDevice, TransportDeviceInfo};
use crate::Transport;

/// Device discovery abstraction
#[async_trait]
pub trait DeviceDiscovery: Send + Sync {
    /// List currently available devices
    async fn list_devices(&self) -> Result<Vec<DiscoveredDevice>, TransportError>;

    /// Create a transport for a specific device (not yet opened)
    async fn open_device(
        &self,
        device: &DiscoveredDevice,
    ) -> Result<Arc<dyn Transport>, TransportError>;
}

/// Enumerates raw HID interfaces with the VIA usage page/usage, any vendor
#[derive(Debug, Default)]
pub struct HidDiscovery;

impl HidDiscovery {
    /// Create a new HID discovery instance
    pub fn new() -> Self {
        Self
    }

    /// Check if this is the VIA raw HID interface
    fn is_raw_interface(device_info: &hidapi::DeviceInfo) -> bool {
        device_info.usage_page() == device::USAGE_PAGE && device_info.usage() == device::USAGE
    }

    /// Find a device by platform path, falling back to the first match
    pub async fn find(&self, path: Option<&str>) -> Result<DiscoveredDevice, TransportError> {
        let devices = self.list_devices().await?;
        let found = match path {
            Some(p) => devices.into_iter().find(|d| d.info.device_path == p),
            None => devices.into_iter().next(),
        };
        found.ok_or_else(|| {
            TransportError::DeviceNotFound(
                path.map(str::to_string)
                    .unwrap_or_else(|| "no Vial raw HID interface".to_string()),
            )
        })
    }
}

#[async_trait]
impl DeviceDiscovery for HidDiscovery {
    async fn list_devices(&self) -> Result<Vec<DiscoveredDevice>, TransportError> {
        let api = HidApi::new().map_err(|e| TransportError::HidError(e.to_string()))?;
        let mut devices = Vec::new();

        for device_info in api.device_list() {
            let vid = device_info.vendor_id();
            let pid = device_info.product_id();

            if !Self::is_raw_interface(device_info) {
                continue;
            }

            let path = device_info.path().to_string_lossy().to_string();
            debug!("Found device: VID={:04X} PID={:04X} path={}", vid, pid, path);

            devices.push(DiscoveredDevice {
                info: TransportDeviceInfo {
                    vid,
                    pid,
                    device_path: path,
                    serial: device_info.serial_number().map(|s| s.to_string()),
                    manufacturer: device_info.manufacturer_string().map(|s| s.to_string()),
                    product_name: device_info.product_string().map(|s| s.to_string()),
                    usage_page: device_info.usage_page(),
                    usage: device_info.usage(),
                },
            });
        }

        info!("Discovered {} raw HID interface(s)", devices.len());
        Ok(devices)
    }

    async fn open_device(
        &self,
        device: &DiscoveredDevice,
    ) -> Result<Arc<dyn Transport>, TransportError> {
        Ok(Arc::new(HidTransport::new(device.info.clone())))
    }
}
