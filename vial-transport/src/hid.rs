//! hidapi backed raw HID transport

use std::ffi::CString;
use std::time::Duration;

use async_trait::async_trait;
use hidapi::{HidApi, HidDevice};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::TransportError;
use crate::protocol::{frame_name, MSG_LEN, REPORT_ID};
use crate::types::TransportDeviceInfo;
use crate::Transport;

/// The report id counts towards the bytes hidapi must accept
fn ensure_full_write(written: usize, expected: usize) -> Result<(), TransportError> {
    if written < expected {
        return Err(TransportError::Write(format!(
            "short write: {} of {} bytes",
            written, expected
        )));
    }
    Ok(())
}

/// Raw HID transport for the VIA interface
///
/// The device is opened lazily by [`Transport::open`] so a handle can be
/// created from discovery results without touching the hardware.
pub struct HidTransport {
    device: Mutex<Option<HidDevice>>,
    info: TransportDeviceInfo,
}

impl HidTransport {
    /// Create an unopened transport for the interface described by `info`
    pub fn new(info: TransportDeviceInfo) -> Self {
        Self {
            device: Mutex::new(None),
            info,
        }
    }

    fn open_device(&self) -> Result<HidDevice, TransportError> {
        let api = HidApi::new().map_err(|e| TransportError::Connection(e.to_string()))?;
        let path = CString::new(self.info.device_path.as_str())
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        api.open_path(&path).map_err(|e| match TransportError::from(e) {
            TransportError::HidPermissionDenied(msg) => TransportError::HidPermissionDenied(msg),
            other => TransportError::Connection(other.to_string()),
        })
    }
}

#[async_trait]
impl Transport for HidTransport {
    async fn open(&self) -> Result<(), TransportError> {
        let mut device = self.device.lock();
        if device.is_none() {
            debug!("Opening {}", self.info.device_path);
            *device = Some(self.open_device()?);
        }
        Ok(())
    }

    async fn write_frame(&self, frame: &[u8; MSG_LEN]) -> Result<(), TransportError> {
        let guard = self.device.lock();
        let device = guard.as_ref().ok_or(TransportError::Disconnected)?;

        let mut buf = [0u8; MSG_LEN + 1];
        buf[0] = REPORT_ID;
        buf[1..].copy_from_slice(frame);
        debug!("Sending {}: {:02X?}", frame_name(frame), &frame[..8]);

        let written = device
            .write(&buf)
            .map_err(|e| TransportError::Write(e.to_string()))?;
        ensure_full_write(written, buf.len())
    }

    async fn read_frame(&self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        let guard = self.device.lock();
        let device = guard.as_ref().ok_or(TransportError::Disconnected)?;

        let mut buf = vec![0u8; MSG_LEN];
        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        let n = device.read_timeout(&mut buf, timeout_ms)?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        debug!("Received {} bytes: {:02X?}", n, &buf[..n.min(8)]);
        Ok(Some(buf))
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    async fn is_connected(&self) -> bool {
        self.device.lock().is_some()
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.device.lock().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_must_include_report_id_byte() {
        assert!(ensure_full_write(MSG_LEN + 1, MSG_LEN + 1).is_ok());
        let err = ensure_full_write(MSG_LEN, MSG_LEN + 1).unwrap_err();
        assert!(matches!(err, TransportError::Write(msg) if msg == "short write: 32 of 33 bytes"));
    }
}
