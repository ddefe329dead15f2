//! Retrieval sequence tests against a simulated Vial device.

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use vial_keyboard::{DefinitionError, KeyboardError, VialKeyboard};
use vial_transport::{Session, Transport, TransportDeviceInfo, TransportError, MSG_LEN};

// ── Simulated device ────────────────────────────────────────────────────────

#[derive(Default)]
struct Quirks {
    /// Reply to `0x11` with a different echo byte
    bad_layer_echo: bool,
    /// Never answer keymap buffer requests
    drop_keymap: bool,
    /// Answer keymap requests with offset + 2
    shifted_keymap_offset: bool,
    /// Fail the write of any frame starting with these bytes
    fail_write: Option<&'static [u8]>,
}

struct MockVialDevice {
    info: TransportDeviceInfo,
    definition: Vec<u8>,
    layers: u8,
    keymap: Vec<u8>,
    quirks: Quirks,
    inbound: Mutex<VecDeque<Vec<u8>>>,
    requests: Mutex<Vec<Vec<u8>>>,
}

impl MockVialDevice {
    fn new(definition: Vec<u8>, layers: u8, keymap: Vec<u8>, quirks: Quirks) -> Arc<Self> {
        Arc::new(Self {
            info: TransportDeviceInfo {
                vid: 0x4653,
                pid: 0x0001,
                product_name: Some("Mock".into()),
                ..Default::default()
            },
            definition,
            layers,
            keymap,
            quirks,
            inbound: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn respond(&self, req: &[u8; MSG_LEN]) -> Option<Vec<u8>> {
        let mut resp = vec![0u8; MSG_LEN];
        match req[0] {
            0x01 => {
                resp[0] = 0x01;
                resp[1..3].copy_from_slice(&9u16.to_be_bytes());
            }
            0x11 => {
                resp[0] = if self.quirks.bad_layer_echo { 0x12 } else { 0x11 };
                resp[1] = self.layers;
            }
            0x12 => {
                if self.quirks.drop_keymap {
                    return None;
                }
                let offset = u16::from_be_bytes([req[1], req[2]]) as usize;
                let size = req[3] as usize;
                resp[..4].copy_from_slice(&req[..4]);
                if self.quirks.shifted_keymap_offset {
                    resp[1..3].copy_from_slice(&(offset as u16 + 2).to_be_bytes());
                }
                let end = (offset + size).min(self.keymap.len());
                resp[4..4 + (end - offset)].copy_from_slice(&self.keymap[offset..end]);
            }
            0xFE => match req[1] {
                0x00 => {
                    resp[..4].copy_from_slice(&6u32.to_le_bytes());
                    resp[4..12].copy_from_slice(&0x1122_3344_5566_7788u64.to_le_bytes());
                }
                0x01 => {
                    resp[..4].copy_from_slice(&(self.definition.len() as u32).to_le_bytes());
                }
                0x02 => {
                    let block = u32::from_le_bytes([req[2], req[3], req[4], req[5]]) as usize;
                    let start = (block * MSG_LEN).min(self.definition.len());
                    let end = (start + MSG_LEN).min(self.definition.len());
                    resp[..end - start].copy_from_slice(&self.definition[start..end]);
                    // trailing garbage past the payload end must be ignored
                    resp[end - start..].fill(0xAA);
                }
                _ => return None,
            },
            _ => return None,
        }
        Some(resp)
    }

    fn requests_with(&self, prefix: &[u8]) -> Vec<Vec<u8>> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for MockVialDevice {
    async fn open(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn write_frame(&self, frame: &[u8; MSG_LEN]) -> Result<(), TransportError> {
        self.requests.lock().push(frame.to_vec());
        if let Some(prefix) = self.quirks.fail_write {
            if frame.starts_with(prefix) {
                return Err(TransportError::Write("device unplugged".into()));
            }
        }
        if let Some(resp) = self.respond(frame) {
            self.inbound.lock().push_back(resp);
        }
        Ok(())
    }

    async fn read_frame(&self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        if let Some(frame) = self.inbound.lock().pop_front() {
            return Ok(Some(frame));
        }
        tokio::time::sleep(timeout).await;
        Ok(self.inbound.lock().pop_front())
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    async fn is_connected(&self) -> bool {
        true
    }

    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────────

const DEFINITION_JSON: &str = r#"{
    "name": "Mock 2x3",
    "matrix": {"rows": 2, "cols": 3},
    "layouts": {"keymap": [["0,0", "0,1", "0,2"], ["1,0", {"w": 2}, "1,1"]]}
}"#;

fn xz(json: &str) -> Vec<u8> {
    let mut out = Vec::new();
    lzma_rs::xz_compress(&mut Cursor::new(json.as_bytes()), &mut out).unwrap();
    out
}

fn keymap(layers: u8, rows: u8, cols: u8) -> Vec<u8> {
    let count = layers as usize * rows as usize * cols as usize;
    (0..count)
        .flat_map(|i| (0x0004 + i as u16).to_be_bytes())
        .collect()
}

fn keyboard(device: &Arc<MockVialDevice>) -> VialKeyboard {
    let session = Session::new(device.clone())
        .unwrap()
        .with_timeout(Duration::from_millis(50));
    VialKeyboard::new(Arc::new(session))
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_load_reassembles_definition_and_keymap() {
    let device = MockVialDevice::new(xz(DEFINITION_JSON), 4, keymap(4, 2, 3), Quirks::default());
    let mut kb = keyboard(&device);

    let loaded = kb.load().await.unwrap();

    assert_eq!(loaded.state.via_protocol, 9);
    assert_eq!(loaded.state.vial_protocol, 6);
    assert_eq!(loaded.state.keyboard_id, 0x1122_3344_5566_7788);
    assert_eq!(loaded.state.layers, 4);
    assert_eq!(loaded.state.matrix(), Some((2, 3)));
    assert_eq!(loaded.definition.name.as_deref(), Some("Mock 2x3"));
    assert_eq!(loaded.keymap.len(), 48);
    assert_eq!(loaded.keymap.as_bytes(), keymap(4, 2, 3).as_slice());
    assert_eq!(loaded.keymap.keycode(3, 1, 2), Some(0x0004 + 23));
}

#[tokio::test]
async fn definition_blocks_are_requested_sequentially() {
    let payload = xz(DEFINITION_JSON);
    let expected_blocks = payload.len().div_ceil(MSG_LEN);
    let device = MockVialDevice::new(payload, 1, keymap(1, 2, 3), Quirks::default());
    let mut kb = keyboard(&device);

    kb.load_definition().await.unwrap();

    let blocks: Vec<u32> = device
        .requests_with(&[0xFE, 0x02])
        .iter()
        .map(|r| u32::from_le_bytes([r[2], r[3], r[4], r[5]]))
        .collect();
    assert_eq!(blocks, (0..expected_blocks as u32).collect::<Vec<_>>());
}

#[tokio::test]
async fn keymap_chunks_cover_buffer_in_offset_order() {
    // 4 layers * 5 rows * 15 cols * 2 = 600 bytes -> 21 chunks of 28 + 1 of 12
    let json = r#"{"matrix":{"rows":5,"cols":15},"layouts":{"keymap":[]}}"#;
    let device = MockVialDevice::new(xz(json), 4, keymap(4, 5, 15), Quirks::default());
    let mut kb = keyboard(&device);

    let loaded = kb.load().await.unwrap();
    assert_eq!(loaded.keymap.len(), 600);

    let chunks: Vec<(u16, u8)> = device
        .requests_with(&[0x12])
        .iter()
        .map(|r| (u16::from_be_bytes([r[1], r[2]]), r[3]))
        .collect();
    assert_eq!(chunks.len(), 22);
    assert_eq!(chunks[0], (0, 28));
    assert_eq!(chunks[1], (28, 28));
    assert_eq!(*chunks.last().unwrap(), (588, 12));
    assert!(chunks.iter().all(|&(_, n)| n <= 28));
}

#[tokio::test]
async fn zero_layers_yields_empty_keymap() {
    let device = MockVialDevice::new(xz(DEFINITION_JSON), 0, Vec::new(), Quirks::default());
    let mut kb = keyboard(&device);

    let loaded = kb.load().await.unwrap();
    assert!(loaded.keymap.is_empty());
    assert!(device.requests_with(&[0x12]).is_empty());
}

#[tokio::test]
async fn keymap_before_definition_is_rejected() {
    let device = MockVialDevice::new(xz(DEFINITION_JSON), 4, keymap(4, 2, 3), Quirks::default());
    let mut kb = keyboard(&device);

    let err = kb.load_keymap().await.unwrap_err();
    assert!(matches!(err, KeyboardError::DefinitionNotLoaded));
}

#[tokio::test]
async fn corrupt_definition_surfaces_error() {
    let mut payload = xz(DEFINITION_JSON);
    let mid = payload.len() / 2;
    payload[mid] ^= 0xFF;
    let device = MockVialDevice::new(payload, 4, keymap(4, 2, 3), Quirks::default());
    let mut kb = keyboard(&device);

    let err = kb.load_definition().await.unwrap_err();
    assert!(matches!(err, KeyboardError::Definition(_)));
}

#[tokio::test]
async fn empty_definition_fails_to_parse() {
    let device = MockVialDevice::new(Vec::new(), 4, keymap(4, 2, 3), Quirks::default());
    let mut kb = keyboard(&device);

    let err = kb.load_definition().await.unwrap_err();
    assert!(matches!(
        err,
        KeyboardError::Definition(DefinitionError::Json(_))
    ));
    assert!(device.requests_with(&[0xFE, 0x02]).is_empty());
}

#[tokio::test]
async fn definition_without_matrix_is_rejected() {
    let json = r#"{"name": "NoMatrix", "layouts": {"keymap": [["0,0"]]}}"#;
    let device = MockVialDevice::new(xz(json), 4, keymap(4, 2, 3), Quirks::default());
    let mut kb = keyboard(&device);

    let err = kb.load_definition().await.unwrap_err();
    assert!(matches!(
        err,
        KeyboardError::Definition(DefinitionError::MissingMatrix)
    ));
    assert_eq!(kb.state().matrix(), None);
}

#[tokio::test]
async fn write_failure_aborts_load() {
    let quirks = Quirks {
        fail_write: Some(&[0xFE, 0x02]),
        ..Default::default()
    };
    let device = MockVialDevice::new(xz(DEFINITION_JSON), 4, keymap(4, 2, 3), quirks);
    let mut kb = keyboard(&device);

    let err = kb.load().await.unwrap_err();
    assert!(matches!(
        err,
        KeyboardError::Transport(TransportError::Write(_))
    ));

    // first definition block is the last frame sent
    let requests = device.requests.lock().clone();
    assert_eq!(device.requests_with(&[0xFE, 0x02]).len(), 1);
    assert!(requests.last().is_some_and(|r| r.starts_with(&[0xFE, 0x02, 0, 0, 0, 0])));
    assert!(device.requests_with(&[0x11]).is_empty());
    assert!(device.requests_with(&[0x12]).is_empty());
}

#[tokio::test]
async fn mismatched_echo_is_unexpected_response() {
    let quirks = Quirks {
        bad_layer_echo: true,
        ..Default::default()
    };
    let device = MockVialDevice::new(xz(DEFINITION_JSON), 4, keymap(4, 2, 3), quirks);
    let mut kb = keyboard(&device);

    kb.load_definition().await.unwrap();
    let err = kb.load_keymap().await.unwrap_err();
    assert!(matches!(err, KeyboardError::UnexpectedResponse(_)));
}

#[tokio::test]
async fn keymap_chunk_for_wrong_offset_is_rejected() {
    let quirks = Quirks {
        shifted_keymap_offset: true,
        ..Default::default()
    };
    let device = MockVialDevice::new(xz(DEFINITION_JSON), 4, keymap(4, 2, 3), quirks);
    let mut kb = keyboard(&device);

    kb.load_definition().await.unwrap();
    let err = kb.load_keymap().await.unwrap_err();
    assert!(matches!(err, KeyboardError::UnexpectedResponse(_)));
    assert_eq!(device.requests_with(&[0x12]).len(), 1);
}

#[tokio::test]
async fn silent_device_times_out() {
    let quirks = Quirks {
        drop_keymap: true,
        ..Default::default()
    };
    let device = MockVialDevice::new(xz(DEFINITION_JSON), 4, keymap(4, 2, 3), quirks);
    let mut kb = keyboard(&device);

    kb.load_definition().await.unwrap();
    let err = kb.load_keymap().await.unwrap_err();
    assert!(matches!(
        err,
        KeyboardError::Transport(TransportError::Timeout { timeout_ms: 50 })
    ));
}

#[tokio::test(flavor = "multi_thread")]
#[ignore] // requires hardware
async fn load_from_connected_keyboard() {
    use vial_transport::{DeviceDiscovery, HidDiscovery};

    let discovery = HidDiscovery::new();
    let device = discovery
        .find(None)
        .await
        .expect("No Vial keyboard found, plug in a supported device");
    let transport = discovery.open_device(&device).await.unwrap();
    let mut kb = VialKeyboard::new(Arc::new(Session::new(transport).unwrap()));

    let loaded = kb.load().await.unwrap();
    let (rows, cols) = loaded.state.matrix().unwrap();
    assert_eq!(
        loaded.keymap.len(),
        loaded.state.layers as usize * rows as usize * cols as usize * 2
    );
}
