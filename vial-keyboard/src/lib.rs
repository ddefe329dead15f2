//! High-level interface for Vial keyboards
//!
//! Runs the retrieval sequence on top of a [`vial_transport::Session`]:
//! protocol version, keyboard id, the compressed definition and finally the
//! raw dynamic keymap. Requests are strictly sequential; the session already
//! guarantees only one is in flight.

pub mod definition;
pub mod error;
pub mod keymap;
pub mod state;

pub use definition::{Definition, Layouts, Matrix};
pub use error::{DefinitionError, KeyboardError};
pub use keymap::KeymapBuffer;
pub use state::ProtocolState;

use std::sync::Arc;

use tracing::{debug, info};
use vial_transport::command::{
    DefinitionBlock, DefinitionSizeResponse, GetDefinitionBlock, GetDefinitionSize,
    GetKeyboardId, GetKeymapBuffer, GetLayerCount, GetProtocolVersion, HidCommand, HidResponse,
    KeyboardIdResponse, KeymapChunk, LayerCountResponse, ProtocolVersionResponse,
};
use vial_transport::protocol::{self, BUFFER_FETCH_CHUNK, MSG_LEN};
use vial_transport::Session;

/// Highest keymap size addressable by the 16-bit buffer offset
const MAX_KEYMAP_LEN: usize = u16::MAX as usize + 1;

/// Definition as fetched from the keyboard
#[derive(Debug, Clone)]
pub struct FetchedDefinition {
    pub definition: Arc<Definition>,
    /// Decompressed JSON text
    pub json: String,
}

/// Everything retrieved by [`VialKeyboard::load`]
#[derive(Debug, Clone)]
pub struct LoadedKeyboard {
    pub state: ProtocolState,
    pub definition: Arc<Definition>,
    pub definition_json: String,
    pub keymap: KeymapBuffer,
}

/// Keyboard interface over a request/response session
pub struct VialKeyboard {
    session: Arc<Session>,
    state: ProtocolState,
}

impl VialKeyboard {
    /// Create a new keyboard interface
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            state: ProtocolState::default(),
        }
    }

    /// Get the underlying session
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// State accumulated so far
    pub fn state(&self) -> &ProtocolState {
        &self.state
    }

    /// Open the device channel
    pub async fn connect(&mut self) -> Result<(), KeyboardError> {
        self.session.open().await?;
        info!("Connected to {}", self.session.device_info().describe());
        Ok(())
    }

    async fn query<C, R>(&self, cmd: &C) -> Result<R, KeyboardError>
    where
        C: HidCommand + Sync,
        R: HidResponse,
    {
        let resp = self.session.query(cmd).await?;
        R::parse(&resp).map_err(|e| {
            KeyboardError::UnexpectedResponse(format!(
                "{}: {}",
                protocol::frame_name(C::HEADER),
                e
            ))
        })
    }

    // === Protocol ===

    /// Query the VIA protocol version
    pub async fn reload_via_protocol(&mut self) -> Result<u16, KeyboardError> {
        let resp: ProtocolVersionResponse = self.query(&GetProtocolVersion).await?;
        self.state.via_protocol = resp.version;
        debug!("VIA protocol {}", resp.version);
        Ok(resp.version)
    }

    /// Query the Vial protocol version and keyboard id
    pub async fn reload_keyboard_id(&mut self) -> Result<(u32, u64), KeyboardError> {
        let resp: KeyboardIdResponse = self.query(&GetKeyboardId).await?;
        self.state.vial_protocol = resp.vial_protocol;
        self.state.keyboard_id = resp.keyboard_id;
        debug!(
            "Vial protocol {}, keyboard id {:016X}",
            resp.vial_protocol, resp.keyboard_id
        );
        Ok((resp.vial_protocol, resp.keyboard_id))
    }

    // === Definition ===

    /// Size in bytes of the compressed definition
    pub async fn query_definition_size(&self) -> Result<u32, KeyboardError> {
        let resp: DefinitionSizeResponse = self.query(&GetDefinitionSize).await?;
        Ok(resp.size)
    }

    /// Fetch `size` bytes of compressed definition, one block per request
    pub async fn fetch_definition_payload(&self, size: u32) -> Result<Vec<u8>, KeyboardError> {
        let size = size as usize;
        let mut payload = Vec::with_capacity(size);
        let mut block = 0u32;

        while payload.len() < size {
            let resp: DefinitionBlock = self.query(&GetDefinitionBlock { block }).await?;
            let take = MSG_LEN.min(size - payload.len());
            payload.extend_from_slice(&resp.data[..take]);
            block += 1;
        }

        debug!("Fetched definition: {} bytes in {} blocks", size, block);
        Ok(payload)
    }

    /// Run the full definition sequence: protocol version, keyboard id,
    /// size, blocks, decompress, parse
    ///
    /// A definition without a matrix is rejected; offline loading through
    /// [`Definition::load`] stays lenient.
    pub async fn load_definition(&mut self) -> Result<FetchedDefinition, KeyboardError> {
        self.reload_via_protocol().await?;
        self.reload_keyboard_id().await?;

        let size = self.query_definition_size().await?;
        let payload = self.fetch_definition_payload(size).await?;

        let json = definition::decompress(&payload)?;
        let definition = Definition::from_json_str(&json)?;
        if definition.matrix.is_none() {
            return Err(DefinitionError::MissingMatrix.into());
        }

        self.state.rows = definition.rows();
        self.state.cols = definition.cols();
        info!(
            "Loaded definition '{}' ({} compressed bytes, matrix {:?})",
            definition.display_name(),
            size,
            self.state.matrix()
        );

        Ok(FetchedDefinition {
            definition: Arc::new(definition),
            json,
        })
    }

    // === Keymap ===

    /// Query the number of dynamic keymap layers
    pub async fn reload_layer_count(&mut self) -> Result<u8, KeyboardError> {
        let resp: LayerCountResponse = self.query(&GetLayerCount).await?;
        self.state.layers = resp.count;
        debug!("{} layers", resp.count);
        Ok(resp.count)
    }

    /// Fetch the whole keymap buffer in 28-byte chunks
    ///
    /// Requires the matrix size from [`VialKeyboard::load_definition`].
    pub async fn load_keymap(&mut self) -> Result<KeymapBuffer, KeyboardError> {
        let (rows, cols) = self
            .state
            .matrix()
            .ok_or(KeyboardError::DefinitionNotLoaded)?;
        let layers = self.reload_layer_count().await?;

        let size = KeymapBuffer::expected_len(layers, rows, cols);
        if size > MAX_KEYMAP_LEN {
            return Err(KeyboardError::KeymapTooLarge { size });
        }

        let mut data = Vec::with_capacity(size);
        while data.len() < size {
            let offset = data.len();
            let chunk = (BUFFER_FETCH_CHUNK as usize).min(size - offset);
            let cmd = GetKeymapBuffer {
                offset: offset as u16,
                size: chunk as u8,
            };
            let resp: KeymapChunk = self.query(&cmd).await?;
            if usize::from(resp.offset) != offset {
                return Err(KeyboardError::UnexpectedResponse(format!(
                    "keymap chunk for offset {} answered offset {}",
                    offset, resp.offset
                )));
            }
            let bytes = resp.take(chunk).map_err(|e| {
                KeyboardError::UnexpectedResponse(format!("keymap chunk at {}: {}", offset, e))
            })?;
            data.extend_from_slice(bytes);
        }

        info!(
            "Loaded keymap: {} layers x {}x{} ({} bytes)",
            layers, rows, cols, size
        );
        Ok(KeymapBuffer::new(data, layers, rows, cols))
    }

    /// Connect, then load definition and keymap
    pub async fn load(&mut self) -> Result<LoadedKeyboard, KeyboardError> {
        self.connect().await?;
        let fetched = self.load_definition().await?;
        let keymap = self.load_keymap().await?;
        Ok(LoadedKeyboard {
            state: self.state,
            definition: fetched.definition,
            definition_json: fetched.json,
            keymap,
        })
    }
}
