//! Command handlers for the CLI application.
//!
//! - `device`: commands that talk to a keyboard (list, info, dump)
//! - `offline`: commands working on saved files or raw codes (layout, decode)

pub mod device;
pub mod offline;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tracing::debug;
use vial_export::config::Config;
use vial_export::keycode::{DecoderTables, KeycodeTable};
use vial_keyboard::VialKeyboard;
use vial_transport::{DeviceDiscovery, HidDiscovery, Session};

use crate::cli::Cli;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Settings shared by all commands: CLI flags layered over the config file
pub struct Context {
    pub config: Config,
    pub tables: DecoderTables,
    pub device: Option<String>,
    pub timeout: Option<Duration>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let config = Config::load(cli.config.as_deref())?;

        let keycodes: Option<PathBuf> = cli.keycodes.clone().or_else(|| config.keycodes.clone());
        let table = match &keycodes {
            Some(path) => KeycodeTable::builtin().merged(KeycodeTable::load(path)?),
            None => KeycodeTable::builtin(),
        };
        debug!("{} keycodes in decoder table", table.len());

        Ok(Self {
            tables: DecoderTables::with_keycodes(table),
            device: cli.device.clone(),
            timeout: cli.timeout_ms.or(config.timeout_ms).map(Duration::from_millis),
            config,
        })
    }

    /// Whether `0x..` fallbacks are blanked, unless overridden per command
    pub fn hide_hex(&self, show_hex: bool) -> bool {
        self.config.hide_hex_labels && !show_hex
    }

    /// Find the requested device and wrap it in a keyboard interface
    pub async fn open_keyboard(&self) -> anyhow::Result<VialKeyboard> {
        let discovery = HidDiscovery::new();
        let device = discovery.find(self.device.as_deref()).await?;
        let transport = discovery.open_device(&device).await?;

        let mut session = Session::new(transport)?;
        if let Some(timeout) = self.timeout {
            session = session.with_timeout(timeout);
        }
        Ok(VialKeyboard::new(Arc::new(session)))
    }
}

/// Print to stdout or write to `output`
pub fn write_output(content: &str, output: Option<&Path>) -> CommandResult {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}
