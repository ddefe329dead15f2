// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use vial_export::export::Format;

#[derive(Parser)]
#[command(name = "vial_export")]
#[command(author, version, about = "Retrieve and decode keymaps from Vial keyboards")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Raw HID device path (first Vial interface when omitted)
    #[arg(long, global = true, value_name = "PATH")]
    pub device: Option<String>,

    /// Config file (default: $XDG_CONFIG_HOME/vial-export/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Keycode table JSON merged over the built-in labels
    #[arg(long, global = true, value_name = "FILE")]
    pub keycodes: Option<PathBuf>,

    /// Per-request timeout in milliseconds
    #[arg(long = "timeout-ms", global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List connected Vial keyboards
    #[command(visible_aliases = ["ls", "l"])]
    List,

    /// Show protocol versions, keyboard id, matrix and layer count
    #[command(visible_aliases = ["version", "i"])]
    Info,

    /// Fetch definition and keymap, then print the decoded layout
    #[command(visible_alias = "d")]
    Dump {
        /// Only this layer (default: all)
        #[arg(short, long)]
        layer: Option<usize>,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Save the decompressed definition JSON
        #[arg(long, value_name = "FILE")]
        save_definition: Option<PathBuf>,

        /// Save the raw keymap buffer
        #[arg(long, value_name = "FILE")]
        save_keymap: Option<PathBuf>,

        /// Keep `0x..` labels for codes without a known name
        #[arg(long)]
        show_hex: bool,
    },

    /// Decode a saved definition (JSON or XZ) and optional raw keymap
    Layout {
        /// Definition file
        definition: PathBuf,

        /// Raw keymap buffer as saved by `dump --save-keymap`
        #[arg(short, long, value_name = "FILE")]
        keymap: Option<PathBuf>,

        /// Layer count of the keymap (default: derived from its size)
        #[arg(long, requires = "keymap")]
        layers: Option<u8>,

        /// Only this layer (default: all)
        #[arg(short, long, requires = "keymap")]
        layer: Option<usize>,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Keep `0x..` labels for codes without a known name
        #[arg(long)]
        show_hex: bool,
    },

    /// Decode raw keycodes (hex `0x6104` or decimal)
    #[command(visible_alias = "kc")]
    Decode {
        #[arg(required = true)]
        codes: Vec<String>,
    },
}
