// Vial keymap export - shared library
// Layout geometry, keycode decoding and label resolution on top of the
// vial-keyboard retrieval crate

pub mod config;
pub mod export;
pub mod geometry;
pub mod keycode;
pub mod keymap;
pub mod layout;

pub use config::{Config, ConfigError};
pub use export::{ExportDocument, ExportOptions, Format};
pub use keycode::{classify, decode, DecoderTables, KeycodeTable, Rule};
pub use keymap::{display_label, is_visible, key_label, visible_keys, ExclusionSet};
pub use layout::{parse_layout, Key};
