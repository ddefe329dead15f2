//! Serializable snapshot of a decoded keyboard
//!
//! Holds the positioned keys that survive the visibility filter together with
//! their labels per layer. Written as JSON or as a plain text listing.

use std::fmt::Write as _;

use serde::Serialize;
use vial_keyboard::{KeymapBuffer, ProtocolState};

use crate::geometry::{bounding_box, BoundingBox};
use crate::keycode::DecoderTables;
use crate::keymap::{display_label, key_code, visible_keys, ExclusionSet};
use crate::layout::Key;

/// Output format for `dump` / `layout`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// How to build an [`ExportDocument`]
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Only this layer; all layers when `None`
    pub layer: Option<usize>,
    pub hide_hex: bool,
    pub exclusions: ExclusionSet,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyboardSummary {
    pub name: String,
    /// Present when the data came from a live device
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ProtocolState>,
    pub rows: u8,
    pub cols: u8,
    pub layers: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportKey {
    /// Position in the emitted sequence
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<u32>,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(skip_serializing_if = "is_zero")]
    pub rotation_angle: f64,
    #[serde(skip_serializing_if = "is_zero")]
    pub rotation_x: f64,
    #[serde(skip_serializing_if = "is_zero")]
    pub rotation_y: f64,
    /// Raw codes, one per exported layer
    pub codes: Vec<Option<u16>>,
    /// Display labels, one per exported layer
    pub labels: Vec<String>,
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    pub keyboard: KeyboardSummary,
    /// Layers the `codes`/`labels` columns refer to
    pub layers: Vec<usize>,
    pub bounds: BoundingBox,
    pub keys: Vec<ExportKey>,
}

impl ExportDocument {
    pub fn build(
        name: &str,
        protocol: Option<ProtocolState>,
        keys: &[Key],
        buffer: &KeymapBuffer,
        tables: &DecoderTables,
        options: &ExportOptions,
    ) -> Self {
        let layers: Vec<usize> = match options.layer {
            Some(layer) => vec![buffer.clamp_layer(layer)],
            None => (0..usize::from(buffer.layers())).collect(),
        };

        let shown: Vec<&Key> = visible_keys(keys, buffer, &options.exclusions);
        let bounds = bounding_box(shown.iter().copied(), 1.0);

        let keys = shown
            .iter()
            .enumerate()
            .map(|(index, key)| ExportKey {
                index,
                row: key.row,
                col: key.col,
                x: key.x,
                y: key.y,
                w: key.w,
                h: key.h,
                rotation_angle: key.rotation_angle,
                rotation_x: key.rotation_x,
                rotation_y: key.rotation_y,
                codes: layers.iter().map(|&l| key_code(key, buffer, l)).collect(),
                labels: layers
                    .iter()
                    .map(|&l| display_label(key, buffer, l, tables, options.hide_hex))
                    .collect(),
            })
            .collect();

        Self {
            keyboard: KeyboardSummary {
                name: name.to_string(),
                protocol,
                rows: buffer.rows(),
                cols: buffer.cols(),
                layers: buffer.layers(),
            },
            layers,
            bounds,
            keys,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// One block per layer, one line per key
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let kb = &self.keyboard;
        let _ = writeln!(
            out,
            "{}: {} layers, {}x{} matrix, {} keys ({:.2} x {:.2} u)",
            kb.name,
            kb.layers,
            kb.rows,
            kb.cols,
            self.keys.len(),
            self.bounds.width(),
            self.bounds.height()
        );
        if let Some(p) = &kb.protocol {
            let _ = writeln!(
                out,
                "VIA protocol {}, Vial protocol {}, keyboard id {:016X}",
                p.via_protocol, p.vial_protocol, p.keyboard_id
            );
        }

        for (column, layer) in self.layers.iter().enumerate() {
            let _ = writeln!(out, "\n=== Layer {} ===", layer);
            for key in &self.keys {
                let pos = match (key.row, key.col) {
                    (Some(r), Some(c)) => format!("{},{}", r, c),
                    _ => "-".to_string(),
                };
                let code = match key.codes[column] {
                    Some(code) => format!("{:04X}", code),
                    None => "----".to_string(),
                };
                let _ = writeln!(
                    out,
                    "{:>3}  {:<6} {}  {}",
                    key.index,
                    pos,
                    code,
                    key.labels[column].replace('\n', " / ")
                );
            }
        }
        out
    }

    pub fn render(&self, format: Format) -> Result<String, serde_json::Error> {
        match format {
            Format::Text => Ok(self.to_text()),
            Format::Json => self.to_json(),
        }
    }
}
