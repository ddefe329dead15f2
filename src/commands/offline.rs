//! Commands that need no device.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{bail, Context as _};
use vial_export::export::{ExportDocument, ExportOptions, Format};
use vial_export::keycode::{self, classify, decode};
use vial_export::layout::{parse_layout, Key};
use vial_keyboard::{Definition, KeymapBuffer};

use super::{write_output, CommandResult, Context};

/// Options for [`layout`]
pub struct LayoutArgs {
    pub definition: PathBuf,
    pub keymap: Option<PathBuf>,
    pub layers: Option<u8>,
    pub layer: Option<usize>,
    pub format: Format,
    pub output: Option<PathBuf>,
    pub show_hex: bool,
}

/// Work out the layer count of a saved keymap from its size
fn infer_layers(len: usize, rows: u8, cols: u8) -> anyhow::Result<u8> {
    let per_layer = KeymapBuffer::expected_len(1, rows, cols);
    if per_layer == 0 || len % per_layer != 0 {
        bail!(
            "keymap is {} bytes, not a multiple of {} ({}x{} matrix)",
            len,
            per_layer,
            rows,
            cols
        );
    }
    u8::try_from(len / per_layer).context("keymap holds more than 255 layers")
}

/// Geometry only: one line per key
fn geometry_text(name: &str, keys: &[Key]) -> String {
    let mut out = format!("{}: {} keys\n", name, keys.len());
    for (i, key) in keys.iter().enumerate() {
        let pos = match key.matrix() {
            Some((r, c)) => format!("{},{}", r, c),
            None => "-".to_string(),
        };
        let _ = write!(
            out,
            "{:>3}  {:<6} x={:<6} y={:<6} {}x{}",
            i, pos, key.x, key.y, key.w, key.h
        );
        if key.is_rotated() {
            let _ = write!(
                out,
                " r={} @ ({}, {})",
                key.rotation_angle, key.rotation_x, key.rotation_y
            );
        }
        if key.decal || key.ghost {
            out.push_str(" (hidden)");
        }
        out.push('\n');
    }
    out
}

/// Decode a saved definition, with labels when a keymap is given
pub fn layout(ctx: &Context, args: LayoutArgs) -> CommandResult {
    let definition = Definition::load(&args.definition)
        .with_context(|| format!("loading {}", args.definition.display()))?;
    let name = definition.display_name();
    let keys = parse_layout(&definition.layouts.keymap);

    let Some(keymap_path) = &args.keymap else {
        let mut out = match args.format {
            Format::Text => geometry_text(name, &keys),
            Format::Json => serde_json::to_string_pretty(&keys)?,
        };
        if !out.ends_with('\n') {
            out.push('\n');
        }
        return write_output(&out, args.output.as_deref());
    };

    let (Some(rows), Some(cols)) = (definition.rows(), definition.cols()) else {
        bail!("{} has no matrix size", args.definition.display());
    };
    let data = std::fs::read(keymap_path)
        .with_context(|| format!("reading {}", keymap_path.display()))?;
    let layers = match args.layers {
        Some(n) => n,
        None => infer_layers(data.len(), rows, cols)?,
    };
    let buffer = KeymapBuffer::new(data, layers, rows, cols);

    let options = ExportOptions {
        layer: args.layer,
        hide_hex: ctx.hide_hex(args.show_hex),
        exclusions: ctx.config.exclusions_for(name),
    };
    let doc = ExportDocument::build(name, None, &keys, &buffer, &ctx.tables, &options);

    let mut out = doc.render(args.format)?;
    if !out.ends_with('\n') {
        out.push('\n');
    }
    write_output(&out, args.output.as_deref())
}

/// Print the label and matching rule for each code
pub fn decode_codes(ctx: &Context, codes: &[String]) -> CommandResult {
    for raw in codes {
        let Some(code) = keycode::parse_code(raw) else {
            bail!("'{}' is not a 16-bit keycode", raw);
        };
        let rule = classify(code, &ctx.tables);
        let label = decode(code, &ctx.tables);
        println!(
            "0x{:04X}  {:<16} {}",
            code,
            format!("{:?}", rule),
            label.replace('\n', " / ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_layers() {
        assert_eq!(infer_layers(600, 5, 15).unwrap(), 4);
        assert!(infer_layers(601, 5, 15).is_err());
        assert!(infer_layers(0, 0, 15).is_err());
    }

    #[test]
    fn test_geometry_text() {
        let rows = serde_json::json!([["0,0", {"d": true}, "x"]]);
        let keys = parse_layout(rows.as_array().unwrap());
        let text = geometry_text("pad", &keys);
        assert!(text.starts_with("pad: 2 keys\n"));
        assert!(text.lines().nth(2).unwrap().ends_with("(hidden)"));
    }
}
