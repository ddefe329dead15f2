//! Commands that talk to a connected keyboard.

use std::path::PathBuf;

use anyhow::Context as _;
use vial_export::export::{ExportDocument, ExportOptions, Format};
use vial_export::layout::parse_layout;
use vial_transport::{DeviceDiscovery, HidDiscovery};

use super::{write_output, CommandResult, Context};

/// List Vial raw HID interfaces
pub async fn list() -> CommandResult {
    let devices = HidDiscovery::new().list_devices().await?;
    if devices.is_empty() {
        println!("No Vial keyboards found");
        return Ok(());
    }

    println!("Vial keyboards:");
    for device in &devices {
        let info = &device.info;
        println!(
            "  VID={:04X} PID={:04X} {} {} path={}",
            info.vid,
            info.pid,
            info.manufacturer.as_deref().unwrap_or("-"),
            info.product_name.as_deref().unwrap_or("-"),
            info.device_path,
        );
    }
    Ok(())
}

/// Show what the keyboard reports about itself
pub async fn info(ctx: &Context) -> CommandResult {
    let mut keyboard = ctx.open_keyboard().await?;
    keyboard.connect().await?;
    let fetched = keyboard.load_definition().await?;
    let layers = keyboard.reload_layer_count().await?;
    let state = keyboard.state();

    println!("Device:         {}", keyboard.session().device_info().describe());
    println!("Name:           {}", fetched.definition.display_name());
    println!("VIA protocol:   {}", state.via_protocol);
    println!("Vial protocol:  {}", state.vial_protocol);
    println!("Keyboard id:    {:016X}", state.keyboard_id);
    match state.matrix() {
        Some((rows, cols)) => println!("Matrix:         {} x {}", rows, cols),
        None => println!("Matrix:         (not in definition)"),
    }
    println!("Layers:         {}", layers);
    Ok(())
}

/// Options for [`dump`]
pub struct DumpArgs {
    pub layer: Option<usize>,
    pub format: Format,
    pub output: Option<PathBuf>,
    pub save_definition: Option<PathBuf>,
    pub save_keymap: Option<PathBuf>,
    pub show_hex: bool,
}

/// Fetch everything and print the decoded layout
pub async fn dump(ctx: &Context, args: DumpArgs) -> CommandResult {
    let mut keyboard = ctx.open_keyboard().await?;
    let loaded = keyboard.load().await?;

    if let Some(path) = &args.save_definition {
        std::fs::write(path, &loaded.definition_json)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("Saved definition to {}", path.display());
    }
    if let Some(path) = &args.save_keymap {
        std::fs::write(path, loaded.keymap.as_bytes())
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("Saved keymap ({} layers) to {}", loaded.keymap.layers(), path.display());
    }

    let name = loaded.definition.display_name();
    let keys = parse_layout(&loaded.definition.layouts.keymap);
    let options = ExportOptions {
        layer: args.layer,
        hide_hex: ctx.hide_hex(args.show_hex),
        exclusions: ctx.config.exclusions_for(name),
    };
    let doc = ExportDocument::build(
        name,
        Some(loaded.state),
        &keys,
        &loaded.keymap,
        &ctx.tables,
        &options,
    );

    let mut out = doc.render(args.format)?;
    if !out.ends_with('\n') {
        out.push('\n');
    }
    write_output(&out, args.output.as_deref())
}
