//! Vial keymap export CLI
//!
//! Reads the layout definition and dynamic keymap from a Vial keyboard and
//! prints the decoded layout.

use clap::Parser;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;
use commands::{device, offline, Context};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vial_export=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        None | Some(Commands::Info) => {
            device::info(&ctx).await?;
        }
        Some(Commands::List) => {
            device::list().await?;
        }
        Some(Commands::Dump {
            layer,
            format,
            output,
            save_definition,
            save_keymap,
            show_hex,
        }) => {
            device::dump(
                &ctx,
                device::DumpArgs {
                    layer,
                    format,
                    output,
                    save_definition,
                    save_keymap,
                    show_hex,
                },
            )
            .await?;
        }
        Some(Commands::Layout {
            definition,
            keymap,
            layers,
            layer,
            format,
            output,
            show_hex,
        }) => {
            offline::layout(
                &ctx,
                offline::LayoutArgs {
                    definition,
                    keymap,
                    layers,
                    layer,
                    format,
                    output,
                    show_hex,
                },
            )?;
        }
        Some(Commands::Decode { codes }) => {
            offline::decode_codes(&ctx, &codes)?;
        }
    }

    Ok(())
}
