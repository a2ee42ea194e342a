//! Ollim CLI: compose a screenshot into a device mockup and export it.
//!
//! Usage:
//!   ollim export [IMAGE] [STYLE]     Export the mockup as PNG or JPEG
//!   ollim copy [IMAGE] [STYLE]       Copy the mockup to the clipboard
//!   ollim preview [IMAGE] [STYLE]    Write the on-screen preview raster
//!   ollim geometry [STYLE]           Print the resolved device geometry
//!   ollim catalog [KIND]             List devices, presets, and colors
//!   ollim check                      Check configuration and assets

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ollim_common::config::AppConfig;

mod commands;

use commands::catalog::CatalogKind;
use commands::StyleArgs;

#[derive(Parser)]
#[command(
    name = "ollim",
    about = "Place screenshots into device mockups and export them",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the mockup to an image file
    Export {
        /// Screenshot to place in the device (PNG or JPEG)
        image: Option<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,

        /// Output directory (defaults to the configured one)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// File name without extension (defaults to a timestamp)
        #[arg(long)]
        name: Option<String>,

        /// Output format: png|jpeg
        #[arg(long)]
        format: Option<String>,

        /// JPEG quality [0, 100]
        #[arg(long, conflicts_with = "preset")]
        quality: Option<u8>,

        /// JPEG quality preset: max|high|medium|low
        #[arg(long)]
        preset: Option<String>,
    },

    /// Copy the mockup to the clipboard at export resolution
    Copy {
        /// Screenshot to place in the device (PNG or JPEG)
        image: Option<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Render the on-screen preview into a PNG
    Preview {
        /// Screenshot to place in the device (PNG or JPEG)
        image: Option<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,

        /// Viewport size as WIDTHxHEIGHT
        #[arg(long, default_value = "1280x800", value_parser = commands::parse_size)]
        viewport: (u32, u32),

        /// Output PNG path
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,
    },

    /// Print the resolved device geometry as JSON
    Geometry {
        #[command(flatten)]
        style: StyleArgs,

        /// Screenshot size as WIDTHxHEIGHT (affects browser and borderless layouts)
        #[arg(long, value_parser = commands::parse_size)]
        image_size: Option<(u32, u32)>,
    },

    /// List catalog entries
    Catalog {
        /// Which catalog to list (all when omitted)
        #[arg(value_enum)]
        kind: Option<CatalogKind>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Check configuration, assets, and clipboard support
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    ollim_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Export {
            image,
            style,
            output,
            name,
            format,
            quality,
            preset,
        } => {
            commands::export::run(
                &config,
                image,
                style,
                commands::export::ExportArgs {
                    output,
                    name,
                    format,
                    quality,
                    preset,
                },
            )
            .await
        }
        Commands::Copy { image, style } => commands::copy::run(&config, image, style).await,
        Commands::Preview {
            image,
            style,
            viewport,
            output,
        } => commands::preview::run(&config, image, style, viewport, output).await,
        Commands::Geometry { style, image_size } => {
            commands::geometry::run(&config, style, image_size)
        }
        Commands::Catalog { kind, json } => commands::catalog::run(kind, json),
        Commands::Check => commands::check::run(&config, cli.config),
    }
}
