// SPDX-License-Identifier: GPL-3.0-only

use clap::{Args, Parser, Subcommand};
use photobooth::backends::camera::CameraBackendType;
use photobooth::{Config, FilterType, StripTemplate};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photobooth")]
#[command(about = "Virtual photo booth: four shots, one strip")]
#[command(version = photobooth::constants::app_info::version())]
#[command(subcommand_required = false)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where frames come from (overrides the configuration file)
#[derive(Args)]
struct SourceArgs {
    /// Use an image file or a directory of images instead of a camera
    #[arg(long, global = true, conflicts_with = "pattern")]
    source: Option<PathBuf>,

    /// Use a synthetic test pattern instead of a camera
    #[arg(long, global = true)]
    pattern: bool,

    /// V4L2 device node
    #[arg(long, global = true)]
    device: Option<PathBuf>,

    /// Directory holding the saved photo set
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

impl SourceArgs {
    fn apply(self, config: &mut Config) {
        if let Some(path) = self.source {
            config.backend = CameraBackendType::File;
            config.source_path = Some(path);
        } else if self.pattern {
            config.backend = CameraBackendType::Pattern;
        }
        if let Some(device) = self.device {
            config.backend = CameraBackendType::V4l2;
            config.device_path = device;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = Some(dir);
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the booth in the terminal (default)
    Terminal,

    /// Take the photos of a strip
    Capture {
        /// Filter baked into every photo
        #[arg(short, long)]
        filter: Option<FilterType>,

        /// Save the strip with this template when done
        #[arg(short, long)]
        template: Option<StripTemplate>,

        /// Output directory for the strip (default: Downloads)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Retake one photo of the saved strip
    Retake {
        /// Photo position, 1 to 4
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        position: u8,

        /// Filter for the new photo
        #[arg(short, long)]
        filter: Option<FilterType>,
    },

    /// Delete one photo of the saved strip
    Delete {
        /// Photo position, 1 to 4
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        position: u8,
    },

    /// Delete all saved photos
    Clear,

    /// Show the saved photo set and settings
    Status,

    /// Render the saved photos into a strip and save it
    Export {
        /// Strip template
        #[arg(short, long, default_value = "classic")]
        template: StripTemplate,

        /// Output directory (default: Downloads)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List available filters
    Filters,

    /// List available strip templates
    Templates,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photobooth=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load();
    cli.source.apply(&mut config);

    match cli.command {
        None | Some(Commands::Terminal) => photobooth::terminal::run(config),
        Some(Commands::Capture {
            filter,
            template,
            output,
        }) => cli::capture(&config, filter, template, output),
        Some(Commands::Retake { position, filter }) => {
            cli::retake(&config, usize::from(position) - 1, filter)
        }
        Some(Commands::Delete { position }) => cli::delete(&config, usize::from(position) - 1),
        Some(Commands::Clear) => cli::clear(&config),
        Some(Commands::Status) => cli::status(&config),
        Some(Commands::Export { template, output }) => cli::export(&config, template, output),
        Some(Commands::Filters) => {
            cli::list_filters();
            Ok(())
        }
        Some(Commands::Templates) => {
            cli::list_templates();
            Ok(())
        }
    }
}
