//! PlantCare scan CLI
//!
//! Command-line front end for capturing, uploading and analyzing plant
//! images and for managing the signed-in profile.

use clap::{Parser, Subcommand};
use plantcare::capture::FacingMode;
use std::path::PathBuf;
use tracing::info;

mod cli;

#[derive(Parser)]
#[command(name = "plantcare")]
#[command(about = "Plant disease scanner: capture, upload and analyze plant images")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a still from the camera
    Scan {
        /// Camera to use: environment (back) or user (front)
        #[arg(short, long)]
        facing: Option<FacingMode>,

        /// Write the captured JPEG here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Submit the still for analysis
        #[arg(short, long)]
        analyze: bool,

        /// Use the system camera instead of the mock
        #[arg(long)]
        native: bool,
    },

    /// Analyze an image file from disk
    Upload {
        /// Image file (JPEG, PNG, GIF, WebP or BMP)
        path: PathBuf,
    },

    /// Print advice text split into sections
    Advice {
        /// File holding the advice text, or - for stdin
        source: String,
    },

    /// List past scans
    History,

    /// Show or update the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Hold the camera open until Ctrl-C
    Preview {
        /// Camera to use: environment (back) or user (front)
        #[arg(short, long)]
        facing: Option<FacingMode>,

        /// Use the system camera instead of the mock
        #[arg(long)]
        native: bool,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the profile
    Show,

    /// Change profile fields
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// New avatar image (JPG or PNG, max 1MB)
        #[arg(long)]
        avatar: Option<PathBuf>,
        /// New cover image (JPG or PNG, max 1MB)
        #[arg(long)]
        cover: Option<PathBuf>,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Cli::parse();

    let config = match cli::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("PlantCare v{}", plantcare::VERSION);

    let result = match args.command {
        Commands::Scan {
            facing,
            output,
            analyze,
            native,
        } => cli::scan(&config, facing, output, analyze, native),
        Commands::Upload { path } => cli::upload(&config, path),
        Commands::Advice { source } => cli::advice(&source),
        Commands::History => cli::history(&config),
        Commands::Profile { action } => match action {
            ProfileAction::Show => cli::profile_show(&config),
            ProfileAction::Update {
                username,
                first_name,
                last_name,
                description,
                avatar,
                cover,
            } => cli::profile_update(
                &config,
                cli::ProfileChanges {
                    username,
                    first_name,
                    last_name,
                    description,
                    avatar,
                    cover,
                },
            ),
        },
        Commands::Preview { facing, native } => cli::preview(&config, facing, native),
        Commands::Config => cli::print_config(&config),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
