use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use perros_index::cli::submit::SubmitArgs;
use perros_index::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for perros_index::AppCommand {
    fn from(cmd: Commands) -> perros_index::AppCommand {
        use perros_index::AppCommand;
        match cmd {
            Commands::Ticker => AppCommand::Ticker,
            Commands::List { limit } => AppCommand::List { limit },
            Commands::Submit {
                name,
                price_bs,
                lat,
                lng,
                state,
                photo,
            } => AppCommand::Submit(SubmitArgs {
                name,
                price_bs,
                lat,
                lng,
                state,
                photo,
            }),
            Commands::Rates => AppCommand::Rates,
            Commands::Nearby { lat, lng, radius } => AppCommand::Nearby {
                lat,
                lng,
                radius_km: radius,
            },
            Commands::Locate { lat, lng } => AppCommand::Locate { lat, lng },
            Commands::Watch => AppCommand::Watch,
            Commands::Disclaimer => AppCommand::Disclaimer,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show national and local averages
    Ticker,
    /// List reports, newest first
    List {
        /// Show at most this many reports
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Report a hot dog price in bolívares
    Submit {
        /// Business name
        #[arg(short, long)]
        name: String,
        /// Price in bolívares
        #[arg(short, long)]
        price_bs: String,
        /// Latitude; defaults to the saved location
        #[arg(long, allow_hyphen_values = true, requires = "lng")]
        lat: Option<f64>,
        /// Longitude; defaults to the saved location
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lng: Option<f64>,
        /// Venezuelan state of the business
        #[arg(short, long)]
        state: Option<String>,
        /// Photo of the hot dog
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Show the current exchange rates
    Rates,
    /// Reports around a point
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Radius in kilometers
        #[arg(short, long)]
        radius: Option<f64>,
    },
    /// Save your location for local averages
    Locate {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
    /// Follow new reports live
    Watch,
    /// Explain how prices are shown
    Disclaimer,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => perros_index::cli::setup::setup(),
        Some(cmd) => perros_index::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
