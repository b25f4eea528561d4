//! SafeAlert CLI - nearest emergency facilities and panic alerts
//!
//! Finds hospitals, clinics and pharmacies around a position using the
//! Overpass API, ranks them by distance, and sends panic alerts carrying the
//! nearest one.

use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use safealert_geo::Coordinate;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod session;
mod view;

use commands::{distance, nearby, nearest, panic, send, Context};

/// Nearest emergency facility finder
#[derive(Parser)]
#[command(name = "safealert")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Path to a safealert.toml configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Overpass API interpreter endpoint
    #[arg(long, global = true, env = "SAFEALERT_OVERPASS_URL")]
    overpass_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List facilities around a position, nearest first
    Nearby {
        /// Position as "lat,lon"
        #[arg(allow_hyphen_values = true)]
        position: Coordinate,

        /// Search radius in meters
        #[arg(short, long)]
        radius: Option<u32>,

        /// Amenity categories, comma separated
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,

        /// Read an Overpass JSON response from a file instead of querying
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show only the single nearest facility
    Nearest {
        /// Position as "lat,lon"
        #[arg(allow_hyphen_values = true)]
        position: Coordinate,

        /// Search radius in meters
        #[arg(short, long)]
        radius: Option<u32>,

        /// Amenity categories, comma separated
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,

        /// Read an Overpass JSON response from a file instead of querying
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Send a panic alert with the nearest facility attached
    Panic {
        /// Position as "lat,lon"
        #[arg(allow_hyphen_values = true)]
        position: Coordinate,

        /// Note attached to the alert
        #[arg(short, long)]
        note: Option<String>,

        /// Alert endpoint URL
        #[arg(long, env = "SAFEALERT_ALERT_URL")]
        endpoint: Option<String>,

        /// Search radius in meters (defaults to the panic radius)
        #[arg(short, long)]
        radius: Option<u32>,
    },

    /// Send an alert naming one facility from the nearby list
    Send {
        /// Position as "lat,lon"
        #[arg(allow_hyphen_values = true)]
        position: Coordinate,

        /// Id of the chosen facility, as listed by `nearby --format json`
        place_id: String,

        /// Search radius in meters
        #[arg(short, long)]
        radius: Option<u32>,

        /// Amenity categories, comma separated
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,

        /// Read an Overpass JSON response from a file instead of querying
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Alert endpoint URL
        #[arg(long, env = "SAFEALERT_ALERT_URL")]
        endpoint: Option<String>,

        /// Note attached to the alert
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Read "lat,lon" positions from stdin and keep the list current
    Watch {
        /// Search radius in meters
        #[arg(short, long)]
        radius: Option<u32>,

        /// Amenity categories, comma separated
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,
    },

    /// Great-circle distance between two positions
    Distance {
        /// First position as "lat,lon"
        #[arg(allow_hyphen_values = true)]
        from: Coordinate,

        /// Second position as "lat,lon"
        #[arg(allow_hyphen_values = true)]
        to: Coordinate,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let ctx = match Context::load(cli.config.as_deref(), cli.overpass_url, cli.format) {
        Ok(ctx) => ctx,
        Err(e) => return report(&e, cli.format),
    };

    let level = if cli.verbose {
        "warn,safealert=debug,safealert_api_client=debug,safealert_telemetry=debug".to_string()
    } else {
        ctx.settings.logging.level.clone()
    };
    let telemetry = safealert_telemetry::TelemetryConfig::default()
        .with_level(level)
        .with_json(ctx.settings.logging.json);
    if let Err(e) = safealert_telemetry::init_with_config(telemetry) {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }

    let result = match cli.command {
        Commands::Nearby { position, radius, categories, input } => {
            nearby::run(&ctx, position, radius, &categories, input.as_deref()).await
        }

        Commands::Nearest { position, radius, categories, input } => {
            nearest::run(&ctx, position, radius, &categories, input.as_deref()).await
        }

        Commands::Panic { position, note, endpoint, radius } => {
            panic::run(&ctx, position, note, endpoint, radius).await
        }

        Commands::Send { position, place_id, radius, categories, input, endpoint, note } => {
            send::run(&ctx, position, &place_id, radius, &categories, input.as_deref(), endpoint, note).await
        }

        Commands::Watch { radius, categories } => session::run(&ctx, radius, &categories).await,

        Commands::Distance { from, to } => distance::run(&ctx, from, to),
    };

    tracing::debug!(
        session_id = safealert_telemetry::session_id(),
        metrics = %safealert_telemetry::metrics().export_json(),
        "Session finished"
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e, cli.format),
    }
}

/// Print `e` on stderr and map it to an exit code.
///
/// With `--format json`, coded errors are written as an error report.
fn report(e: &anyhow::Error, format: OutputFormat) -> ExitCode {
    let coded = e.downcast_ref::<safealert_core::Error>();

    match (format, coded) {
        (OutputFormat::Json, Some(err)) => match serde_json::to_string_pretty(&err.to_report()) {
            Ok(json) => eprintln!("{json}"),
            Err(_) => eprintln!("{} {:#}", "Error:".red().bold(), e),
        },
        _ => eprintln!("{} {:#}", "Error:".red().bold(), e),
    }

    let code = coded.map_or(safealert_core::error::exit_codes::FAILURE, safealert_core::Error::exit_code);
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
