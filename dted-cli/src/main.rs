use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// DTED elevation data CLI tool
#[derive(Parser)]
#[command(name = "dted")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing DTED tiles
    #[arg(short, long, env = "DTED_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Maximum parsed tiles in cache
    #[arg(
        short,
        long,
        env = "DTED_CACHE_SIZE",
        default_value = "100",
        global = true
    )]
    cache_size: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query height above ellipsoid for a single coordinate
    ///
    /// A point with no covering tile prints `no tile` (`"hae": null` with
    /// --json) rather than the geoid offset alone.
    Query {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Treat void postings as 0 m instead of -32767
        #[arg(short, long)]
        ignore_voids: bool,

        /// Constant geoid separation in meters
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        geoid_offset: f64,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add heights to every coordinate of a CSV file
    ///
    /// Rows with no covering tile get `no tile` in the `hae` column rather
    /// than the geoid offset alone.
    Batch {
        /// Input CSV file
        input: PathBuf,

        /// Output file (defaults to <input>_elevation.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column name for latitude
        #[arg(long, default_value = "lat")]
        lat_col: String,

        /// Column name for longitude
        #[arg(long, default_value = "lon")]
        lon_col: String,

        /// Treat void postings as 0 m instead of -32767
        #[arg(short, long)]
        ignore_voids: bool,

        /// Constant geoid separation in meters
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        geoid_offset: f64,
    },

    /// Display information about a DTED tile
    Info {
        /// Path to a DTED file
        tile: PathBuf,
    },

    /// List DTED tiles under the data directory
    List,

    /// Report void postings in files or directories as JSON
    Voids {
        /// Files or directories to scan
        #[arg(required = true)]
        targets: Vec<PathBuf>,

        /// Include the (columns, rows) of every void posting
        #[arg(long)]
        indices: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dted=info,dted_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Query {
            lat,
            lon,
            ignore_voids,
            geoid_offset,
            json,
        } => commands::query::run(
            cli.data_dir,
            cli.cache_size,
            lat,
            lon,
            ignore_voids,
            geoid_offset,
            json,
        ),
        Commands::Batch {
            input,
            output,
            lat_col,
            lon_col,
            ignore_voids,
            geoid_offset,
        } => commands::batch::run(
            cli.data_dir,
            cli.cache_size,
            input,
            output,
            lat_col,
            lon_col,
            ignore_voids,
            geoid_offset,
        ),
        Commands::Info { tile } => commands::info::run(tile),
        Commands::List => commands::list::run(cli.data_dir, cli.cache_size),
        Commands::Voids { targets, indices } => commands::voids::run(targets, indices),
    }
}
