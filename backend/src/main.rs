//! chainexport CLI - Export on-chain history as CSV
//!
//! # Main Commands
//!
//! ```bash
//! chainexport transactions 0xADDR            # Last 100 transactions as CSV
//! chainexport attestations 0xADDR --out-dir exports
//! chainexport prices                         # BTC / ETH / BNB / OP in USD
//! chainexport serve                          # Start HTTP server (port 3000)
//! ```
//!
//! # Offline Commands
//!
//! ```bash
//! chainexport convert records.json --shape transactions   # Project a JSON array
//! chainexport projection --shape attestations             # Show built-in projection
//! chainexport operations                                  # Show available operations
//! ```

use chainexport::source::{ticker_line, DEFAULT_TICKER};
use chainexport::{
    build_export_with_projection, export_attestations, export_transactions, operations_description,
    write_export, Config, ExportOptions, ExportResult, Projection, Quoting, RecordShape, Sources,
    SortOrder,
};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "chainexport")]
#[command(about = "Export account transactions and attestations as CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an account's transactions and export them as CSV
    Transactions {
        /// Account address
        address: String,

        /// Keep the first N records (0 keeps all; default from config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Order requested from the explorer
        #[arg(short, long, value_enum, default_value_t = SortOrder::Desc)]
        sort: SortOrder,

        /// Quote cells that contain delimiters
        #[arg(short, long)]
        quote: bool,

        /// Save as <address>_transactions.csv in this directory
        #[arg(long, conflicts_with = "output")]
        out_dir: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch the attestations made by an account and export them as CSV
    Attestations {
        /// Attester address
        address: String,

        /// Keep the first N records (0 keeps all; default from config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Quote cells that contain delimiters
        #[arg(short, long)]
        quote: bool,

        /// Save as <address>_attestations.csv in this directory
        #[arg(long, conflicts_with = "output")]
        out_dir: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Project a JSON array of records into CSV without fetching
    Convert {
        /// Input JSON file (array of records)
        input: PathBuf,

        /// Shape of the records
        #[arg(long, value_enum)]
        shape: RecordShape,

        /// Use a projection file instead of the built-in one
        #[arg(short, long)]
        projection: Option<PathBuf>,

        /// Quote cells that contain delimiters
        #[arg(short, long)]
        quote: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show current USD prices of the ticker assets
    Prices {
        /// Print JSON instead of a ticker line
        #[arg(long)]
        json: bool,
    },

    /// Show the built-in projection for a shape
    Projection {
        #[arg(long, value_enum)]
        shape: RecordShape,
    },

    /// Show available projection operations
    Operations,

    /// Start HTTP server
    Serve {
        /// Port to listen on (default from config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match Config::from_env() {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Transactions {
            address,
            limit,
            sort,
            quote,
            out_dir,
            output,
        } => {
            let options = export_options(&config, limit, quote);
            let sources = Sources::from_config(&config)?;
            let export = export_transactions(&sources.explorer, &address, sort, &options).await?;
            deliver(&export, out_dir.as_deref(), output.as_deref())
        }

        Commands::Attestations {
            address,
            limit,
            quote,
            out_dir,
            output,
        } => {
            let options = export_options(&config, limit, quote);
            let sources = Sources::from_config(&config)?;
            let export = export_attestations(&sources.attestations, &address, &options).await?;
            deliver(&export, out_dir.as_deref(), output.as_deref())
        }

        Commands::Convert {
            input,
            shape,
            projection,
            quote,
            output,
        } => cmd_convert(&input, shape, projection.as_deref(), quote, output.as_deref()),

        Commands::Prices { json } => {
            let sources = Sources::from_config(&config)?;
            let quotes = sources.prices.fetch_prices(DEFAULT_TICKER).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&quotes)?);
            } else {
                println!("{}", ticker_line(&quotes));
            }
            Ok(())
        }

        Commands::Projection { shape } => {
            println!("{}", Projection::for_shape(shape).to_json()?);
            Ok(())
        }

        Commands::Operations => {
            println!("{}", operations_description());
            Ok(())
        }

        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.port = port;
            }
            chainexport::server::start_server(config).await?;
            Ok(())
        }
    }
}

fn export_options(config: &Config, limit: Option<usize>, quote: bool) -> ExportOptions {
    let options = ExportOptions::from_config(config).with_quoting(quoting(quote));
    match limit {
        Some(limit) => options.with_limit(limit),
        None => options,
    }
}

fn quoting(quote: bool) -> Quoting {
    if quote {
        Quoting::Rfc4180
    } else {
        Quoting::Literal
    }
}

fn cmd_convert(
    input: &Path,
    shape: RecordShape,
    projection_path: Option<&Path>,
    quote: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Converting {} as {}", input.display(), shape);

    let content = fs::read_to_string(input)?;
    let records: Vec<Value> = serde_json::from_str(&content)?;

    let projection = match projection_path {
        Some(path) => {
            log::info!("Using projection {}", path.display());
            Projection::from_json(&fs::read_to_string(path)?)?
        }
        None => Projection::for_shape(shape),
    };

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("records");

    let options = ExportOptions {
        limit: None,
        quoting: quoting(quote),
    };
    let export = build_export_with_projection(stem, shape, &records, &projection, &options)?;
    write_output(&export.csv, output)
}

fn deliver(
    export: &ExportResult,
    out_dir: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    match out_dir {
        Some(dir) => {
            let path = write_export(dir, export)?;
            eprintln!("{}", path.display());
            Ok(())
        }
        None => write_output(&export.csv, output),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            log::info!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
