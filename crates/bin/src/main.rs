//! SectorLens CLI binary.
//!
//! Provides command-line access to the sector and company analytics.

mod commands;
mod logging;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use sectorlens::output::{ExportDataset, ExportFormat};
use sectorlens::{SectorLens, Settings, load_dotenv};
use std::path::PathBuf;
use std::process;
use tracing::debug;

#[derive(Parser)]
#[command(name = "sectorlens")]
#[command(about = "SectorLens: sector and company position analytics", long_about = None)]
#[command(version)]
struct Cli {
    /// Fact store path (overrides configuration)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Configuration file (defaults to ./sectorlens.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Processing date for the trailing-year window (YYYY-MM-DD)
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load company, position and price CSV files into the fact store
    Load {
        /// Company CSV (id,ticker,sector_name)
        #[arg(long)]
        company: PathBuf,

        /// Position CSV (company_id,date,shares)
        #[arg(long)]
        position: PathBuf,

        /// Price CSV (company_id,date,close_usd)
        #[arg(long)]
        price: PathBuf,

        /// Delete every stored row before loading
        #[arg(long)]
        replace: bool,
    },

    /// Top 10 sectors by total position over a date range
    Sectors {
        /// Range start (defaults to range end minus the configured days)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Range end (defaults to the latest position date)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Sector to compare; repeat for several, "All" for every sector
        #[arg(long = "sector", default_value = "All")]
        sectors: Vec<String>,
    },

    /// Top 25% companies by trailing-year average position
    Companies {
        /// Keep only these sectors; "All" keeps every sector
        #[arg(long = "sector", default_value = "All")]
        sectors: Vec<String>,

        /// Case-insensitive search over ticker and sector name
        #[arg(long)]
        search: Option<String>,
    },

    /// Close price history with summary statistics
    Series {
        /// Tickers to show (defaults to the first ticker)
        tickers: Vec<String>,
    },

    /// List distinct sectors and tickers
    List {
        /// Only list sectors
        #[arg(long, conflicts_with = "tickers")]
        sectors: bool,

        /// Only list tickers
        #[arg(long)]
        tickers: bool,
    },

    /// Show the latest position and price dates
    LatestDate,

    /// Export a result table to a file
    Export {
        /// Table to export
        dataset: DatasetArg,

        /// Ticker for the series export
        #[arg(long, required_if_eq("dataset", "series"))]
        ticker: Option<String>,

        /// Range start for the sector export
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Range end for the sector export
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Sectors for the sector export
        #[arg(long = "sector", default_value = "All")]
        sectors: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
        format: FormatArg,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Render every dashboard view with default selections
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DatasetArg {
    TopSectors,
    TopCompanies,
    Series,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
    PrettyJson,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => Self::Csv,
            FormatArg::Json => Self::Json,
            FormatArg::PrettyJson => Self::PrettyJson,
        }
    }
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    load_dotenv()?;
    let mut settings = Settings::load(cli.config.as_deref())?;
    apply_overrides(&mut settings, cli.db, cli.as_of);

    let app = SectorLens::new(settings);
    let output = commands::Output { json: cli.json };

    match cli.command {
        Commands::Load {
            company,
            position,
            price,
            replace,
        } => {
            commands::load(&app, company, position, price, replace)?;
        }
        Commands::Sectors {
            start,
            end,
            sectors,
        } => {
            commands::sectors(&app, output, start, end, &sectors)?;
        }
        Commands::Companies { sectors, search } => {
            commands::companies(&app, output, &sectors, search.as_deref())?;
        }
        Commands::Series { tickers } => {
            commands::series(&app, output, tickers)?;
        }
        Commands::List { sectors, tickers } => {
            commands::list(&app, output, sectors || !tickers, tickers || !sectors)?;
        }
        Commands::LatestDate => {
            commands::latest_date(&app, output)?;
        }
        Commands::Export {
            dataset,
            ticker,
            start,
            end,
            sectors,
            format,
            out,
        } => {
            let dataset = match dataset {
                DatasetArg::TopSectors => ExportDataset::TopSectors,
                DatasetArg::TopCompanies => ExportDataset::TopCompanies,
                DatasetArg::Series => ExportDataset::Series(ticker.unwrap_or_default()),
            };
            commands::export(&app, dataset, format.into(), start, end, &sectors, &out)?;
        }
        Commands::Dashboard => {
            commands::dashboard(&app, output)?;
        }
    }

    Ok(())
}

/// Command-line flags take precedence over configured values.
fn apply_overrides(settings: &mut Settings, db: Option<PathBuf>, as_of: Option<NaiveDate>) {
    if let Some(db) = db {
        settings.database_path = db;
    }
    if as_of.is_some() {
        settings.as_of = as_of;
    }
    debug!(
        db = %settings.database_path.display(),
        as_of = ?settings.as_of,
        range_days = settings.default_range_days,
        "settings resolved"
    );
}
