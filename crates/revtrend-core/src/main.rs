//! revtrend CLI: import quarterly revenue report PDFs and query the store.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use revtrend_core::{batch, locator, quarter, series, RevenueStore};

#[derive(Parser)]
#[command(name = "revtrend")]
#[command(about = "Quarterly revenue PDF importer and store")]
#[command(version)]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true, default_value = "data/revenue.db")]
    db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import every PDF report found in a directory
    Import {
        /// Directory containing report PDFs
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// Export the store to CSV and/or JSON files
    Export {
        /// Write a CSV file to this path
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write a JSON file to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// List stored quarters with totals and growth rates
    List {
        /// Only the N chronologically latest quarters
        #[arg(long, conflicts_with = "range")]
        latest: Option<i64>,

        /// Inclusive bounds: start-year start-quarter end-year end-quarter
        #[arg(long, num_args = 4, value_names = ["START_YEAR", "START_QUARTER", "END_YEAR", "END_QUARTER"])]
        range: Option<Vec<i64>>,
    },

    /// Show import provenance, most recent first
    History,

    /// Print the release tag for the latest report in a directory
    Tag {
        /// Directory containing report PDFs
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "revtrend_core=debug,revtrend=debug"
    } else {
        "revtrend_core=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Import { data_dir } => cmd_import(&cli.db, &data_dir),
        Commands::Export { csv, json } => cmd_export(&cli.db, csv.as_deref(), json.as_deref()),
        Commands::List { latest, range } => cmd_list(&cli.db, latest, range.as_deref()),
        Commands::History => cmd_history(&cli.db),
        Commands::Tag { data_dir } => cmd_tag(&data_dir),
    }
}

fn cmd_import(db: &Path, data_dir: &Path) -> Result<()> {
    let mut store = RevenueStore::open(db)
        .with_context(|| format!("opening store at {}", db.display()))?;
    let report = batch::import_directory(&mut store, data_dir)
        .with_context(|| format!("importing from {}", data_dir.display()))?;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(rows) => println!("✓ {} ({rows} quarters)", outcome.filename),
            Err(e) => println!("✗ {}: {e}", outcome.filename),
        }
    }
    println!(
        "{} document(s) processed, {} quarter(s) inserted/updated, {} failure(s)",
        report.documents_processed(),
        report.rows_upserted,
        report.failures
    );
    Ok(())
}

fn cmd_export(db: &Path, csv: Option<&Path>, json: Option<&Path>) -> Result<()> {
    if csv.is_none() && json.is_none() {
        bail!("nothing to export: pass --csv and/or --json");
    }
    let store = RevenueStore::open(db)?;
    if let Some(path) = csv {
        store.export_csv(path)?;
        println!("✓ exported CSV to {}", path.display());
    }
    if let Some(path) = json {
        store.export_json(path)?;
        println!("✓ exported JSON to {}", path.display());
    }
    Ok(())
}

fn cmd_list(db: &Path, latest: Option<i64>, range: Option<&[i64]>) -> Result<()> {
    let store = RevenueStore::open(db)?;
    let records = match (latest, range) {
        (Some(n), _) => store.list_latest(n)?,
        (None, Some([sy, sq, ey, eq])) => store.list_range(*sy, *sq, *ey, *eq)?,
        (None, _) => store.list_all()?,
    };
    if records.is_empty() {
        println!("no quarters stored");
        return Ok(());
    }

    let view = series::build_series(&records);
    println!("{:<10} {:>14} {:>10}", "quarter", "total_revenue", "growth");
    for i in 0..view.quarters.len() {
        println!(
            "{:<10} {:>14} {:>10}",
            view.quarters[i], view.totals[i], view.growth_rates[i]
        );
    }
    Ok(())
}

fn cmd_history(db: &Path) -> Result<()> {
    let store = RevenueStore::open(db)?;
    let history = store.list_import_history()?;
    if history.is_empty() {
        println!("no imports recorded");
        return Ok(());
    }
    for record in history {
        println!(
            "{}: {} quarter(s), through FY{} (imported {})",
            record.pdf_filename,
            record.quarters_count,
            record.fiscal_year_max,
            record.imported_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

fn cmd_tag(data_dir: &Path) -> Result<()> {
    let latest = locator::latest_document(data_dir)?;
    let name = latest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let key = quarter::parse_quarter_key(&name);
    if key.is_sentinel() {
        bail!("latest report {name} has no recognizable quarter code");
    }
    println!("{key}");
    Ok(())
}
