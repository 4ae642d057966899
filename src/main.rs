//! Conciliator CLI - reconcile Dock, Matera and Depara exports
//!
//! # Main Commands
//!
//! ```bash
//! conciliator serve                                  # Start HTTP server (port 3000)
//! conciliator process --dock d.xlsx --matera m.csv --depara p.xlsm
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! conciliator inspect dock d.xlsx    # Show the cleaned table for one input
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use conciliator::{
    load_delimited, load_spreadsheet, normalize, pipeline, transform_dock, transform_matera,
    AnchorColumn, FirstRow, Table,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "conciliator")]
#[command(about = "Reconcile Dock, Matera and Depara exports into one workbook", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: three input files in, one workbook out
    Process {
        /// Dock ledger export (xlsx)
        #[arg(long)]
        dock: PathBuf,

        /// Matera settlement export (semicolon CSV)
        #[arg(long)]
        matera: PathBuf,

        /// Depara account mapping (xlsx/xlsm)
        #[arg(long)]
        depara: PathBuf,

        /// Output file (default: dock_matera_depara.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load and clean a single input, print its shape
    Inspect {
        /// Which input the file is
        kind: InputKind,

        /// Input file
        input: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputKind {
    Dock,
    Matera,
    Depara,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process {
            dock,
            matera,
            depara,
            output,
        } => cmd_process(&dock, &matera, &depara, output.as_deref()),

        Commands::Inspect { kind, input } => cmd_inspect(kind, &input),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_process(
    dock: &Path,
    matera: &Path,
    depara: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Dock:   {}", dock.display());
    eprintln!("📄 Matera: {}", matera.display());
    eprintln!("📄 Depara: {}", depara.display());

    let dock_bytes = fs::read(dock)?;
    let matera_bytes = fs::read(matera)?;
    let depara_bytes = fs::read(depara)?;

    let result = pipeline::run(&dock_bytes, &matera_bytes, &depara_bytes)?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(pipeline::OUTPUT_FILE_NAME));
    fs::write(&path, &result.workbook)?;

    eprintln!(
        "✅ {} written ({} Dock / {} Matera / {} Depara rows)",
        path.display(),
        result.summary.dock_rows,
        result.summary.matera_rows,
        result.summary.depara_rows
    );
    Ok(())
}

fn cmd_inspect(kind: InputKind, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔍 Inspecting: {}", input.display());
    let bytes = fs::read(input)?;

    let table = match kind {
        InputKind::Dock => {
            let raw = load_spreadsheet(&bytes)?;
            let mut table = normalize(&raw, &AnchorColumn { index: pipeline::HEADER_ANCHOR_COLUMN })?;
            transform_dock(&mut table);
            table
        }
        InputKind::Matera => {
            let raw = load_delimited(&bytes, pipeline::MATERA_DELIMITER)?;
            let mut table = normalize(&raw, &FirstRow)?;
            transform_matera(&mut table)?;
            table
        }
        InputKind::Depara => {
            let raw = load_spreadsheet(&bytes)?;
            normalize(&raw, &AnchorColumn { index: pipeline::HEADER_ANCHOR_COLUMN })?
        }
    };

    print_shape(&table);
    Ok(())
}

fn print_shape(table: &Table) {
    eprintln!("   Columns: {}", table.column_names().join(", "));
    eprintln!("✅ {} rows, {} columns", table.height(), table.width());

    for (i, column) in table.columns().enumerate().take(10) {
        let sample = column
            .cells()
            .iter()
            .take(3)
            .map(|c| c.as_ref().map_or("·".to_string(), |v| v.display()))
            .collect::<Vec<_>>()
            .join(" | ");
        eprintln!("   [{:2}] {}: {}", i + 1, column.name(), sample);
    }
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    conciliator::server::start_server(port).await
}
