//! dwcexport CLI - Raw occurrence JSON to Darwin Core CSV
//!
//! # Main Command
//!
//! ```bash
//! dwcexport export memory/raw.json -o memory/occurrences.csv -c config
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! dwcexport extract memory/raw.json      # Print the extracted occurrence list
//! dwcexport normalize memory/raw.json    # Print normalized records as JSON
//! dwcexport fields -c config             # Show the effective configuration
//! ```

use clap::{ArgAction, Parser, Subcommand};
use dwcexport::config::CONFIG_DIR_ENV;
use dwcexport::logs::init_logging;
use dwcexport::{
    dwc_normalize_to_csv, find_occurrence_list, normalize_all, read_raw_json, ExportConfig,
    ExportOptions, PipelineOutcome,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dwcexport")]
#[command(about = "Normalize raw occurrence records into a Darwin Core / GBIF CSV", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: raw JSON → Darwin Core CSV
    Export {
        /// Raw occurrence JSON file
        input: PathBuf,

        /// CSV file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Directory with dwc_core_fields.json / basis_of_record_map.json
        #[arg(short, long, env = CONFIG_DIR_ENV)]
        config_dir: Option<PathBuf>,
    },

    /// Print the occurrence list found in a raw JSON file
    Extract {
        /// Raw occurrence JSON file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print normalized Darwin Core records as JSON
    Normalize {
        /// Raw occurrence JSON file
        input: PathBuf,

        /// Directory with dwc_core_fields.json / basis_of_record_map.json
        #[arg(short, long, env = CONFIG_DIR_ENV)]
        config_dir: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective core columns and basis-of-record map
    Fields {
        /// Directory with dwc_core_fields.json / basis_of_record_map.json
        #[arg(short, long, env = CONFIG_DIR_ENV)]
        config_dir: Option<PathBuf>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Export {
            input,
            output,
            config_dir,
        } => cmd_export(input, output, config_dir),

        Commands::Extract { input, output } => cmd_extract(&input, output.as_deref()),

        Commands::Normalize {
            input,
            config_dir,
            output,
        } => cmd_normalize(&input, config_dir.as_deref(), output.as_deref()),

        Commands::Fields { config_dir } => cmd_fields(config_dir.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_export(
    input: PathBuf,
    output: PathBuf,
    config_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = ExportOptions::new(input, output);
    options.config_dir = config_dir;

    match dwc_normalize_to_csv(&options)? {
        PipelineOutcome::Exported { path, summary } => {
            eprintln!("✓ CSV written: {}", path.display());
            eprintln!("   {}", summary.summary());
        }
        PipelineOutcome::NoOccurrences => {
            eprintln!("⚠️  No occurrences detected, no file written.");
        }
    }
    Ok(())
}

fn cmd_extract(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let occurrences = find_occurrence_list(read_raw_json(input)?);
    eprintln!("📄 {} occurrence entries in {}", occurrences.len(), input.display());

    let json = serde_json::to_string_pretty(&occurrences)?;
    write_output(&json, output)
}

fn cmd_normalize(
    input: &Path,
    config_dir: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let occurrences = find_occurrence_list(read_raw_json(input)?);
    let config = ExportConfig::load(config_dir);
    let batch = normalize_all(&occurrences, &config.basis_of_record);

    eprintln!(
        "⚙️  Normalized {} records ({} skipped)",
        batch.records.len(),
        batch.skipped.len()
    );

    let normalized: Vec<_> = batch.normalized().collect();
    let json = serde_json::to_string_pretty(&normalized)?;
    write_output(&json, output)
}

fn cmd_fields(config_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = ExportConfig::load(config_dir);

    eprintln!("📋 Core fields ({}): {}", config.fields.len(), config.fields_source.describe());
    eprintln!(
        "📋 basisOfRecord map ({}): {}",
        config.basis_of_record.len(),
        config.basis_of_record_source.describe()
    );

    let json = serde_json::to_string_pretty(&serde_json::json!({
        "fields": config.fields,
        "basisOfRecord": config.basis_of_record,
    }))?;
    println!("{}", json);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
