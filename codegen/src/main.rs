//! Refgen CLI - Generate Rust table sources from reference data
//!
//! # Commands
//!
//! ```bash
//! refgen markets "April 2019" ISO10383_MIC.xls   # MIC registry
//! refgen naics 2-6_digit_2017_Codes.csv          # NAICS codes
//! refgen sic sic_codes.csv                       # US SIC codes
//! refgen layout naics > naics.json               # Dump a default layout
//! ```
//!
//! Generated code goes to stdout (or `--output`); logs go to stderr and
//! follow `RUST_LOG`.

use clap::{Parser, Subcommand, ValueEnum};
use refdata::transform::layout::{CodeLayout, MarketLayout, OnInvalidRow, StatusPolicy};
use refdata::{generate_codes, generate_markets, CodeOptions, GenerateResult, GeneratedFile, MarketOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "refgen")]
#[command(about = "Generate Rust table literals from MIC registry and industry code files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the market table from the ISO 10383 MIC registry
    Markets {
        /// When the registry was fetched, shown in the header comment
        fetched: String,

        /// Registry workbook or CSV export
        input: PathBuf,

        /// Layout JSON file (default: the published registry layout)
        #[arg(short, long)]
        layout: Option<PathBuf>,

        /// What an unrecognized status becomes
        #[arg(long, value_enum, default_value_t = StatusPolicy::Fallback)]
        unknown_status: StatusPolicy,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Generate the NAICS code table
    Naics {
        /// NAICS code list (CSV or workbook)
        input: PathBuf,

        #[command(flatten)]
        codes: CodeArgs,
    },

    /// Generate the US SIC code table
    Sic {
        /// SIC code list (CSV or workbook)
        input: PathBuf,

        #[command(flatten)]
        codes: CodeArgs,
    },

    /// Print a default layout as JSON
    Layout {
        #[arg(value_enum)]
        kind: LayoutKind,
    },
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Skip invalid rows instead of stopping at the first one
    #[arg(long)]
    skip_invalid: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct CodeArgs {
    /// Layout JSON file (default: the published file layout)
    #[arg(short, long)]
    layout: Option<PathBuf>,

    /// When the file was fetched; adds the header comment
    #[arg(long)]
    fetched: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutKind {
    Markets,
    Naics,
    Sic,
}

impl CommonArgs {
    fn on_invalid(&self) -> OnInvalidRow {
        if self.skip_invalid {
            OnInvalidRow::Skip
        } else {
            OnInvalidRow::Abort
        }
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Markets {
            fetched,
            input,
            layout,
            unknown_status,
            common,
        } => cmd_markets(fetched, &input, layout.as_deref(), unknown_status, &common),

        Commands::Naics { input, codes } => cmd_codes(&input, CodeLayout::naics, &codes),

        Commands::Sic { input, codes } => cmd_codes(&input, CodeLayout::us_sic, &codes),

        Commands::Layout { kind } => cmd_layout(kind),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_markets(
    fetched: String,
    input: &Path,
    layout: Option<&Path>,
    unknown_status: StatusPolicy,
    common: &CommonArgs,
) -> GenerateResult<()> {
    info!("reading registry: {}", input.display());

    let layout = match layout {
        Some(path) => MarketLayout::from_file(path)?,
        None => MarketLayout::default(),
    };

    let mut options = MarketOptions::new(layout);
    options.status_policy = unknown_status;
    options.on_invalid = common.on_invalid();
    options.fetched = Some(fetched);

    let generated = generate_markets(input, &options)?;
    finish(&generated, common.output.as_deref())
}

fn cmd_codes(input: &Path, default_layout: fn() -> CodeLayout, args: &CodeArgs) -> GenerateResult<()> {
    info!("reading codes: {}", input.display());

    let layout = match &args.layout {
        Some(path) => CodeLayout::from_file(path)?,
        None => default_layout(),
    };

    let mut options = CodeOptions::new(layout);
    options.on_invalid = args.common.on_invalid();
    options.fetched = args.fetched.clone();

    let generated = generate_codes(input, &options)?;
    finish(&generated, args.common.output.as_deref())
}

fn cmd_layout(kind: LayoutKind) -> GenerateResult<()> {
    let json = match kind {
        LayoutKind::Markets => MarketLayout::default().to_json()?,
        LayoutKind::Naics => CodeLayout::naics().to_json()?,
        LayoutKind::Sic => CodeLayout::us_sic().to_json()?,
    };
    println!("{}", json);
    Ok(())
}

fn finish(generated: &GeneratedFile, output: Option<&Path>) -> GenerateResult<()> {
    info!(
        records = generated.record_count,
        skipped = generated.skipped.len(),
        "generated table"
    );
    write_output(&generated.source, output)
}

fn write_output(content: &str, path: Option<&Path>) -> GenerateResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            info!("output written to: {}", p.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
