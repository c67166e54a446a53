use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use payment_advice_to_csv::{
    AmountErrorPolicy, ConversionReport, ExtractOptions, FieldPresence, GridFormat, OutputLayout,
    PageSelection, convert_pdf_to_csv, dump_grid, dump_grid_to_path, format_amount, load_document,
    normalize_path_input,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pdf2csv",
    version,
    about = "Convert supplier payment advice PDFs into CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract supplier, payment and line-item data and write CSV.
    Convert(ConvertArgs),
    /// Print the detected table grid as tabula-style JSON.
    Grid(GridArgs),
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Grid source format: auto, pdf or tabula-json.
    #[arg(long, default_value = "auto")]
    format: String,

    /// Page selection like 1-3,5.
    #[arg(long)]
    pages: Option<String>,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Input PDF (or tabula JSON) path. Prompted for when omitted.
    #[arg(short, long)]
    input: Option<String>,

    /// Output CSV path. Prompted for when omitted.
    #[arg(short, long)]
    output: Option<String>,

    #[command(flatten)]
    source: SourceArgs,

    /// Require non-empty supplier, payment and line-item cells.
    #[arg(long)]
    strict_fields: bool,

    /// Fail instead of skipping gross amounts that do not parse.
    #[arg(long)]
    abort_on_bad_amount: bool,

    /// Write supplier and payment details as leading rows instead of
    /// repeating them on every line item.
    #[arg(long)]
    separate: bool,

    /// Leading rows of every table that are never line items.
    #[arg(long, default_value_t = 3)]
    header_rows: usize,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct GridArgs {
    /// Input PDF (or tabula JSON) path.
    #[arg(short, long)]
    input: String,

    /// Write JSON here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    source: SourceArgs,
}

fn parse_source_options(source: &SourceArgs) -> Result<ExtractOptions> {
    let format = GridFormat::from_str(&source.format)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --format")?;
    let pages = source
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid page selection: {error}"))
        .context("failed to parse --pages")?;

    Ok(ExtractOptions {
        pages,
        format,
        ..ExtractOptions::default()
    })
}

fn parse_options(args: &ConvertArgs) -> Result<ExtractOptions> {
    let source = parse_source_options(&args.source)?;

    Ok(ExtractOptions {
        field_presence: if args.strict_fields {
            FieldPresence::Strict
        } else {
            FieldPresence::Lenient
        },
        amount_errors: if args.abort_on_bad_amount {
            AmountErrorPolicy::Abort
        } else {
            AmountErrorPolicy::SkipAndWarn
        },
        layout: if args.separate {
            OutputLayout::Separate
        } else {
            OutputLayout::Merged
        },
        header_rows: args.header_rows,
        ..source
    })
}

fn prompt_path(prompt: &str) -> Result<PathBuf> {
    println!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read path from stdin")?;
    let path = normalize_path_input(&line);
    if path.as_os_str().is_empty() {
        anyhow::bail!("no path entered");
    }
    Ok(path)
}

fn resolve_path(value: Option<&str>, prompt: &str) -> Result<PathBuf> {
    match value {
        Some(value) => Ok(normalize_path_input(value)),
        None => prompt_path(prompt),
    }
}

fn log_report(report: &ConversionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} page={:?} table_id={:?} row={:?}: {}",
                warning.code, warning.page, warning.table_id, warning.row, warning.message
            );
        }
    }
}

fn run_convert(args: &ConvertArgs) -> Result<PathBuf> {
    let options = parse_options(args)?;
    let input = resolve_path(args.input.as_deref(), "Enter PDF file path:")?;
    let output = resolve_path(args.output.as_deref(), "Enter output CSV file path:")?;

    let report = convert_pdf_to_csv(&input, &output, &options)
        .with_context(|| format!("failed to convert '{}'", input.display()))?;
    log_report(&report, args.verbose);
    if args.verbose {
        eprintln!(
            "{} line item(s) from {} table(s), total {}",
            report.row_count,
            report.table_count,
            format_amount(report.total)
        );
    }

    Ok(output)
}

fn run_grid(args: &GridArgs) -> Result<()> {
    let options = parse_source_options(&args.source)?;
    let input = normalize_path_input(&args.input);
    let document = load_document(&input, &options)
        .with_context(|| format!("failed to read tables from '{}'", input.display()))?;

    match &args.output {
        Some(path) => dump_grid_to_path(&document, path)
            .with_context(|| format!("failed to write '{}'", path.display()))?,
        None => dump_grid(&document, io::stdout().lock())?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("payment_advice_to_csv=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Convert(args) => run_convert(args).map(|output| {
            println!(
                "Table data successfully converted to CSV: {}",
                output.display()
            );
        }),
        Commands::Grid(args) => run_grid(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
