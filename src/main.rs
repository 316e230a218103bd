//! CLI entry point for the listing analysis pipeline.

use carlens::error::AnalysisError;
use carlens::reporting::{self, ReportGenerator};
use carlens::{
    DatasetProfiler, EmptyColumnPolicy, Pipeline, PipelineConfig, ZeroKmPolicy, loader,
};
use clap::{Parser, ValueEnum};

/// CLI-compatible zero-km policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliZeroKmPolicy {
    /// Leave price_per_km missing for km = 0 records
    Null,
    /// Remove km = 0 records before derivation
    Drop,
}

impl From<CliZeroKmPolicy> for ZeroKmPolicy {
    fn from(cli: CliZeroKmPolicy) -> Self {
        match cli {
            CliZeroKmPolicy::Null => ZeroKmPolicy::Null,
            CliZeroKmPolicy::Drop => ZeroKmPolicy::Drop,
        }
    }
}

/// CLI-compatible empty-column policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEmptyColumnPolicy {
    /// Skip the column with a warning
    Skip,
    /// Abort the run with an imputation error
    Fail,
}

impl From<CliEmptyColumnPolicy> for EmptyColumnPolicy {
    fn from(cli: CliEmptyColumnPolicy) -> Self {
        match cli {
            CliEmptyColumnPolicy::Skip => EmptyColumnPolicy::Skip,
            CliEmptyColumnPolicy::Fail => EmptyColumnPolicy::Fail,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory analysis for used-car listings",
    long_about = "Analyzes a CSV of used-car listings: drops rows missing price or km,\n\
                  mean-imputes the secondary numeric columns, removes duplicates, derives\n\
                  price_per_km, aggregates by seats/transmission/brand and renders charts.\n\n\
                  EXAMPLES:\n  \
                  # Analyze output.csv, write charts under ./outputs\n  \
                  carlens\n\n  \
                  # Custom input, five brands in the table, no charts\n  \
                  carlens -i listings.csv -n 5 --no-charts\n\n  \
                  # Machine-readable output\n  \
                  carlens --json | jq .cleaning\n\n  \
                  # Overview only\n  \
                  carlens --dry-run"
)]
struct Args {
    /// Path to the listings CSV file
    #[arg(short, long, default_value = "output.csv")]
    input: String,

    /// Output directory for charts and reports
    #[arg(short, long, default_value = "./outputs")]
    output_dir: String,

    /// Number of brands shown in the brand summary table
    #[arg(short = 'n', long, default_value_t = 10)]
    top_brands: usize,

    /// How records with km = 0 are handled when deriving price_per_km
    #[arg(long, value_enum, default_value = "null")]
    zero_km: CliZeroKmPolicy,

    /// How an imputation column with no observed values is handled
    #[arg(long, value_enum, default_value = "skip")]
    empty_column: CliEmptyColumnPolicy,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Output JSON to stdout instead of the human-readable report
    ///
    /// Logs move to stderr so stdout stays machine-readable.
    /// Useful for piping to other tools: `carlens --json | jq .cleaning`
    #[arg(long)]
    json: bool,

    /// Write the analysis report to the output directory
    ///
    /// The report is saved as analysis_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress the console report (warnings still log)
    #[arg(short, long)]
    quiet: bool,

    /// Load the file and print the overview only, without cleaning or charts
    #[arg(long)]
    dry_run: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` overrides the `--log-level` flag; `--quiet` caps the level at
/// warn. With `--json`, diagnostics are routed to stderr so stdout carries
/// nothing but the report.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if json_output {
        builder.with_writer(std::io::stderr).init();
    } else {
        builder.init();
    }
}

fn main() {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if let Err(e) = run(&args) {
        report_failure(&e, args.json);
        std::process::exit(if e.is_usage_error() { 2 } else { 1 });
    }
}

fn run(args: &Args) -> Result<(), AnalysisError> {
    let config = PipelineConfig::builder()
        .input_path(&args.input)
        .output_dir(&args.output_dir)
        .top_brands(args.top_brands)
        .zero_km_policy(args.zero_km.into())
        .empty_column_policy(args.empty_column.into())
        .render_charts(!args.no_charts)
        .emit_report(args.emit_report)
        .build()?;

    if args.dry_run {
        return run_overview_only(&config);
    }

    let pipeline = Pipeline::builder().config(config).build()?;
    let result = pipeline.run()?;

    let report = ReportGenerator::build_report(&args.input, &result);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !args.quiet {
        reporting::print_console_report(&report, args.top_brands);
    }

    Ok(())
}

/// Load the input and print the overview, running no mutation stage.
fn run_overview_only(config: &PipelineConfig) -> Result<(), AnalysisError> {
    let df = loader::load_listings(&config.input_path, config)?;
    let overview = DatasetProfiler::overview(&df)?;

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Overview only, no cleaning or charts");
    println!("{}", "=".repeat(80));

    reporting::print_overview(&overview, &config.input_path.display().to_string());

    println!("{}", "=".repeat(80));
    println!("To run the full analysis, run without --dry-run");
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Report a fatal error in the format the selected output mode expects.
fn report_failure(error: &AnalysisError, json_output: bool) {
    if json_output {
        let envelope = serde_json::json!({ "error": error });
        match serde_json::to_string_pretty(&envelope) {
            Ok(body) => println!("{}", body),
            Err(_) => eprintln!("Error: {}", error),
        }
    } else {
        eprintln!("Error: {}", error);
    }
}
