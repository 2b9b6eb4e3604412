//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments and initializes logging
//! - resolves source locations into a `BuildConfig`
//! - builds the aligned dataset
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, PaymentArgs, QuarterArgs, ReportArgs, ShowArgs, SourceArgs};
use crate::data::resolve_location;
use crate::domain::{BuildConfig, Dataset, Period, SeriesId, SourceSpec};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `hs` binary.
pub fn run() -> Result<(), AppError> {
    // `hs` and `hs --cpi x.csv` behave like `hs report ...`; clap needs the
    // subcommand name, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_tracing(cli.verbose);
    dotenvy::dotenv().ok();

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Table(args) => handle_table(args),
        Command::Quarter(args) => handle_quarter(args),
        Command::Payment(args) => handle_payment(args),
        Command::Show(args) => handle_show(args),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = build_config_from_args(&args);
    let dataset = pipeline::build_dataset(&config)?;
    let highlights = crate::report::compute_highlights(&dataset);

    println!("{}", crate::report::format_run_summary(&dataset, &highlights));
    println!(
        "{}",
        crate::report::format_table(crate::report::tail(&dataset.records, config.rows))
    );

    if let Some(path) = &config.export_csv {
        crate::io::export::write_records_csv(path, &dataset.records)?;
        info!(path = %path.display(), "wrote csv export");
    }
    if let Some(path) = &config.export_json {
        crate::io::dataset::write_dataset_json(path, &dataset)?;
        info!(path = %path.display(), "wrote dataset json");
    }
    if config.debug {
        let path = crate::debug::write_debug_bundle(&dataset)?;
        eprintln!("Debug bundle written to {}", path.display());
    }

    Ok(())
}

fn handle_table(args: SourceArgs) -> Result<(), AppError> {
    let dataset = build(&args)?;
    print!("{}", crate::report::format_table(&dataset.records));
    Ok(())
}

fn handle_quarter(args: QuarterArgs) -> Result<(), AppError> {
    let period: Period = args.label.parse().map_err(|e: String| AppError::new(2, e))?;
    let dataset = build(&args.source)?;

    let record = dataset.find(period).ok_or_else(|| {
        let window = match (dataset.first_period(), dataset.last_period()) {
            (Some(first), Some(last)) => format!("{first} to {last}"),
            _ => "empty".to_string(),
        };
        AppError::new(3, format!("Quarter {period} is outside the merged window ({window})."))
    })?;

    print!("{}", crate::report::format_quarter(record, &dataset));
    Ok(())
}

fn handle_payment(args: PaymentArgs) -> Result<(), AppError> {
    pipeline::validate_down_payment(args.down_payment)?;
    if !(args.price.is_finite() && args.price >= 0.0) {
        return Err(AppError::new(2, format!("Price must be non-negative, got {}.", args.price)));
    }
    if !args.rate.is_finite() {
        return Err(AppError::new(2, format!("Rate must be finite, got {}.", args.rate)));
    }

    let payment = crate::math::monthly_payment(args.price, args.rate, args.down_payment);
    print!(
        "{}",
        crate::report::format_payment(args.price, args.rate, args.down_payment, payment)
    );
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let dataset = crate::io::dataset::read_dataset_json(&args.dataset)?;
    print!(
        "{}",
        crate::report::format_table(crate::report::tail(&dataset.records, args.rows))
    );
    Ok(())
}

fn build(source: &SourceArgs) -> Result<Dataset, AppError> {
    let config = BuildConfig {
        sources: source_specs(source),
        down_payment: source.down_payment,
        rows: 0,
        export_csv: None,
        export_json: None,
        debug: false,
    };
    pipeline::build_dataset(&config)
}

pub fn build_config_from_args(args: &ReportArgs) -> BuildConfig {
    BuildConfig {
        sources: source_specs(&args.source),
        down_payment: args.source.down_payment,
        rows: args.rows,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
        debug: args.debug,
    }
}

fn source_specs(source: &SourceArgs) -> Vec<SourceSpec> {
    SeriesId::ALL
        .into_iter()
        .map(|series| {
            let explicit = match series {
                SeriesId::Cpi => source.cpi.as_deref(),
                SeriesId::Msp => source.msp.as_deref(),
                SeriesId::M30 => source.m30.as_deref(),
            };
            SourceSpec {
                series,
                location: resolve_location(series, explicit),
            }
        })
        .collect()
}

/// Rewrite argv so `hs` defaults to `hs report`.
///
/// Rules:
/// - `hs`                      -> `hs report`
/// - `hs --cpi c.csv ...`      -> `hs report --cpi c.csv ...`
/// - `hs --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "report" | "table" | "quarter" | "payment" | "show"
    );
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    argv
}
