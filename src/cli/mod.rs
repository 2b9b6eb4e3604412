//! Command-line parsing for the quarterly housing series aligner.
//!
//! Argument parsing stays here; command dispatch lives in `app`.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::DEFAULT_DOWN_PAYMENT;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "hs",
    version,
    about = "Quarterly CPI, median sales price and 30-year mortgage rate, aligned (FRED-based)"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the dataset, print the summary, highlights and the latest rows.
    Report(ReportArgs),
    /// Print the complete record table only (useful for scripting).
    Table(SourceArgs),
    /// Show every field for one quarter, e.g. `hs quarter "2008 Q3"`.
    Quarter(QuarterArgs),
    /// Evaluate the monthly payment formula directly.
    Payment(PaymentArgs),
    /// Print the table from a previously exported dataset JSON.
    Show(ShowArgs),
}

/// Where to read each series from, and how to derive payments.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// CPI source (URL or CSV path). Falls back to `HS_CPI_SOURCE`, then FRED.
    #[arg(long, value_name = "SOURCE")]
    pub cpi: Option<String>,

    /// Median sales price source (URL or CSV path). Falls back to `HS_MSP_SOURCE`, then FRED.
    #[arg(long, value_name = "SOURCE")]
    pub msp: Option<String>,

    /// 30-year mortgage rate source (URL or CSV path). Falls back to `HS_M30_SOURCE`, then FRED.
    #[arg(long, value_name = "SOURCE")]
    pub m30: Option<String>,

    /// Down payment as a fraction of the price, in [0, 1).
    #[arg(long, default_value_t = DEFAULT_DOWN_PAYMENT)]
    pub down_payment: f64,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of most recent quarters to print (0 prints all).
    #[arg(long, default_value_t = 12)]
    pub rows: usize,

    /// Export merged records to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the dataset (settings + records) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Write a markdown debug bundle under `debug/`.
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Args, Clone)]
pub struct QuarterArgs {
    /// Quarter label (`2008 Q3`, `2008q3`) or any ISO date inside it.
    pub label: String,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args, Clone)]
pub struct PaymentArgs {
    /// Sales price.
    #[arg(long)]
    pub price: f64,

    /// Annual mortgage rate as a fraction (0.065 for 6.5%).
    #[arg(long)]
    pub rate: f64,

    /// Down payment as a fraction of the price, in [0, 1).
    #[arg(long, default_value_t = DEFAULT_DOWN_PAYMENT)]
    pub down_payment: f64,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Dataset JSON file produced by `hs report --export-json`.
    #[arg(long, value_name = "JSON")]
    pub dataset: PathBuf,

    /// Number of most recent quarters to print (0 prints all).
    #[arg(long, default_value_t = 0)]
    pub rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_flags() {
        let cli = Cli::parse_from([
            "hs", "-vv", "report", "--cpi", "cpi.csv", "--rows", "0", "--down-payment", "0.1", "--debug",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.source.cpi.as_deref(), Some("cpi.csv"));
        assert_eq!(args.source.msp, None);
        assert_eq!(args.rows, 0);
        assert_eq!(args.source.down_payment, 0.1);
        assert!(args.debug);
    }

    #[test]
    fn quarter_takes_a_positional_label() {
        let cli = Cli::parse_from(["hs", "quarter", "2008 Q3"]);
        let Command::Quarter(args) = cli.command else {
            panic!("expected quarter");
        };
        assert_eq!(args.label, "2008 Q3");
        assert_eq!(args.source.down_payment, DEFAULT_DOWN_PAYMENT);
    }
}
