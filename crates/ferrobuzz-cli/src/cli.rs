//! CLI argument definitions for ferrobuzz.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `count` | Count watch-list mentions in forum posts and comments |
//! | `zscores` | Show a symbol's daily mention counts and z-scores |
//! | `prices` | Fetch daily closes and their movement labels |
//! | `analyze` | Cross-validate mention z-scores against price moves |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--config` | none | YAML configuration file |
//! | `--log-level` | `RUST_LOG` or `warn` | Log filter written to stderr |
//!
//! # Examples
//!
//! ```bash
//! # Build the mention table
//! ferrobuzz count --posts posts.csv --comments comments.csv --symbols GME,AMC --out mentions.csv
//!
//! # Analyze against offline prices
//! ferrobuzz analyze --mentions mentions.csv --prices-dir prices/ GME AMC
//!
//! # Analyze against Alpha Vantage
//! FERROBUZZ_ALPHAVANTAGE_API_KEY=... ferrobuzz analyze --mentions mentions.csv GME --format json
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ferrobuzz_core::OutputSize;

/// Forum mention z-scores versus daily price moves.
#[derive(Debug, Parser)]
#[command(
    name = "ferrobuzz",
    author,
    version,
    about = "Forum mention z-scores versus daily price moves",
    long_about = "ferrobuzz counts ticker mentions in forum posts, standardizes them per symbol \
and checks with a cross-validated KNN classifier whether a day's mention z-score says anything \
about that day's price move.\n\
\n\
Use 'ferrobuzz <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// YAML configuration file layered over the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter such as `info` or `ferrobuzz_core=debug`. Overrides `RUST_LOG`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Count watch-list mentions per symbol and day.
    Count(CountArgs),
    /// Show daily mention counts and z-scores for one symbol.
    Zscores(ZscoresArgs),
    /// Fetch daily closes and label day-over-day moves.
    Prices(PricesArgs),
    /// Run the cross-validated classifier for one or more symbols.
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Args)]
pub struct CountArgs {
    /// Posts CSV (`id,title,body,flair,created_utc`).
    #[arg(long)]
    pub posts: PathBuf,

    /// Comments CSV (`id,post_id,body,created_utc`).
    #[arg(long)]
    pub comments: Option<PathBuf>,

    /// Comma separated watch-list, e.g. `GME,AMC,BB`.
    #[arg(long, required = true)]
    pub symbols: String,

    /// Write the mention table (`symbol,date,count`) to this file.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ZscoresArgs {
    /// Mention table CSV (`symbol,date,count`).
    #[arg(long)]
    pub mentions: PathBuf,

    pub symbol: String,

    /// Only use days on which the symbol was mentioned.
    #[arg(long, default_value_t = false)]
    pub no_zero_fill: bool,
}

/// Where daily closes come from. Alpha Vantage unless a CSV option is given.
#[derive(Debug, Args)]
pub struct PriceSourceArgs {
    /// Single `date,close` CSV used for every symbol.
    #[arg(long, conflicts_with = "prices_dir")]
    pub prices_csv: Option<PathBuf>,

    /// Directory of `<SYMBOL>.csv` files with `date,close` rows.
    #[arg(long)]
    pub prices_dir: Option<PathBuf>,

    /// Alpha Vantage history size.
    #[arg(long, value_enum)]
    pub output_size: Option<OutputSizeArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputSizeArg {
    Compact,
    Full,
}

impl From<OutputSizeArg> for OutputSize {
    fn from(value: OutputSizeArg) -> Self {
        match value {
            OutputSizeArg::Compact => OutputSize::Compact,
            OutputSizeArg::Full => OutputSize::Full,
        }
    }
}

#[derive(Debug, Args)]
pub struct PricesArgs {
    pub symbol: String,

    #[command(flatten)]
    pub source: PriceSourceArgs,

    /// Percent changes within this distance of zero are `noChange`.
    #[arg(long)]
    pub epsilon: Option<f64>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Mention table CSV (`symbol,date,count`).
    #[arg(long)]
    pub mentions: PathBuf,

    /// Symbols to analyze. Defaults to every symbol in the mention table.
    pub symbols: Vec<String>,

    #[command(flatten)]
    pub source: PriceSourceArgs,

    /// Number of stratified folds.
    #[arg(long)]
    pub folds: Option<usize>,

    /// Neighbors consulted per prediction.
    #[arg(long)]
    pub neighbors: Option<usize>,

    /// Shuffle seed for fold assignment.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Percent changes within this distance of zero are `noChange`.
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Only use days on which the symbol was mentioned.
    #[arg(long, default_value_t = false)]
    pub no_zero_fill: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_with_overrides() {
        let cli = Cli::try_parse_from([
            "ferrobuzz",
            "analyze",
            "--mentions",
            "mentions.csv",
            "--prices-dir",
            "prices",
            "--folds",
            "4",
            "--no-zero-fill",
            "GME",
            "AMC",
            "--format",
            "json",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.format, OutputFormat::Json);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze command");
        };
        assert_eq!(args.symbols, vec!["GME", "AMC"]);
        assert_eq!(args.folds, Some(4));
        assert!(args.no_zero_fill);
        assert_eq!(args.source.prices_dir, Some(PathBuf::from("prices")));
    }

    #[test]
    fn price_csv_options_conflict() {
        let err = Cli::try_parse_from([
            "ferrobuzz",
            "prices",
            "GME",
            "--prices-csv",
            "gme.csv",
            "--prices-dir",
            "prices",
        ])
        .expect_err("must fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn count_requires_watch_list() {
        let err = Cli::try_parse_from(["ferrobuzz", "count", "--posts", "posts.csv"])
            .expect_err("must fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
