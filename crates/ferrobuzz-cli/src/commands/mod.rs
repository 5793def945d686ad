mod analyze;
mod count;
mod prices;
mod zscores;

use std::sync::Arc;

use ferrobuzz_core::{
    AlphaVantageAdapter, AnalysisConfig, CsvPriceSource, PriceSource, ReqwestHttpClient,
    SymbolReport,
};
use serde_json::Value;

use crate::cli::{Cli, Command, PriceSourceArgs};
use crate::error::CliError;

/// Plain rows shown by the table renderer, with the JSON form kept alongside.
#[derive(Debug)]
pub struct TableData {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub json: Value,
}

#[derive(Debug)]
pub enum CommandOutput {
    Reports(Vec<SymbolReport>),
    Table(TableData),
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let config = AnalysisConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Command::Count(args) => count::run(args),
        Command::Zscores(args) => zscores::run(args, config),
        Command::Prices(args) => prices::run(args, config).await,
        Command::Analyze(args) => analyze::run(args, config).await,
    }
}

/// The configured price source. Alpha Vantage is built only when no CSV
/// option is given, so a missing key only matters then.
fn price_source(
    args: &PriceSourceArgs,
    config: &mut AnalysisConfig,
) -> Result<Arc<dyn PriceSource>, CliError> {
    if let Some(size) = args.output_size {
        config.alphavantage.output_size = size.into();
    }

    if let Some(path) = &args.prices_csv {
        return Ok(Arc::new(CsvPriceSource::file(path)));
    }
    if let Some(dir) = &args.prices_dir {
        return Ok(Arc::new(CsvPriceSource::directory(dir)));
    }

    let adapter = AlphaVantageAdapter::new(&config.alphavantage, Arc::new(ReqwestHttpClient::new()))?;
    Ok(Arc::new(adapter))
}
