use ferrobuzz_core::{mention_zscores, AnalysisConfig, MentionTable, Symbol, TradeDate};
use serde::Serialize;

use crate::cli::ZscoresArgs;
use crate::error::CliError;

use super::{CommandOutput, TableData};

#[derive(Debug, Serialize)]
struct ZscoreRow {
    date: TradeDate,
    count: u64,
    zscore: f64,
}

pub fn run(args: &ZscoresArgs, config: AnalysisConfig) -> Result<CommandOutput, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let zero_fill = config.zero_fill && !args.no_zero_fill;

    let mentions = MentionTable::load(&args.mentions)?;
    let counts = mentions.series(&symbol, zero_fill)?;
    let zscores = mention_zscores(&mentions, &symbol, zero_fill)?;

    let data = zscores
        .iter()
        .map(|(date, zscore)| ZscoreRow {
            date: *date,
            count: counts.get(date).copied().unwrap_or(0),
            zscore: *zscore,
        })
        .collect::<Vec<_>>();

    let rows = data
        .iter()
        .map(|row| {
            vec![
                row.date.to_string(),
                row.count.to_string(),
                format!("{:.4}", row.zscore),
            ]
        })
        .collect();

    Ok(CommandOutput::Table(TableData {
        columns: vec!["date", "count", "zscore"],
        rows,
        json: serde_json::json!({ "symbol": symbol, "zero_fill": zero_fill, "days": data }),
    }))
}
