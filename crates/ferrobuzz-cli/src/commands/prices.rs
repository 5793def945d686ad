use ferrobuzz_core::{AnalysisConfig, Pipeline, Symbol};

use crate::cli::PricesArgs;
use crate::error::CliError;

use super::{price_source, CommandOutput, TableData};

pub async fn run(args: &PricesArgs, mut config: AnalysisConfig) -> Result<CommandOutput, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    if let Some(epsilon) = args.epsilon {
        config.no_change_epsilon = epsilon;
    }

    let source = price_source(&args.source, &mut config)?;
    let pipeline = Pipeline::new(source, config)?;
    let bars = pipeline.price_bars(&symbol).await?;

    let rows = bars
        .iter()
        .map(|bar| {
            vec![
                bar.date.to_string(),
                format!("{:.4}", bar.close),
                bar.pct_change
                    .map(|pct| format!("{:+.4}%", pct * 100.0))
                    .unwrap_or_else(|| String::from("-")),
                bar.label
                    .map(|label| label.to_string())
                    .unwrap_or_else(|| String::from("-")),
            ]
        })
        .collect();

    Ok(CommandOutput::Table(TableData {
        columns: vec!["date", "close", "change", "label"],
        rows,
        json: serde_json::json!({
            "symbol": symbol,
            "source": pipeline.source_id(),
            "bars": bars,
        }),
    }))
}
