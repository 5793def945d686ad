use std::fs::File;
use std::io::BufWriter;

use ferrobuzz_core::{CountSummary, MentionCounter, Symbol};
use serde::Serialize;
use tracing::info;

use crate::cli::CountArgs;
use crate::error::CliError;

use super::{CommandOutput, TableData};

#[derive(Debug, Serialize)]
struct MentionRow {
    symbol: String,
    date: String,
    count: u64,
}

#[derive(Debug, Serialize)]
struct CountResponseData {
    summary: CountSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    written_to: Option<String>,
    mentions: Vec<MentionRow>,
}

pub fn run(args: &CountArgs) -> Result<CommandOutput, CliError> {
    let watch_list = Symbol::parse_list(&args.symbols)?;
    let counter = MentionCounter::new(watch_list);
    let count = counter.count_files(&args.posts, args.comments.as_deref())?;

    if let Some(path) = &args.out {
        let file = File::create(path)?;
        count.table.write_csv(BufWriter::new(file))?;
        info!(path = %path.display(), "wrote mention table");
    }

    let mut mentions = Vec::new();
    for symbol in count.table.symbols() {
        for date in count.table.dates() {
            let value = count.table.count(symbol, date);
            if value > 0 {
                mentions.push(MentionRow {
                    symbol: symbol.to_string(),
                    date: date.to_string(),
                    count: value,
                });
            }
        }
    }

    let rows = mentions
        .iter()
        .map(|row| vec![row.symbol.clone(), row.date.clone(), row.count.to_string()])
        .collect();
    let data = CountResponseData {
        summary: count.summary,
        written_to: args.out.as_ref().map(|path| path.display().to_string()),
        mentions,
    };

    Ok(CommandOutput::Table(TableData {
        columns: vec!["symbol", "date", "count"],
        rows,
        json: serde_json::to_value(data)?,
    }))
}
