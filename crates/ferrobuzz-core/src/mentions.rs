//! Long-format mention table keyed by `(symbol, date)`.
//!
//! The table is stored as an explicit `symbol -> date -> count` map. Series
//! for one symbol can be extracted either sparsely (only days with mentions)
//! or densely over every day present anywhere in the table, with absent
//! days filled as zero.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{DateSeries, PipelineError, Symbol, TradeDate, ValidationError};

#[derive(Debug, Deserialize)]
struct MentionRow {
    symbol: String,
    date: String,
    count: u64,
}

#[derive(Debug, Serialize)]
struct MentionRowOut<'a> {
    symbol: &'a str,
    date: TradeDate,
    count: u64,
}

/// Mention counts per symbol and day. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionTable {
    by_symbol: BTreeMap<Symbol, BTreeMap<TradeDate, u64>>,
    dates: BTreeSet<TradeDate>,
}

impl MentionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` mentions; repeated `(symbol, date)` keys accumulate.
    pub fn add(
        &mut self,
        symbol: Symbol,
        date: TradeDate,
        count: u64,
    ) -> Result<(), ValidationError> {
        let days = self.by_symbol.entry(symbol.clone()).or_default();
        let total = days.entry(date).or_insert(0);
        *total = total
            .checked_add(count)
            .ok_or_else(|| ValidationError::CountOverflow { symbol, date })?;
        self.dates.insert(date);
        Ok(())
    }

    /// Load a `symbol,date,count` CSV file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|error| {
            PipelineError::missing(format!(
                "mention table '{}' could not be opened: {error}",
                path.display()
            ))
        })?;
        let table = Self::from_reader(file)?;
        if table.is_empty() {
            return Err(PipelineError::missing(format!(
                "mention table '{}' has no rows",
                path.display()
            )));
        }

        info!(
            path = %path.display(),
            symbols = table.by_symbol.len(),
            days = table.dates.len(),
            "loaded mention table"
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PipelineError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut table = Self::new();
        for row in reader.deserialize() {
            let row: MentionRow = row?;
            let symbol = Symbol::parse(&row.symbol)?;
            let date = TradeDate::parse(&row.date)?;
            table.add(symbol, date, row.count)?;
        }
        Ok(table)
    }

    /// Write non-zero rows as `symbol,date,count`, sorted by symbol then date.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PipelineError> {
        let mut writer = csv::Writer::from_writer(writer);
        for (symbol, days) in &self.by_symbol {
            for (date, count) in days {
                if *count == 0 {
                    continue;
                }
                writer.serialize(MentionRowOut {
                    symbol: symbol.as_str(),
                    date: *date,
                    count: *count,
                })?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.by_symbol.keys()
    }

    /// Every day that appears for any symbol.
    pub fn dates(&self) -> impl Iterator<Item = TradeDate> + '_ {
        self.dates.iter().copied()
    }

    pub fn count(&self, symbol: &Symbol, date: TradeDate) -> u64 {
        self.by_symbol
            .get(symbol)
            .and_then(|days| days.get(&date))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_mentions(&self, symbol: &Symbol) -> u64 {
        self.by_symbol
            .get(symbol)
            .map(|days| days.values().sum())
            .unwrap_or(0)
    }

    /// Daily mention counts for `symbol`.
    ///
    /// With `zero_fill` the series spans every day in the table.
    pub fn series(&self, symbol: &Symbol, zero_fill: bool) -> Result<DateSeries<u64>, PipelineError> {
        let days = self.by_symbol.get(symbol).ok_or_else(|| {
            PipelineError::missing(format!("symbol {symbol} has no rows in the mention table"))
        })?;

        let series: DateSeries<u64> = if zero_fill {
            self.dates
                .iter()
                .map(|date| (*date, days.get(date).copied().unwrap_or(0)))
                .collect()
        } else {
            days.iter().map(|(date, count)| (*date, *count)).collect()
        };

        debug!(%symbol, days = series.len(), zero_fill, "extracted mention series");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "symbol,date,count\n\
GME,2021-01-27,5\n\
GME,2021-01-29,2\n\
AMC,2021-01-28,4\n\
gme,2021-01-27,1\n";

    fn day(value: &str) -> TradeDate {
        TradeDate::parse(value).expect("valid date")
    }

    #[test]
    fn sums_repeated_symbol_date_rows() {
        let table = MentionTable::from_reader(TABLE.as_bytes()).expect("table should parse");
        let gme = Symbol::parse("GME").expect("valid");
        assert_eq!(table.count(&gme, day("2021-01-27")), 6);
        assert_eq!(table.total_mentions(&gme), 8);
    }

    #[test]
    fn zero_fill_spans_all_table_dates() {
        let table = MentionTable::from_reader(TABLE.as_bytes()).expect("table should parse");
        let gme = Symbol::parse("GME").expect("valid");

        let dense = table.series(&gme, true).expect("symbol present");
        assert_eq!(dense.values().copied().collect::<Vec<_>>(), vec![6, 0, 2]);

        let sparse = table.series(&gme, false).expect("symbol present");
        assert_eq!(sparse.values().copied().collect::<Vec<_>>(), vec![6, 2]);
    }

    #[test]
    fn unknown_symbol_is_missing_data() {
        let table = MentionTable::from_reader(TABLE.as_bytes()).expect("table should parse");
        let err = table
            .series(&Symbol::parse("TSLA").expect("valid"), true)
            .expect_err("must fail");
        assert!(matches!(err, PipelineError::MissingData { .. }));
    }

    #[test]
    fn writes_sorted_long_csv() {
        let table = MentionTable::from_reader(TABLE.as_bytes()).expect("table should parse");
        let mut out = Vec::new();
        table.write_csv(&mut out).expect("write should succeed");

        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(
            text,
            "symbol,date,count\nAMC,2021-01-28,4\nGME,2021-01-27,6\nGME,2021-01-29,2\n"
        );
    }

    #[test]
    fn overflowing_repeated_rows_are_rejected() {
        let input = format!("symbol,date,count\nGME,2021-01-27,{}\nGME,2021-01-27,1\n", u64::MAX);
        let err = MentionTable::from_reader(input.as_bytes()).expect_err("must fail");
        match err {
            PipelineError::Validation(ValidationError::CountOverflow { symbol, date }) => {
                assert_eq!(symbol.as_str(), "GME");
                assert_eq!(date, day("2021-01-27"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_dates() {
        let err = MentionTable::from_reader("symbol,date,count\nGME,27/01/2021,1\n".as_bytes())
            .expect_err("must fail");
        assert!(matches!(err, PipelineError::Validation(_)));
    }
}
