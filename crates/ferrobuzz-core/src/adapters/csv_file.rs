use std::fs::File;
use std::future::Future;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::Deserialize;
use tracing::info;

use crate::price_source::{DailyClosesRequest, PriceHistory, PriceSource, SourceError};
use crate::{DailyClose, Symbol, TradeDate};

#[derive(Debug, Deserialize)]
struct CloseRow {
    date: String,
    close: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Layout {
    /// One file answers for whatever symbol is requested.
    File(PathBuf),
    /// `<dir>/<SYMBOL>.csv` per symbol.
    Directory(PathBuf),
}

/// Offline price source reading `date,close` CSV files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPriceSource {
    layout: Layout,
}

impl CsvPriceSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            layout: Layout::File(path.into()),
        }
    }

    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            layout: Layout::Directory(dir.into()),
        }
    }

    pub fn path_for(&self, symbol: &Symbol) -> PathBuf {
        match &self.layout {
            Layout::File(path) => path.clone(),
            Layout::Directory(dir) => dir.join(format!("{symbol}.csv")),
        }
    }

    fn read_history(&self, symbol: &Symbol) -> Result<PriceHistory, SourceError> {
        let path = self.path_for(symbol);
        let file = File::open(&path).map_err(|error| {
            SourceError::missing_data(format!(
                "price file '{}' for {symbol} could not be opened: {error}",
                path.display()
            ))
        })?;

        let closes = read_closes(file, &path)?;
        if closes.is_empty() {
            return Err(SourceError::missing_data(format!(
                "price file '{}' has no rows",
                path.display()
            )));
        }

        info!(%symbol, path = %path.display(), days = closes.len(), "loaded offline price history");
        Ok(PriceHistory::new(symbol.clone(), closes))
    }
}

fn read_closes<R: Read>(reader: R, path: &Path) -> Result<Vec<DailyClose>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    reader
        .deserialize()
        .map(|row| {
            let row: CloseRow = row.map_err(|error| {
                SourceError::internal(format!("'{}': {error}", path.display()))
            })?;
            let date = TradeDate::parse(&row.date).map_err(|error| {
                SourceError::internal(format!("'{}': {error}", path.display()))
            })?;
            Ok(DailyClose::new(date, row.close))
        })
        .collect()
}

impl PriceSource for CsvPriceSource {
    fn id(&self) -> &'static str {
        "csv"
    }

    fn daily_closes<'a>(
        &'a self,
        req: DailyClosesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceHistory, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.read_history(&req.symbol) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price_source::SourceErrorKind;
    use std::io::Write;

    fn symbol(value: &str) -> Symbol {
        Symbol::parse(value).expect("valid symbol")
    }

    #[test]
    fn directory_layout_uses_symbol_file_name() {
        let source = CsvPriceSource::directory("/data/prices");
        assert_eq!(source.path_for(&symbol("gme")), PathBuf::from("/data/prices/GME.csv"));
    }

    #[tokio::test]
    async fn reads_closes_sorted_by_date() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "date,close\n2021-01-28,193.6\n2021-01-27,347.51\n").expect("write prices");

        let history = CsvPriceSource::file(file.path())
            .daily_closes(DailyClosesRequest::new(symbol("GME")))
            .await
            .expect("prices should load");

        assert_eq!(history.symbol, symbol("GME"));
        let closes = history.closes.iter().map(|c| c.close).collect::<Vec<_>>();
        assert_eq!(closes, vec![347.51, 193.6]);
    }

    #[tokio::test]
    async fn missing_file_is_missing_data() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = CsvPriceSource::directory(dir.path())
            .daily_closes(DailyClosesRequest::new(symbol("AMC")))
            .await
            .expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::MissingData);
    }

    #[tokio::test]
    async fn malformed_close_is_bad_source_data() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "date,close\n2021-01-28,n/a\n").expect("write prices");

        let error = CsvPriceSource::file(file.path())
            .daily_closes(DailyClosesRequest::new(symbol("GME")))
            .await
            .expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::Internal);
    }

    #[tokio::test]
    async fn date_with_trailing_junk_is_bad_source_data() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "date,close\n2021-01-28junk,193.6\n").expect("write prices");

        let error = CsvPriceSource::file(file.path())
            .daily_closes(DailyClosesRequest::new(symbol("GME")))
            .await
            .expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::Internal);
        assert!(error.to_string().contains("2021-01-28junk"));
    }
}
