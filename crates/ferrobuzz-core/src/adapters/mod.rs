//! [`PriceSource`](crate::PriceSource) implementations.

mod alphavantage;
mod csv_file;

pub use alphavantage::AlphaVantageAdapter;
pub use csv_file::CsvPriceSource;
