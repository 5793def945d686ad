//! # Domain Models
//!
//! Strongly-typed values shared by every pipeline stage.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker symbol |
//! | [`TradeDate`] | Calendar day key |
//! | [`DateSeries`] | Ordered, duplicate-free date -> value map |
//! | [`DailyClose`] | End-of-day close from a price source |
//! | [`PriceBar`] | Close with percent change and movement label |
//! | [`MovementLabel`] | `fall`, `noChange` or `rise` |
//! | [`AlignedRecord`] | Joined z-score feature and label for one day |

mod models;
mod series;
mod symbol;
mod trade_date;

pub use models::{AlignedRecord, DailyClose, MovementLabel, PriceBar};
pub use series::DateSeries;
pub use symbol::Symbol;
pub use trade_date::TradeDate;
