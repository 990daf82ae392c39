//! Price data access port trait.

use crate::domain::error::CryptofolioError;
use crate::domain::table::AssetTable;
use chrono::NaiveDate;

pub trait PricePort {
    /// Daily closing prices for `tickers` over `[start_date, end_date)`.
    ///
    /// The returned table has one column per ticker, in the requested order,
    /// and contains only dates on which every ticker has a price.
    fn fetch_closes(
        &self,
        tickers: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<AssetTable, CryptofolioError>;
}
