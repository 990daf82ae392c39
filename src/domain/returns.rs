//! Simple period-over-period returns.
//!
//! R[t] = (P[t] - P[t-1]) / P[t-1]
//! The first price row has no return row. A zero previous price yields a
//! non-finite return.

use crate::domain::table::AssetTable;

pub fn compute_returns(prices: &AssetTable) -> AssetTable {
    let rows: Vec<_> = prices.rows().collect();
    let mut dates = Vec::with_capacity(rows.len().saturating_sub(1));
    let mut values = Vec::with_capacity(rows.len().saturating_sub(1));

    for w in rows.windows(2) {
        let (_, prev) = w[0];
        let (date, curr) = w[1];
        dates.push(date);
        values.push(prev.iter().zip(curr).map(|(p, c)| (c - p) / p).collect());
    }

    AssetTable::from_aligned(prices.columns().to_vec(), dates, values)
}
