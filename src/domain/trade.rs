//! Trade rows as persisted in `tradeTb`.
//!
//! Rows read back from storage keep their text fields as strings: history may
//! contain values that predate the current enumerations, and the consumers
//! decide whether to parse or skip them.

use chrono::{NaiveDate, NaiveDateTime};

/// Full trade row for the trade log view. Immutable once inserted.
#[derive(Debug, Clone)]
pub struct TradeRecord {
    pub id: i64,
    pub product: String,
    pub category: String,
    pub shipment: String,
    pub year: i32,
    pub operation: String,
    pub tons: i64,
    pub level: f64,
    pub notional: f64,
    pub trade_date: NaiveDate,
    pub registered: NaiveDateTime,
}

/// Slim projection used when marking to market: one leg per historical trade
/// on a (product, category, shipment, year) key.
#[derive(Debug, Clone)]
pub struct TradeLeg {
    pub id: i64,
    pub operation: String,
    pub tons: i64,
    pub level: f64,
}
