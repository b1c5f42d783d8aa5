//! CSV export of the trade log.

use crate::domain::error::PnldeskError;
use crate::domain::trade::TradeRecord;
use std::io::Write;

/// Write the trade log as CSV with a header row matching the table columns.
pub fn write_trade_log<W: Write>(writer: W, trades: &[TradeRecord]) -> Result<(), PnldeskError> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "id", "prod", "cat", "ship", "year", "op", "ton", "lvl", "notion", "date", "reg",
    ])
    .map_err(|e| PnldeskError::Database {
        reason: format!("CSV write error: {}", e),
    })?;

    for trade in trades {
        wtr.write_record([
            trade.id.to_string(),
            trade.product.clone(),
            trade.category.clone(),
            trade.shipment.clone(),
            trade.year.to_string(),
            trade.operation.clone(),
            trade.tons.to_string(),
            trade.level.to_string(),
            trade.notional.to_string(),
            trade.trade_date.format("%Y-%m-%d").to_string(),
            trade.registered.format("%Y-%m-%d %H:%M:%S").to_string(),
        ])
        .map_err(|e| PnldeskError::Database {
            reason: format!("CSV write error: {}", e),
        })?;
    }

    wtr.flush()?;
    Ok(())
}
