//! Plain-text rendering of pivot tables and the trade log for the CLI.

use crate::domain::pivot::PivotTable;
use crate::domain::trade::TradeRecord;

const CELL_WIDTH: usize = 10;

/// Render a pivot table as an aligned text block with a title line.
pub fn format_pivot(title: &str, table: &PivotTable) -> String {
    let label_width = table
        .row_labels()
        .iter()
        .map(|l| l.len())
        .max()
        .unwrap_or(0)
        .max(title.len());

    let mut out = String::new();
    out.push_str(&format!("{:<label_width$}", title));
    for col in table.col_labels() {
        out.push_str(&format!(" {:>CELL_WIDTH$}", col));
    }
    out.push('\n');

    for (label, cells) in table.rows() {
        out.push_str(&format!("{:<label_width$}", label));
        for value in cells {
            out.push_str(&format!(" {:>CELL_WIDTH$.2}", value));
        }
        out.push('\n');
    }

    out
}

/// Render the full trade log as an aligned text table.
pub fn format_trade_log(trades: &[TradeRecord]) -> String {
    if trades.is_empty() {
        return "No trades recorded.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:>5} {:<8} {:<11} {:<5} {:>5} {:<9} {:>7} {:>7} {:>12} {:<11} {:<19}\n",
        "id", "prod", "cat", "ship", "year", "op", "ton", "lvl", "notion", "date", "reg"
    ));

    for trade in trades {
        out.push_str(&format!(
            "{:>5} {:<8} {:<11} {:<5} {:>5} {:<9} {:>7} {:>7.4} {:>12.2} {:<11} {:<19}\n",
            trade.id,
            trade.product,
            trade.category,
            trade.shipment,
            trade.year,
            trade.operation,
            trade.tons,
            trade.level,
            trade.notional,
            trade.trade_date.format("%Y-%m-%d").to_string(),
            trade.registered.format("%Y-%m-%d %H:%M:%S").to_string(),
        ));
    }

    out
}
