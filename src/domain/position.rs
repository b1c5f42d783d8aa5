//! Position snapshots as persisted in `posTb`.

use chrono::NaiveDateTime;

/// Append-only position snapshot: running net tonnage for a
/// (product, category, shipment, year) key. The current position is the row
/// with the latest registration timestamp.
#[derive(Debug, Clone)]
pub struct PositionRecord {
    pub category: String,
    pub shipment: String,
    pub year: i32,
    pub position: i64,
    pub registered: NaiveDateTime,
}
