//! Valuation rows as persisted in `mtmtb`.

use chrono::{NaiveDate, NaiveDateTime};

/// Append-only MTM/PnL entry anchored to a trade id. The latest row per trade
/// id is the trade's current mark; the latest row per (category, shipment) is
/// what the overview pivots show.
#[derive(Debug, Clone)]
pub struct MtmRecord {
    pub category: String,
    pub shipment: String,
    pub year: i32,
    pub mtm: f64,
    pub pnl: f64,
    pub date: NaiveDate,
    pub registered: NaiveDateTime,
}

/// One point of the PnL time-series chart.
#[derive(Debug, Clone)]
pub struct PnlPoint {
    pub date: NaiveDate,
    pub category: String,
    pub pnl: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mtm_record_fields() {
        let record = MtmRecord {
            category: "C&F Vessel".into(),
            shipment: "CNF".into(),
            year: 2025,
            mtm: 0.37,
            pnl: -36.7454,
            date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            registered: NaiveDate::from_ymd_opt(2025, 4, 2)
                .unwrap()
                .and_hms_opt(15, 45, 10)
                .unwrap(),
        };
        assert!((record.mtm - 0.37).abs() < f64::EPSILON);
        assert!(record.pnl < 0.0);
    }
}
