//! Trade booking and mark-to-market arithmetic.
//!
//! Stateless per invocation: every entry point reads current state through
//! the ledger port, computes, and writes back. The fan-out shape mirrors the
//! desk workflow — one submission covers every selected category × shipment
//! pair.

use crate::domain::error::PnldeskError;
use crate::domain::market::{BookKey, Category, Operation, Product, Shipment};
use crate::ports::ledger_port::LedgerPort;
use std::str::FromStr;

/// `notional = conversion_factor(product) × (level_pct / 100) × tons`.
pub fn notional(product: Product, level_pct: f64, tons: i64) -> f64 {
    product.conversion_factor() * (level_pct / 100.0) * tons as f64
}

/// Apply a trade to a running position. Purchase adds tonnage, Sale removes.
pub fn apply_operation(position: i64, operation: Operation, tons: i64) -> i64 {
    match operation {
        Operation::Purchase => position + tons,
        Operation::Sale => position - tons,
    }
}

/// Book one trade submission: for every selected (category, shipment) pair,
/// insert an immutable trade row and append the updated position snapshot.
/// A missing prior snapshot means the book is flat (position 0).
///
/// Returns the number of trade rows inserted.
pub fn book_trade(
    ledger: &dyn LedgerPort,
    product: Product,
    operation: Operation,
    year: i32,
    tons: i64,
    level_pct: f64,
    categories: &[Category],
    shipments: &[Shipment],
) -> Result<usize, PnldeskError> {
    let level = level_pct / 100.0;
    let notion = notional(product, level_pct, tons);

    let mut inserted = 0;
    for &category in categories {
        for &shipment in shipments {
            let key = BookKey::new(product, category, shipment, year);
            let old_position = ledger.fetch_latest_position(&key)?;
            let new_position = apply_operation(old_position, operation, tons);

            ledger.insert_trade(&key, operation, tons, level, notion)?;
            ledger.insert_position(&key, new_position)?;
            inserted += 1;
        }
    }

    Ok(inserted)
}

/// Outcome of one mark-to-market submission.
#[derive(Debug, Default)]
pub struct MarkSummary {
    /// Number of valuation rows inserted (one per historical trade).
    pub marked: usize,
    /// Trade ids skipped because their stored operation did not parse.
    pub skipped: Vec<i64>,
}

/// Mark every historical trade on the selected (category, shipment) pairs to
/// a new level, inserting one valuation row per trade.
///
/// The delta convention is asymmetric on purpose: the first mark values the
/// trade against its own entry level, every later mark against the previous
/// mark. For a Purchase `delta = prior − new` (entry level standing in for
/// the prior on the first mark); for a Sale the sign is mirrored.
/// `pnl = delta × conversion_factor × tons`.
///
/// Trade legs with an unparseable stored operation are skipped and reported
/// in the summary, never aborting the rest of the batch.
pub fn mark_to_market(
    ledger: &dyn LedgerPort,
    product: Product,
    year: i32,
    mtm_pct: f64,
    categories: &[Category],
    shipments: &[Shipment],
) -> Result<MarkSummary, PnldeskError> {
    let new_mtm = mtm_pct / 100.0;
    let factor = product.conversion_factor();

    let mut summary = MarkSummary::default();
    for &category in categories {
        for &shipment in shipments {
            let key = BookKey::new(product, category, shipment, year);
            for leg in ledger.fetch_trades_for(&key)? {
                let operation = match Operation::from_str(&leg.operation) {
                    Ok(op) => op,
                    Err(_) => {
                        summary.skipped.push(leg.id);
                        continue;
                    }
                };

                let delta = match (ledger.fetch_latest_mtm(leg.id)?, operation) {
                    (None, Operation::Purchase) => leg.level - new_mtm,
                    (None, Operation::Sale) => new_mtm - leg.level,
                    (Some(prior), Operation::Purchase) => prior - new_mtm,
                    (Some(prior), Operation::Sale) => new_mtm - prior,
                };
                let pnl = delta * factor * leg.tons as f64;

                ledger.insert_mtm_pnl(leg.id, &key, new_mtm, pnl)?;
                summary.marked += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::PositionRecord;
    use crate::domain::trade::{TradeLeg, TradeRecord};
    use crate::domain::valuation::{MtmRecord, PnlPoint};
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory ledger double: append-only vectors, latest-wins resolution.
    #[derive(Default)]
    struct MemLedger {
        trades: RefCell<Vec<(i64, BookKey, String, i64, f64, f64)>>,
        positions: RefCell<HashMap<BookKey, Vec<i64>>>,
        marks: RefCell<Vec<(i64, f64, f64)>>,
    }

    impl MemLedger {
        fn pnl_for(&self, trade_id: i64) -> Vec<f64> {
            self.marks
                .borrow()
                .iter()
                .filter(|(id, _, _)| *id == trade_id)
                .map(|(_, _, pnl)| *pnl)
                .collect()
        }
    }

    impl LedgerPort for MemLedger {
        fn create_schema(&self) -> Result<(), PnldeskError> {
            Ok(())
        }

        fn insert_trade(
            &self,
            key: &BookKey,
            operation: Operation,
            tons: i64,
            level: f64,
            notional: f64,
        ) -> Result<(), PnldeskError> {
            let mut trades = self.trades.borrow_mut();
            let id = trades.len() as i64 + 1;
            trades.push((id, *key, operation.as_str().to_string(), tons, level, notional));
            Ok(())
        }

        fn insert_position(&self, key: &BookKey, position: i64) -> Result<(), PnldeskError> {
            self.positions
                .borrow_mut()
                .entry(*key)
                .or_default()
                .push(position);
            Ok(())
        }

        fn insert_mtm_pnl(
            &self,
            trade_id: i64,
            _key: &BookKey,
            mtm_level: f64,
            pnl: f64,
        ) -> Result<(), PnldeskError> {
            self.marks.borrow_mut().push((trade_id, mtm_level, pnl));
            Ok(())
        }

        fn fetch_latest_mtm(&self, trade_id: i64) -> Result<Option<f64>, PnldeskError> {
            Ok(self
                .marks
                .borrow()
                .iter()
                .rev()
                .find(|(id, _, _)| *id == trade_id)
                .map(|(_, mtm, _)| *mtm))
        }

        fn fetch_latest_position(&self, key: &BookKey) -> Result<i64, PnldeskError> {
            Ok(self
                .positions
                .borrow()
                .get(key)
                .and_then(|v| v.last().copied())
                .unwrap_or(0))
        }

        fn fetch_trades_for(&self, key: &BookKey) -> Result<Vec<TradeLeg>, PnldeskError> {
            Ok(self
                .trades
                .borrow()
                .iter()
                .filter(|(_, k, _, _, _, _)| k == key)
                .map(|(id, _, op, tons, level, _)| TradeLeg {
                    id: *id,
                    operation: op.clone(),
                    tons: *tons,
                    level: *level,
                })
                .collect())
        }

        fn load_pnl_rows(&self, _: Product, _: i32) -> Result<Vec<MtmRecord>, PnldeskError> {
            Ok(Vec::new())
        }

        fn load_mtm_rows(&self, _: Product, _: i32) -> Result<Vec<MtmRecord>, PnldeskError> {
            Ok(Vec::new())
        }

        fn load_position_rows(
            &self,
            _: Product,
            _: i32,
        ) -> Result<Vec<PositionRecord>, PnldeskError> {
            Ok(Vec::new())
        }

        fn load_trades(&self) -> Result<Vec<TradeRecord>, PnldeskError> {
            Ok(Vec::new())
        }

        fn load_pnl_series(&self, _: Product) -> Result<Vec<PnlPoint>, PnldeskError> {
            Ok(Vec::new())
        }
    }

    fn key() -> BookKey {
        BookKey::new(Product::SoyBean, Category::FobVessel, Shipment::Vsl, 2025)
    }

    #[test]
    fn notional_soybean_100t_at_36pct() {
        assert_relative_eq!(
            notional(Product::SoyBean, 36.0, 100),
            1322.8344,
            epsilon = 1e-9
        );
    }

    #[test]
    fn notional_unit_factor_products_scale_linearly() {
        assert_relative_eq!(
            notional(Product::SoyMeal, 100.0, 1),
            1.1023,
            epsilon = 1e-9
        );
    }

    #[test]
    fn apply_operation_signs() {
        assert_eq!(apply_operation(0, Operation::Purchase, 100), 100);
        assert_eq!(apply_operation(100, Operation::Sale, 30), 70);
        assert_eq!(apply_operation(0, Operation::Sale, 50), -50);
    }

    #[test]
    fn book_trade_fans_out_per_pair() {
        let ledger = MemLedger::default();
        let inserted = book_trade(
            &ledger,
            Product::SoyBean,
            Operation::Purchase,
            2025,
            100,
            36.0,
            &Category::ALL,
            &Shipment::ALL,
        )
        .unwrap();

        assert_eq!(inserted, 9);
        assert_eq!(ledger.trades.borrow().len(), 9);
        assert_eq!(ledger.fetch_latest_position(&key()).unwrap(), 100);
    }

    #[test]
    fn book_trade_accumulates_position() {
        let ledger = MemLedger::default();
        let cats = [Category::FobVessel];
        let ships = [Shipment::Vsl];

        book_trade(&ledger, Product::SoyBean, Operation::Purchase, 2025, 100, 36.0, &cats, &ships)
            .unwrap();
        book_trade(&ledger, Product::SoyBean, Operation::Purchase, 2025, 40, 38.0, &cats, &ships)
            .unwrap();
        book_trade(&ledger, Product::SoyBean, Operation::Sale, 2025, 60, 37.0, &cats, &ships)
            .unwrap();

        assert_eq!(ledger.fetch_latest_position(&key()).unwrap(), 80);
    }

    #[test]
    fn book_trade_stores_level_as_fraction() {
        let ledger = MemLedger::default();
        book_trade(
            &ledger,
            Product::SoyBean,
            Operation::Purchase,
            2025,
            100,
            36.0,
            &[Category::FobVessel],
            &[Shipment::Vsl],
        )
        .unwrap();

        let trades = ledger.trades.borrow();
        let (_, _, _, _, level, notion) = trades[0];
        assert_relative_eq!(level, 0.36, epsilon = 1e-12);
        assert_relative_eq!(notion, 1322.8344, epsilon = 1e-9);
    }

    #[test]
    fn first_mark_values_against_entry_level() {
        let ledger = MemLedger::default();
        let cats = [Category::FobVessel];
        let ships = [Shipment::Vsl];
        book_trade(&ledger, Product::SoyBean, Operation::Purchase, 2025, 100, 36.0, &cats, &ships)
            .unwrap();

        let summary =
            mark_to_market(&ledger, Product::SoyBean, 2025, 37.0, &cats, &ships).unwrap();

        assert_eq!(summary.marked, 1);
        assert!(summary.skipped.is_empty());
        // delta = 0.36 - 0.37 = -0.01 → pnl = -0.01 × 36.7454 × 100
        let pnl = ledger.pnl_for(1);
        assert_eq!(pnl.len(), 1);
        assert_relative_eq!(pnl[0], -36.7454, epsilon = 1e-9);
    }

    #[test]
    fn second_mark_values_against_prior_mark() {
        let ledger = MemLedger::default();
        let cats = [Category::FobVessel];
        let ships = [Shipment::Vsl];
        book_trade(&ledger, Product::SoyBean, Operation::Purchase, 2025, 100, 36.0, &cats, &ships)
            .unwrap();

        mark_to_market(&ledger, Product::SoyBean, 2025, 37.0, &cats, &ships).unwrap();
        mark_to_market(&ledger, Product::SoyBean, 2025, 40.0, &cats, &ships).unwrap();

        // delta = 0.37 - 0.40 = -0.03 → pnl = -0.03 × 36.7454 × 100
        let pnl = ledger.pnl_for(1);
        assert_eq!(pnl.len(), 2);
        assert_relative_eq!(pnl[1], -110.2362, epsilon = 1e-9);
    }

    #[test]
    fn sale_marks_mirror_the_sign() {
        let ledger = MemLedger::default();
        let cats = [Category::FobVessel];
        let ships = [Shipment::Vsl];
        book_trade(&ledger, Product::SoyBean, Operation::Sale, 2025, 100, 36.0, &cats, &ships)
            .unwrap();

        mark_to_market(&ledger, Product::SoyBean, 2025, 37.0, &cats, &ships).unwrap();

        // Sale: delta = 0.37 - 0.36 = +0.01
        let pnl = ledger.pnl_for(1);
        assert_relative_eq!(pnl[0], 36.7454, epsilon = 1e-9);
    }

    #[test]
    fn marking_at_zero_is_a_real_mark() {
        let ledger = MemLedger::default();
        let cats = [Category::FobVessel];
        let ships = [Shipment::Vsl];
        book_trade(&ledger, Product::SoyBean, Operation::Purchase, 2025, 100, 36.0, &cats, &ships)
            .unwrap();

        mark_to_market(&ledger, Product::SoyBean, 2025, 0.0, &cats, &ships).unwrap();
        assert_eq!(ledger.fetch_latest_mtm(1).unwrap(), Some(0.0));

        // The next mark must compute against 0.0, not the entry level.
        mark_to_market(&ledger, Product::SoyBean, 2025, 1.0, &cats, &ships).unwrap();
        let pnl = ledger.pnl_for(1);
        // delta = 0.0 - 0.01 = -0.01
        assert_relative_eq!(pnl[1], -36.7454, epsilon = 1e-9);
    }

    #[test]
    fn every_historical_trade_gets_its_own_valuation_row() {
        let ledger = MemLedger::default();
        let cats = [Category::FobVessel];
        let ships = [Shipment::Vsl];
        book_trade(&ledger, Product::SoyBean, Operation::Purchase, 2025, 100, 36.0, &cats, &ships)
            .unwrap();
        book_trade(&ledger, Product::SoyBean, Operation::Sale, 2025, 50, 38.0, &cats, &ships)
            .unwrap();

        let summary =
            mark_to_market(&ledger, Product::SoyBean, 2025, 39.0, &cats, &ships).unwrap();
        assert_eq!(summary.marked, 2);
        assert_eq!(ledger.marks.borrow().len(), 2);
    }

    #[test]
    fn unknown_operation_is_skipped_not_fatal() {
        let ledger = MemLedger::default();
        ledger
            .trades
            .borrow_mut()
            .push((1, key(), "Swap".into(), 100, 0.36, 1322.8344));
        ledger
            .trades
            .borrow_mut()
            .push((2, key(), "Purchase".into(), 100, 0.36, 1322.8344));

        let summary = mark_to_market(
            &ledger,
            Product::SoyBean,
            2025,
            37.0,
            &[Category::FobVessel],
            &[Shipment::Vsl],
        )
        .unwrap();

        assert_eq!(summary.marked, 1);
        assert_eq!(summary.skipped, vec![1]);
    }
}
