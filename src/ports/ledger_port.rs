//! Ledger storage port trait.
//!
//! One contract over both backends (hosted PostgreSQL and local SQLite).
//! Every operation returns a typed `Result`; the adapters never swallow
//! errors or hand back dead connections. History tables are append-only and
//! "current value" always means the latest registered row.

use crate::domain::error::PnldeskError;
use crate::domain::market::{BookKey, Operation, Product};
use crate::domain::position::PositionRecord;
use crate::domain::trade::{TradeLeg, TradeRecord};
use crate::domain::valuation::{MtmRecord, PnlPoint};

pub trait LedgerPort {
    /// Idempotently create the four ledger tables.
    fn create_schema(&self) -> Result<(), PnldeskError>;

    /// Insert one immutable trade row. Duplicates are allowed by design:
    /// one submission fans out into a row per category × shipment pair.
    fn insert_trade(
        &self,
        key: &BookKey,
        operation: Operation,
        tons: i64,
        level: f64,
        notional: f64,
    ) -> Result<(), PnldeskError>;

    /// Append a position snapshot.
    fn insert_position(&self, key: &BookKey, position: i64) -> Result<(), PnldeskError>;

    /// Append a valuation row tied to a trade id. The id is a weak
    /// reference — no foreign-key enforcement is assumed.
    fn insert_mtm_pnl(
        &self,
        trade_id: i64,
        key: &BookKey,
        mtm_level: f64,
        pnl: f64,
    ) -> Result<(), PnldeskError>;

    /// Most recent mark for a trade. `None` means "never marked", which is
    /// distinct from a mark at zero.
    fn fetch_latest_mtm(&self, trade_id: i64) -> Result<Option<f64>, PnldeskError>;

    /// Current net position for a key; a key with no history is flat (0).
    fn fetch_latest_position(&self, key: &BookKey) -> Result<i64, PnldeskError>;

    /// All historical trades for a key, in no guaranteed order.
    fn fetch_trades_for(&self, key: &BookKey) -> Result<Vec<TradeLeg>, PnldeskError>;

    /// Bulk readers for the pivot views and the trade log. These return raw
    /// rows only — all aggregation happens in [`crate::domain::pivot`].
    fn load_pnl_rows(&self, product: Product, year: i32) -> Result<Vec<MtmRecord>, PnldeskError>;
    fn load_mtm_rows(&self, product: Product, year: i32) -> Result<Vec<MtmRecord>, PnldeskError>;
    fn load_position_rows(
        &self,
        product: Product,
        year: i32,
    ) -> Result<Vec<PositionRecord>, PnldeskError>;
    fn load_trades(&self) -> Result<Vec<TradeRecord>, PnldeskError>;

    /// Chart series: (date, category, pnl) points ordered by date.
    fn load_pnl_series(&self, product: Product) -> Result<Vec<PnlPoint>, PnldeskError>;
}
