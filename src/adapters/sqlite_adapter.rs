//! SQLite ledger adapter (local file-backed or in-memory store).

use crate::domain::error::PnldeskError;
use crate::domain::market::{BookKey, Operation, Product};
use crate::domain::position::PositionRecord;
use crate::domain::trade::{TradeLeg, TradeRecord};
use crate::domain::valuation::{MtmRecord, PnlPoint};
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;
use chrono::{NaiveDate, NaiveDateTime};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn parse_date(value: String) -> Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            value.len(),
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

fn parse_timestamp(value: String) -> Result<NaiveDateTime, rusqlite::Error> {
    NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M:%S").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            value.len(),
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PnldeskError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| PnldeskError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| PnldeskError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }

    /// Single-connection in-memory database for tests.
    pub fn in_memory() -> Result<Self, PnldeskError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| PnldeskError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, PnldeskError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| PnldeskError::Database {
                reason: e.to_string(),
            })
    }
}

fn query_err(e: rusqlite::Error) -> PnldeskError {
    PnldeskError::DatabaseQuery {
        reason: e.to_string(),
    }
}

impl LedgerPort for SqliteAdapter {
    fn create_schema(&self) -> Result<(), PnldeskError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tradeTb (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                prod    TEXT NOT NULL,
                cat     TEXT NOT NULL,
                ship    TEXT NOT NULL,
                year    INTEGER NOT NULL,
                op      TEXT NOT NULL,
                ton     INTEGER NOT NULL,
                lvl     REAL NOT NULL,
                notion  REAL NOT NULL,
                date    DATE DEFAULT (date('now')),
                reg     TIMESTAMP DEFAULT (datetime('now'))
            );
            CREATE TABLE IF NOT EXISTS mtmtb (
                idPnl   INTEGER PRIMARY KEY AUTOINCREMENT,
                idTrade INTEGER NOT NULL,
                prod    TEXT NOT NULL,
                cat     TEXT NOT NULL,
                ship    TEXT NOT NULL,
                year    INTEGER NOT NULL,
                mtm     REAL NOT NULL,
                pnl     REAL NOT NULL,
                date    DATE DEFAULT (date('now')),
                reg     TIMESTAMP DEFAULT (datetime('now'))
            );
            CREATE TABLE IF NOT EXISTS posTb (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                prod    TEXT NOT NULL,
                cat     TEXT NOT NULL,
                ship    TEXT NOT NULL,
                year    INTEGER NOT NULL,
                pos     INTEGER NOT NULL,
                date    DATE DEFAULT (date('now')),
                reg     TIMESTAMP DEFAULT (datetime('now'))
            );
            CREATE TABLE IF NOT EXISTS pnltb (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                prod    TEXT NOT NULL,
                cat     TEXT NOT NULL,
                ship    TEXT NOT NULL,
                year    INTEGER NOT NULL,
                pnl     REAL NOT NULL,
                date    DATE DEFAULT (date('now')),
                reg     TIMESTAMP DEFAULT (datetime('now'))
            );",
        )
        .map_err(query_err)?;

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
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO tradeTb (prod, cat, ship, year, op, ton, lvl, notion)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                key.product.as_str(),
                key.category.as_str(),
                key.shipment.as_str(),
                key.year,
                operation.as_str(),
                tons,
                level,
                notional
            ],
        )
        .map_err(query_err)?;

        Ok(())
    }

    fn insert_position(&self, key: &BookKey, position: i64) -> Result<(), PnldeskError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO posTb (prod, cat, ship, year, pos)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                key.product.as_str(),
                key.category.as_str(),
                key.shipment.as_str(),
                key.year,
                position
            ],
        )
        .map_err(query_err)?;

        Ok(())
    }

    fn insert_mtm_pnl(
        &self,
        trade_id: i64,
        key: &BookKey,
        mtm_level: f64,
        pnl: f64,
    ) -> Result<(), PnldeskError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO mtmtb (idTrade, prod, cat, ship, year, mtm, pnl)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                trade_id,
                key.product.as_str(),
                key.category.as_str(),
                key.shipment.as_str(),
                key.year,
                mtm_level,
                pnl
            ],
        )
        .map_err(query_err)?;

        Ok(())
    }

    fn fetch_latest_mtm(&self, trade_id: i64) -> Result<Option<f64>, PnldeskError> {
        let conn = self.conn()?;

        // idPnl tie-break keeps "latest" deterministic at one-second
        // timestamp granularity.
        conn.query_row(
            "SELECT mtm FROM mtmtb
             WHERE idTrade = ?1
             ORDER BY reg DESC, idPnl DESC LIMIT 1",
            params![trade_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(query_err)
    }

    fn fetch_latest_position(&self, key: &BookKey) -> Result<i64, PnldeskError> {
        let conn = self.conn()?;

        let position: Option<i64> = conn
            .query_row(
                "SELECT pos FROM posTb
                 WHERE prod = ?1 AND cat = ?2 AND ship = ?3 AND year = ?4
                 ORDER BY reg DESC, id DESC LIMIT 1",
                params![
                    key.product.as_str(),
                    key.category.as_str(),
                    key.shipment.as_str(),
                    key.year
                ],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_err)?;

        Ok(position.unwrap_or(0))
    }

    fn fetch_trades_for(&self, key: &BookKey) -> Result<Vec<TradeLeg>, PnldeskError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, op, ton, lvl FROM tradeTb
                 WHERE prod = ?1 AND cat = ?2 AND ship = ?3 AND year = ?4",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(
                params![
                    key.product.as_str(),
                    key.category.as_str(),
                    key.shipment.as_str(),
                    key.year
                ],
                |row| {
                    Ok(TradeLeg {
                        id: row.get(0)?,
                        operation: row.get(1)?,
                        tons: row.get(2)?,
                        level: row.get(3)?,
                    })
                },
            )
            .map_err(query_err)?;

        let mut legs = Vec::new();
        for row in rows {
            legs.push(row.map_err(query_err)?);
        }

        Ok(legs)
    }

    fn load_pnl_rows(&self, product: Product, year: i32) -> Result<Vec<MtmRecord>, PnldeskError> {
        self.load_mtm_rows(product, year)
    }

    fn load_mtm_rows(&self, product: Product, year: i32) -> Result<Vec<MtmRecord>, PnldeskError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT cat, ship, year, mtm, pnl, date, reg FROM mtmtb
                 WHERE prod LIKE ?1 AND year = ?2
                 ORDER BY reg DESC, idPnl DESC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![product.as_str(), year], |row| {
                Ok(MtmRecord {
                    category: row.get(0)?,
                    shipment: row.get(1)?,
                    year: row.get(2)?,
                    mtm: row.get(3)?,
                    pnl: row.get(4)?,
                    date: parse_date(row.get(5)?)?,
                    registered: parse_timestamp(row.get(6)?)?,
                })
            })
            .map_err(query_err)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(query_err)?);
        }

        Ok(records)
    }

    fn load_position_rows(
        &self,
        product: Product,
        year: i32,
    ) -> Result<Vec<PositionRecord>, PnldeskError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT cat, ship, year, pos, reg FROM posTb
                 WHERE prod LIKE ?1 AND year = ?2
                 ORDER BY reg DESC, id DESC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![product.as_str(), year], |row| {
                Ok(PositionRecord {
                    category: row.get(0)?,
                    shipment: row.get(1)?,
                    year: row.get(2)?,
                    position: row.get(3)?,
                    registered: parse_timestamp(row.get(4)?)?,
                })
            })
            .map_err(query_err)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(query_err)?);
        }

        Ok(records)
    }

    fn load_trades(&self) -> Result<Vec<TradeRecord>, PnldeskError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, prod, cat, ship, year, op, ton, lvl, notion, date, reg
                 FROM tradeTb ORDER BY id",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(TradeRecord {
                    id: row.get(0)?,
                    product: row.get(1)?,
                    category: row.get(2)?,
                    shipment: row.get(3)?,
                    year: row.get(4)?,
                    operation: row.get(5)?,
                    tons: row.get(6)?,
                    level: row.get(7)?,
                    notional: row.get(8)?,
                    trade_date: parse_date(row.get(9)?)?,
                    registered: parse_timestamp(row.get(10)?)?,
                })
            })
            .map_err(query_err)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(query_err)?);
        }

        Ok(records)
    }

    fn load_pnl_series(&self, product: Product) -> Result<Vec<PnlPoint>, PnldeskError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT date, cat, pnl FROM mtmtb
                 WHERE prod LIKE ?1
                 ORDER BY date, reg, idPnl",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![product.as_str()], |row| {
                Ok(PnlPoint {
                    date: parse_date(row.get(0)?)?,
                    category: row.get(1)?,
                    pnl: row.get(2)?,
                })
            })
            .map_err(query_err)?;

        let mut points = Vec::new();
        for row in rows {
            points.push(row.map_err(query_err)?);
        }

        Ok(points)
    }
}
