//! PostgreSQL ledger adapter (hosted store).
//!
//! Same contract as the SQLite adapter; only connection setup, placeholder
//! syntax (`$n`) and column types differ. `INTEGER` columns are written as
//! `i32` and read back through `::bigint` casts; `NUMERIC` columns are
//! written through `::double precision` casts so the driver-side types
//! always match the declared columns.

use crate::domain::error::PnldeskError;
use crate::domain::market::{BookKey, Operation, Product};
use crate::domain::position::PositionRecord;
use crate::domain::trade::{TradeLeg, TradeRecord};
use crate::domain::valuation::{MtmRecord, PnlPoint};
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;
use postgres::{Client, NoTls};
use std::cell::RefCell;

pub struct PostgresAdapter {
    client: RefCell<Client>,
}

fn query_err(e: postgres::Error) -> PnldeskError {
    PnldeskError::DatabaseQuery {
        reason: e.to_string(),
    }
}

impl PostgresAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PnldeskError> {
        // Try [postgres] connection_string first, fall back to [database] conninfo
        let connection_string = config
            .get_string("postgres", "connection_string")
            .or_else(|| config.get_string("database", "conninfo"))
            .ok_or_else(|| PnldeskError::ConfigMissing {
                section: "database".into(),
                key: "conninfo".into(),
            })?;

        let client =
            Client::connect(&connection_string, NoTls).map_err(|e| PnldeskError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client: RefCell::new(client),
        })
    }
}

impl LedgerPort for PostgresAdapter {
    fn create_schema(&self) -> Result<(), PnldeskError> {
        self.client
            .borrow_mut()
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS tradeTb (
                    id      SERIAL PRIMARY KEY,
                    prod    VARCHAR(7) NOT NULL,
                    cat     VARCHAR(10) NOT NULL,
                    ship    VARCHAR(3) NOT NULL,
                    year    INTEGER NOT NULL,
                    op      VARCHAR(8) NOT NULL,
                    ton     INTEGER NOT NULL,
                    lvl     NUMERIC(4,2) NOT NULL,
                    notion  NUMERIC(11,2) NOT NULL,
                    date    DATE DEFAULT CURRENT_DATE,
                    reg     TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                );
                CREATE TABLE IF NOT EXISTS mtmtb (
                    idPnl   SERIAL PRIMARY KEY,
                    idTrade INTEGER NOT NULL,
                    prod    VARCHAR(7) NOT NULL,
                    cat     VARCHAR(10) NOT NULL,
                    ship    VARCHAR(3) NOT NULL,
                    year    INTEGER NOT NULL,
                    mtm     NUMERIC(4,2) NOT NULL,
                    pnl     NUMERIC(11,2) NOT NULL,
                    date    DATE DEFAULT CURRENT_DATE,
                    reg     TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                );
                CREATE TABLE IF NOT EXISTS posTb (
                    id      SERIAL PRIMARY KEY,
                    prod    VARCHAR(7) NOT NULL,
                    cat     VARCHAR(10) NOT NULL,
                    ship    VARCHAR(3) NOT NULL,
                    year    INTEGER NOT NULL,
                    pos     INTEGER NOT NULL,
                    date    DATE DEFAULT CURRENT_DATE,
                    reg     TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                );
                CREATE TABLE IF NOT EXISTS pnltb (
                    id      SERIAL PRIMARY KEY,
                    prod    VARCHAR(7) NOT NULL,
                    cat     VARCHAR(10) NOT NULL,
                    ship    VARCHAR(3) NOT NULL,
                    year    INTEGER NOT NULL,
                    pnl     NUMERIC(11,2) NOT NULL,
                    date    DATE DEFAULT CURRENT_DATE,
                    reg     TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                );",
            )
            .map_err(query_err)
    }

    fn insert_trade(
        &self,
        key: &BookKey,
        operation: Operation,
        tons: i64,
        level: f64,
        notional: f64,
    ) -> Result<(), PnldeskError> {
        let tons = tons as i32;
        self.client
            .borrow_mut()
            .execute(
                "INSERT INTO tradeTb (prod, cat, ship, year, op, ton, lvl, notion)
                 VALUES ($1, $2, $3, $4, $5, $6, $7::double precision, $8::double precision)",
                &[
                    &key.product.as_str(),
                    &key.category.as_str(),
                    &key.shipment.as_str(),
                    &key.year,
                    &operation.as_str(),
                    &tons,
                    &level,
                    &notional,
                ],
            )
            .map_err(query_err)?;

        Ok(())
    }

    fn insert_position(&self, key: &BookKey, position: i64) -> Result<(), PnldeskError> {
        let position = position as i32;
        self.client
            .borrow_mut()
            .execute(
                "INSERT INTO posTb (prod, cat, ship, year, pos)
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    &key.product.as_str(),
                    &key.category.as_str(),
                    &key.shipment.as_str(),
                    &key.year,
                    &position,
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
        let trade_id = trade_id as i32;
        self.client
            .borrow_mut()
            .execute(
                "INSERT INTO mtmtb (idTrade, prod, cat, ship, year, mtm, pnl)
                 VALUES ($1, $2, $3, $4, $5, $6::double precision, $7::double precision)",
                &[
                    &trade_id,
                    &key.product.as_str(),
                    &key.category.as_str(),
                    &key.shipment.as_str(),
                    &key.year,
                    &mtm_level,
                    &pnl,
                ],
            )
            .map_err(query_err)?;

        Ok(())
    }

    fn fetch_latest_mtm(&self, trade_id: i64) -> Result<Option<f64>, PnldeskError> {
        let trade_id = trade_id as i32;
        let rows = self
            .client
            .borrow_mut()
            .query(
                "SELECT mtm::double precision FROM mtmtb
                 WHERE idTrade = $1
                 ORDER BY reg DESC, idPnl DESC LIMIT 1",
                &[&trade_id],
            )
            .map_err(query_err)?;

        Ok(rows.first().map(|row| row.get(0)))
    }

    fn fetch_latest_position(&self, key: &BookKey) -> Result<i64, PnldeskError> {
        let rows = self
            .client
            .borrow_mut()
            .query(
                "SELECT pos::bigint FROM posTb
                 WHERE prod = $1 AND cat = $2 AND ship = $3 AND year = $4
                 ORDER BY reg DESC, id DESC LIMIT 1",
                &[
                    &key.product.as_str(),
                    &key.category.as_str(),
                    &key.shipment.as_str(),
                    &key.year,
                ],
            )
            .map_err(query_err)?;

        Ok(rows.first().map(|row| row.get(0)).unwrap_or(0))
    }

    fn fetch_trades_for(&self, key: &BookKey) -> Result<Vec<TradeLeg>, PnldeskError> {
        let rows = self
            .client
            .borrow_mut()
            .query(
                "SELECT id::bigint, op, ton::bigint, lvl::double precision FROM tradeTb
                 WHERE prod = $1 AND cat = $2 AND ship = $3 AND year = $4",
                &[
                    &key.product.as_str(),
                    &key.category.as_str(),
                    &key.shipment.as_str(),
                    &key.year,
                ],
            )
            .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|row| TradeLeg {
                id: row.get(0),
                operation: row.get(1),
                tons: row.get(2),
                level: row.get(3),
            })
            .collect())
    }

    fn load_pnl_rows(&self, product: Product, year: i32) -> Result<Vec<MtmRecord>, PnldeskError> {
        self.load_mtm_rows(product, year)
    }

    fn load_mtm_rows(&self, product: Product, year: i32) -> Result<Vec<MtmRecord>, PnldeskError> {
        let rows = self
            .client
            .borrow_mut()
            .query(
                "SELECT cat, ship, year, mtm::double precision, pnl::double precision, date, reg
                 FROM mtmtb
                 WHERE prod ILIKE $1 AND year = $2
                 ORDER BY reg DESC, idPnl DESC",
                &[&product.as_str(), &year],
            )
            .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|row| MtmRecord {
                category: row.get(0),
                shipment: row.get(1),
                year: row.get(2),
                mtm: row.get(3),
                pnl: row.get(4),
                date: row.get(5),
                registered: row.get(6),
            })
            .collect())
    }

    fn load_position_rows(
        &self,
        product: Product,
        year: i32,
    ) -> Result<Vec<PositionRecord>, PnldeskError> {
        let rows = self
            .client
            .borrow_mut()
            .query(
                "SELECT cat, ship, year, pos::bigint, reg FROM posTb
                 WHERE prod ILIKE $1 AND year = $2
                 ORDER BY reg DESC, id DESC",
                &[&product.as_str(), &year],
            )
            .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|row| PositionRecord {
                category: row.get(0),
                shipment: row.get(1),
                year: row.get(2),
                position: row.get(3),
                registered: row.get(4),
            })
            .collect())
    }

    fn load_trades(&self) -> Result<Vec<TradeRecord>, PnldeskError> {
        let rows = self
            .client
            .borrow_mut()
            .query(
                "SELECT id::bigint, prod, cat, ship, year, op, ton::bigint,
                        lvl::double precision, notion::double precision, date, reg
                 FROM tradeTb ORDER BY id",
                &[],
            )
            .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|row| TradeRecord {
                id: row.get(0),
                product: row.get(1),
                category: row.get(2),
                shipment: row.get(3),
                year: row.get(4),
                operation: row.get(5),
                tons: row.get(6),
                level: row.get(7),
                notional: row.get(8),
                trade_date: row.get(9),
                registered: row.get(10),
            })
            .collect())
    }

    fn load_pnl_series(&self, product: Product) -> Result<Vec<PnlPoint>, PnldeskError> {
        let rows = self
            .client
            .borrow_mut()
            .query(
                "SELECT date, cat, pnl::double precision FROM mtmtb
                 WHERE prod ILIKE $1
                 ORDER BY date, reg, idPnl",
                &[&product.as_str()],
            )
            .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|row| PnlPoint {
                date: row.get(0),
                category: row.get(1),
                pnl: row.get(2),
            })
            .collect())
    }
}
