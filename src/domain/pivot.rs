//! Pivoted overview tables.
//!
//! Three views, all with a fixed shape regardless of what the input rows
//! contain: monthly PnL (category × month, summed), latest MTM level and
//! latest position (category × shipment, latest row per pair wins). Labels
//! outside the fixed row/column sets are dropped; missing cells are zero.

use crate::domain::market::{Category, Shipment, MONTH_LABELS};
use crate::domain::position::PositionRecord;
use crate::domain::valuation::MtmRecord;
use chrono::{Datelike, NaiveDateTime};
use std::collections::HashMap;

pub const YEAR_COLUMN: &str = "Year";
pub const TOTAL_ROW: &str = "Total";

/// Dense pivot matrix with fixed label orders.
#[derive(Debug, Clone)]
pub struct PivotTable {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    cells: Vec<Vec<f64>>,
}

impl PivotTable {
    fn zeroed(rows: &[&str], cols: &[&str]) -> Self {
        Self {
            row_labels: rows.iter().map(|s| s.to_string()).collect(),
            col_labels: cols.iter().map(|s| s.to_string()).collect(),
            cells: vec![vec![0.0; cols.len()]; rows.len()],
        }
    }

    fn index_of(labels: &[String], label: &str) -> Option<usize> {
        labels.iter().position(|l| l == label)
    }

    /// Add into a cell; labels outside the fixed sets are ignored.
    fn add(&mut self, row: &str, col: &str, value: f64) {
        if let (Some(r), Some(c)) = (
            Self::index_of(&self.row_labels, row),
            Self::index_of(&self.col_labels, col),
        ) {
            self.cells[r][c] += value;
        }
    }

    fn set(&mut self, row: &str, col: &str, value: f64) {
        if let (Some(r), Some(c)) = (
            Self::index_of(&self.row_labels, row),
            Self::index_of(&self.col_labels, col),
        ) {
            self.cells[r][c] = value;
        }
    }

    /// Append a trailing "Year" column (row sums) and "Total" row (column
    /// sums, including the Year cell).
    fn append_totals(mut self) -> Self {
        for row in &mut self.cells {
            let sum: f64 = row.iter().sum();
            row.push(sum);
        }
        self.col_labels.push(YEAR_COLUMN.to_string());

        let total: Vec<f64> = (0..self.col_labels.len())
            .map(|c| self.cells.iter().map(|row| row[c]).sum())
            .collect();
        self.cells.push(total);
        self.row_labels.push(TOTAL_ROW.to_string());

        self
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let r = Self::index_of(&self.row_labels, row)?;
        let c = Self::index_of(&self.col_labels, col)?;
        Some(self.cells[r][c])
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.row_labels
            .iter()
            .zip(&self.cells)
            .map(|(label, cells)| (label.as_str(), cells.as_slice()))
    }
}

fn category_labels() -> Vec<&'static str> {
    Category::ALL.iter().map(|c| c.as_str()).collect()
}

fn shipment_labels() -> Vec<&'static str> {
    Shipment::ALL.iter().map(|s| s.as_str()).collect()
}

/// Monthly PnL view: sum `pnl` by (category, 3-letter month of `date`),
/// then append Year/Total.
pub fn monthly_pnl_pivot(rows: &[MtmRecord]) -> PivotTable {
    let mut table = PivotTable::zeroed(&category_labels(), &MONTH_LABELS);
    for row in rows {
        let month = MONTH_LABELS[row.date.month0() as usize];
        table.add(&row.category, month, row.pnl);
    }
    table.append_totals()
}

/// Keep only the most recently registered value per (category, shipment).
/// Strictly-later wins, so on equal timestamps the earlier input row is kept
/// (loaders order rows latest-first).
fn latest_per_pair<'a, T>(
    rows: &'a [T],
    key: impl Fn(&'a T) -> (&'a str, &'a str),
    registered: impl Fn(&T) -> NaiveDateTime,
    value: impl Fn(&T) -> f64,
) -> HashMap<(&'a str, &'a str), f64> {
    let mut latest: HashMap<(&str, &str), (NaiveDateTime, f64)> = HashMap::new();
    for row in rows {
        let k = key(row);
        let reg = registered(row);
        match latest.get(&k) {
            Some((existing, _)) if *existing >= reg => {}
            _ => {
                latest.insert(k, (reg, value(row)));
            }
        }
    }
    latest.into_iter().map(|(k, (_, v))| (k, v)).collect()
}

/// Latest MTM level per (category, shipment). No totals: summing or
/// averaging mark percentages is not meaningful.
pub fn latest_mtm_pivot(rows: &[MtmRecord]) -> PivotTable {
    let mut table = PivotTable::zeroed(&category_labels(), &shipment_labels());
    let latest = latest_per_pair(
        rows,
        |r| (r.category.as_str(), r.shipment.as_str()),
        |r| r.registered,
        |r| r.mtm,
    );
    for ((category, shipment), mtm) in latest {
        table.set(category, shipment, mtm);
    }
    table
}

/// Latest position per (category, shipment), with Year/Total appended.
pub fn latest_position_pivot(rows: &[PositionRecord]) -> PivotTable {
    let mut table = PivotTable::zeroed(&category_labels(), &shipment_labels());
    let latest = latest_per_pair(
        rows,
        |r| (r.category.as_str(), r.shipment.as_str()),
        |r| r.registered,
        |r| r.position as f64,
    );
    for ((category, shipment), position) in latest {
        table.set(category, shipment, position);
    }
    table.append_totals()
}
