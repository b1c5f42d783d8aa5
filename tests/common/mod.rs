#![allow(dead_code)]

use pnldesk::adapters::sqlite_adapter::SqliteAdapter;
use pnldesk::domain::market::{BookKey, Category, Product, Shipment};
use pnldesk::ports::ledger_port::LedgerPort;

/// Fresh in-memory ledger with the schema already created.
pub fn ledger() -> SqliteAdapter {
    let adapter = SqliteAdapter::in_memory().unwrap();
    adapter.create_schema().unwrap();
    adapter
}

pub fn soybean_key(category: Category, shipment: Shipment) -> BookKey {
    BookKey::new(Product::SoyBean, category, shipment, 2025)
}

pub fn vsl_key() -> BookKey {
    soybean_key(Category::FobVessel, Shipment::Vsl)
}
