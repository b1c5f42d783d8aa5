//! Port traits between the domain and the adapters.

pub mod config_port;
pub mod ledger_port;
