//! Core domain types and logic.

pub mod market;
pub mod trade;
pub mod position;
pub mod valuation;
pub mod booking;
pub mod pivot;
pub mod error;
