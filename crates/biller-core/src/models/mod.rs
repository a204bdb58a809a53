//! Data models shared across the extractor, ledger and front-ends.

pub mod bill;
pub mod config;
