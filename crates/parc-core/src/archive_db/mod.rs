//! Relational ledger (SQLite via sqlx).
//!
//! Holds the download records consulted in database mode and the link ledger
//! table. Both are insert/upsert-only; nothing here deletes rows.

pub mod db;
pub mod links;
pub mod records;
pub mod types;

pub use db::ArchiveDb;
pub use types::*;

#[cfg(test)]
mod tests;
