pub mod config;
pub mod logging;

pub mod api;
pub mod archive_db;
pub mod auth;
pub mod decision;
pub mod executor;
pub mod ledger;
pub mod naming;
pub mod orchestrator;
pub mod persistence;
pub mod resolver;
pub mod retry;
pub mod storage;
pub mod transport;

#[cfg(test)]
mod test_support;
