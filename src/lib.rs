//! splitpot - shared-expense ledger and settlement engine
//!
//! This library records the money a group spends together, splits every
//! expense into exact integer-cent shares, hands out leftover cents through
//! a fairness rotation, tracks a shared public fund, and settles each period
//! with a short list of transfers that brings every balance to zero.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (members, periods, transactions, etc.)
//! - `ledger`: Pure split, rotation, balance and settlement computations
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer
//! - `audit`: Audit logging system
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `splitpot` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use splitpot::config::{paths::SplitpotPaths, settings::Settings};
//! use splitpot::services::BalanceService;
//! use splitpot::storage::Storage;
//!
//! let paths = SplitpotPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//!
//! let period = storage.periods.get_open()?.unwrap();
//! let plan = BalanceService::new(&storage, &settings).compute_settlement_plan(period.id)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod ledger;
pub mod models;
pub mod services;
pub mod storage;

pub use error::SplitpotError;
