//! Core ledger logic for PocketLedger.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and the consistency
//! engine live here.
//!
//! # Modules
//!
//! - `account` - Financial account records
//! - `ledger` - The Ledger Consistency Engine and transaction types
//! - `loan` - Informal loan sub-ledger records
//! - `recurring` - Stored recurring-rule templates and schedule helpers
//! - `export` - CSV export of the transaction history
//! - `store` - Store contracts the engine depends on

pub mod account;
pub mod export;
pub mod ledger;
pub mod loan;
pub mod recurring;
pub mod store;
