//! Informal loan sub-ledger.
//!
//! Loans track money lent to or borrowed from a counterparty outside the
//! account system. Their `outstanding_amount` is mutated only by the
//! Ledger Engine's settlement operations.

pub mod types;

pub use types::{LoanDirection, LoanRecord, LoanStatus};
