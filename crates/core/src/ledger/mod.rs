//! The Ledger Consistency Engine and its transaction types.
//!
//! This module guarantees that an account's stored balance always equals
//! the net effect of the transactions applied to it:
//! - A transaction's balance effect is applied exactly once, atomically
//! - Transactions can be reversed without drift
//! - Loan outstanding-amount bookkeeping stays consistent with its
//!   settlement transactions

pub mod engine;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod engine_props;
#[cfg(test)]
pub(crate) mod testing;

pub use engine::{CreateLoanInput, LedgerEngine};
pub use error::LedgerError;
pub use types::{
    duplicate_window, CategorySpending, DailyDelta, Transaction, TransactionDetails,
    TransactionDirection, TransactionDraft, DUPLICATE_WINDOW_SECS, LOAN_REPAYMENT_CATEGORY,
    LOAN_SETTLEMENT_TAG,
};
pub use validation::{validate_amount, validate_transfer_shape};
