//! Ledger error types for validation and state errors.
//!
//! Every mutating engine operation returns one of these typed errors
//! instead of panicking or partially committing. All variants are
//! recoverable, caller-visible conditions; the caller decides
//! user-facing messaging.

use pocketledger_shared::types::{AccountId, LoanId, TransactionId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Account Errors ==========
    /// A referenced account does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// A debit would drive an account balance negative.
    #[error("Insufficient balance in account {account}. Current: {balance}, Required: {required}")]
    InsufficientBalance {
        /// The account that would go negative.
        account: AccountId,
        /// The balance before the debit.
        balance: Decimal,
        /// The amount the debit requires.
        required: Decimal,
    },

    // ========== Validation Errors ==========
    /// Transfer endpoints are malformed: a Transfer requires a distinct
    /// destination account, and non-Transfer directions must not carry one.
    #[error("Invalid transfer endpoints")]
    InvalidTransferEndpoints,

    /// Candidate amount is zero or negative.
    #[error("Transaction amount must be positive")]
    NonPositiveAmount,

    /// An indistinguishable transaction already exists inside the
    /// trailing duplicate-suppression window. First writer wins.
    #[error("Duplicate transaction detected within {window_secs}s window")]
    DuplicateTransaction {
        /// Width of the window in seconds.
        window_secs: i64,
    },

    // ========== Record Errors ==========
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Loan not found.
    #[error("Loan not found: {0}")]
    LoanNotFound(LoanId),

    /// Settlement amount exceeds the loan's outstanding amount.
    /// Also returned for any settlement against an already-settled loan
    /// (outstanding = 0).
    #[error("Payment {amount} exceeds outstanding {outstanding} on loan {loan}")]
    PaymentExceedsOutstanding {
        /// The loan being settled.
        loan: LoanId,
        /// The attempted settlement amount.
        amount: Decimal,
        /// The outstanding amount at the time of the attempt.
        outstanding: Decimal,
    },

    /// A loan with outstanding amount > 0 cannot be deleted.
    #[error("Loan {loan} is not fully settled: outstanding {outstanding}")]
    LoanNotFullySettled {
        /// The loan.
        loan: LoanId,
        /// Its outstanding amount.
        outstanding: Decimal,
    },
}

impl LedgerError {
    /// Returns a stable error code for callers that branch on kind.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::InvalidTransferEndpoints => "INVALID_TRANSFER_ENDPOINTS",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::DuplicateTransaction { .. } => "DUPLICATE_TRANSACTION",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::LoanNotFound(_) => "LOAN_NOT_FOUND",
            Self::PaymentExceedsOutstanding { .. } => "PAYMENT_EXCEEDS_OUTSTANDING",
            Self::LoanNotFullySettled { .. } => "LOAN_NOT_FULLY_SETTLED",
        }
    }

    /// Returns true if retrying the same call could succeed.
    ///
    /// Deliberately false for every variant: duplicate suppression and
    /// balance checks are exactly the conditions a blind retry must not
    /// silently bypass.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}
