//! Loan record types.

use chrono::{DateTime, Utc};
use pocketledger_shared::types::{LoanId, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::types::TransactionDirection;

/// Which side of the loan the user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanDirection {
    /// The user is the lender.
    ILent,
    /// The user is the borrower.
    IBorrowed,
}

impl LoanDirection {
    /// Direction of a settlement transaction for this loan.
    ///
    /// A repayment of money the user lent comes back in as Income; a
    /// repayment of money the user borrowed goes out as Expense.
    #[must_use]
    pub const fn settlement_direction(self) -> TransactionDirection {
        match self {
            Self::ILent => TransactionDirection::Income,
            Self::IBorrowed => TransactionDirection::Expense,
        }
    }

    /// Direction of the originating cash movement for this loan.
    ///
    /// Lending disburses money out of an account; borrowing receives it.
    #[must_use]
    pub const fn disbursement_direction(self) -> TransactionDirection {
        match self {
            Self::ILent => TransactionDirection::Expense,
            Self::IBorrowed => TransactionDirection::Income,
        }
    }
}

/// Derived lifecycle state of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// Outstanding amount > 0; further settlement accepted.
    Active,
    /// Outstanding amount is zero. Terminal: no further settlement.
    Settled,
}

/// A loan between the user and a counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    /// Unique loan ID.
    pub id: LoanId,
    /// Which side of the loan the user is on.
    pub direction: LoanDirection,
    /// The other party involved in the loan.
    pub counterparty: String,
    /// The original loan amount (> 0).
    pub original_amount: Decimal,
    /// Remaining unpaid amount (0 <= outstanding <= original). Mutated
    /// only by the Ledger Engine.
    pub outstanding_amount: Decimal,
    /// When the loan was created.
    pub created_at: DateTime<Utc>,
    /// Ordered, append-only list of transaction IDs that created or
    /// settled this loan.
    pub history: Vec<TransactionId>,
}

impl LoanRecord {
    /// Derives the lifecycle state from the outstanding amount.
    #[must_use]
    pub fn status(&self) -> LoanStatus {
        if self.outstanding_amount.is_zero() {
            LoanStatus::Settled
        } else {
            LoanStatus::Active
        }
    }
}
