//! Ledger domain types for transaction creation and querying.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use pocketledger_shared::types::{AccountId, LoanId, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Width of the trailing duplicate-suppression window, in seconds.
///
/// A candidate is rejected when another transaction with the same
/// `(amount, category, from_account)` triple exists inside the window
/// ending at the candidate's timestamp (inclusive at both ends).
pub const DUPLICATE_WINDOW_SECS: i64 = 30;

/// Returns the duplicate-suppression window as a `Duration`.
#[must_use]
pub fn duplicate_window() -> Duration {
    Duration::seconds(DUPLICATE_WINDOW_SECS)
}

/// Category assigned to loan settlement transactions.
pub const LOAN_REPAYMENT_CATEGORY: &str = "Loan Repayment";

/// Category assigned to loan disbursement transactions.
pub const LOAN_DISBURSEMENT_CATEGORY: &str = "Loan";

/// Tag attached to loan settlement transactions.
pub const LOAN_SETTLEMENT_TAG: &str = "loan_settlement";

/// Direction of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionDirection {
    /// Money going out of an account.
    Expense,
    /// Money coming into an account.
    Income,
    /// Money moving between two accounts.
    Transfer,
}

/// A persisted financial transaction.
///
/// Once persisted by the engine, the financial fields (`amount`,
/// `direction`, `from_account`, `to_account`) are immutable; the only
/// legal way to undo their effect is
/// [`reverse_transaction`](crate::ledger::LedgerEngine::reverse_transaction).
/// Non-financial fields may be edited through
/// [`TransactionStore::update_details`](crate::store::TransactionStore::update_details)
/// since they carry no balance effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID.
    pub id: TransactionId,
    /// When the transaction occurred.
    pub timestamp: DateTime<Utc>,
    /// Transaction amount (always strictly positive).
    pub amount: Decimal,
    /// Direction of money movement.
    pub direction: TransactionDirection,
    /// Source account.
    pub from_account: AccountId,
    /// Destination account. Present iff `direction` is `Transfer`.
    pub to_account: Option<AccountId>,
    /// Category label (e.g., "Food", "Transport").
    pub category: String,
    /// Optional subcategory label.
    pub subcategory: Option<String>,
    /// Who this transaction was with (person/shop name).
    pub counterparty: Option<String>,
    /// Optional free-text note.
    pub note: Option<String>,
    /// Tags for categorization.
    pub tags: BTreeSet<String>,
    /// Whether this transaction settles a loan.
    pub is_loan_settlement: bool,
    /// The loan this transaction settles or originates, if any.
    pub related_loan: Option<LoanId>,
}

/// A candidate transaction not yet persisted.
///
/// `id` and `timestamp` may be caller-supplied; the engine generates
/// them otherwise.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    /// Caller-supplied ID, or `None` to let the engine generate one.
    pub id: Option<TransactionId>,
    /// Caller-supplied timestamp, or `None` for the current time.
    pub timestamp: Option<DateTime<Utc>>,
    /// Transaction amount (must be strictly positive).
    pub amount: Decimal,
    /// Direction of money movement.
    pub direction: TransactionDirection,
    /// Source account.
    pub from_account: AccountId,
    /// Destination account. Required iff `direction` is `Transfer`.
    pub to_account: Option<AccountId>,
    /// Category label.
    pub category: String,
    /// Optional subcategory label.
    pub subcategory: Option<String>,
    /// Who this transaction was with.
    pub counterparty: Option<String>,
    /// Optional free-text note.
    pub note: Option<String>,
    /// Tags for categorization.
    pub tags: BTreeSet<String>,
    /// Whether this transaction settles a loan.
    pub is_loan_settlement: bool,
    /// The loan this transaction settles or originates, if any.
    pub related_loan: Option<LoanId>,
}

impl TransactionDraft {
    /// Creates a minimal draft with the required financial fields.
    #[must_use]
    pub fn new(
        direction: TransactionDirection,
        amount: Decimal,
        from_account: AccountId,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            timestamp: None,
            amount,
            direction,
            from_account,
            to_account: None,
            category: category.into(),
            subcategory: None,
            counterparty: None,
            note: None,
            tags: BTreeSet::new(),
            is_loan_settlement: false,
            related_loan: None,
        }
    }

    /// Sets the destination account for a transfer.
    #[must_use]
    pub fn to_account(mut self, account: AccountId) -> Self {
        self.to_account = Some(account);
        self
    }

    /// Sets an explicit timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Materializes the draft into a persisted record, filling in the
    /// engine-generated ID and timestamp when the caller supplied none.
    pub(crate) fn into_transaction(self, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id: self.id.unwrap_or_default(),
            timestamp: self.timestamp.unwrap_or(now),
            amount: self.amount,
            direction: self.direction,
            from_account: self.from_account,
            to_account: self.to_account,
            category: self.category,
            subcategory: self.subcategory,
            counterparty: self.counterparty,
            note: self.note,
            tags: self.tags,
            is_loan_settlement: self.is_loan_settlement,
            related_loan: self.related_loan,
        }
    }
}

/// Editable non-financial fields of a persisted transaction.
///
/// These carry no balance effect, so the Transaction Store applies them
/// directly without engine involvement.
#[derive(Debug, Clone, Default)]
pub struct TransactionDetails {
    /// New category label, if changing.
    pub category: Option<String>,
    /// New subcategory label, if changing (`Some(None)` clears it).
    pub subcategory: Option<Option<String>>,
    /// New counterparty, if changing (`Some(None)` clears it).
    pub counterparty: Option<Option<String>>,
    /// New note, if changing (`Some(None)` clears it).
    pub note: Option<Option<String>>,
    /// Replacement tag set, if changing.
    pub tags: Option<BTreeSet<String>>,
}

/// Aggregate: total spend per category over a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpending {
    /// The category label.
    pub category: String,
    /// Total expense amount in the category.
    pub total: Decimal,
}

/// Aggregate: net balance delta for one calendar day.
///
/// Income counts positive, expenses negative; transfers net to zero
/// across the ledger and are excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyDelta {
    /// The calendar day.
    pub date: NaiveDate,
    /// Net income minus expense for the day.
    pub delta: Decimal,
}
