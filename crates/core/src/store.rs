//! Store contracts the Ledger Engine depends on.
//!
//! Stores are pure CRUD with no business rules: they never touch an
//! account balance or a loan outstanding amount. All balance-effecting
//! mutation goes through the [`LedgerEngine`](crate::ledger::LedgerEngine),
//! which is constructed with explicit store handles - there is no global
//! store instance.
//!
//! Reads may run concurrently with a mutating engine unit and may observe
//! its pre- or post-state, but implementations must never expose an
//! internally inconsistent mid-unit state.

use chrono::{DateTime, Utc};
use pocketledger_shared::types::{AccountId, LoanId, RecurringRuleId, TransactionId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::Account;
use crate::ledger::types::{
    CategorySpending, DailyDelta, Transaction, TransactionDetails, TransactionDirection,
};
use crate::loan::{LoanDirection, LoanRecord};
use crate::recurring::RecurringRule;

/// Errors surfaced by store contracts.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The account still has transactions referencing it and cannot be
    /// deleted.
    #[error("Account {account} has {count} referencing transactions")]
    HasReferencingTransactions {
        /// The account that was asked to be deleted.
        account: AccountId,
        /// How many transactions reference it.
        count: usize,
    },
}

/// Persisted key-to-record mapping for accounts.
pub trait AccountStore: Send + Sync {
    /// Looks up an account by ID.
    fn get(&self, id: AccountId) -> Option<Account>;

    /// Inserts or replaces an account record.
    fn upsert(&self, account: Account);

    /// Deletes an account.
    ///
    /// Fails with [`StoreError::HasReferencingTransactions`] when any
    /// transaction references the account. Deleting an absent account is
    /// a no-op.
    fn delete(&self, id: AccountId) -> Result<(), StoreError>;

    /// Lists all accounts, ordered by name.
    fn list(&self) -> Vec<Account>;

    /// Sum of all account balances.
    fn sum_of_balances(&self) -> Decimal;
}

/// Persisted append-style collection of transaction records.
pub trait TransactionStore: Send + Sync {
    /// Inserts a transaction record.
    fn insert(&self, transaction: Transaction);

    /// Applies non-financial edits to a transaction. Returns false if
    /// the transaction does not exist.
    fn update_details(&self, id: TransactionId, details: TransactionDetails) -> bool;

    /// Deletes a transaction record. Returns false if absent.
    fn delete(&self, id: TransactionId) -> bool;

    /// Looks up a transaction by ID.
    fn get(&self, id: TransactionId) -> Option<Transaction>;

    /// Lists all transactions, newest first.
    fn list(&self) -> Vec<Transaction>;

    /// Transactions touching the account as source or destination.
    fn by_account(&self, account: AccountId) -> Vec<Transaction>;

    /// Transactions in the given category.
    fn by_category(&self, category: &str) -> Vec<Transaction>;

    /// Transactions with the given counterparty.
    fn by_counterparty(&self, counterparty: &str) -> Vec<Transaction>;

    /// Transactions with `start <= timestamp <= end`.
    fn by_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Transaction>;

    /// Transactions with the given direction.
    fn by_direction(&self, direction: TransactionDirection) -> Vec<Transaction>;

    /// Transactions carrying the given tag.
    fn by_tag(&self, tag: &str) -> Vec<Transaction>;

    /// Free-text search over note, category, and counterparty.
    fn search(&self, query: &str) -> Vec<Transaction>;

    /// All loan settlement transactions.
    fn settlements(&self) -> Vec<Transaction>;

    /// Transactions linked to the given loan.
    fn by_loan(&self, loan: LoanId) -> Vec<Transaction>;

    /// Whether a transaction with the same `(amount, category,
    /// from_account)` exists with `start <= timestamp <= end`.
    ///
    /// This is the duplicate-window query the engine relies on.
    fn exists_in_window(
        &self,
        amount: Decimal,
        category: &str,
        from_account: AccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> bool;

    /// Total income over the range.
    fn income_total(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal;

    /// Total expense over the range.
    fn expense_total(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal;

    /// Expense totals per category over the range, largest first.
    fn expense_by_category(&self, start: DateTime<Utc>, end: DateTime<Utc>)
        -> Vec<CategorySpending>;

    /// Net income-minus-expense delta per calendar day over the range,
    /// oldest first.
    fn daily_deltas(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DailyDelta>;
}

/// Persisted collection of loan records.
pub trait LoanStore: Send + Sync {
    /// Inserts a loan record.
    fn insert(&self, loan: LoanRecord);

    /// Replaces a loan record.
    fn update(&self, loan: LoanRecord);

    /// Deletes a loan record. Returns false if absent.
    fn delete(&self, id: LoanId) -> bool;

    /// Looks up a loan by ID.
    fn get(&self, id: LoanId) -> Option<LoanRecord>;

    /// Lists all loans, newest first.
    fn list(&self) -> Vec<LoanRecord>;

    /// Loans with outstanding amount > 0, newest first.
    fn active(&self) -> Vec<LoanRecord>;

    /// Sum of outstanding amounts over active loans in the direction.
    fn sum_outstanding_by_direction(&self, direction: LoanDirection) -> Decimal;
}

/// Persisted collection of recurring rules.
///
/// Rules are stored but never acted upon by the engine; an external
/// scheduler queries [`due`](RecurringRuleStore::due) and applies each
/// materialized draft through the engine.
pub trait RecurringRuleStore: Send + Sync {
    /// Inserts a rule.
    fn insert(&self, rule: RecurringRule);

    /// Replaces a rule.
    fn update(&self, rule: RecurringRule);

    /// Deletes a rule. Returns false if absent.
    fn delete(&self, id: RecurringRuleId) -> bool;

    /// Looks up a rule by ID.
    fn get(&self, id: RecurringRuleId) -> Option<RecurringRule>;

    /// Lists all rules, soonest next date first.
    fn list(&self) -> Vec<RecurringRule>;

    /// Active rules whose next date is at or before `now`.
    fn due(&self, now: DateTime<Utc>) -> Vec<RecurringRule>;
}
