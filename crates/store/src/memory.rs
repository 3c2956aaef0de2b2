//! `DashMap`-backed implementation of the store contracts.
//!
//! Pure CRUD: nothing here touches an account balance or a loan
//! outstanding amount beyond storing the records it is handed. All
//! balance-effecting mutation goes through the Ledger Engine, which
//! serializes its own writes; concurrent readers see individually
//! consistent records.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use pocketledger_shared::types::{AccountId, LoanId, RecurringRuleId, TransactionId};
use rust_decimal::Decimal;

use pocketledger_core::account::Account;
use pocketledger_core::ledger::types::{
    CategorySpending, DailyDelta, Transaction, TransactionDetails, TransactionDirection,
};
use pocketledger_core::loan::{LoanDirection, LoanRecord};
use pocketledger_core::recurring::RecurringRule;
use pocketledger_core::store::{
    AccountStore, LoanStore, RecurringRuleStore, StoreError, TransactionStore,
};

/// In-memory store holding all four record collections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(crate) accounts: DashMap<AccountId, Account>,
    pub(crate) transactions: DashMap<TransactionId, Transaction>,
    pub(crate) loans: DashMap<LoanId, LoanRecord>,
    pub(crate) rules: DashMap<RecurringRuleId, RecurringRule>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transactions matching the filter, newest first.
    fn filtered<F>(&self, filter: F) -> Vec<Transaction>
    where
        F: Fn(&Transaction) -> bool,
    {
        let mut out: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out
    }
}

impl AccountStore for MemoryStore {
    fn get(&self, id: AccountId) -> Option<Account> {
        self.accounts.get(&id).map(|entry| entry.value().clone())
    }

    fn upsert(&self, account: Account) {
        self.accounts.insert(account.id, account);
    }

    fn delete(&self, id: AccountId) -> Result<(), StoreError> {
        let count = self
            .transactions
            .iter()
            .filter(|entry| {
                entry.value().from_account == id || entry.value().to_account == Some(id)
            })
            .count();
        if count > 0 {
            return Err(StoreError::HasReferencingTransactions { account: id, count });
        }
        self.accounts.remove(&id);
        Ok(())
    }

    fn list(&self) -> Vec<Account> {
        let mut out: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    fn sum_of_balances(&self) -> Decimal {
        self.accounts.iter().map(|entry| entry.value().balance).sum()
    }
}

impl TransactionStore for MemoryStore {
    fn insert(&self, transaction: Transaction) {
        self.transactions.insert(transaction.id, transaction);
    }

    fn update_details(&self, id: TransactionId, details: TransactionDetails) -> bool {
        let Some(mut entry) = self.transactions.get_mut(&id) else {
            return false;
        };
        let tx = entry.value_mut();
        if let Some(category) = details.category {
            tx.category = category;
        }
        if let Some(subcategory) = details.subcategory {
            tx.subcategory = subcategory;
        }
        if let Some(counterparty) = details.counterparty {
            tx.counterparty = counterparty;
        }
        if let Some(note) = details.note {
            tx.note = note;
        }
        if let Some(tags) = details.tags {
            tx.tags = tags;
        }
        true
    }

    fn delete(&self, id: TransactionId) -> bool {
        self.transactions.remove(&id).is_some()
    }

    fn get(&self, id: TransactionId) -> Option<Transaction> {
        self.transactions.get(&id).map(|entry| entry.value().clone())
    }

    fn list(&self) -> Vec<Transaction> {
        self.filtered(|_| true)
    }

    fn by_account(&self, account: AccountId) -> Vec<Transaction> {
        self.filtered(|t| t.from_account == account || t.to_account == Some(account))
    }

    fn by_category(&self, category: &str) -> Vec<Transaction> {
        self.filtered(|t| t.category == category)
    }

    fn by_counterparty(&self, counterparty: &str) -> Vec<Transaction> {
        self.filtered(|t| t.counterparty.as_deref() == Some(counterparty))
    }

    fn by_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Transaction> {
        self.filtered(|t| start <= t.timestamp && t.timestamp <= end)
    }

    fn by_direction(&self, direction: TransactionDirection) -> Vec<Transaction> {
        self.filtered(|t| t.direction == direction)
    }

    fn by_tag(&self, tag: &str) -> Vec<Transaction> {
        self.filtered(|t| t.tags.contains(tag))
    }

    fn search(&self, query: &str) -> Vec<Transaction> {
        let query = query.to_lowercase();
        self.filtered(|t| {
            t.category.to_lowercase().contains(&query)
                || t.note
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&query))
                || t.counterparty
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&query))
        })
    }

    fn settlements(&self) -> Vec<Transaction> {
        self.filtered(|t| t.is_loan_settlement)
    }

    fn by_loan(&self, loan: LoanId) -> Vec<Transaction> {
        self.filtered(|t| t.related_loan == Some(loan))
    }

    fn exists_in_window(
        &self,
        amount: Decimal,
        category: &str,
        from_account: AccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> bool {
        self.transactions.iter().any(|entry| {
            let t = entry.value();
            t.amount == amount
                && t.category == category
                && t.from_account == from_account
                && start <= t.timestamp
                && t.timestamp <= end
        })
    }

    fn income_total(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal {
        self.transactions
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|t| {
                t.direction == TransactionDirection::Income
                    && start <= t.timestamp
                    && t.timestamp <= end
            })
            .map(|t| t.amount)
            .sum()
    }

    fn expense_total(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal {
        self.transactions
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|t| {
                t.direction == TransactionDirection::Expense
                    && start <= t.timestamp
                    && t.timestamp <= end
            })
            .map(|t| t.amount)
            .sum()
    }

    fn expense_by_category(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<CategorySpending> {
        let mut totals: HashMap<String, Decimal> = HashMap::new();
        for t in self.by_date_range(start, end) {
            if t.direction == TransactionDirection::Expense {
                *totals.entry(t.category).or_default() += t.amount;
            }
        }
        let mut out: Vec<CategorySpending> = totals
            .into_iter()
            .map(|(category, total)| CategorySpending { category, total })
            .collect();
        out.sort_by(|a, b| b.total.cmp(&a.total));
        out
    }

    fn daily_deltas(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DailyDelta> {
        let mut totals: HashMap<NaiveDate, Decimal> = HashMap::new();
        for t in self.by_date_range(start, end) {
            let signed = match t.direction {
                TransactionDirection::Income => t.amount,
                TransactionDirection::Expense => -t.amount,
                TransactionDirection::Transfer => continue,
            };
            *totals.entry(t.timestamp.date_naive()).or_default() += signed;
        }
        let mut out: Vec<DailyDelta> = totals
            .into_iter()
            .map(|(date, delta)| DailyDelta { date, delta })
            .collect();
        out.sort_by(|a, b| a.date.cmp(&b.date));
        out
    }
}

impl LoanStore for MemoryStore {
    fn insert(&self, loan: LoanRecord) {
        self.loans.insert(loan.id, loan);
    }

    fn update(&self, loan: LoanRecord) {
        self.loans.insert(loan.id, loan);
    }

    fn delete(&self, id: LoanId) -> bool {
        self.loans.remove(&id).is_some()
    }

    fn get(&self, id: LoanId) -> Option<LoanRecord> {
        self.loans.get(&id).map(|entry| entry.value().clone())
    }

    fn list(&self) -> Vec<LoanRecord> {
        let mut out: Vec<LoanRecord> = self
            .loans
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    fn active(&self) -> Vec<LoanRecord> {
        LoanStore::list(self)
            .into_iter()
            .filter(|l| l.outstanding_amount > Decimal::ZERO)
            .collect()
    }

    fn sum_outstanding_by_direction(&self, direction: LoanDirection) -> Decimal {
        self.loans
            .iter()
            .filter(|entry| {
                entry.value().direction == direction
                    && entry.value().outstanding_amount > Decimal::ZERO
            })
            .map(|entry| entry.value().outstanding_amount)
            .sum()
    }
}

impl RecurringRuleStore for MemoryStore {
    fn insert(&self, rule: RecurringRule) {
        self.rules.insert(rule.id, rule);
    }

    fn update(&self, rule: RecurringRule) {
        self.rules.insert(rule.id, rule);
    }

    fn delete(&self, id: RecurringRuleId) -> bool {
        self.rules.remove(&id).is_some()
    }

    fn get(&self, id: RecurringRuleId) -> Option<RecurringRule> {
        self.rules.get(&id).map(|entry| entry.value().clone())
    }

    fn list(&self) -> Vec<RecurringRule> {
        let mut out: Vec<RecurringRule> = self
            .rules
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        out.sort_by(|a, b| a.next_date.cmp(&b.next_date));
        out
    }

    fn due(&self, now: DateTime<Utc>) -> Vec<RecurringRule> {
        RecurringRuleStore::list(self)
            .into_iter()
            .filter(|rule| rule.is_due(now))
            .collect()
    }
}
