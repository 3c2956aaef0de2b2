//! In-memory test doubles for the store contracts.
//!
//! A single `TestStore` implements all three contracts over plain
//! `Mutex<HashMap>` collections, so engine tests exercise the real
//! engine against a minimal backing store.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use pocketledger_shared::types::{AccountId, LoanId, TransactionId};
use rust_decimal::Decimal;

use crate::account::Account;
use crate::ledger::types::{
    CategorySpending, DailyDelta, Transaction, TransactionDetails, TransactionDirection,
};
use crate::loan::{LoanDirection, LoanRecord};
use crate::store::{AccountStore, LoanStore, StoreError, TransactionStore};

/// Minimal in-memory backing store for engine tests.
#[derive(Default)]
pub(crate) struct TestStore {
    accounts: Mutex<HashMap<AccountId, Account>>,
    transactions: Mutex<HashMap<TransactionId, Transaction>>,
    loans: Mutex<HashMap<LoanId, LoanRecord>>,
}

impl TestStore {
    fn transactions_snapshot(&self) -> Vec<Transaction> {
        let mut all: Vec<Transaction> =
            self.transactions.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        all
    }
}

impl AccountStore for TestStore {
    fn get(&self, id: AccountId) -> Option<Account> {
        self.accounts.lock().unwrap().get(&id).cloned()
    }

    fn upsert(&self, account: Account) {
        self.accounts.lock().unwrap().insert(account.id, account);
    }

    fn delete(&self, id: AccountId) -> Result<(), StoreError> {
        let count = self
            .transactions_snapshot()
            .iter()
            .filter(|t| t.from_account == id || t.to_account == Some(id))
            .count();
        if count > 0 {
            return Err(StoreError::HasReferencingTransactions { account: id, count });
        }
        self.accounts.lock().unwrap().remove(&id);
        Ok(())
    }

    fn list(&self) -> Vec<Account> {
        let mut all: Vec<Account> = self.accounts.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    fn sum_of_balances(&self) -> Decimal {
        self.accounts
            .lock()
            .unwrap()
            .values()
            .map(|a| a.balance)
            .sum()
    }
}

impl TransactionStore for TestStore {
    fn insert(&self, transaction: Transaction) {
        self.transactions
            .lock()
            .unwrap()
            .insert(transaction.id, transaction);
    }

    fn update_details(&self, id: TransactionId, details: TransactionDetails) -> bool {
        let mut map = self.transactions.lock().unwrap();
        let Some(tx) = map.get_mut(&id) else {
            return false;
        };
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
        self.transactions.lock().unwrap().remove(&id).is_some()
    }

    fn get(&self, id: TransactionId) -> Option<Transaction> {
        self.transactions.lock().unwrap().get(&id).cloned()
    }

    fn list(&self) -> Vec<Transaction> {
        self.transactions_snapshot()
    }

    fn by_account(&self, account: AccountId) -> Vec<Transaction> {
        self.transactions_snapshot()
            .into_iter()
            .filter(|t| t.from_account == account || t.to_account == Some(account))
            .collect()
    }

    fn by_category(&self, category: &str) -> Vec<Transaction> {
        self.transactions_snapshot()
            .into_iter()
            .filter(|t| t.category == category)
            .collect()
    }

    fn by_counterparty(&self, counterparty: &str) -> Vec<Transaction> {
        self.transactions_snapshot()
            .into_iter()
            .filter(|t| t.counterparty.as_deref() == Some(counterparty))
            .collect()
    }

    fn by_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Transaction> {
        self.transactions_snapshot()
            .into_iter()
            .filter(|t| start <= t.timestamp && t.timestamp <= end)
            .collect()
    }

    fn by_direction(&self, direction: TransactionDirection) -> Vec<Transaction> {
        self.transactions_snapshot()
            .into_iter()
            .filter(|t| t.direction == direction)
            .collect()
    }

    fn by_tag(&self, tag: &str) -> Vec<Transaction> {
        self.transactions_snapshot()
            .into_iter()
            .filter(|t| t.tags.contains(tag))
            .collect()
    }

    fn search(&self, query: &str) -> Vec<Transaction> {
        let query = query.to_lowercase();
        self.transactions_snapshot()
            .into_iter()
            .filter(|t| {
                t.category.to_lowercase().contains(&query)
                    || t.note
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&query))
                    || t.counterparty
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&query))
            })
            .collect()
    }

    fn settlements(&self) -> Vec<Transaction> {
        self.transactions_snapshot()
            .into_iter()
            .filter(|t| t.is_loan_settlement)
            .collect()
    }

    fn by_loan(&self, loan: LoanId) -> Vec<Transaction> {
        self.transactions_snapshot()
            .into_iter()
            .filter(|t| t.related_loan == Some(loan))
            .collect()
    }

    fn exists_in_window(
        &self,
        amount: Decimal,
        category: &str,
        from_account: AccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> bool {
        self.transactions.lock().unwrap().values().any(|t| {
            t.amount == amount
                && t.category == category
                && t.from_account == from_account
                && start <= t.timestamp
                && t.timestamp <= end
        })
    }

    fn income_total(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal {
        self.by_date_range(start, end)
            .iter()
            .filter(|t| t.direction == TransactionDirection::Income)
            .map(|t| t.amount)
            .sum()
    }

    fn expense_total(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal {
        self.by_date_range(start, end)
            .iter()
            .filter(|t| t.direction == TransactionDirection::Expense)
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
        let mut totals: HashMap<chrono::NaiveDate, Decimal> = HashMap::new();
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

impl LoanStore for TestStore {
    fn insert(&self, loan: LoanRecord) {
        self.loans.lock().unwrap().insert(loan.id, loan);
    }

    fn update(&self, loan: LoanRecord) {
        self.loans.lock().unwrap().insert(loan.id, loan);
    }

    fn delete(&self, id: LoanId) -> bool {
        self.loans.lock().unwrap().remove(&id).is_some()
    }

    fn get(&self, id: LoanId) -> Option<LoanRecord> {
        self.loans.lock().unwrap().get(&id).cloned()
    }

    fn list(&self) -> Vec<LoanRecord> {
        let mut all: Vec<LoanRecord> = self.loans.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    fn active(&self) -> Vec<LoanRecord> {
        LoanStore::list(self)
            .into_iter()
            .filter(|l| l.outstanding_amount > Decimal::ZERO)
            .collect()
    }

    fn sum_outstanding_by_direction(&self, direction: LoanDirection) -> Decimal {
        self.loans
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.direction == direction && l.outstanding_amount > Decimal::ZERO)
            .map(|l| l.outstanding_amount)
            .sum()
    }
}
