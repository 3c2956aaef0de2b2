//! Property-based tests for the Ledger Consistency Engine.
//!
//! - Property 1: Balance Arithmetic (income adds, expense subtracts)
//! - Property 2: Transfer Conservation
//! - Property 3: Reversal Round Trip
//! - Property 4: Duplicate Window Boundary
//! - Property 5: Loan Settlement Consistency

use std::sync::Arc;

use chrono::{Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::account::{Account, AccountKind};
use crate::loan::LoanDirection;
use crate::store::{AccountStore, LoanStore, TransactionStore};

use super::engine::{CreateLoanInput, LedgerEngine};
use super::error::LedgerError;
use super::testing::TestStore;
use super::types::{TransactionDirection, TransactionDraft};

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate non-Transfer directions.
fn simple_direction() -> impl Strategy<Value = TransactionDirection> {
    prop_oneof![
        Just(TransactionDirection::Expense),
        Just(TransactionDirection::Income),
    ]
}

/// Strategy to generate loan directions.
fn loan_direction() -> impl Strategy<Value = LoanDirection> {
    prop_oneof![Just(LoanDirection::ILent), Just(LoanDirection::IBorrowed)]
}

fn setup() -> (Arc<TestStore>, LedgerEngine) {
    let store = Arc::new(TestStore::default());
    let engine = LedgerEngine::new(store.clone(), store.clone(), store.clone());
    (store, engine)
}

fn seed_account(store: &Arc<TestStore>, balance: Decimal) -> pocketledger_shared::types::AccountId {
    let account = Account::new("Account", AccountKind::Bank, balance);
    let id = account.id;
    AccountStore::upsert(store.as_ref(), account);
    id
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property 1: Balance Arithmetic
    // =========================================================================

    /// *For any* valid Income transaction,
    /// `balance_after = balance_before + amount`.
    #[test]
    fn prop_income_adds_amount(
        initial in positive_amount(),
        amount in positive_amount(),
    ) {
        let (store, engine) = setup();
        let account = seed_account(&store, initial);

        let result = engine.apply_transaction(TransactionDraft::new(
            TransactionDirection::Income,
            amount,
            account,
            "Salary",
        ));

        prop_assert!(result.is_ok());
        prop_assert_eq!(
            AccountStore::get(store.as_ref(), account).unwrap().balance,
            initial + amount
        );
    }

    /// *For any* Expense: succeeds exactly when `amount <= balance`, and
    /// the account record is unchanged on rejection.
    #[test]
    fn prop_expense_subtracts_or_rejects(
        initial in positive_amount(),
        amount in positive_amount(),
    ) {
        let (store, engine) = setup();
        let account = seed_account(&store, initial);
        let before = AccountStore::get(store.as_ref(), account).unwrap();

        let result = engine.apply_transaction(TransactionDraft::new(
            TransactionDirection::Expense,
            amount,
            account,
            "Food",
        ));

        if amount <= initial {
            prop_assert!(result.is_ok());
            prop_assert_eq!(
                AccountStore::get(store.as_ref(), account).unwrap().balance,
                initial - amount
            );
        } else {
            prop_assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })), "expected InsufficientBalance, got {:?}", result);
            prop_assert_eq!(AccountStore::get(store.as_ref(), account).unwrap(), before);
            prop_assert!(TransactionStore::list(store.as_ref()).is_empty());
        }
    }

    // =========================================================================
    // Property 2: Transfer Conservation
    // =========================================================================

    /// *For any* valid Transfer, the sum of the two balances is
    /// conserved.
    #[test]
    fn prop_transfer_conserves_total(
        from_balance in positive_amount(),
        to_balance in positive_amount(),
        amount in positive_amount(),
    ) {
        let (store, engine) = setup();
        let from = seed_account(&store, from_balance);
        let to = seed_account(&store, to_balance);
        let total_before = from_balance + to_balance;

        let result = engine.apply_transaction(
            TransactionDraft::new(TransactionDirection::Transfer, amount, from, "Transfer")
                .to_account(to),
        );

        // Whether the transfer succeeded or was rejected for balance,
        // the total never changes.
        if amount > from_balance {
            prop_assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })), "expected InsufficientBalance, got {:?}", result);
        } else {
            prop_assert!(result.is_ok());
        }
        prop_assert_eq!(AccountStore::sum_of_balances(store.as_ref()), total_before);
    }

    // =========================================================================
    // Property 3: Reversal Round Trip
    // =========================================================================

    /// *For any* applied transaction, reversal restores every touched
    /// account to its exact pre-application balance.
    #[test]
    fn prop_reversal_round_trip(
        initial in positive_amount(),
        amount in positive_amount(),
        direction in simple_direction(),
    ) {
        let (store, engine) = setup();
        // Fund the account so Expense never trips the balance check.
        let account = seed_account(&store, initial + amount);
        let before = AccountStore::get(store.as_ref(), account).unwrap().balance;

        let tx = engine
            .apply_transaction(TransactionDraft::new(direction, amount, account, "Misc"))
            .unwrap();
        engine.reverse_transaction(tx.id).unwrap();

        prop_assert_eq!(
            AccountStore::get(store.as_ref(), account).unwrap().balance,
            before
        );
        prop_assert!(TransactionStore::get(store.as_ref(), tx.id).is_none());
    }

    /// Transfer reversal restores both legs exactly.
    #[test]
    fn prop_transfer_reversal_round_trip(
        from_balance in positive_amount(),
        to_balance in positive_amount(),
        amount in positive_amount(),
    ) {
        let (store, engine) = setup();
        let from = seed_account(&store, from_balance + amount);
        let to = seed_account(&store, to_balance);

        let tx = engine
            .apply_transaction(
                TransactionDraft::new(TransactionDirection::Transfer, amount, from, "Transfer")
                    .to_account(to),
            )
            .unwrap();
        engine.reverse_transaction(tx.id).unwrap();

        prop_assert_eq!(
            AccountStore::get(store.as_ref(), from).unwrap().balance,
            from_balance + amount
        );
        prop_assert_eq!(
            AccountStore::get(store.as_ref(), to).unwrap().balance,
            to_balance
        );
    }

    // =========================================================================
    // Property 4: Duplicate Window Boundary
    // =========================================================================

    /// A second indistinguishable candidate is rejected inside the
    /// trailing 30-second window and accepted outside it.
    #[test]
    fn prop_duplicate_window_boundary(
        amount in positive_amount(),
        offset_secs in 0i64..120,
    ) {
        let (store, engine) = setup();
        let account = seed_account(&store, amount + amount);
        let base = Utc::now();

        engine
            .apply_transaction(
                TransactionDraft::new(TransactionDirection::Expense, amount, account, "Food")
                    .at(base),
            )
            .unwrap();
        let result = engine.apply_transaction(
            TransactionDraft::new(TransactionDirection::Expense, amount, account, "Food")
                .at(base + Duration::seconds(offset_secs)),
        );

        if offset_secs <= super::types::DUPLICATE_WINDOW_SECS {
            prop_assert!(matches!(result, Err(LedgerError::DuplicateTransaction { .. })), "expected DuplicateTransaction, got {:?}", result);
            prop_assert_eq!(TransactionStore::list(store.as_ref()).len(), 1);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(TransactionStore::list(store.as_ref()).len(), 2);
        }
    }

    // =========================================================================
    // Property 5: Loan Settlement Consistency
    // =========================================================================

    /// After any sequence of valid partial settlements, the outstanding
    /// amount equals original minus the sum settled, the history length
    /// matches the number of settlements, and every settlement
    /// transaction links back to the loan.
    #[test]
    fn prop_partial_settlements_stay_consistent(
        original_cents in 100i64..1_000_000,
        splits in prop::collection::vec(1u32..100, 1..5),
        direction in loan_direction(),
    ) {
        let (store, engine) = setup();
        let original = Decimal::new(original_cents, 2);
        // Fund generously so IBorrowed settlements never hit the
        // balance check.
        let account = seed_account(&store, original * Decimal::from(2));
        let loan = engine
            .create_loan(CreateLoanInput {
                counterparty: "Jane".to_string(),
                amount: original,
                direction,
                related_transaction: None,
            })
            .unwrap();

        // Convert split weights into amounts that never overshoot.
        let mut remaining = original;
        let mut settled_total = Decimal::ZERO;
        let mut settlements = 0usize;

        for weight in splits {
            if remaining.is_zero() {
                break;
            }
            let amount = std::cmp::min(Decimal::new(i64::from(weight), 0), remaining);
            match engine.settle_loan(loan.id, amount, account, None) {
                Ok(tx) => {
                    prop_assert!(tx.is_loan_settlement);
                    prop_assert_eq!(tx.related_loan, Some(loan.id));
                    remaining -= amount;
                    settled_total += amount;
                    settlements += 1;
                }
                Err(LedgerError::DuplicateTransaction { .. }) => {
                    // Two identical settlements inside the window are
                    // indistinguishable resubmissions and rejected by
                    // design; the loan must be untouched by them.
                }
                Err(e) => return Err(TestCaseError::fail(format!("unexpected error: {e}"))),
            }
        }

        let loan = LoanStore::get(store.as_ref(), loan.id).unwrap();
        prop_assert_eq!(loan.outstanding_amount, original - settled_total);
        prop_assert_eq!(loan.history.len(), settlements);
        prop_assert!(loan.outstanding_amount >= Decimal::ZERO);
    }

    /// Overpayment is rejected and mutates nothing.
    #[test]
    fn prop_overpayment_rejected_without_mutation(
        original in positive_amount(),
        excess in positive_amount(),
        direction in loan_direction(),
    ) {
        let (store, engine) = setup();
        let account = seed_account(&store, original + excess);
        let loan = engine
            .create_loan(CreateLoanInput {
                counterparty: "Jane".to_string(),
                amount: original,
                direction,
                related_transaction: None,
            })
            .unwrap();

        let result = engine.settle_loan(loan.id, original + excess, account, None);

        prop_assert!(matches!(result, Err(LedgerError::PaymentExceedsOutstanding { .. })), "expected PaymentExceedsOutstanding, got {:?}", result);
        prop_assert_eq!(
            LoanStore::get(store.as_ref(), loan.id).unwrap().outstanding_amount,
            original
        );
        prop_assert!(TransactionStore::list(store.as_ref()).is_empty());
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Full settlement drives the loan to Settled and the account to the
    /// expected balance.
    #[test]
    fn test_full_settlement_example() {
        use rust_decimal_macros::dec;

        let (store, engine) = setup();
        let hdfc = seed_account(&store, dec!(5000));
        let loan = engine
            .create_loan(CreateLoanInput {
                counterparty: "Jane".to_string(),
                amount: dec!(500),
                direction: LoanDirection::IBorrowed,
                related_transaction: None,
            })
            .unwrap();

        engine.settle_loan(loan.id, dec!(500), hdfc, None).unwrap();

        let loan = LoanStore::get(store.as_ref(), loan.id).unwrap();
        assert_eq!(loan.outstanding_amount, dec!(0));
        assert_eq!(
            AccountStore::get(store.as_ref(), hdfc).unwrap().balance,
            dec!(4500)
        );
    }
}
