//! The Ledger Consistency Engine.
//!
//! The engine is the only component permitted to mutate account balances
//! or loan outstanding amounts. Every mutating operation is an atomic
//! unit: a single writer lock serializes units against each other, and
//! all validation runs before the first store write, so an interleaved
//! reader can observe the pre-state or the post-state of a unit but
//! never a partially applied one.
//!
//! There is no engine-level retry. Duplicate suppression exists
//! precisely so that a caller blindly re-submitting after a transient
//! failure does not double-apply an effect.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use pocketledger_shared::types::{LoanId, TransactionId};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::account::Account;
use crate::loan::{LoanDirection, LoanRecord};
use crate::store::{AccountStore, LoanStore, TransactionStore};

use super::error::LedgerError;
use super::types::{
    duplicate_window, Transaction, TransactionDirection, TransactionDraft,
    DUPLICATE_WINDOW_SECS, LOAN_DISBURSEMENT_CATEGORY, LOAN_REPAYMENT_CATEGORY,
    LOAN_SETTLEMENT_TAG,
};
use super::validation::{validate_amount, validate_transfer_shape};

/// Input for creating a loan record.
#[derive(Debug, Clone)]
pub struct CreateLoanInput {
    /// The other party involved in the loan.
    pub counterparty: String,
    /// The loan amount (must be strictly positive).
    pub amount: Decimal,
    /// Which side of the loan the user is on.
    pub direction: LoanDirection,
    /// Originating cash-movement transaction to seed the history with,
    /// if the caller already applied one.
    pub related_transaction: Option<TransactionId>,
}

/// The Ledger Consistency Engine.
///
/// Constructed once with explicit store handles and shared by reference;
/// there is no hidden global state.
pub struct LedgerEngine {
    accounts: Arc<dyn AccountStore>,
    transactions: Arc<dyn TransactionStore>,
    loans: Arc<dyn LoanStore>,
    write_lock: Mutex<()>,
}

impl LedgerEngine {
    /// Creates an engine over the given stores.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        transactions: Arc<dyn TransactionStore>,
        loans: Arc<dyn LoanStore>,
    ) -> Self {
        Self {
            accounts,
            transactions,
            loans,
            write_lock: Mutex::new(()),
        }
    }

    /// Acquires the writer lock for one mutating unit.
    ///
    /// A poisoned lock is recovered: units never leave partially applied
    /// state behind, so the data the lock guards is still consistent.
    fn lock_unit(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validates and applies a candidate transaction as one atomic unit.
    ///
    /// On success the transaction record and the updated balance(s) are
    /// persisted together and the persisted record is returned. On any
    /// failure no state changes.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::NonPositiveAmount`] - amount is zero or negative
    /// * [`LedgerError::InvalidTransferEndpoints`] - malformed transfer shape
    /// * [`LedgerError::AccountNotFound`] - a referenced account is missing
    /// * [`LedgerError::DuplicateTransaction`] - an indistinguishable
    ///   transaction exists in the trailing 30-second window
    /// * [`LedgerError::InsufficientBalance`] - a debit would drive a
    ///   balance negative
    #[instrument(skip(self, draft), fields(direction = ?draft.direction))]
    pub fn apply_transaction(&self, draft: TransactionDraft) -> Result<Transaction, LedgerError> {
        let _guard = self.lock_unit();
        self.apply_locked(draft)
    }

    /// Applies a candidate while the caller already holds the writer
    /// lock. All validation precedes the first store write.
    fn apply_locked(&self, mut draft: TransactionDraft) -> Result<Transaction, LedgerError> {
        validate_amount(draft.amount)?;
        validate_transfer_shape(draft.direction, draft.from_account, draft.to_account)?;

        let from = self
            .accounts
            .get(draft.from_account)
            .ok_or(LedgerError::AccountNotFound(draft.from_account))?;

        let to = match draft.to_account {
            Some(id) => Some(
                self.accounts
                    .get(id)
                    .ok_or(LedgerError::AccountNotFound(id))?,
            ),
            None => None,
        };

        let now = Utc::now();
        let timestamp = draft.timestamp.unwrap_or(now);
        draft.timestamp = Some(timestamp);

        // First writer wins; there is no override path.
        if self.transactions.exists_in_window(
            draft.amount,
            &draft.category,
            draft.from_account,
            timestamp - duplicate_window(),
            timestamp,
        ) {
            return Err(LedgerError::DuplicateTransaction {
                window_secs: DUPLICATE_WINDOW_SECS,
            });
        }

        let (new_from, new_to) = match draft.direction {
            TransactionDirection::Expense => {
                (Self::debited(&from, draft.amount)?, None)
            }
            TransactionDirection::Income => {
                let mut from = from;
                from.balance += draft.amount;
                (from, None)
            }
            TransactionDirection::Transfer => {
                let new_from = Self::debited(&from, draft.amount)?;
                // to is always present here after shape validation
                let mut to = to.ok_or(LedgerError::InvalidTransferEndpoints)?;
                to.balance += draft.amount;
                (new_from, Some(to))
            }
        };

        // Point of no return: every write below is infallible under the
        // writer lock, so the unit commits in full.
        let transaction = draft.into_transaction(now);
        self.transactions.insert(transaction.clone());
        self.accounts.upsert(new_from);
        if let Some(to) = new_to {
            self.accounts.upsert(to);
        }

        info!(
            id = %transaction.id,
            amount = %transaction.amount,
            "transaction applied"
        );
        Ok(transaction)
    }

    /// Returns the account with `amount` subtracted, rejecting debits
    /// that would drive the balance negative.
    fn debited(account: &Account, amount: Decimal) -> Result<Account, LedgerError> {
        let new_balance = account.balance - amount;
        if new_balance < Decimal::ZERO {
            return Err(LedgerError::InsufficientBalance {
                account: account.id,
                balance: account.balance,
                required: amount,
            });
        }
        let mut updated = account.clone();
        updated.balance = new_balance;
        Ok(updated)
    }

    /// Atomically undoes a previously applied transaction: the inverse
    /// balance deltas are applied and the record is deleted, as one unit.
    ///
    /// Subtracting legs (the source account of an Income reversal, the
    /// destination account of a Transfer reversal) are rejected with
    /// `InsufficientBalance` if they would go negative - that indicates
    /// the balance was already mutated out-of-band.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::TransactionNotFound`] - no such transaction
    /// * [`LedgerError::AccountNotFound`] - a touched account is missing
    /// * [`LedgerError::InsufficientBalance`] - a subtracting leg would
    ///   go negative
    #[instrument(skip(self))]
    pub fn reverse_transaction(&self, id: TransactionId) -> Result<(), LedgerError> {
        let _guard = self.lock_unit();

        let transaction = self
            .transactions
            .get(id)
            .ok_or(LedgerError::TransactionNotFound(id))?;

        let from = self
            .accounts
            .get(transaction.from_account)
            .ok_or(LedgerError::AccountNotFound(transaction.from_account))?;

        let (new_from, new_to) = match transaction.direction {
            TransactionDirection::Expense => {
                let mut from = from;
                from.balance += transaction.amount;
                (from, None)
            }
            TransactionDirection::Income => {
                (Self::debited(&from, transaction.amount)?, None)
            }
            TransactionDirection::Transfer => {
                let to_id = transaction
                    .to_account
                    .ok_or(LedgerError::InvalidTransferEndpoints)?;
                let to = self
                    .accounts
                    .get(to_id)
                    .ok_or(LedgerError::AccountNotFound(to_id))?;
                let mut from = from;
                from.balance += transaction.amount;
                (from, Some(Self::debited(&to, transaction.amount)?))
            }
        };

        self.accounts.upsert(new_from);
        if let Some(to) = new_to {
            self.accounts.upsert(to);
        }
        self.transactions.delete(id);

        info!(id = %id, "transaction reversed");
        Ok(())
    }

    /// Creates a loan record with `outstanding = original = amount`.
    ///
    /// No balance side effect by itself; use
    /// [`create_loan_with_disbursement`](Self::create_loan_with_disbursement)
    /// to compose the originating cash movement atomically.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NonPositiveAmount`] for a non-positive amount.
    #[instrument(skip(self, input), fields(direction = ?input.direction))]
    pub fn create_loan(&self, input: CreateLoanInput) -> Result<LoanRecord, LedgerError> {
        let _guard = self.lock_unit();
        validate_amount(input.amount)?;

        let loan = LoanRecord {
            id: LoanId::new(),
            direction: input.direction,
            counterparty: input.counterparty,
            original_amount: input.amount,
            outstanding_amount: input.amount,
            created_at: Utc::now(),
            history: input.related_transaction.into_iter().collect(),
        };
        self.loans.insert(loan.clone());

        debug!(id = %loan.id, "loan created");
        Ok(loan)
    }

    /// Creates a loan together with its originating cash movement, as
    /// one atomic unit.
    ///
    /// Lending (`ILent`) disburses an Expense from `source_account`;
    /// borrowing (`IBorrowed`) receives an Income into it. The loan's
    /// history is seeded with the disbursement transaction. Any failure
    /// applying the transaction leaves no loan behind.
    ///
    /// # Errors
    ///
    /// Same as [`apply_transaction`](Self::apply_transaction).
    #[instrument(skip(self, input), fields(direction = ?input.direction))]
    pub fn create_loan_with_disbursement(
        &self,
        input: CreateLoanInput,
        source_account: pocketledger_shared::types::AccountId,
        note: Option<String>,
    ) -> Result<(LoanRecord, Transaction), LedgerError> {
        let _guard = self.lock_unit();
        validate_amount(input.amount)?;

        let loan_id = LoanId::new();
        let default_note = match input.direction {
            LoanDirection::ILent => format!("Loan to {}", input.counterparty),
            LoanDirection::IBorrowed => format!("Loan from {}", input.counterparty),
        };

        let mut draft = TransactionDraft::new(
            input.direction.disbursement_direction(),
            input.amount,
            source_account,
            LOAN_DISBURSEMENT_CATEGORY,
        );
        draft.counterparty = Some(input.counterparty.clone());
        draft.note = Some(note.unwrap_or(default_note));
        draft.related_loan = Some(loan_id);

        let transaction = self.apply_locked(draft)?;

        let loan = LoanRecord {
            id: loan_id,
            direction: input.direction,
            counterparty: input.counterparty,
            original_amount: input.amount,
            outstanding_amount: input.amount,
            created_at: Utc::now(),
            history: vec![transaction.id],
        };
        self.loans.insert(loan.clone());

        info!(id = %loan.id, transaction = %transaction.id, "loan opened with disbursement");
        Ok((loan, transaction))
    }

    /// Settles (part of) a loan as one atomic unit: applies the
    /// settlement transaction, decrements the outstanding amount, and
    /// appends the transaction to the loan's history.
    ///
    /// The settlement direction derives from the loan: `ILent`
    /// repayments are Income into `source_account`, `IBorrowed`
    /// repayments are Expense from it. When the settlement amount equals
    /// the outstanding amount the loan transitions to Settled; a settled
    /// loan accepts no further settlement.
    ///
    /// Any failure applying the settlement transaction aborts the whole
    /// operation with no loan or account mutation.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::LoanNotFound`] - no such loan
    /// * [`LedgerError::NonPositiveAmount`] - non-positive amount
    /// * [`LedgerError::PaymentExceedsOutstanding`] - amount exceeds the
    ///   outstanding amount (a settled loan always fails this way)
    /// * plus any error from [`apply_transaction`](Self::apply_transaction)
    #[instrument(skip(self, note))]
    pub fn settle_loan(
        &self,
        loan_id: LoanId,
        amount: Decimal,
        source_account: pocketledger_shared::types::AccountId,
        note: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        let _guard = self.lock_unit();

        let mut loan = self
            .loans
            .get(loan_id)
            .ok_or(LedgerError::LoanNotFound(loan_id))?;

        validate_amount(amount)?;

        if amount > loan.outstanding_amount {
            return Err(LedgerError::PaymentExceedsOutstanding {
                loan: loan_id,
                amount,
                outstanding: loan.outstanding_amount,
            });
        }

        let mut draft = TransactionDraft::new(
            loan.direction.settlement_direction(),
            amount,
            source_account,
            LOAN_REPAYMENT_CATEGORY,
        );
        draft.counterparty = Some(loan.counterparty.clone());
        draft.note =
            Some(note.unwrap_or_else(|| format!("Settlement for loan to {}", loan.counterparty)));
        draft.tags.insert(LOAN_SETTLEMENT_TAG.to_string());
        draft.is_loan_settlement = true;
        draft.related_loan = Some(loan_id);

        let transaction = self.apply_locked(draft)?;

        loan.outstanding_amount -= amount;
        loan.history.push(transaction.id);
        self.loans.update(loan.clone());

        info!(
            loan = %loan_id,
            outstanding = %loan.outstanding_amount,
            "loan settlement applied"
        );
        Ok(transaction)
    }

    /// Deletes a fully settled loan record.
    ///
    /// The settlement transactions themselves are retained; only the
    /// loan record is removed.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::LoanNotFound`] - no such loan
    /// * [`LedgerError::LoanNotFullySettled`] - outstanding amount > 0
    #[instrument(skip(self))]
    pub fn delete_loan(&self, loan_id: LoanId) -> Result<(), LedgerError> {
        let _guard = self.lock_unit();

        let loan = self
            .loans
            .get(loan_id)
            .ok_or(LedgerError::LoanNotFound(loan_id))?;

        if loan.outstanding_amount > Decimal::ZERO {
            return Err(LedgerError::LoanNotFullySettled {
                loan: loan_id,
                outstanding: loan.outstanding_amount,
            });
        }

        self.loans.delete(loan_id);
        debug!(id = %loan_id, "loan deleted");
        Ok(())
    }
}
