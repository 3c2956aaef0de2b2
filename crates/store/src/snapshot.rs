//! JSON snapshot persistence for [`MemoryStore`].
//!
//! The whole store is serialized as one JSON document. Saves write to a
//! sibling temp file first and rename into place, so a crash mid-write
//! leaves the previous snapshot intact.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use pocketledger_core::account::Account;
use pocketledger_core::ledger::types::Transaction;
use pocketledger_core::loan::LoanRecord;
use pocketledger_core::recurring::RecurringRule;

use crate::memory::MemoryStore;

/// Errors that can occur while loading or saving a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Reading or writing the snapshot file failed.
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The snapshot file is not valid JSON for the expected shape.
    #[error("snapshot is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// On-disk representation of the full store state.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    loans: Vec<LoanRecord>,
    #[serde(default)]
    recurring_rules: Vec<RecurringRule>,
}

impl MemoryStore {
    /// Loads a store from the snapshot at `path`.
    ///
    /// A missing file yields an empty store, so first launch needs no
    /// special casing.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the file exists but cannot be read
    /// or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no snapshot found, starting empty");
            return Ok(Self::new());
        }

        let reader = BufReader::new(File::open(path)?);
        let snapshot: Snapshot = serde_json::from_reader(reader)?;

        let store = Self::new();
        for account in snapshot.accounts {
            store.accounts.insert(account.id, account);
        }
        for transaction in snapshot.transactions {
            store.transactions.insert(transaction.id, transaction);
        }
        for loan in snapshot.loans {
            store.loans.insert(loan.id, loan);
        }
        for rule in snapshot.recurring_rules {
            store.rules.insert(rule.id, rule);
        }
        info!(
            path = %path.display(),
            accounts = store.accounts.len(),
            transactions = store.transactions.len(),
            loans = store.loans.len(),
            "snapshot loaded"
        );
        Ok(store)
    }

    /// Saves the store state to a snapshot at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if serialization or any file
    /// operation fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let snapshot = Snapshot {
            accounts: self.accounts.iter().map(|e| e.value().clone()).collect(),
            transactions: self
                .transactions
                .iter()
                .map(|e| e.value().clone())
                .collect(),
            loans: self.loans.iter().map(|e| e.value().clone()).collect(),
            recurring_rules: self.rules.iter().map(|e| e.value().clone()).collect(),
        };

        let tmp = path.with_extension("json.tmp");
        {
            let writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(writer, &snapshot)?;
        }
        fs::rename(&tmp, path)?;
        info!(
            path = %path.display(),
            transactions = snapshot.transactions.len(),
            "snapshot saved"
        );
        Ok(())
    }
}
