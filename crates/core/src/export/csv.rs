//! Quoted-CSV export of transactions for downstream consumers.
//!
//! One header row, one row per transaction, tags joined with `;`.
//! Account IDs are resolved to display names through the Account Store,
//! falling back to the raw ID for accounts that no longer resolve.

use std::io::Write;

use thiserror::Error;

use crate::ledger::types::{Transaction, TransactionDirection};
use crate::store::AccountStore;

/// Delimiter used to join a transaction's tags into one field.
pub const TAG_DELIMITER: &str = ";";

/// Errors that can occur during CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing a CSV record failed.
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
}

fn direction_label(direction: TransactionDirection) -> &'static str {
    match direction {
        TransactionDirection::Expense => "Expense",
        TransactionDirection::Income => "Income",
        TransactionDirection::Transfer => "Transfer",
    }
}

fn account_name(accounts: &dyn AccountStore, id: pocketledger_shared::types::AccountId) -> String {
    accounts
        .get(id)
        .map_or_else(|| id.to_string(), |account| account.name)
}

/// Writes the transactions as quoted CSV to `out`.
///
/// # Errors
///
/// Returns [`ExportError`] if writing fails.
pub fn write_csv<W: Write>(
    out: W,
    transactions: &[Transaction],
    accounts: &dyn AccountStore,
) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(out);

    writer.write_record([
        "Date",
        "Amount",
        "Direction",
        "Category",
        "Counterparty",
        "Note",
        "Tags",
        "From Account",
        "To Account",
    ])?;

    for transaction in transactions {
        let tags: Vec<&str> = transaction.tags.iter().map(String::as_str).collect();
        writer.write_record([
            transaction.timestamp.to_rfc3339(),
            transaction.amount.to_string(),
            direction_label(transaction.direction).to_string(),
            transaction.category.clone(),
            transaction.counterparty.clone().unwrap_or_default(),
            transaction.note.clone().unwrap_or_default(),
            tags.join(TAG_DELIMITER),
            account_name(accounts, transaction.from_account),
            transaction
                .to_account
                .map_or_else(String::new, |id| account_name(accounts, id)),
        ])?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
