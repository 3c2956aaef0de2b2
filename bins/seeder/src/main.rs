//! Snapshot seeder for PocketLedger development and testing.
//!
//! Builds a small ledger — a few accounts, a week of transactions, and
//! a partially settled loan — and writes it to the configured snapshot
//! path so a fresh checkout has data to poke at.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pocketledger_core::account::{Account, AccountKind};
use pocketledger_core::ledger::{
    CreateLoanInput, LedgerEngine, TransactionDirection, TransactionDraft,
};
use pocketledger_core::loan::LoanDirection;
use pocketledger_core::store::AccountStore;
use pocketledger_shared::types::Currency;
use pocketledger_shared::AppConfig;
use pocketledger_store::MemoryStore;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pocketledger=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let currency: Currency = config
        .ledger
        .default_currency
        .parse()
        .map_err(anyhow::Error::msg)?;

    let store = Arc::new(MemoryStore::new());
    let engine = LedgerEngine::new(store.clone(), store.clone(), store.clone());

    info!(%currency, "seeding accounts");
    let cash = Account::new("Cash", AccountKind::Cash, dec!(2000)).with_currency(currency);
    let sbi = Account::new("SBI", AccountKind::Bank, dec!(15000)).with_currency(currency);
    let hdfc = Account::new("HDFC", AccountKind::Bank, dec!(5000)).with_currency(currency);
    let (cash_id, sbi_id, hdfc_id) = (cash.id, sbi.id, hdfc.id);
    for account in [cash, sbi, hdfc] {
        AccountStore::upsert(store.as_ref(), account);
    }

    info!("seeding a week of transactions");
    let now = Utc::now();
    let drafts = [
        TransactionDraft::new(TransactionDirection::Income, dec!(45000), sbi_id, "Salary")
            .at(now - Duration::days(7)),
        TransactionDraft::new(TransactionDirection::Expense, dec!(1200), sbi_id, "Rent")
            .at(now - Duration::days(6)),
        TransactionDraft::new(TransactionDirection::Transfer, dec!(500), sbi_id, "Transfer")
            .to_account(cash_id)
            .at(now - Duration::days(5)),
        TransactionDraft::new(TransactionDirection::Expense, dec!(150), cash_id, "Food")
            .at(now - Duration::days(4)),
        TransactionDraft::new(TransactionDirection::Expense, dec!(60), cash_id, "Transport")
            .at(now - Duration::days(3)),
        TransactionDraft::new(TransactionDirection::Expense, dec!(320), hdfc_id, "Groceries")
            .at(now - Duration::days(2)),
    ];
    for draft in drafts {
        engine.apply_transaction(draft)?;
    }

    info!("seeding a partially settled loan");
    let (loan, _) = engine.create_loan_with_disbursement(
        CreateLoanInput {
            counterparty: "Jane".to_string(),
            amount: dec!(800),
            direction: LoanDirection::ILent,
            related_transaction: None,
        },
        hdfc_id,
        None,
    )?;
    engine.settle_loan(loan.id, dec!(300), hdfc_id, None)?;

    let path = &config.store.path;
    store
        .save(path)
        .with_context(|| format!("failed to save snapshot to {path}"))?;
    info!(path = %path, "seed snapshot written");

    Ok(())
}
