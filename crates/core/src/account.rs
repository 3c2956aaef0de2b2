//! Financial account records.
//!
//! An account's `balance` is owned exclusively by the Ledger Engine: no
//! other component may change it. Callers create accounts with an initial
//! balance and from then on only the engine moves money.

use pocketledger_shared::types::{AccountId, Currency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Physical cash on hand.
    Cash,
    /// A bank account.
    Bank,
}

/// A financial account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Display name (e.g., "HDFC", "Cash").
    pub name: String,
    /// Kind of account.
    pub kind: AccountKind,
    /// Current balance. Mutated only by the Ledger Engine.
    pub balance: Decimal,
    /// Currency the account is denominated in.
    pub currency: Currency,
}

impl Account {
    /// Creates a new account with an initial balance in the default
    /// currency.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: AccountKind, balance: Decimal) -> Self {
        Self {
            id: AccountId::new(),
            name: name.into(),
            kind,
            balance,
            currency: Currency::default(),
        }
    }

    /// Sets the denomination currency, for callers carrying a
    /// configured default.
    #[must_use]
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}
