//! Recurring rule types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use pocketledger_shared::types::{AccountId, RecurringRuleId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::types::{TransactionDirection, TransactionDraft};

use super::schedule::next_occurrence;

/// How often a rule recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every day.
    Daily,
    /// Every week.
    Weekly,
    /// Every month.
    Monthly,
    /// Every year.
    Yearly,
}

/// Partial transaction template a rule stamps out on each occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTemplate {
    /// Transaction amount.
    pub amount: Decimal,
    /// Direction of money movement.
    pub direction: TransactionDirection,
    /// Source account.
    pub from_account: AccountId,
    /// Destination account for transfers.
    pub to_account: Option<AccountId>,
    /// Category label.
    pub category: String,
    /// Optional subcategory label.
    pub subcategory: Option<String>,
    /// Who the transaction is with.
    pub counterparty: Option<String>,
    /// Optional note.
    pub note: Option<String>,
    /// Tags for categorization.
    pub tags: BTreeSet<String>,
}

/// A rule for recurring transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringRule {
    /// Unique rule ID.
    pub id: RecurringRuleId,
    /// The template to stamp out on each occurrence.
    pub template: TransactionTemplate,
    /// How often the rule recurs.
    pub frequency: Frequency,
    /// When the next occurrence is due.
    pub next_date: DateTime<Utc>,
    /// Last date the rule may fire, if bounded.
    pub end_date: Option<DateTime<Utc>>,
    /// Whether the rule is still active.
    pub is_active: bool,
}

impl RecurringRule {
    /// Whether the rule should fire at `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.next_date <= now
    }

    /// Materializes a candidate transaction for the current occurrence,
    /// timestamped at the scheduled date.
    #[must_use]
    pub fn to_draft(&self) -> TransactionDraft {
        let template = &self.template;
        TransactionDraft {
            id: None,
            timestamp: Some(self.next_date),
            amount: template.amount,
            direction: template.direction,
            from_account: template.from_account,
            to_account: template.to_account,
            category: template.category.clone(),
            subcategory: template.subcategory.clone(),
            counterparty: template.counterparty.clone(),
            note: template.note.clone(),
            tags: template.tags.clone(),
            is_loan_settlement: false,
            related_loan: None,
        }
    }

    /// Advances the rule to its next occurrence, deactivating it once
    /// the end date is passed.
    pub fn advance(&mut self) {
        self.next_date = next_occurrence(self.frequency, self.next_date);
        if let Some(end) = self.end_date {
            if self.next_date > end {
                self.is_active = false;
            }
        }
    }
}
