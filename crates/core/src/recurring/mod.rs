//! Recurring transaction rules.
//!
//! Rules are stored templates plus a schedule; the engine never executes
//! them. An external scheduler queries the due rules, applies each
//! materialized draft through the engine, then advances the rule.

pub mod schedule;
pub mod types;

pub use schedule::next_occurrence;
pub use types::{Frequency, RecurringRule, TransactionTemplate};
