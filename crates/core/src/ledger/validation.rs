//! Business rule validation for candidate transactions.
//!
//! Pure functions with no store access; the engine runs these before
//! touching any state.

use pocketledger_shared::types::AccountId;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::TransactionDirection;

/// Validates that a candidate amount is strictly positive.
///
/// # Errors
///
/// Returns [`LedgerError::NonPositiveAmount`] for zero or negative amounts.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount);
    }
    Ok(())
}

/// Validates the transfer shape of a candidate.
///
/// A Transfer requires a destination account distinct from the source;
/// Expense and Income must not carry one.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidTransferEndpoints`] on violation.
pub fn validate_transfer_shape(
    direction: TransactionDirection,
    from_account: AccountId,
    to_account: Option<AccountId>,
) -> Result<(), LedgerError> {
    match (direction, to_account) {
        (TransactionDirection::Transfer, Some(to)) if to != from_account => Ok(()),
        (TransactionDirection::Transfer, _) => Err(LedgerError::InvalidTransferEndpoints),
        (_, Some(_)) => Err(LedgerError::InvalidTransferEndpoints),
        (_, None) => Ok(()),
    }
}
