use std::borrow::Borrow;

use thiserror::Error;

use crate::domain::{AccountError, AccountId, Cents, format_cents};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Account already exists: {0}")]
    DuplicateAccount(AccountId),

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error(
        "Insufficient funds in account {account}: balance {}, required {}",
        money(.balance),
        money(.required)
    )]
    InsufficientFunds {
        account: AccountId,
        balance: Cents,
        required: Cents,
    },

    #[error("Persistence failure: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidArgument(reason) => AppError::InvalidArgument(reason),
            AccountError::InsufficientFunds {
                account,
                balance,
                required,
            } => AppError::InsufficientFunds {
                account,
                balance,
                required,
            },
        }
    }
}

// Error fields reach the format arguments by reference.
fn money(cents: impl Borrow<Cents>) -> String {
    format_cents(*cents.borrow())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_message_uses_decimal_amounts() {
        let err = AppError::InsufficientFunds {
            account: 100,
            balance: 3000,
            required: 100000,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds in account 100: balance 30.00, required 1000.00"
        );
    }

    #[test]
    fn test_account_error_converts_to_matching_variant() {
        let err: AppError = AccountError::InvalidArgument("bad".to_string()).into();
        assert!(matches!(err, AppError::InvalidArgument(reason) if reason == "bad"));
    }
}
