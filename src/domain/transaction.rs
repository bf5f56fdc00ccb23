use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type TransactionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Money opening the account, recorded only when the initial balance is positive
    InitialDeposit,
    /// Cash paid in by the holder
    Deposit,
    /// Cash taken out by the holder
    Withdrawal,
    /// Incoming side of a transfer
    TransferIn,
    /// Outgoing side of a transfer
    TransferOut,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::InitialDeposit => "INITIAL_DEPOSIT",
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdrawal => "WITHDRAWAL",
            TransactionKind::TransferIn => "TRANSFER_IN",
            TransactionKind::TransferOut => "TRANSFER_OUT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "INITIAL_DEPOSIT" => Some(TransactionKind::InitialDeposit),
            "DEPOSIT" => Some(TransactionKind::Deposit),
            "WITHDRAWAL" => Some(TransactionKind::Withdrawal),
            "TRANSFER_IN" => Some(TransactionKind::TransferIn),
            "TRANSFER_OUT" => Some(TransactionKind::TransferOut),
            _ => None,
        }
    }

    /// Credits raise the balance, everything else lowers it.
    pub fn is_credit(&self) -> bool {
        matches!(
            self,
            TransactionKind::InitialDeposit | TransactionKind::Deposit | TransactionKind::TransferIn
        )
    }

    pub fn is_debit(&self) -> bool {
        !self.is_credit()
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of an account's history.
/// Transactions are never edited or removed once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Amount in cents (always positive, the sign comes from `kind`)
    pub amount: Cents,
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Create a transaction stamped with the current time.
    /// The amount must already have been validated by the account.
    pub(crate) fn new(amount: Cents, kind: TransactionKind) -> Self {
        debug_assert!(amount > 0, "Transaction amount must be positive");
        Self {
            id: Uuid::new_v4(),
            amount,
            kind,
            timestamp: Utc::now(),
        }
    }

    /// Amount as it affects the balance: positive for credits, negative for debits.
    /// Saturates for amounts no account could have recorded.
    pub fn signed_amount(&self) -> Cents {
        if self.kind.is_credit() {
            self.amount
        } else {
            self.amount.saturating_neg()
        }
    }

    /// Like `signed_amount`, but `None` when the amount cannot be negated.
    pub fn checked_signed_amount(&self) -> Option<Cents> {
        if self.kind.is_credit() {
            Some(self.amount)
        } else {
            self.amount.checked_neg()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [TransactionKind; 5] = [
        TransactionKind::InitialDeposit,
        TransactionKind::Deposit,
        TransactionKind::Withdrawal,
        TransactionKind::TransferIn,
        TransactionKind::TransferOut,
    ];

    #[test]
    fn test_kind_string_form() {
        for kind in ALL_KINDS {
            assert_eq!(TransactionKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(
            TransactionKind::from_str("transfer_in"),
            Some(TransactionKind::TransferIn)
        );
        assert_eq!(TransactionKind::from_str("refund"), None);
    }

    #[test]
    fn test_kind_serializes_as_upper_snake_case() {
        let json = serde_json::to_string(&TransactionKind::InitialDeposit).unwrap();
        assert_eq!(json, "\"INITIAL_DEPOSIT\"");
    }

    #[test]
    fn test_signed_amount_follows_kind() {
        let credits = [
            TransactionKind::InitialDeposit,
            TransactionKind::Deposit,
            TransactionKind::TransferIn,
        ];
        let debits = [TransactionKind::Withdrawal, TransactionKind::TransferOut];

        for kind in credits {
            assert_eq!(Transaction::new(2500, kind).signed_amount(), 2500);
        }
        for kind in debits {
            assert_eq!(Transaction::new(2500, kind).signed_amount(), -2500);
        }
    }

    #[test]
    fn test_signed_amount_of_unrepresentable_debit_does_not_panic() {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            amount: Cents::MIN,
            kind: TransactionKind::Withdrawal,
            timestamp: Utc::now(),
        };

        assert_eq!(transaction.checked_signed_amount(), None);
        assert_eq!(transaction.signed_amount(), Cents::MAX);
    }

    #[test]
    fn test_new_transaction_gets_unique_id_and_current_time() {
        let before = Utc::now();
        let a = Transaction::new(100, TransactionKind::Deposit);
        let b = Transaction::new(100, TransactionKind::Deposit);

        assert_ne!(a.id, b.id);
        assert!(a.timestamp >= before);
        assert!(a.timestamp <= Utc::now());
    }
}
