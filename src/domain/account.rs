use serde::{Deserialize, Serialize};

use super::{Cents, Transaction, TransactionKind, format_cents};

pub type AccountId = i64;

/// A named holder of a non-negative balance and the history that produced it.
///
/// Fields are private so that balance and history can only change together:
/// every mutation appends exactly one transaction and adjusts the balance by
/// its signed amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    holder_name: String,
    /// Current balance in cents, never negative
    balance: Cents,
    /// Chronological, append-only
    history: Vec<Transaction>,
}

impl Account {
    /// Open an account. A positive initial balance is recorded as an
    /// `InitialDeposit` so the history always explains the balance.
    pub fn new(
        id: AccountId,
        holder_name: impl Into<String>,
        initial_balance: Cents,
    ) -> Result<Self, AccountError> {
        let holder_name = holder_name.into();
        if id <= 0 {
            return Err(AccountError::InvalidArgument(format!(
                "account id must be positive, got {}",
                id
            )));
        }
        if holder_name.trim().is_empty() {
            return Err(AccountError::InvalidArgument(
                "holder name must not be empty".to_string(),
            ));
        }
        if initial_balance < 0 {
            return Err(AccountError::InvalidArgument(format!(
                "initial balance must not be negative, got {}",
                format_cents(initial_balance)
            )));
        }

        let mut account = Self {
            id,
            holder_name,
            balance: 0,
            history: Vec::new(),
        };
        if initial_balance > 0 {
            account.record(initial_balance, TransactionKind::InitialDeposit);
        }
        Ok(account)
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn balance(&self) -> Cents {
        self.balance
    }

    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    /// Pay money in.
    pub fn deposit(&mut self, amount: Cents) -> Result<&Transaction, AccountError> {
        self.ensure_can_credit(amount)?;
        Ok(self.record(amount, TransactionKind::Deposit))
    }

    /// Receive the incoming side of a transfer. Same mechanics as `deposit`,
    /// tagged differently for the audit trail.
    pub fn credit(&mut self, amount: Cents) -> Result<&Transaction, AccountError> {
        self.ensure_can_credit(amount)?;
        Ok(self.record(amount, TransactionKind::TransferIn))
    }

    /// Take money out, tagged as `Withdrawal` or `TransferOut`.
    /// Fails without touching the account when funds are short.
    pub fn withdraw(
        &mut self,
        amount: Cents,
        kind: TransactionKind,
    ) -> Result<&Transaction, AccountError> {
        if !kind.is_debit() {
            return Err(AccountError::InvalidArgument(format!(
                "{} is not a debit kind",
                kind
            )));
        }
        self.ensure_can_debit(amount)?;
        Ok(self.record(amount, kind))
    }

    /// Move `amount` from `source` to `target` as one operation.
    ///
    /// Every precondition on both accounts is checked before either is
    /// mutated, so the two appends that follow cannot fail halfway.
    pub fn transfer(
        source: &mut Account,
        target: &mut Account,
        amount: Cents,
    ) -> Result<(), AccountError> {
        if source.id == target.id {
            return Err(AccountError::InvalidArgument(
                "cannot transfer to the same account".to_string(),
            ));
        }
        source.ensure_can_debit(amount)?;
        target.ensure_can_credit(amount)?;

        source.record(amount, TransactionKind::TransferOut);
        target.record(amount, TransactionKind::TransferIn);
        Ok(())
    }

    fn ensure_positive(amount: Cents) -> Result<(), AccountError> {
        if amount <= 0 {
            return Err(AccountError::InvalidArgument(format!(
                "amount must be positive, got {}",
                format_cents(amount)
            )));
        }
        Ok(())
    }

    fn ensure_can_credit(&self, amount: Cents) -> Result<(), AccountError> {
        Self::ensure_positive(amount)?;
        if self.balance.checked_add(amount).is_none() {
            return Err(AccountError::InvalidArgument(format!(
                "amount {} would overflow the balance of account {}",
                format_cents(amount),
                self.id
            )));
        }
        Ok(())
    }

    fn ensure_can_debit(&self, amount: Cents) -> Result<(), AccountError> {
        Self::ensure_positive(amount)?;
        if self.balance < amount {
            return Err(AccountError::InsufficientFunds {
                account: self.id,
                balance: self.balance,
                required: amount,
            });
        }
        Ok(())
    }

    // Callers have validated `amount`, so the balance stays in range.
    fn record(&mut self, amount: Cents, kind: TransactionKind) -> &Transaction {
        let transaction = Transaction::new(amount, kind);
        self.balance += transaction.signed_amount();
        self.history.push(transaction);
        &self.history[self.history.len() - 1]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    InvalidArgument(String),
    InsufficientFunds {
        account: AccountId,
        balance: Cents,
        required: Cents,
    },
}

impl std::fmt::Display for AccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountError::InvalidArgument(reason) => write!(f, "Invalid argument: {}", reason),
            AccountError::InsufficientFunds {
                account,
                balance,
                required,
            } => write!(
                f,
                "Insufficient funds in account {}: balance {}, required {}",
                account,
                format_cents(*balance),
                format_cents(*required)
            ),
        }
    }
}

impl std::error::Error for AccountError {}
