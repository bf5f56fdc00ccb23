use std::collections::HashSet;

use super::{Account, AccountId, Cents, Transaction, format_cents};

/// Compute a balance by replaying a history.
/// Balance = sum of credits - sum of debits
///
/// Returns `None` when the replay does not fit in `Cents`.
pub fn compute_balance(history: &[Transaction]) -> Option<Cents> {
    history.iter().try_fold(0, |balance: Cents, transaction| {
        balance.checked_add(transaction.checked_signed_amount()?)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// Stored balance differs from the replayed history
    BalanceMismatch {
        account: AccountId,
        stored: Cents,
        computed: Cents,
    },
    /// Replaying the history overflows the balance type
    BalanceOverflow(AccountId),
    NegativeBalance { account: AccountId, balance: Cents },
    /// A history entry with a zero or negative amount
    InvalidAmount { account: AccountId, position: usize },
    DuplicateId(AccountId),
    InvalidId(AccountId),
    EmptyHolderName(AccountId),
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityIssue::BalanceMismatch {
                account,
                stored,
                computed,
            } => write!(
                f,
                "account {}: stored balance {}, history sums to {}",
                account,
                format_cents(*stored),
                format_cents(*computed)
            ),
            IntegrityIssue::BalanceOverflow(account) => {
                write!(f, "account {}: history sum overflows the balance", account)
            }
            IntegrityIssue::NegativeBalance { account, balance } => write!(
                f,
                "account {}: negative balance {}",
                account,
                format_cents(*balance)
            ),
            IntegrityIssue::InvalidAmount { account, position } => write!(
                f,
                "account {}: transaction #{} has a non-positive amount",
                account, position
            ),
            IntegrityIssue::DuplicateId(account) => {
                write!(f, "account id {} appears more than once", account)
            }
            IntegrityIssue::InvalidId(account) => {
                write!(f, "account id {} is not positive", account)
            }
            IntegrityIssue::EmptyHolderName(account) => {
                write!(f, "account {}: holder name is empty", account)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub account_count: usize,
    pub transaction_count: usize,
    pub total_balance: Cents,
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check every account invariant over a collection of accounts.
pub fn build_integrity_report(accounts: &[Account]) -> IntegrityReport {
    let mut report = IntegrityReport {
        account_count: accounts.len(),
        ..Default::default()
    };
    let mut seen = HashSet::new();

    for account in accounts {
        let id = account.id();
        if !seen.insert(id) {
            report.issues.push(IntegrityIssue::DuplicateId(id));
        }
        if id <= 0 {
            report.issues.push(IntegrityIssue::InvalidId(id));
        }
        if account.holder_name().trim().is_empty() {
            report.issues.push(IntegrityIssue::EmptyHolderName(id));
        }

        let history = account.history();
        report.transaction_count += history.len();
        report.total_balance = report.total_balance.saturating_add(account.balance());

        let mut amounts_valid = true;
        for (position, transaction) in history.iter().enumerate() {
            if transaction.amount <= 0 {
                amounts_valid = false;
                report
                    .issues
                    .push(IntegrityIssue::InvalidAmount { account: id, position });
            }
        }

        // A history with bad amounts is already broken; replaying it proves nothing.
        if amounts_valid {
            match compute_balance(history) {
                Some(computed) if computed != account.balance() => {
                    report.issues.push(IntegrityIssue::BalanceMismatch {
                        account: id,
                        stored: account.balance(),
                        computed,
                    });
                }
                Some(_) => {}
                None => report.issues.push(IntegrityIssue::BalanceOverflow(id)),
            }
        }
        if account.balance() < 0 {
            report.issues.push(IntegrityIssue::NegativeBalance {
                account: id,
                balance: account.balance(),
            });
        }
    }

    report
}
