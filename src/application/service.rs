use std::path::PathBuf;

use anyhow::anyhow;
use tracing::{debug, error, info, warn};

use crate::domain::{
    Account, AccountId, Cents, IntegrityReport, Transaction, TransactionKind,
    build_integrity_report,
};
use crate::storage::SnapshotStore;

use super::AppError;

/// Application service owning every account and its persistence.
/// This is the primary interface for any client (CLI, TUI, scripts, etc.).
///
/// Each successful mutation is followed by a full snapshot write. A failed
/// write is logged but does not undo or fail the mutation.
pub struct LedgerService {
    store: SnapshotStore,
    /// Kept in creation order
    accounts: Vec<Account>,
    /// Set when an unreadable snapshot could not be moved aside; saving
    /// would overwrite it.
    save_blocked: bool,
}

/// Result of a transfer
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub source: AccountId,
    pub target: AccountId,
    pub amount: Cents,
    pub source_balance: Cents,
    pub target_balance: Cents,
}

impl LedgerService {
    /// Create an empty ledger writing to the given store, without reading it.
    pub fn new(store: SnapshotStore) -> Self {
        Self {
            store,
            accounts: Vec::new(),
            save_blocked: false,
        }
    }

    /// Open the ledger stored at `path`.
    ///
    /// A missing snapshot starts an empty ledger. So does an unreadable one,
    /// after it has been renamed to `<path>.corrupt`. If that rename fails the
    /// ledger still opens empty but refuses to save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = SnapshotStore::new(path);
        let mut save_blocked = false;
        let accounts = match store.load() {
            Ok(Some(snapshot)) => {
                info!(
                    "Loaded {} account(s) from {}",
                    snapshot.accounts.len(),
                    store.path().display()
                );
                snapshot.accounts
            }
            Ok(None) => {
                debug!(
                    "No snapshot at {}, starting with an empty ledger",
                    store.path().display()
                );
                Vec::new()
            }
            Err(e) => {
                warn!("Could not load snapshot, starting with an empty ledger: {e:#}");
                match store.quarantine() {
                    Ok(moved) => warn!("Unreadable snapshot kept at {}", moved.display()),
                    Err(e) => {
                        error!("{e:#}; saving is disabled to keep the unreadable snapshot");
                        save_blocked = true;
                    }
                }
                Vec::new()
            }
        };

        Self {
            store,
            accounts,
            save_blocked,
        }
    }

    /// True when the snapshot on disk must not be overwritten.
    pub fn is_save_blocked(&self) -> bool {
        self.save_blocked
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    // ========================
    // Account operations
    // ========================

    /// Open a new account. Ids must be unique within the ledger.
    pub fn create_account(
        &mut self,
        id: AccountId,
        holder_name: impl Into<String>,
        initial_balance: Cents,
    ) -> Result<&Account, AppError> {
        if self.find_account(id).is_some() {
            return Err(AppError::DuplicateAccount(id));
        }

        let account = Account::new(id, holder_name, initial_balance)?;
        info!(
            account = id,
            initial_balance, "Created account for {}",
            account.holder_name()
        );
        self.accounts.push(account);
        self.persist();

        Ok(&self.accounts[self.accounts.len() - 1])
    }

    /// Look up an account by id.
    pub fn find_account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id() == id)
    }

    /// Look up an account by id, failing if it does not exist.
    pub fn get_account(&self, id: AccountId) -> Result<&Account, AppError> {
        self.find_account(id).ok_or(AppError::AccountNotFound(id))
    }

    /// Remove an account and its history.
    pub fn delete_account(&mut self, id: AccountId) -> Result<Account, AppError> {
        let index = self.index_of(id)?;
        let account = self.accounts.remove(index);
        info!(account = id, "Deleted account");
        self.persist();
        Ok(account)
    }

    /// All accounts in creation order.
    pub fn list_accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Chronological history of one account.
    pub fn history(&self, id: AccountId) -> Result<&[Transaction], AppError> {
        Ok(self.get_account(id)?.history())
    }

    // ========================
    // Balance operations
    // ========================

    /// Pay money into an account.
    pub fn deposit(&mut self, id: AccountId, amount: Cents) -> Result<&Account, AppError> {
        let index = self.index_of(id)?;
        self.accounts[index].deposit(amount)?;
        debug!(account = id, amount, "Deposit recorded");
        self.persist();
        Ok(&self.accounts[index])
    }

    /// Take money out of an account. Fails with `InsufficientFunds` and
    /// leaves the account untouched when the balance is too low.
    pub fn withdraw(&mut self, id: AccountId, amount: Cents) -> Result<&Account, AppError> {
        let index = self.index_of(id)?;
        self.accounts[index].withdraw(amount, TransactionKind::Withdrawal)?;
        debug!(account = id, amount, "Withdrawal recorded");
        self.persist();
        Ok(&self.accounts[index])
    }

    /// Move money between two distinct accounts, all or nothing.
    pub fn transfer(
        &mut self,
        source: AccountId,
        target: AccountId,
        amount: Cents,
    ) -> Result<TransferResult, AppError> {
        let source_index = self.index_of(source)?;
        let target_index = self.index_of(target)?;
        if amount <= 0 {
            return Err(AppError::InvalidArgument(
                "Amount must be positive".to_string(),
            ));
        }
        if source == target {
            return Err(AppError::InvalidArgument(
                "Source and target accounts must differ".to_string(),
            ));
        }

        let (from, to) = pair_mut(&mut self.accounts, source_index, target_index);
        Account::transfer(from, to, amount)?;

        let result = TransferResult {
            source,
            target,
            amount,
            source_balance: from.balance(),
            target_balance: to.balance(),
        };
        info!(source, target, amount, "Transfer recorded");
        self.persist();

        Ok(result)
    }

    // ========================
    // Integrity and persistence
    // ========================

    /// Recompute every balance from its history and report any divergence.
    pub fn check_integrity(&self) -> IntegrityReport {
        build_integrity_report(&self.accounts)
    }

    /// Write the snapshot now, reporting failure to the caller.
    pub fn save(&self) -> Result<(), AppError> {
        if self.save_blocked {
            return Err(AppError::Persistence(anyhow!(
                "Refusing to overwrite unreadable snapshot {}",
                self.store.path().display()
            )));
        }
        self.store.save(&self.accounts)?;
        debug!(
            "Saved {} account(s) to {}",
            self.accounts.len(),
            self.store.path().display()
        );
        Ok(())
    }

    // The mutation that triggered this has already happened and stays applied.
    fn persist(&self) {
        if let Err(e) = self.save() {
            error!("Failed to save snapshot: {e}");
        }
    }

    fn index_of(&self, id: AccountId) -> Result<usize, AppError> {
        self.accounts
            .iter()
            .position(|account| account.id() == id)
            .ok_or(AppError::AccountNotFound(id))
    }
}

/// Borrow two distinct accounts mutably at once.
fn pair_mut(accounts: &mut [Account], a: usize, b: usize) -> (&mut Account, &mut Account) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = accounts.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = accounts.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts(ids: &[AccountId]) -> Vec<Account> {
        ids.iter()
            .map(|&id| Account::new(id, format!("Holder {}", id), 0).unwrap())
            .collect()
    }

    #[test]
    fn test_pair_mut_forward() {
        let mut list = accounts(&[1, 2, 3]);
        let (a, b) = pair_mut(&mut list, 0, 2);
        assert_eq!((a.id(), b.id()), (1, 3));
    }

    #[test]
    fn test_pair_mut_backward() {
        let mut list = accounts(&[1, 2, 3]);
        let (a, b) = pair_mut(&mut list, 2, 1);
        assert_eq!((a.id(), b.id()), (3, 2));
    }
}
