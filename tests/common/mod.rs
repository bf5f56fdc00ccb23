// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use bankbook::application::LedgerService;
use bankbook::domain::{Account, Cents};
use tempfile::TempDir;

/// Helper to create an empty service writing into a temporary directory
pub fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::open(snapshot_path(&temp_dir));
    Ok((service, temp_dir))
}

/// Snapshot location used by `test_service`
pub fn snapshot_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("bankbook.json")
}

/// Balance recomputed from the history alone
pub fn replayed_balance(account: &Account) -> Cents {
    account.history().iter().map(|t| t.signed_amount()).sum()
}

/// Test fixture: the Alice/Bob pair used throughout the ledger tests
pub struct StandardAccounts;

impl StandardAccounts {
    pub const ALICE: i64 = 100;
    pub const BOB: i64 = 200;

    /// Alice opens with 50.00, Bob with nothing
    pub fn create(service: &mut LedgerService) -> Result<()> {
        service.create_account(Self::ALICE, "Alice", 5000)?;
        service.create_account(Self::BOB, "Bob", 0)?;
        Ok(())
    }
}
