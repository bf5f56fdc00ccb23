mod common;

use anyhow::Result;
use bankbook::application::AppError;
use bankbook::domain::TransactionKind;
use common::{StandardAccounts, replayed_balance, test_service};

const ALICE: i64 = StandardAccounts::ALICE;
const BOB: i64 = StandardAccounts::BOB;

fn kinds_and_amounts(
    service: &bankbook::LedgerService,
    id: i64,
) -> Result<Vec<(TransactionKind, i64)>> {
    Ok(service
        .history(id)?
        .iter()
        .map(|t| (t.kind, t.signed_amount()))
        .collect())
}

#[test]
fn test_transfer_between_alice_and_bob() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    let result = service.transfer(ALICE, BOB, 2000)?;

    assert_eq!(result.source_balance, 3000);
    assert_eq!(result.target_balance, 2000);
    assert_eq!(service.find_account(ALICE).unwrap().balance(), 3000);
    assert_eq!(service.find_account(BOB).unwrap().balance(), 2000);
    assert_eq!(
        kinds_and_amounts(&service, ALICE)?,
        vec![
            (TransactionKind::InitialDeposit, 5000),
            (TransactionKind::TransferOut, -2000)
        ]
    );
    assert_eq!(
        kinds_and_amounts(&service, BOB)?,
        vec![(TransactionKind::TransferIn, 2000)]
    );

    Ok(())
}

#[test]
fn test_transfer_with_insufficient_funds_changes_nothing() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;
    service.transfer(ALICE, BOB, 2000)?;

    let alice_before = service.get_account(ALICE)?.clone();
    let bob_before = service.get_account(BOB)?.clone();

    let result = service.transfer(ALICE, BOB, 100000);

    assert!(matches!(
        result,
        Err(AppError::InsufficientFunds {
            account: ALICE,
            balance: 3000,
            required: 100000
        })
    ));
    assert_eq!(service.get_account(ALICE)?, &alice_before);
    assert_eq!(service.get_account(BOB)?, &bob_before);

    Ok(())
}

#[test]
fn test_transfer_rejects_invalid_requests() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    assert!(matches!(
        service.transfer(ALICE, 999, 100),
        Err(AppError::AccountNotFound(999))
    ));
    assert!(matches!(
        service.transfer(999, BOB, 100),
        Err(AppError::AccountNotFound(999))
    ));
    assert!(matches!(
        service.transfer(ALICE, BOB, 0),
        Err(AppError::InvalidArgument(_))
    ));
    assert!(matches!(
        service.transfer(ALICE, BOB, -500),
        Err(AppError::InvalidArgument(_))
    ));
    assert!(matches!(
        service.transfer(ALICE, ALICE, 100),
        Err(AppError::InvalidArgument(_))
    ));

    assert_eq!(service.get_account(ALICE)?.balance(), 5000);
    assert_eq!(service.get_account(ALICE)?.history().len(), 1);
    assert!(service.get_account(BOB)?.history().is_empty());

    Ok(())
}

#[test]
fn test_transfer_of_entire_balance() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    service.transfer(ALICE, BOB, 5000)?;

    assert_eq!(service.get_account(ALICE)?.balance(), 0);
    assert_eq!(service.get_account(BOB)?.balance(), 5000);

    Ok(())
}

#[test]
fn test_duplicate_account_is_rejected() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    let result = service.create_account(ALICE, "Impostor", 99900);

    assert!(matches!(result, Err(AppError::DuplicateAccount(ALICE))));
    assert_eq!(service.list_accounts().len(), 2);
    assert_eq!(service.get_account(ALICE)?.holder_name(), "Alice");
    assert_eq!(service.get_account(ALICE)?.balance(), 5000);

    Ok(())
}

#[test]
fn test_create_account_rejects_invalid_arguments() -> Result<()> {
    let (mut service, _temp) = test_service()?;

    for (id, name, initial) in [(0, "Zero", 0), (-1, "Negative", 0), (1, "", 0), (2, "Dave", -100)] {
        assert!(matches!(
            service.create_account(id, name, initial),
            Err(AppError::InvalidArgument(_))
        ));
    }
    assert!(service.list_accounts().is_empty());

    Ok(())
}

#[test]
fn test_deposit_then_withdraw_round_trip() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    service.deposit(BOB, 1250)?;
    let account = service.withdraw(BOB, 1250)?;

    assert_eq!(account.balance(), 0);
    assert_eq!(
        kinds_and_amounts(&service, BOB)?,
        vec![
            (TransactionKind::Deposit, 1250),
            (TransactionKind::Withdrawal, -1250)
        ]
    );

    Ok(())
}

#[test]
fn test_withdraw_more_than_balance_fails() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    assert!(matches!(
        service.withdraw(ALICE, 5001),
        Err(AppError::InsufficientFunds { .. })
    ));
    assert_eq!(service.get_account(ALICE)?.balance(), 5000);
    assert_eq!(service.get_account(ALICE)?.history().len(), 1);

    Ok(())
}

#[test]
fn test_non_positive_deposit_is_an_error() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    assert!(matches!(
        service.deposit(BOB, 0),
        Err(AppError::InvalidArgument(_))
    ));
    assert!(matches!(
        service.withdraw(BOB, -1),
        Err(AppError::InvalidArgument(_))
    ));
    assert!(matches!(
        service.deposit(999, 100),
        Err(AppError::AccountNotFound(999))
    ));
    assert!(service.get_account(BOB)?.history().is_empty());

    Ok(())
}

#[test]
fn test_delete_account() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    let deleted = service.delete_account(ALICE)?;
    assert_eq!(deleted.holder_name(), "Alice");
    assert!(service.find_account(ALICE).is_none());
    assert!(matches!(
        service.history(ALICE),
        Err(AppError::AccountNotFound(ALICE))
    ));

    assert!(matches!(
        service.delete_account(ALICE),
        Err(AppError::AccountNotFound(ALICE))
    ));
    assert_eq!(service.list_accounts().len(), 1);

    Ok(())
}

#[test]
fn test_list_accounts_keeps_creation_order() -> Result<()> {
    let (mut service, _temp) = test_service()?;

    for id in [30, 10, 20] {
        service.create_account(id, format!("Holder {}", id), 0)?;
    }
    service.delete_account(10)?;
    service.create_account(5, "Late", 0)?;

    let ids: Vec<i64> = service.list_accounts().iter().map(|a| a.id()).collect();
    assert_eq!(ids, vec![30, 20, 5]);

    Ok(())
}

#[test]
fn test_balances_match_history_after_mixed_activity() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;
    service.create_account(300, "Carol", 1000)?;

    service.deposit(BOB, 700)?;
    service.transfer(ALICE, 300, 1500)?;
    let _ = service.transfer(BOB, ALICE, 10_000);
    service.withdraw(300, 2400)?;
    service.transfer(BOB, ALICE, 700)?;
    let _ = service.withdraw(BOB, 1);
    let _ = service.deposit(ALICE, -5);

    for account in service.list_accounts() {
        assert_eq!(account.balance(), replayed_balance(account));
        assert!(account.balance() >= 0);
    }
    assert_eq!(service.get_account(ALICE)?.balance(), 4200);
    assert_eq!(service.get_account(BOB)?.balance(), 0);
    assert_eq!(service.get_account(300)?.balance(), 100);

    let report = service.check_integrity();
    assert!(report.is_healthy());
    assert_eq!(report.total_balance, 4300);

    Ok(())
}

#[test]
fn test_history_is_chronological() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    service.deposit(ALICE, 100)?;
    service.withdraw(ALICE, 50)?;
    service.transfer(ALICE, BOB, 25)?;

    let history = service.history(ALICE)?;
    assert_eq!(history.len(), 4);
    assert!(
        history
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    );

    Ok(())
}
