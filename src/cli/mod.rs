use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::application::LedgerService;
use crate::domain::{
    AccountId, Cents, Transaction, TransactionKind, format_cents, format_signed_cents, parse_cents,
};
use crate::io::{ExportFormat, Exporter};
use crate::storage::DEFAULT_SNAPSHOT_FILE;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Bankbook - Personal Account Ledger
#[derive(Parser)]
#[command(name = "bankbook")]
#[command(about = "A local-first ledger of accounts, deposits, withdrawals and transfers")]
#[command(version)]
pub struct Cli {
    /// Snapshot file path
    #[arg(short, long, env = "BANKBOOK_FILE", default_value = DEFAULT_SNAPSHOT_FILE)]
    pub file: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Pay money into an account
    Deposit {
        /// Account id
        id: AccountId,

        /// Amount to deposit (e.g., "50.00" or "50")
        amount: String,
    },

    /// Take money out of an account
    Withdraw {
        /// Account id
        id: AccountId,

        /// Amount to withdraw (e.g., "50.00" or "50")
        amount: String,
    },

    /// Move money from one account to another
    Transfer {
        /// Amount to transfer (e.g., "50.00" or "50")
        amount: String,

        /// Source account id
        #[arg(long)]
        from: AccountId,

        /// Destination account id
        #[arg(long)]
        to: AccountId,
    },

    /// Show the transaction history of an account
    History {
        /// Account id
        id: AccountId,

        /// Only show the most recent N transactions
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only show one kind: deposit, withdrawal, transfer_in, transfer_out, initial_deposit
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Verify that every balance matches its history
    Check,

    /// Export data to CSV or JSON
    Export {
        /// What to export: accounts, history, snapshot
        export_type: String,

        /// Restrict a history export to one account
        #[arg(short, long)]
        account: Option<AccountId>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json (default: csv, json for snapshot)
        #[arg(short = 'F', long)]
        format: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Open a new account
    Create {
        /// Account id (positive, must be unique)
        id: AccountId,

        /// Account holder name
        holder: String,

        /// Opening balance (e.g., "50.00")
        #[arg(short, long, default_value = "0")]
        initial: String,
    },

    /// List all accounts
    List,

    /// Show account details
    Show {
        /// Account id
        id: AccountId,
    },

    /// Delete an account and its history
    Delete {
        /// Account id
        id: AccountId,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let mut service = LedgerService::open(&self.file);

        let outcome = run_command(&mut service, self.command);

        // Final best-effort save on the way out, whatever the command did.
        if let Err(e) = service.save() {
            warn!("Failed to save snapshot on exit: {e}");
        }

        outcome
    }
}

fn run_command(service: &mut LedgerService, command: Commands) -> Result<()> {
    match command {
        Commands::Account(account_cmd) => run_account_command(service, account_cmd)?,

        Commands::Deposit { id, amount } => {
            let amount = parse_amount(&amount)?;
            let account = service.deposit(id, amount)?;
            println!(
                "Deposited {} into account {} (balance {})",
                format_cents(amount),
                id,
                format_cents(account.balance())
            );
        }

        Commands::Withdraw { id, amount } => {
            let amount = parse_amount(&amount)?;
            let account = service.withdraw(id, amount)?;
            println!(
                "Withdrew {} from account {} (balance {})",
                format_cents(amount),
                id,
                format_cents(account.balance())
            );
        }

        Commands::Transfer { amount, from, to } => {
            let amount = parse_amount(&amount)?;
            let result = service.transfer(from, to, amount)?;
            println!(
                "Transferred {} from account {} to account {}",
                format_cents(result.amount),
                result.source,
                result.target
            );
            println!(
                "  {}: {}    {}: {}",
                result.source,
                format_cents(result.source_balance),
                result.target,
                format_cents(result.target_balance)
            );
        }

        Commands::History { id, limit, kind } => {
            let kind = kind
                .map(|k| {
                    TransactionKind::from_str(&k).ok_or_else(|| {
                        anyhow!(
                            "Unknown transaction kind '{}'. Valid kinds: deposit, withdrawal, transfer_in, transfer_out, initial_deposit",
                            k
                        )
                    })
                })
                .transpose()?;

            let history: Vec<&Transaction> = service
                .history(id)?
                .iter()
                .filter(|t| kind.is_none_or(|k| t.kind == k))
                .collect();
            if history.is_empty() {
                println!("No matching transactions for account {}.", id);
            } else {
                let skip = limit.map_or(0, |n| history.len().saturating_sub(n));
                print_history(&history[skip..]);
            }
        }

        Commands::Check => run_check_command(service)?,

        Commands::Export {
            export_type,
            account,
            output,
            format,
        } => run_export_command(
            service,
            &export_type,
            account,
            output.as_deref(),
            format.as_deref(),
        )?,
    }

    Ok(())
}

fn run_account_command(service: &mut LedgerService, cmd: AccountCommands) -> Result<()> {
    match cmd {
        AccountCommands::Create {
            id,
            holder,
            initial,
        } => {
            let initial = parse_cents(&initial)
                .context("Invalid initial balance. Use '50.00' or '50'")?;
            let account = service.create_account(id, holder, initial)?;
            println!(
                "Created account {} for {} (balance {})",
                account.id(),
                account.holder_name(),
                format_cents(account.balance())
            );
        }

        AccountCommands::List => {
            let accounts = service.list_accounts();
            if accounts.is_empty() {
                println!("No accounts found.");
            } else {
                println!("{:<10} {:<24} {:>14}", "ID", "HOLDER", "BALANCE");
                println!("{}", "-".repeat(50));
                for account in accounts {
                    println!(
                        "{:<10} {:<24} {:>14}",
                        account.id(),
                        account.holder_name(),
                        format_cents(account.balance())
                    );
                }
            }
        }

        AccountCommands::Show { id } => {
            let account = service.get_account(id)?;
            println!("Account: {}", account.id());
            println!("  Holder:       {}", account.holder_name());
            println!("  Balance:      {}", format_cents(account.balance()));
            println!("  Transactions: {}", account.history().len());
            if let Some(first) = account.history().first() {
                println!("  Opened:       {}", first.timestamp.format(TIMESTAMP_FORMAT));
            }
            if let Some(last) = account.history().last() {
                println!("  Last activity: {}", last.timestamp.format(TIMESTAMP_FORMAT));
            }
        }

        AccountCommands::Delete { id } => {
            let account = service.delete_account(id)?;
            println!(
                "Deleted account {} ({}), final balance {}",
                account.id(),
                account.holder_name(),
                format_cents(account.balance())
            );
        }
    }
    Ok(())
}

fn run_check_command(service: &LedgerService) -> Result<()> {
    let report = service.check_integrity();

    println!("Accounts:     {}", report.account_count);
    println!("Transactions: {}", report.transaction_count);
    println!("Total held:   {}", format_cents(report.total_balance));

    if report.is_healthy() {
        println!("Ledger is consistent.");
        return Ok(());
    }

    println!();
    for issue in &report.issues {
        println!("  ! {}", issue);
    }
    Err(anyhow!(
        "Ledger integrity check found {} issue(s)",
        report.issues.len()
    ))
}

fn run_export_command(
    service: &LedgerService,
    export_type: &str,
    account: Option<AccountId>,
    output: Option<&str>,
    format: Option<&str>,
) -> Result<()> {
    use std::fs::File;
    use std::io::{Write, stdout};

    let format = match (format, export_type) {
        (Some(f), _) => ExportFormat::from_str(f)
            .ok_or_else(|| anyhow!("Unknown export format '{}'. Use csv or json", f))?,
        (None, "snapshot") => ExportFormat::Json,
        (None, _) => ExportFormat::Csv,
    };

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "accounts" => {
            let count = exporter.export_accounts(writer, format)?;
            if output.is_some() {
                eprintln!("Exported {} accounts", count);
            }
        }
        "history" => {
            let count = exporter.export_history(writer, format, account)?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        "snapshot" => {
            let snapshot = exporter.export_snapshot(writer, format)?;
            if output.is_some() {
                eprintln!("Exported snapshot with {} accounts", snapshot.accounts.len());
            }
        }
        other => {
            return Err(anyhow!(
                "Unknown export type '{}'. Use accounts, history or snapshot",
                other
            ));
        }
    }

    Ok(())
}

fn print_history(history: &[&Transaction]) {
    println!("{:<20} {:<16} {:>14}", "DATE", "KIND", "AMOUNT");
    println!("{}", "-".repeat(52));
    for transaction in history {
        println!(
            "{:<20} {:<16} {:>14}",
            transaction.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            transaction.kind.as_str(),
            format_signed_cents(transaction.signed_amount())
        );
    }
}

fn parse_amount(input: &str) -> Result<Cents> {
    parse_cents(input).context("Invalid amount format. Use '50.00' or '50'")
}
