use anyhow::{Result, bail};
use serde::Serialize;
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{AccountId, Cents, Transaction, TransactionKind};
use crate::storage::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// One line of the account summary export
#[derive(Debug, Clone, Serialize)]
pub struct AccountRow {
    pub id: AccountId,
    pub holder_name: String,
    pub balance: Cents,
    pub transactions: usize,
}

/// One line of the history export
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    pub account_id: AccountId,
    pub transaction_id: String,
    pub timestamp: String,
    pub kind: TransactionKind,
    pub amount: Cents,
    pub signed_amount: Cents,
}

impl HistoryRow {
    fn new(account_id: AccountId, transaction: &Transaction) -> Self {
        Self {
            account_id,
            transaction_id: transaction.id.to_string(),
            timestamp: transaction.timestamp.to_rfc3339(),
            kind: transaction.kind,
            amount: transaction.amount,
            signed_amount: transaction.signed_amount(),
        }
    }
}

/// Exporter for writing ledger data out as CSV or JSON
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    pub fn account_rows(&self) -> Vec<AccountRow> {
        self.service
            .list_accounts()
            .iter()
            .map(|account| AccountRow {
                id: account.id(),
                holder_name: account.holder_name().to_string(),
                balance: account.balance(),
                transactions: account.history().len(),
            })
            .collect()
    }

    /// History rows for one account, or for every account in creation order.
    pub fn history_rows(&self, account: Option<AccountId>) -> Result<Vec<HistoryRow>> {
        let rows = match account {
            Some(id) => self
                .service
                .history(id)?
                .iter()
                .map(|t| HistoryRow::new(id, t))
                .collect(),
            None => self
                .service
                .list_accounts()
                .iter()
                .flat_map(|a| a.history().iter().map(move |t| HistoryRow::new(a.id(), t)))
                .collect(),
        };
        Ok(rows)
    }

    /// Export the account summary; returns the number of rows written.
    pub fn export_accounts<W: Write>(&self, writer: W, format: ExportFormat) -> Result<usize> {
        write_rows(writer, format, &self.account_rows())
    }

    /// Export transaction history; returns the number of rows written.
    pub fn export_history<W: Write>(
        &self,
        writer: W,
        format: ExportFormat,
        account: Option<AccountId>,
    ) -> Result<usize> {
        write_rows(writer, format, &self.history_rows(account)?)
    }

    /// Export the full ledger in snapshot layout
    pub fn export_snapshot<W: Write>(&self, mut writer: W, format: ExportFormat) -> Result<Snapshot> {
        if format != ExportFormat::Json {
            bail!("Snapshot export is only available as JSON");
        }
        let snapshot = Snapshot::new(self.service.list_accounts().to_vec());
        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(snapshot)
    }
}

fn write_rows<W: Write, T: Serialize>(
    mut writer: W,
    format: ExportFormat,
    rows: &[T],
) -> Result<usize> {
    match format {
        ExportFormat::Csv => {
            // The header comes from the row's field names
            let mut csv_writer = csv::Writer::from_writer(writer);
            for row in rows {
                csv_writer.serialize(row)?;
            }
            csv_writer.flush()?;
        }
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, rows)?;
            writeln!(writer)?;
            writer.flush()?;
        }
    }
    Ok(rows.len())
}
