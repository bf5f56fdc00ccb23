use std::fs;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::domain::{Account, build_integrity_report};

/// Current on-disk layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The whole ledger as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub accounts: Vec<Account>,
}

impl Snapshot {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            accounts,
        }
    }

    /// Reject snapshots this build cannot interpret or whose accounts
    /// break the ledger invariants.
    pub fn validate(&self) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            bail!(
                "Unsupported snapshot version {} (expected {})",
                self.version,
                SNAPSHOT_VERSION
            );
        }
        let report = build_integrity_report(&self.accounts);
        if let Some(issue) = report.issues.first() {
            bail!(
                "Snapshot failed integrity check ({} issue(s)), first: {}",
                report.issues.len(),
                issue
            );
        }
        Ok(())
    }
}

/// Flat-file store holding a single JSON snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the snapshot.
    /// Returns `Ok(None)` when no snapshot has been written yet.
    pub fn load(&self) -> Result<Option<Snapshot>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to open snapshot {}", self.path.display())
                });
            }
        };

        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse snapshot {}", self.path.display()))?;
        snapshot.validate()?;
        Ok(Some(snapshot))
    }

    /// Write all accounts, replacing the previous snapshot atomically.
    ///
    /// The data goes to a temporary file next to the target which is then
    /// renamed over it, so readers see either the old or the new snapshot.
    pub fn save(&self, accounts: &[Account]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let snapshot = Snapshot::new(accounts.to_vec());
        let mut temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &snapshot)
                .context("Failed to serialize snapshot")?;
            writer.flush().context("Failed to write snapshot")?;
        }
        temp.as_file()
            .sync_all()
            .context("Failed to sync snapshot to disk")?;
        temp.persist(&self.path)
            .with_context(|| format!("Failed to replace snapshot {}", self.path.display()))?;
        Ok(())
    }

    /// Move an unreadable snapshot out of the way so the next save does not
    /// overwrite it. Returns where it was moved.
    pub fn quarantine(&self) -> Result<PathBuf> {
        let mut target = self.path.clone().into_os_string();
        target.push(".corrupt");
        let target = PathBuf::from(target);
        fs::rename(&self.path, &target).with_context(|| {
            format!(
                "Failed to move {} to {}",
                self.path.display(),
                target.display()
            )
        })?;
        Ok(target)
    }
}
