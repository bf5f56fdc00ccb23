mod snapshot;

pub use snapshot::*;

/// File name used when no snapshot path is configured.
pub const DEFAULT_SNAPSHOT_FILE: &str = "bankbook.json";
