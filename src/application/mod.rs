// Application layer - the operations any front end drives.
// The service owns every account and decides when the snapshot is written.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
