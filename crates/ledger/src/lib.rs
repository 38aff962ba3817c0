//! Reference implementation of the ledger collaborator.
//!
//! Stores records, assembles the transaction context each guard sees, and
//! commits a transaction's effects only if every guard permits.

pub mod effects;
pub mod memory;
pub mod report;
pub mod sink;
pub mod state;
pub mod tx;

pub use memory::{MemoryLedger, Receipt, Rejection};
pub use report::ReplayReport;
pub use sink::{OutcomeRow, ReplaySummaryRow};
pub use state::LedgerState;
pub use tx::{LedgerTx, RecordKey, Step, Subject};

use carefund_core::Record;

/// Read access to the records a transaction can reference.
pub trait RecordSource {
    fn resolve(&self, key: &RecordKey) -> Option<Record>;
}
