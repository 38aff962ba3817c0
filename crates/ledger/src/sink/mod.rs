//! Row-oriented output for replay runs.
//!
//! Two row schemas:
//! - [`OutcomeRow`]: one per submitted transaction
//! - [`ReplaySummaryRow`]: one per replay run
//!
//! Rows are written as NDJSON by [`json_stream::JsonStreamSink`].

pub mod json_stream;

use crate::memory::{Receipt, Rejection};
use crate::report::ReplayReport;
use crate::tx::LedgerTx;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Serializable row types
// ---------------------------------------------------------------------------

/// One row per submitted transaction. Failure fields are `null` on commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeRow {
    pub index: usize,
    pub committed: bool,
    pub actions: String,
    pub created: usize,
    pub consumed: usize,
    pub failed_step: Option<usize>,
    pub failed_action: Option<&'static str>,
    /// Denial class (`unauthorized`, `invariant`, ...) or ledger failure class.
    pub class: Option<String>,
    pub reason: Option<String>,
}

/// One row per replay: totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaySummaryRow {
    pub total_txs: u64,
    pub committed: u64,
    pub aborted: u64,
    pub denied: u64,
    pub elapsed_ms: u64,
}

impl OutcomeRow {
    pub fn new(index: usize, tx: &LedgerTx, outcome: &Result<Receipt, Rejection>) -> Self {
        match outcome {
            Ok(receipt) => OutcomeRow {
                index,
                committed: true,
                actions: tx.action_names(),
                created: receipt.created.len(),
                consumed: receipt.consumed.len(),
                failed_step: None,
                failed_action: None,
                class: None,
                reason: None,
            },
            Err(rejection) => {
                let (failed_step, failed_action) = match rejection {
                    Rejection::Denied { step, action, .. } => (Some(*step), Some(*action)),
                    _ => (None, None),
                };
                OutcomeRow {
                    index,
                    committed: false,
                    actions: tx.action_names(),
                    created: 0,
                    consumed: 0,
                    failed_step,
                    failed_action,
                    class: Some(rejection.class()),
                    reason: Some(rejection.to_string()),
                }
            }
        }
    }
}

impl ReplayReport {
    /// Flatten the report into its sink-ready summary row.
    pub fn to_summary_row(&self) -> ReplaySummaryRow {
        ReplaySummaryRow {
            total_txs: self.total as u64,
            committed: self.committed as u64,
            aborted: (self.total - self.committed) as u64,
            denied: self.denied() as u64,
            elapsed_ms: self.elapsed.as_millis() as u64,
        }
    }
}
