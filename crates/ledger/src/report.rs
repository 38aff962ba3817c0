//! Replay report: runs a transaction stream through a ledger and tallies
//! outcomes by action and by failure class.

use crate::memory::MemoryLedger;
use crate::sink::OutcomeRow;
use crate::tx::LedgerTx;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Per-action commit/abort counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionTally {
    pub committed: usize,
    pub aborted: usize,
}

#[derive(Debug, Default)]
pub struct ReplayReport {
    pub total: usize,
    pub committed: usize,
    /// Keyed by action name. A transaction counts once per step.
    pub by_action: BTreeMap<&'static str, ActionTally>,
    /// Keyed by failure class.
    pub by_class: BTreeMap<String, usize>,
    pub elapsed: Duration,
}

impl ReplayReport {
    /// Submits `txs` in order, returning the report and one row per
    /// transaction.
    pub fn replay(ledger: &mut MemoryLedger, txs: &[LedgerTx]) -> (Self, Vec<OutcomeRow>) {
        let t0 = Instant::now();
        let mut report = ReplayReport::default();
        let mut rows = Vec::with_capacity(txs.len());

        for (index, tx) in txs.iter().enumerate() {
            let outcome = ledger.submit(tx);
            let row = OutcomeRow::new(index, tx, &outcome);
            report.record(tx, &row);
            rows.push(row);
        }

        report.elapsed = t0.elapsed();
        (report, rows)
    }

    fn record(&mut self, tx: &LedgerTx, row: &OutcomeRow) {
        self.total += 1;
        if row.committed {
            self.committed += 1;
        }
        for step in &tx.steps {
            let tally = self.by_action.entry(step.action.name()).or_default();
            if row.committed {
                tally.committed += 1;
            } else {
                tally.aborted += 1;
            }
        }
        if let Some(class) = &row.class {
            *self.by_class.entry(class.clone()).or_default() += 1;
        }
    }

    /// Aborts caused by a guard denial, as opposed to ledger failures.
    pub fn denied(&self) -> usize {
        self.by_class
            .iter()
            .filter(|(class, _)| !matches!(class.as_str(), "unknown-record" | "ledger-conflict"))
            .map(|(_, n)| n)
            .sum()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push('\n');
        out.push_str("╔══════════════════════════════════════════════════════════════╗\n");
        out.push_str("║                    CAREFUND REPLAY REPORT                    ║\n");
        out.push_str("╠══════════════════════════════════════════════════════════════╣\n");
        out.push_str(&format!("║  Transactions:       {:>39} ║\n", self.total));
        out.push_str(&format!("║  Committed:          {:>39} ║\n", self.committed));
        out.push_str(&format!(
            "║  Aborted:            {:>39} ║\n",
            self.total - self.committed
        ));
        out.push_str(&format!("║  Elapsed:            {:>39?} ║\n", self.elapsed));
        out.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        if self.by_action.is_empty() {
            out.push_str("║  No transactions replayed.                                   ║\n");
        } else {
            out.push_str("║  BY ACTION                          committed      aborted   ║\n");
            for (action, tally) in &self.by_action {
                out.push_str(&format!(
                    "║  {:<30} {:>12} {:>12}   ║\n",
                    action, tally.committed, tally.aborted
                ));
            }
        }

        if !self.by_class.is_empty() {
            out.push_str("╠══════════════════════════════════════════════════════════════╣\n");
            out.push_str("║  ABORTS BY CLASS                                             ║\n");
            for (class, n) in &self.by_class {
                out.push_str(&format!("║  {:<30} {:>27}   ║\n", class, n));
            }
        }

        out.push_str("╚══════════════════════════════════════════════════════════════╝\n");
        out
    }
}
