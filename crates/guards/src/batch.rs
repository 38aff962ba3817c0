//! Parallel evaluation of independent transitions.
//!
//! Guards share nothing, so unrelated transitions can be checked on the
//! rayon pool. Results come back in input order.

use crate::verdict::Verdict;
use carefund_core::{Action, GuardConfig, Purpose, TxContext};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One guard invocation: the record (or mint) being authorized, the proposed
/// action and the transaction facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub purpose: Purpose,
    pub action: Action,
    #[serde(default)]
    pub context: TxContext,
}

impl Transition {
    pub fn evaluate(&self, config: &GuardConfig) -> Verdict {
        crate::evaluate(&self.purpose, &self.action, &self.context, config)
    }
}

pub fn evaluate_batch(transitions: &[Transition], config: &GuardConfig) -> Vec<Verdict> {
    tracing::debug!(transitions = transitions.len(), "parallel evaluation");

    let verdicts: Vec<Verdict> = transitions
        .par_iter()
        .map(|t| t.evaluate(config))
        .collect();

    let permitted = verdicts.iter().filter(|v| v.is_ok()).count();
    tracing::debug!(permitted, denied = verdicts.len() - permitted, "evaluation complete");
    verdicts
}
