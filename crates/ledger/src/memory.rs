//! In-memory ledger with all-or-nothing commits.
//!
//! `submit` evaluates every step's guard against the pre-transaction state,
//! then applies effects to a scratch copy. The copy replaces the live state
//! only if every effect applied; otherwise nothing changes.

use crate::effects;
use crate::state::LedgerState;
use crate::tx::{LedgerTx, RecordKey, Subject};
use crate::RecordSource;
use carefund_core::error::CarefundResult;
use carefund_core::{
    Campaign, CampaignId, Donation, GuardConfig, ProtocolParameters, Purpose, Record, VoteRecord,
};
use carefund_guards::{evaluate, Denial};
use thiserror::Error;

/// Why a transaction was not committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("step {step} ({action}) denied: {denial}")]
    Denied {
        step: usize,
        action: &'static str,
        denial: Denial,
    },

    #[error("unknown record {0}")]
    UnknownRecord(RecordKey),

    #[error("ledger conflict: {0}")]
    Conflict(String),
}

impl Rejection {
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Rejection::Denied { denial, .. } => Some(denial),
            _ => None,
        }
    }

    /// Denial class for guard rejections, else the ledger failure class.
    pub fn class(&self) -> String {
        match self {
            Rejection::Denied { denial, .. } => denial.kind().to_string(),
            Rejection::UnknownRecord(_) => "unknown-record".to_string(),
            Rejection::Conflict(_) => "ledger-conflict".to_string(),
        }
    }
}

/// What a committed transaction created and consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    pub created: Vec<RecordKey>,
    pub consumed: Vec<RecordKey>,
}

pub struct MemoryLedger {
    state: LedgerState,
    config: GuardConfig,
}

impl MemoryLedger {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            state: LedgerState::default(),
            config,
        }
    }

    /// Starts from a snapshot, validating its invariants first.
    pub fn from_state(state: LedgerState, config: GuardConfig) -> CarefundResult<Self> {
        state.validate()?;
        config.validate()?;
        Ok(Self { state, config })
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn campaign(&self, id: &CampaignId) -> Option<&Campaign> {
        self.state.campaigns.get(id)
    }

    pub fn donation(&self, n: u64) -> Option<&Donation> {
        self.state.donations.get(&n)
    }

    pub fn proposal(&self, n: u64) -> Option<&VoteRecord> {
        self.state.proposals.get(&n)
    }

    pub fn parameters(&self) -> &ProtocolParameters {
        &self.state.parameters
    }

    /// Opens a proposal for voting. No guard governs opening.
    pub fn open_proposal(&mut self, record: VoteRecord) -> RecordKey {
        let n = self.state.next_proposal;
        self.state.next_proposal += 1;
        self.state.proposals.insert(n, record);
        tracing::info!(proposal = n, "proposal opened");
        RecordKey::Proposal(n)
    }

    pub fn submit(&mut self, tx: &LedgerTx) -> Result<Receipt, Rejection> {
        let result = self.try_submit(tx);
        match &result {
            Ok(receipt) => tracing::info!(
                actions = %tx.action_names(),
                created = receipt.created.len(),
                consumed = receipt.consumed.len(),
                "committed"
            ),
            Err(rejection) => tracing::info!(
                actions = %tx.action_names(),
                reason = %rejection,
                "aborted"
            ),
        }
        result
    }

    fn try_submit(&mut self, tx: &LedgerTx) -> Result<Receipt, Rejection> {
        // The mint manifest is shared by every step, so one reward step owns it.
        let mint_steps = tx.steps.iter().filter(|s| s.subject == Subject::Mint).count();
        if !tx.mint.is_empty() && mint_steps == 0 {
            return Err(Rejection::Conflict("assets minted without a reward step".into()));
        }
        if mint_steps > 1 {
            return Err(Rejection::Conflict(format!(
                "{mint_steps} reward steps share one mint"
            )));
        }

        let ctx = tx.context(&self.state)?;

        // 1. Every guard sees the same pre-transaction snapshot.
        for (i, step) in tx.steps.iter().enumerate() {
            let purpose = match &step.subject {
                Subject::Existing(key) => Purpose::Spend(
                    self.state
                        .resolve(key)
                        .ok_or_else(|| Rejection::UnknownRecord(key.clone()))?,
                ),
                Subject::New(record) => Purpose::Spend(record.clone()),
                Subject::Mint => Purpose::Mint,
            };

            tracing::debug!(step = i, action = step.action.name(), "evaluating");
            evaluate(&purpose, &step.action, &ctx, &self.config).map_err(|denial| {
                Rejection::Denied {
                    step: i,
                    action: step.action.name(),
                    denial,
                }
            })?;
        }

        // 2. Effects on a scratch copy; swap in only when all applied.
        let mut next = self.state.clone();
        let mut receipt = Receipt::default();
        for step in &tx.steps {
            effects::apply(&mut next, step, &ctx, &mut receipt)?;
        }
        self.state = next;
        Ok(receipt)
    }
}

impl RecordSource for MemoryLedger {
    fn resolve(&self, key: &RecordKey) -> Option<Record> {
        self.state.resolve(key)
    }
}
