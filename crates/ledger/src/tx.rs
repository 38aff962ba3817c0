//! Ledger transactions: which records they consume and which transitions
//! they ask the guards to authorize.

use crate::memory::Rejection;
use crate::RecordSource;
use carefund_core::error::{CarefundError, CarefundResult};
use carefund_core::{Action, CampaignId, KeyHash, MintedAsset, Record, TxContext, ValidityInterval};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Address of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum RecordKey {
    Campaign(CampaignId),
    Donation(u64),
    Proposal(u64),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Campaign(id) => write!(f, "campaign:{id}"),
            RecordKey::Donation(n) => write!(f, "donation:{n}"),
            RecordKey::Proposal(n) => write!(f, "proposal:{n}"),
        }
    }
}

/// What a step transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record")]
pub enum Subject {
    /// A stored record, guarded in its current state.
    Existing(RecordKey),
    /// A record this transaction creates (campaign or donation).
    New(Record),
    /// The reward mint.
    Mint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub subject: Subject,
    pub action: Action,
}

/// A bundle of steps committed or aborted as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTx {
    #[serde(default)]
    pub signers: SmallVec<[KeyHash; 4]>,
    #[serde(default)]
    pub validity: ValidityInterval,
    /// Records consumed and made visible to every guard, in order.
    #[serde(default)]
    pub inputs: Vec<RecordKey>,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub mint: Vec<MintedAsset>,
}

impl LedgerTx {
    pub fn new(validity: ValidityInterval) -> Self {
        Self {
            validity,
            ..Self::default()
        }
    }

    pub fn signed_by(mut self, signer: KeyHash) -> Self {
        self.signers.push(signer);
        self
    }

    pub fn input(mut self, key: RecordKey) -> Self {
        self.inputs.push(key);
        self
    }

    pub fn step(mut self, subject: Subject, action: Action) -> Self {
        self.steps.push(Step { subject, action });
        self
    }

    pub fn minting(mut self, asset: MintedAsset) -> Self {
        self.mint.push(asset);
        self
    }

    /// Parses one transaction per non-blank line.
    pub fn parse_ndjson(s: &str) -> CarefundResult<Vec<LedgerTx>> {
        s.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| {
                    CarefundError::InvalidInput(format!("transaction on line {}: {e}", i + 1))
                })
            })
            .collect()
    }

    /// Comma-joined action names, for logs and reports.
    pub fn action_names(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.action.name())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Resolves the inputs against `source` into the context every guard in
    /// this transaction sees.
    pub fn context<S: RecordSource>(&self, source: &S) -> Result<TxContext, Rejection> {
        let consumed = self
            .inputs
            .iter()
            .map(|key| {
                source
                    .resolve(key)
                    .ok_or_else(|| Rejection::UnknownRecord(key.clone()))
            })
            .collect::<Result<Vec<Record>, Rejection>>()?;

        Ok(TxContext {
            signers: self.signers.clone(),
            validity: self.validity,
            consumed,
            minted: self.mint.clone(),
        })
    }
}
