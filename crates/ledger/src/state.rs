//! Ledger contents and snapshot loading.

use crate::tx::RecordKey;
use crate::RecordSource;
use alloy_primitives::Bytes;
use carefund_core::error::{CarefundError, CarefundResult};
use carefund_core::{Campaign, CampaignId, Donation, ProtocolParameters, Record, VoteRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the reference ledger stores. Serializes as a JSON snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerState {
    pub campaigns: BTreeMap<CampaignId, Campaign>,
    pub donations: BTreeMap<u64, Donation>,
    pub proposals: BTreeMap<u64, VoteRecord>,
    pub parameters: ProtocolParameters,
    /// Units minted per reward asset name.
    pub rewards: BTreeMap<Bytes, i64>,
    pub next_donation: u64,
    pub next_proposal: u64,
}

impl LedgerState {
    pub fn from_json(s: &str) -> CarefundResult<Self> {
        let state: LedgerState = serde_json::from_str(s)
            .map_err(|e| CarefundError::InvalidInput(format!("bad ledger snapshot: {e}")))?;
        state.validate()?;
        Ok(state)
    }

    /// Checks the record invariants a snapshot must satisfy before the
    /// guards can trust it.
    pub fn validate(&self) -> CarefundResult<()> {
        for (key, campaign) in &self.campaigns {
            if key != &campaign.id {
                return Err(CarefundError::InvalidInput(format!(
                    "campaign stored under {key} has id {}",
                    campaign.id
                )));
            }
            if !campaign.is_consistent() {
                return Err(CarefundError::InvalidInput(format!(
                    "campaign {key}: raised_amount {} does not match donor ledger",
                    campaign.raised_amount
                )));
            }
        }
        if let Some((&last, _)) = self.donations.last_key_value() {
            if last >= self.next_donation {
                return Err(CarefundError::InvalidInput(format!(
                    "donation {last} is not below next_donation {}",
                    self.next_donation
                )));
            }
        }
        if let Some((&last, _)) = self.proposals.last_key_value() {
            if last >= self.next_proposal {
                return Err(CarefundError::InvalidInput(format!(
                    "proposal {last} is not below next_proposal {}",
                    self.next_proposal
                )));
            }
        }
        Ok(())
    }
}

impl RecordSource for LedgerState {
    fn resolve(&self, key: &RecordKey) -> Option<Record> {
        match key {
            RecordKey::Campaign(id) => self.campaigns.get(id).cloned().map(Record::Campaign),
            RecordKey::Donation(n) => self.donations.get(n).cloned().map(Record::Donation),
            RecordKey::Proposal(n) => self.proposals.get(n).cloned().map(Record::Vote),
        }
    }
}
