//! State changes the ledger applies for each permitted step.
//!
//! Guards only approve; this is where the approved transition happens.

use crate::memory::{Receipt, Rejection};
use crate::state::LedgerState;
use crate::tx::{RecordKey, Step, Subject};
use carefund_core::{
    Action, Campaign, CampaignId, CampaignStatus, DonorEntry, KeyHash, Record, TxContext,
    Verification,
};

pub(crate) fn apply(
    state: &mut LedgerState,
    step: &Step,
    ctx: &TxContext,
    receipt: &mut Receipt,
) -> Result<(), Rejection> {
    match (&step.subject, &step.action) {
        // -- Campaign --
        (Subject::New(Record::Campaign(campaign)), Action::CreateCampaign { .. }) => {
            if state.campaigns.contains_key(&campaign.id) {
                return Err(Rejection::Conflict(format!(
                    "campaign {} already exists",
                    campaign.id
                )));
            }
            state.campaigns.insert(campaign.id.clone(), campaign.clone());
            receipt.created.push(RecordKey::Campaign(campaign.id.clone()));
        }
        (
            Subject::Existing(RecordKey::Campaign(id)),
            Action::VerifyCampaign { document_hash, .. },
        ) => {
            let verifier = first_signer(ctx)?;
            let campaign = campaign_mut(state, id)?;
            campaign.status = CampaignStatus::Verified;
            campaign.verification = Some(Verification {
                document_hash: *document_hash,
                verifier,
                verified_at: ctx.reference_time(),
            });
        }
        (Subject::Existing(RecordKey::Campaign(id)), Action::CancelCampaign { .. }) => {
            campaign_mut(state, id)?.status = CampaignStatus::Cancelled;
        }
        (Subject::Existing(RecordKey::Campaign(id)), Action::CompleteCampaign { .. }) => {
            campaign_mut(state, id)?.status = CampaignStatus::Completed;
        }
        (Subject::Existing(RecordKey::Campaign(id)), Action::WithdrawFunds { .. }) => {
            state
                .campaigns
                .remove(id)
                .ok_or_else(|| Rejection::UnknownRecord(RecordKey::Campaign(id.clone())))?;
            receipt.consumed.push(RecordKey::Campaign(id.clone()));
        }

        // -- Donation --
        (Subject::New(Record::Donation(donation)), Action::Donate { campaign_id, amount }) => {
            let campaign = campaign_mut(state, campaign_id)?;
            campaign.raised_amount = campaign
                .raised_amount
                .checked_add(*amount)
                .ok_or_else(|| Rejection::Conflict("raised amount overflow".into()))?;
            campaign.donors.push(DonorEntry {
                donor: donation.donor,
                amount: *amount,
            });

            let n = state.next_donation;
            state.next_donation += 1;
            state.donations.insert(n, donation.clone());
            receipt.created.push(RecordKey::Donation(n));
        }
        (Subject::Existing(RecordKey::Donation(n)), Action::RequestRefund { campaign_id }) => {
            let donation = state
                .donations
                .remove(n)
                .ok_or(Rejection::UnknownRecord(RecordKey::Donation(*n)))?;
            receipt.consumed.push(RecordKey::Donation(*n));

            let campaign = campaign_mut(state, campaign_id)?;
            let pos = campaign
                .donors
                .iter()
                .position(|e| e.donor == donation.donor && e.amount == donation.amount)
                .ok_or_else(|| {
                    Rejection::Conflict(format!(
                        "donation {n} has no matching entry in campaign {campaign_id}"
                    ))
                })?;
            campaign.donors.remove(pos);
            campaign.raised_amount -= donation.amount;
        }

        // -- Governance --
        (Subject::Existing(RecordKey::Proposal(n)), Action::Vote { approve, .. }) => {
            let voter = first_signer(ctx)?;
            state
                .proposals
                .get_mut(n)
                .ok_or(Rejection::UnknownRecord(RecordKey::Proposal(*n)))?
                .votes
                .insert(voter, *approve);
        }
        (Subject::Existing(RecordKey::Proposal(n)), Action::EmergencyFundRelease { .. }) => {
            consume_proposal(state, *n, receipt)?;
        }
        (Subject::Existing(RecordKey::Proposal(n)), Action::UpdateProtocol { new_parameters }) => {
            consume_proposal(state, *n, receipt)?;
            state.parameters = new_parameters.clone();
        }

        // -- Reward mint --
        (Subject::Mint, Action::IssueReward { .. }) => {
            for asset in &ctx.minted {
                *state.rewards.entry(asset.asset_name.clone()).or_default() += asset.quantity;
            }
        }

        (subject, action) => {
            return Err(Rejection::Conflict(format!(
                "{} cannot be applied to {}",
                action.name(),
                describe(subject)
            )));
        }
    }
    Ok(())
}

fn campaign_mut<'a>(state: &'a mut LedgerState, id: &CampaignId) -> Result<&'a mut Campaign, Rejection> {
    state
        .campaigns
        .get_mut(id)
        .ok_or_else(|| Rejection::UnknownRecord(RecordKey::Campaign(id.clone())))
}

fn consume_proposal(state: &mut LedgerState, n: u64, receipt: &mut Receipt) -> Result<(), Rejection> {
    state
        .proposals
        .remove(&n)
        .ok_or(Rejection::UnknownRecord(RecordKey::Proposal(n)))?;
    receipt.consumed.push(RecordKey::Proposal(n));
    Ok(())
}

fn first_signer(ctx: &TxContext) -> Result<KeyHash, Rejection> {
    ctx.first_signer()
        .copied()
        .ok_or_else(|| Rejection::Conflict("transaction declares no signer".into()))
}

fn describe(subject: &Subject) -> String {
    match subject {
        Subject::Existing(key) => key.to_string(),
        Subject::New(record) => format!("new {}", record.kind()),
        Subject::Mint => "mint".to_string(),
    }
}
