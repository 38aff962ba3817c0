//! Reward mint guard and tier naming.
//!
//! A donor whose contribution reaches the bronze threshold may mint exactly
//! one reward token. Its asset name is derived bit-for-bit from
//! `prefix ++ campaign_id ++ tier_label ++ donor`.

use crate::lookup::find_campaign;
use crate::verdict::{ensure, Denial, GuardKind, Verdict};
use alloy_primitives::Bytes;
use carefund_core::{
    Action, CampaignId, DonorEntry, KeyHash, Lovelace, RewardConfig, TxContext,
};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RewardTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl RewardTier {
    pub fn label(self) -> &'static str {
        match self {
            RewardTier::Bronze => "Bronze",
            RewardTier::Silver => "Silver",
            RewardTier::Gold => "Gold",
            RewardTier::Platinum => "Platinum",
        }
    }

    /// The highest tier whose threshold `amount` meets. Below bronze still
    /// maps to bronze; qualification is checked separately.
    pub fn for_amount(tiers: &RewardConfig, amount: Lovelace) -> Self {
        if amount >= tiers.platinum {
            RewardTier::Platinum
        } else if amount >= tiers.gold {
            RewardTier::Gold
        } else if amount >= tiers.silver {
            RewardTier::Silver
        } else {
            RewardTier::Bronze
        }
    }
}

impl fmt::Display for RewardTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Deterministic asset name for a donor's reward.
pub fn reward_asset_name(
    tiers: &RewardConfig,
    campaign_id: &CampaignId,
    donor: &KeyHash,
    amount: Lovelace,
) -> Bytes {
    let label = RewardTier::for_amount(tiers, amount).label();
    let mut name = Vec::with_capacity(
        tiers.prefix.len() + campaign_id.as_slice().len() + label.len() + donor.as_slice().len(),
    );
    name.extend_from_slice(tiers.prefix.as_bytes());
    name.extend_from_slice(campaign_id.as_slice());
    name.extend_from_slice(label.as_bytes());
    name.extend_from_slice(donor.as_slice());
    Bytes::from(name)
}

/// The first donor-ledger entry for `donor` that reaches the bronze threshold.
pub fn qualifying_contribution<'a>(
    ctx: &'a TxContext,
    tiers: &RewardConfig,
    campaign_id: &CampaignId,
    donor: &KeyHash,
) -> Option<&'a DonorEntry> {
    find_campaign(&ctx.consumed, campaign_id)?
        .donors
        .iter()
        .find(|entry| &entry.donor == donor && entry.amount >= tiers.bronze)
}

pub fn validate(action: &Action, ctx: &TxContext, tiers: &RewardConfig) -> Verdict {
    let Action::IssueReward {
        campaign_id,
        donor,
        amount,
    } = action
    else {
        return Err(Denial::UnexpectedAction {
            guard: GuardKind::RewardMint,
            action: action.name(),
        });
    };

    // Shape of the mint first: anything but a single unit is never allowed.
    let [minted] = ctx.minted.as_slice() else {
        return Err(Denial::MintClassCount(ctx.minted.len()));
    };
    ensure(minted.quantity == 1, || Denial::MintQuantity(minted.quantity))?;

    let entry = qualifying_contribution(ctx, tiers, campaign_id, donor).ok_or_else(|| {
        Denial::NoQualifyingContribution {
            campaign: campaign_id.clone(),
            donor: *donor,
        }
    })?;

    ensure(*amount == entry.amount, || Denial::AmountMismatch {
        claimed: *amount,
        recorded: entry.amount,
    })?;
    ensure(ctx.is_signed_by(donor), || Denial::MissingSignature(*donor))?;

    let expected = reward_asset_name(tiers, campaign_id, donor, entry.amount);
    ensure(minted.asset_name == expected, || Denial::AssetNameMismatch)
}
