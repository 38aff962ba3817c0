//! Campaign lifecycle guard.
//!
//! ```text
//!            ┌─> Verified   (VerifyCampaign)
//!   Active ──┼─> Completed  (CompleteCampaign)
//!            └─> Cancelled  (CancelCampaign)
//! ```
//!
//! `Active` is the only state with outgoing transitions. `WithdrawFunds`
//! consumes a `Verified` (or fully funded `Completed`) campaign without
//! changing its status.

use crate::verdict::{ensure, Denial, GuardKind, Verdict};
use carefund_core::{Action, Campaign, CampaignId, CampaignStatus, Lovelace, PosixTime, TxContext};

pub fn validate(campaign: &Campaign, action: &Action, ctx: &TxContext) -> Verdict {
    match action {
        Action::CreateCampaign { target, deadline } => create(campaign, *target, *deadline, ctx),
        Action::WithdrawFunds { campaign_id } => withdraw(campaign, campaign_id, ctx),
        Action::VerifyCampaign { campaign_id, .. } => verify(campaign, campaign_id, ctx),
        Action::CancelCampaign { campaign_id } => cancel(campaign, campaign_id, ctx),
        Action::CompleteCampaign { campaign_id } => complete(campaign, campaign_id, ctx),
        other => Err(Denial::UnexpectedAction {
            guard: GuardKind::Campaign,
            action: other.name(),
        }),
    }
}

fn create(campaign: &Campaign, target: Lovelace, deadline: PosixTime, ctx: &TxContext) -> Verdict {
    require_owner(campaign, ctx)?;
    ensure(target > 0, || Denial::NonPositiveTarget(target))?;

    let now = ctx.reference_time();
    ensure(deadline > now, || Denial::DeadlineNotInFuture { deadline, now })?;

    ensure(
        campaign.target_amount == target && campaign.deadline == deadline,
        || Denial::CreationMismatch,
    )?;
    ensure(campaign.is_zero_state(), || Denial::NotZeroState)
}

fn withdraw(campaign: &Campaign, id: &CampaignId, ctx: &TxContext) -> Verdict {
    require_owner(campaign, ctx)?;
    require_id(campaign, id)?;

    match campaign.status {
        CampaignStatus::Verified => Ok(()),
        CampaignStatus::Completed => ensure(campaign.raised_amount >= campaign.target_amount, || {
            Denial::TargetNotReached {
                raised: campaign.raised_amount,
                target: campaign.target_amount,
            }
        }),
        actual => Err(Denial::WrongStatus {
            actual,
            required: "Verified or Completed",
        }),
    }
}

/// Any declared signer is taken as the verifying provider. Whether that key
/// belongs to an accredited provider is the identity layer's call, and the
/// document hash is recorded as evidence only.
fn verify(campaign: &Campaign, id: &CampaignId, ctx: &TxContext) -> Verdict {
    ensure(ctx.first_signer().is_some(), || Denial::NoSigner)?;
    require_active(campaign)?;
    require_id(campaign, id)
}

fn cancel(campaign: &Campaign, id: &CampaignId, ctx: &TxContext) -> Verdict {
    require_owner(campaign, ctx)?;
    require_active(campaign)?;
    require_id(campaign, id)
}

fn complete(campaign: &Campaign, id: &CampaignId, ctx: &TxContext) -> Verdict {
    require_owner(campaign, ctx)?;
    require_active(campaign)?;
    require_id(campaign, id)?;
    ensure(campaign.raised_amount >= campaign.target_amount, || {
        Denial::TargetNotReached {
            raised: campaign.raised_amount,
            target: campaign.target_amount,
        }
    })?;
    ensure(ctx.validity.has_passed(campaign.deadline), || {
        Denial::DeadlineNotPassed(campaign.deadline)
    })
}

// ---------------------------------------------------------------------------
// Shared checks
// ---------------------------------------------------------------------------

fn require_owner(campaign: &Campaign, ctx: &TxContext) -> Verdict {
    ensure(ctx.is_signed_by(&campaign.owner), || {
        Denial::MissingSignature(campaign.owner)
    })
}

fn require_active(campaign: &Campaign) -> Verdict {
    ensure(campaign.status == CampaignStatus::Active, || Denial::WrongStatus {
        actual: campaign.status,
        required: "Active",
    })
}

fn require_id(campaign: &Campaign, id: &CampaignId) -> Verdict {
    ensure(&campaign.id == id, || Denial::CampaignMismatch {
        record: campaign.id.clone(),
        action: id.clone(),
    })
}
