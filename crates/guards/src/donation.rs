//! Donation guard: contributing to and refunding from a campaign.
//!
//! The referenced campaign is read from the consumed records; the guard never
//! re-derives campaign state on its own.

use crate::lookup::require_campaign;
use crate::verdict::{ensure, Denial, GuardKind, Verdict};
use carefund_core::{Action, CampaignId, CampaignStatus, Donation, Lovelace, TxContext};

pub fn validate(donation: &Donation, action: &Action, ctx: &TxContext) -> Verdict {
    match action {
        Action::Donate {
            campaign_id,
            amount,
        } => donate(donation, campaign_id, *amount, ctx),
        Action::RequestRefund { campaign_id } => refund(donation, campaign_id, ctx),
        other => Err(Denial::UnexpectedAction {
            guard: GuardKind::Donation,
            action: other.name(),
        }),
    }
}

fn donate(donation: &Donation, id: &CampaignId, amount: Lovelace, ctx: &TxContext) -> Verdict {
    let campaign = require_campaign(&ctx.consumed, id)?;
    require_same_campaign(donation, id)?;

    ensure(campaign.status == CampaignStatus::Active, || Denial::WrongStatus {
        actual: campaign.status,
        required: "Active",
    })?;
    ensure(ctx.validity.is_entirely_before(campaign.deadline), || {
        Denial::DonationWindowClosed(campaign.deadline)
    })?;
    ensure(amount > 0, || Denial::NonPositiveAmount(amount))?;
    ensure(amount == donation.amount, || Denial::AmountMismatch {
        claimed: amount,
        recorded: donation.amount,
    })?;
    ensure(ctx.is_signed_by(&donation.donor), || {
        Denial::MissingSignature(donation.donor)
    })
}

fn refund(donation: &Donation, id: &CampaignId, ctx: &TxContext) -> Verdict {
    let campaign = require_campaign(&ctx.consumed, id)?;
    require_same_campaign(donation, id)?;

    let cancelled = campaign.status == CampaignStatus::Cancelled;
    let missed_target = ctx.validity.has_passed(campaign.deadline)
        && campaign.raised_amount < campaign.target_amount;

    ensure(cancelled || missed_target, || Denial::RefundNotAllowed)?;
    ensure(ctx.is_signed_by(&donation.donor), || {
        Denial::MissingSignature(donation.donor)
    })
}

/// A donation only ever moves money in and out of the campaign it names.
fn require_same_campaign(donation: &Donation, id: &CampaignId) -> Verdict {
    ensure(&donation.campaign_id == id, || Denial::CampaignMismatch {
        record: donation.campaign_id.clone(),
        action: id.clone(),
    })
}
